//! Semantic version triples and range constraints
//!
//! Deliberately hand-rolled: the caret operator is stricter than
//! published-crate conventions at the 0.x low end (`^0.0.3` matches only
//! `0.0.3`), reflecting how unstable renderer components are versioned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Which component [`Version::bump`] increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

impl Version {
    /// Create a version from its three components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `major.minor.patch` string
    ///
    /// Anything else (missing parts, signs, suffixes, empty components)
    /// yields `None`; parsing never panics.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.trim().split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }

    /// Increment one component, resetting the lower ones
    pub fn bump(&self, part: VersionPart) -> Self {
        match part {
            VersionPart::Major => Self::new(self.major + 1, 0, 0),
            VersionPart::Minor => Self::new(self.major, self.minor + 1, 0),
            VersionPart::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Sort versions ascending
pub fn sort_ascending(versions: &mut [Version]) {
    versions.sort();
}

/// Sort versions descending
pub fn sort_descending(versions: &mut [Version]) {
    versions.sort_by(|a, b| b.cmp(a));
}

/// The operator of a range constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintOp {
    /// No prefix or `=`: exact match
    Exact,
    /// `^`: compatible within the leftmost non-zero component
    Caret,
    /// `~`: same major.minor, patch at or above
    Tilde,
    /// `>=`
    GreaterEq,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `<`
    Less,
}

/// A version range constraint such as `^1.2.0` or `>=2.0.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: Version,
}

impl Constraint {
    /// Create a constraint from operator and floor version
    pub fn new(op: ConstraintOp, version: Version) -> Self {
        Self { op, version }
    }

    /// Parse an optional operator prefix followed by a version
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (op, rest) = if let Some(rest) = input.strip_prefix(">=") {
            (ConstraintOp::GreaterEq, rest)
        } else if let Some(rest) = input.strip_prefix("<=") {
            (ConstraintOp::LessEq, rest)
        } else if let Some(rest) = input.strip_prefix('^') {
            (ConstraintOp::Caret, rest)
        } else if let Some(rest) = input.strip_prefix('~') {
            (ConstraintOp::Tilde, rest)
        } else if let Some(rest) = input.strip_prefix('>') {
            (ConstraintOp::Greater, rest)
        } else if let Some(rest) = input.strip_prefix('<') {
            (ConstraintOp::Less, rest)
        } else if let Some(rest) = input.strip_prefix('=') {
            (ConstraintOp::Exact, rest)
        } else {
            (ConstraintOp::Exact, input)
        };
        Version::parse(rest).map(|version| Self::new(op, version))
    }

    /// Check whether a concrete version satisfies this constraint
    pub fn satisfies(&self, candidate: &Version) -> bool {
        let floor = &self.version;
        match self.op {
            ConstraintOp::Exact => candidate == floor,
            ConstraintOp::Caret => {
                if floor.major > 0 {
                    candidate.major == floor.major
                        && (candidate.minor, candidate.patch) >= (floor.minor, floor.patch)
                } else if floor.minor > 0 {
                    // 0.x releases only promise compatibility within a minor
                    candidate.major == 0
                        && candidate.minor == floor.minor
                        && candidate.patch >= floor.patch
                } else {
                    // 0.0.x promises nothing beyond the exact patch
                    candidate == floor
                }
            }
            ConstraintOp::Tilde => {
                candidate.major == floor.major
                    && candidate.minor == floor.minor
                    && candidate.patch >= floor.patch
            }
            ConstraintOp::GreaterEq => candidate >= floor,
            ConstraintOp::LessEq => candidate <= floor,
            ConstraintOp::Greater => candidate > floor,
            ConstraintOp::Less => candidate < floor,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.op {
            ConstraintOp::Exact => "",
            ConstraintOp::Caret => "^",
            ConstraintOp::Tilde => "~",
            ConstraintOp::GreaterEq => ">=",
            ConstraintOp::LessEq => "<=",
            ConstraintOp::Greater => ">",
            ConstraintOp::Less => "<",
        };
        write!(f, "{}{}", prefix, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(Version::parse("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(Version::parse("0.0.0"), Some(Version::new(0, 0, 0)));
        assert_eq!(Version::parse(" 10.20.30 "), Some(Version::new(10, 20, 30)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "", "1", "1.2", "1.2.3.4", "1.2.x", "a.b.c", "-1.2.3", "+1.2.3", "1..3", "1.2.3-rc1",
        ] {
            assert_eq!(Version::parse(bad), None, "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(v("2.0.0") > v("1.9.9"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("1.0.10") > v("1.0.9"));
    }

    #[test]
    fn test_bump_resets_lower_parts() {
        assert_eq!(v("1.2.3").bump(VersionPart::Major), v("2.0.0"));
        assert_eq!(v("1.2.3").bump(VersionPart::Minor), v("1.3.0"));
        assert_eq!(v("1.2.3").bump(VersionPart::Patch), v("1.2.4"));
    }

    #[test]
    fn test_sort_helpers() {
        let mut versions = vec![v("1.10.0"), v("0.9.0"), v("1.2.0")];
        sort_ascending(&mut versions);
        assert_eq!(versions, vec![v("0.9.0"), v("1.2.0"), v("1.10.0")]);
        sort_descending(&mut versions);
        assert_eq!(versions, vec![v("1.10.0"), v("1.2.0"), v("0.9.0")]);
    }

    #[test]
    fn test_constraint_parse() {
        let c = Constraint::parse("^1.2.0").unwrap();
        assert_eq!(c.op, ConstraintOp::Caret);
        assert_eq!(c.version, v("1.2.0"));

        assert_eq!(Constraint::parse("1.2.0").unwrap().op, ConstraintOp::Exact);
        assert_eq!(Constraint::parse("=1.2.0").unwrap().op, ConstraintOp::Exact);
        assert_eq!(
            Constraint::parse(">=1.2.0").unwrap().op,
            ConstraintOp::GreaterEq
        );
        assert_eq!(Constraint::parse("~0.3.1").unwrap().op, ConstraintOp::Tilde);
        assert_eq!(Constraint::parse("^x.y.z"), None);
        assert_eq!(Constraint::parse(""), None);
    }

    #[test]
    fn test_caret_stable() {
        let c = Constraint::parse("^1.2.3").unwrap();
        assert!(c.satisfies(&v("1.2.3")));
        assert!(c.satisfies(&v("1.3.0")));
        assert!(c.satisfies(&v("1.99.0")));
        assert!(!c.satisfies(&v("1.2.2")));
        assert!(!c.satisfies(&v("2.0.0")));
        assert!(!c.satisfies(&v("0.9.9")));
    }

    #[test]
    fn test_caret_zero_minor() {
        let c = Constraint::parse("^0.2.1").unwrap();
        assert!(c.satisfies(&v("0.2.1")));
        assert!(c.satisfies(&v("0.2.9")));
        assert!(!c.satisfies(&v("0.3.0")));
        assert!(!c.satisfies(&v("1.2.1")));
    }

    #[test]
    fn test_caret_zero_zero() {
        let c = Constraint::parse("^0.0.3").unwrap();
        assert!(c.satisfies(&v("0.0.3")));
        assert!(!c.satisfies(&v("0.0.4")));
        assert!(!c.satisfies(&v("0.1.0")));
    }

    #[test]
    fn test_tilde() {
        let c = Constraint::parse("~1.2.3").unwrap();
        assert!(c.satisfies(&v("1.2.3")));
        assert!(c.satisfies(&v("1.2.9")));
        assert!(!c.satisfies(&v("1.3.0")));
        assert!(!c.satisfies(&v("1.2.2")));
    }

    #[test]
    fn test_comparators() {
        assert!(Constraint::parse(">1.0.0").unwrap().satisfies(&v("1.0.1")));
        assert!(!Constraint::parse(">1.0.0").unwrap().satisfies(&v("1.0.0")));
        assert!(Constraint::parse("<=2.0.0").unwrap().satisfies(&v("2.0.0")));
        assert!(Constraint::parse("<2.0.0").unwrap().satisfies(&v("1.9.9")));
        assert!(!Constraint::parse("<2.0.0").unwrap().satisfies(&v("2.0.0")));
    }
}
