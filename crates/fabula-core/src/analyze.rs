//! Pure analysis utilities over condition trees
//!
//! Everything here is non-mutating: extraction of referenced keys and
//! items, structural well-formedness checks, size and depth metrics, a
//! flattening simplifier, and a human-readable rendering. The validator
//! reuses the structural checks when auditing a whole graph.

use crate::{Condition, IndexSet};
use std::fmt;

/// A structural problem found in a condition tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionIssue {
    /// A logical combinator with no sub-conditions
    EmptyCombinator { operator: &'static str },
    /// A comparator with an empty state key
    EmptyKey { operator: &'static str },
    /// An inventory predicate with an empty item id
    EmptyItem { operator: &'static str },
    /// An operator tag this engine version does not recognize
    UnknownOperator,
}

impl fmt::Display for ConditionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionIssue::EmptyCombinator { operator } => {
                write!(f, "`{}` combinator has no sub-conditions", operator)
            }
            ConditionIssue::EmptyKey { operator } => {
                write!(f, "`{}` comparator has an empty state key", operator)
            }
            ConditionIssue::EmptyItem { operator } => {
                write!(f, "`{}` predicate has an empty item id", operator)
            }
            ConditionIssue::UnknownOperator => write!(f, "unknown condition operator"),
        }
    }
}

/// Collect every game-state key the condition dereferences
pub fn referenced_keys(condition: &Condition) -> IndexSet<String> {
    let mut keys = IndexSet::new();
    collect_keys(condition, &mut keys);
    keys
}

fn collect_keys(condition: &Condition, keys: &mut IndexSet<String>) {
    match condition {
        Condition::And { conditions } | Condition::Or { conditions } => {
            for c in conditions {
                collect_keys(c, keys);
            }
        }
        Condition::Equals { key, .. }
        | Condition::NotEquals { key, .. }
        | Condition::GreaterThan { key, .. }
        | Condition::LessThan { key, .. }
        | Condition::Contains { key, .. }
        | Condition::NotContains { key, .. } => {
            keys.insert(key.clone());
        }
        Condition::HasItem { .. } | Condition::NotHasItem { .. } | Condition::Unknown => {}
    }
}

/// Collect every inventory item id the condition tests
pub fn referenced_items(condition: &Condition) -> IndexSet<String> {
    let mut items = IndexSet::new();
    collect_items(condition, &mut items);
    items
}

fn collect_items(condition: &Condition, items: &mut IndexSet<String>) {
    match condition {
        Condition::And { conditions } | Condition::Or { conditions } => {
            for c in conditions {
                collect_items(c, items);
            }
        }
        Condition::HasItem { item } | Condition::NotHasItem { item } => {
            items.insert(item.clone());
        }
        _ => {}
    }
}

/// Check structural well-formedness, recursively
///
/// Returns every issue found rather than stopping at the first, so
/// authoring tools can report all problems in one pass.
pub fn check_condition(condition: &Condition) -> Vec<ConditionIssue> {
    let mut issues = Vec::new();
    check_rec(condition, &mut issues);
    issues
}

fn check_rec(condition: &Condition, issues: &mut Vec<ConditionIssue>) {
    match condition {
        Condition::And { conditions } | Condition::Or { conditions } => {
            if conditions.is_empty() {
                issues.push(ConditionIssue::EmptyCombinator {
                    operator: operator_name(condition),
                });
            }
            for c in conditions {
                check_rec(c, issues);
            }
        }
        Condition::Equals { key, .. }
        | Condition::NotEquals { key, .. }
        | Condition::GreaterThan { key, .. }
        | Condition::LessThan { key, .. }
        | Condition::Contains { key, .. }
        | Condition::NotContains { key, .. } => {
            if key.is_empty() {
                issues.push(ConditionIssue::EmptyKey {
                    operator: operator_name(condition),
                });
            }
        }
        Condition::HasItem { item } | Condition::NotHasItem { item } => {
            if item.is_empty() {
                issues.push(ConditionIssue::EmptyItem {
                    operator: operator_name(condition),
                });
            }
        }
        Condition::Unknown => issues.push(ConditionIssue::UnknownOperator),
    }
}

/// Count every node in the condition tree, combinators included
pub fn count_conditions(condition: &Condition) -> usize {
    match condition {
        Condition::And { conditions } | Condition::Or { conditions } => {
            1 + conditions.iter().map(count_conditions).sum::<usize>()
        }
        _ => 1,
    }
}

/// Maximum nesting depth; a leaf is depth 1
pub fn max_depth(condition: &Condition) -> usize {
    match condition {
        Condition::And { conditions } | Condition::Or { conditions } => {
            1 + conditions.iter().map(max_depth).max().unwrap_or(0)
        }
        _ => 1,
    }
}

/// Collapse nested same-operator combinators
///
/// `and(and(a, b), c)` becomes `and(a, b, c)`; a combinator left with a
/// single child collapses to that child. Leaves are returned unchanged.
pub fn flatten(condition: &Condition) -> Condition {
    match condition {
        Condition::And { conditions } => rebuild_combinator(conditions, true),
        Condition::Or { conditions } => rebuild_combinator(conditions, false),
        leaf => leaf.clone(),
    }
}

fn rebuild_combinator(children: &[Condition], is_and: bool) -> Condition {
    let mut flat = Vec::new();
    for child in children {
        match (flatten(child), is_and) {
            (Condition::And { conditions }, true) => flat.extend(conditions),
            (Condition::Or { conditions }, false) => flat.extend(conditions),
            (other, _) => flat.push(other),
        }
    }
    if flat.len() == 1 {
        return flat.into_iter().next().unwrap();
    }
    if is_and {
        Condition::And { conditions: flat }
    } else {
        Condition::Or { conditions: flat }
    }
}

/// Render a condition as a human-readable string
pub fn describe(condition: &Condition) -> String {
    match condition {
        Condition::And { conditions } => join_described(conditions, " and "),
        Condition::Or { conditions } => join_described(conditions, " or "),
        Condition::Equals { key, value } => format!("{} == {}", key, value),
        Condition::NotEquals { key, value } => format!("{} != {}", key, value),
        Condition::GreaterThan { key, value } => format!("{} > {}", key, value),
        Condition::LessThan { key, value } => format!("{} < {}", key, value),
        Condition::Contains { key, value } => format!("{} contains {}", key, value),
        Condition::NotContains { key, value } => format!("{} does not contain {}", key, value),
        Condition::HasItem { item } => format!("has item '{}'", item),
        Condition::NotHasItem { item } => format!("lacks item '{}'", item),
        Condition::Unknown => "<unknown>".to_string(),
    }
}

fn join_described(conditions: &[Condition], separator: &str) -> String {
    let parts: Vec<String> = conditions.iter().map(describe).collect();
    format!("({})", parts.join(separator))
}

fn operator_name(condition: &Condition) -> &'static str {
    match condition {
        Condition::And { .. } => "and",
        Condition::Or { .. } => "or",
        Condition::Equals { .. } => "equals",
        Condition::NotEquals { .. } => "not_equals",
        Condition::GreaterThan { .. } => "greater_than",
        Condition::LessThan { .. } => "less_than",
        Condition::Contains { .. } => "contains",
        Condition::NotContains { .. } => "not_contains",
        Condition::HasItem { .. } => "has_item",
        Condition::NotHasItem { .. } => "not_has_item",
        Condition::Unknown => "unknown",
    }
}
