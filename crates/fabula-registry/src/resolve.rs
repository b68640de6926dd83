//! Constraint resolution with fallback strategies
//!
//! Resolution never throws: a constraint that cannot be satisfied comes
//! back as a structured failure and the caller decides how loud to be.
//! Fallbacks (latest, compatible) attach an explanatory message to the
//! outcome and log a warning, so silently-degraded stories stay visible.

use crate::{ComponentRegistry, Constraint, RegisteredComponent, StoryManifest, Version};
use fabula_core::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do when no registered version satisfies a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Fail the resolution
    #[default]
    Strict,
    /// Use the newest registered version regardless of fit
    Latest,
    /// Use the newest version sharing the constraint's major number
    Compatible,
}

/// Outcome of resolving one component constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub component_type: String,
    /// The constraint as requested by the manifest
    pub constraint: String,
    /// The version settled on, when resolution succeeded
    pub version: Option<Version>,
    /// Explanation attached when a fallback strategy was applied
    pub message: Option<String>,
    /// Why resolution failed, when it did
    pub error: Option<String>,
}

impl ResolutionResult {
    /// Whether a concrete version was settled on
    pub fn resolved(&self) -> bool {
        self.version.is_some()
    }

    fn success(component_type: &str, constraint: &str, version: Version) -> Self {
        Self {
            component_type: component_type.to_string(),
            constraint: constraint.to_string(),
            version: Some(version),
            message: None,
            error: None,
        }
    }

    fn fallback(
        component_type: &str,
        constraint: &str,
        version: Version,
        message: String,
    ) -> Self {
        tracing::warn!(component_type, constraint, %version, "{}", message);
        Self {
            component_type: component_type.to_string(),
            constraint: constraint.to_string(),
            version: Some(version),
            message: Some(message),
            error: None,
        }
    }

    fn failure(component_type: &str, constraint: &str, error: String) -> Self {
        Self {
            component_type: component_type.to_string(),
            constraint: constraint.to_string(),
            version: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Resolve a component constraint against the registry
///
/// Tries an exact constraint match first; on failure the strategy
/// decides whether and how to degrade.
pub fn resolve_version(
    registry: &ComponentRegistry,
    component_type: &str,
    constraint_str: &str,
    strategy: FallbackStrategy,
) -> ResolutionResult {
    let Some(constraint) = Constraint::parse(constraint_str) else {
        return ResolutionResult::failure(
            component_type,
            constraint_str,
            format!("invalid version constraint {:?}", constraint_str),
        );
    };

    if let Some(found) = registry.find_by_constraint(component_type, &constraint) {
        return ResolutionResult::success(component_type, constraint_str, found.version);
    }

    if !registry.has_component_type(component_type) {
        return ResolutionResult::failure(
            component_type,
            constraint_str,
            format!("no versions of {} are registered", component_type),
        );
    }

    match strategy {
        FallbackStrategy::Strict => ResolutionResult::failure(
            component_type,
            constraint_str,
            format!(
                "no registered version of {} satisfies {}",
                component_type, constraint_str
            ),
        ),
        FallbackStrategy::Latest => match registry.get_latest(component_type) {
            Some(latest) => ResolutionResult::fallback(
                component_type,
                constraint_str,
                latest.version,
                format!(
                    "no version of {} satisfies {}; falling back to latest {}",
                    component_type, constraint_str, latest.version
                ),
            ),
            None => ResolutionResult::failure(
                component_type,
                constraint_str,
                format!("no versions of {} are registered", component_type),
            ),
        },
        FallbackStrategy::Compatible => {
            let same_major = registry
                .versions_of(component_type)
                .into_iter()
                .filter(|v| v.major == constraint.version.major)
                .max();
            match same_major {
                Some(version) => ResolutionResult::fallback(
                    component_type,
                    constraint_str,
                    version,
                    format!(
                        "no version of {} satisfies {}; falling back to compatible {}",
                        component_type, constraint_str, version
                    ),
                ),
                None => ResolutionResult::failure(
                    component_type,
                    constraint_str,
                    format!(
                        "no registered version of {} shares major {} with {}",
                        component_type, constraint.version.major, constraint_str
                    ),
                ),
            }
        }
    }
}

/// Resolve a constraint and hand back the registered component itself
///
/// Convenience for the renderer boundary: maps a node's
/// `(node_type, constraint)` straight to the binding to instantiate.
pub fn get_resolved_component<'a>(
    registry: &'a ComponentRegistry,
    component_type: &str,
    constraint_str: &str,
    strategy: FallbackStrategy,
) -> Option<&'a RegisteredComponent> {
    resolve_version(registry, component_type, constraint_str, strategy)
        .version
        .and_then(|version| registry.get_exact(component_type, &version))
}

/// Aggregated outcome of resolving a manifest
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManifestResolution {
    /// Successfully settled components: type -> version
    pub resolved: IndexMap<String, Version>,
    /// Every failed constraint, in manifest order
    pub failures: Vec<ResolutionResult>,
}

impl ManifestResolution {
    /// Whether every required component resolved
    pub fn fully_resolved(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve every component a manifest requires
pub fn resolve_manifest(
    registry: &ComponentRegistry,
    manifest: &StoryManifest,
    strategy: FallbackStrategy,
) -> ManifestResolution {
    let mut outcome = ManifestResolution::default();
    for (component_type, constraint) in &manifest.required_components {
        let result = resolve_version(registry, component_type, constraint, strategy);
        match result.version {
            Some(version) => {
                outcome.resolved.insert(component_type.clone(), version);
            }
            None => outcome.failures.push(result),
        }
    }
    outcome
}

/// Resolve a manifest and, recursively, each resolved component's
/// declared dependencies
///
/// The visited set is keyed `type@constraint`; revisiting a pair
/// short-circuits as already-handled rather than erroring, so dependency
/// cycles are tolerated.
pub fn resolve_with_dependencies(
    registry: &ComponentRegistry,
    manifest: &StoryManifest,
    strategy: FallbackStrategy,
) -> ManifestResolution {
    let mut outcome = ManifestResolution::default();
    let mut visited: HashSet<String> = HashSet::new();
    for (component_type, constraint) in &manifest.required_components {
        resolve_recursive(
            registry,
            component_type,
            constraint,
            strategy,
            &mut visited,
            &mut outcome,
        );
    }
    outcome
}

fn resolve_recursive(
    registry: &ComponentRegistry,
    component_type: &str,
    constraint: &str,
    strategy: FallbackStrategy,
    visited: &mut HashSet<String>,
    outcome: &mut ManifestResolution,
) {
    if !visited.insert(format!("{}@{}", component_type, constraint)) {
        return;
    }

    let result = resolve_version(registry, component_type, constraint, strategy);
    let Some(version) = result.version else {
        outcome.failures.push(result);
        return;
    };
    outcome
        .resolved
        .insert(component_type.to_string(), version);

    if let Some(component) = registry.get_exact(component_type, &version) {
        // Walk the resolved component's own requirements
        let dependencies = component.dependencies.clone();
        for (dep_type, dep_constraint) in &dependencies {
            resolve_recursive(registry, dep_type, dep_constraint, strategy, visited, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentRegistration;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn seeded_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register(ComponentRegistration::new("text_block", "1.0.0", "renderers/text"))
            .unwrap();
        registry
            .register(ComponentRegistration::new("text_block", "1.2.0", "renderers/text"))
            .unwrap();
        registry
            .register(ComponentRegistration::new("choice_gate", "2.1.0", "renderers/choice"))
            .unwrap();
        registry
    }

    #[test]
    fn test_exact_constraint_resolution() {
        let registry = seeded_registry();
        let result = resolve_version(
            &registry,
            "text_block",
            "^1.0.0",
            FallbackStrategy::Strict,
        );
        assert!(result.resolved());
        assert_eq!(result.version, Some(v("1.2.0")));
        assert!(result.message.is_none());
    }

    #[test]
    fn test_strict_fails_without_fallback() {
        let registry = seeded_registry();
        let result = resolve_version(
            &registry,
            "text_block",
            "^2.0.0",
            FallbackStrategy::Strict,
        );
        assert!(!result.resolved());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_latest_fallback_attaches_message() {
        let registry = seeded_registry();
        let result = resolve_version(
            &registry,
            "text_block",
            "^2.0.0",
            FallbackStrategy::Latest,
        );
        assert_eq!(result.version, Some(v("1.2.0")));
        assert!(result.message.is_some());
    }

    #[test]
    fn test_compatible_fallback_same_major() {
        let mut registry = seeded_registry();
        registry
            .register(ComponentRegistration::new("text_block", "2.0.0", "renderers/text"))
            .unwrap();

        // ^2.5.0 matches nothing, but 2.0.0 shares the major
        let result = resolve_version(
            &registry,
            "text_block",
            "^2.5.0",
            FallbackStrategy::Compatible,
        );
        assert_eq!(result.version, Some(v("2.0.0")));
        assert!(result.message.is_some());

        // Major 3 has no registered versions at all
        let result = resolve_version(
            &registry,
            "text_block",
            "^3.0.0",
            FallbackStrategy::Compatible,
        );
        assert!(!result.resolved());
    }

    #[test]
    fn test_unregistered_type_fails_every_strategy() {
        let registry = seeded_registry();
        for strategy in [
            FallbackStrategy::Strict,
            FallbackStrategy::Latest,
            FallbackStrategy::Compatible,
        ] {
            let result = resolve_version(&registry, "video_block", "^1.0.0", strategy);
            assert!(!result.resolved(), "strategy {:?}", strategy);
        }
    }

    #[test]
    fn test_invalid_constraint_is_soft_failure() {
        let registry = seeded_registry();
        let result = resolve_version(
            &registry,
            "text_block",
            "about-one-ish",
            FallbackStrategy::Latest,
        );
        assert!(!result.resolved());
        assert!(result.error.unwrap().contains("invalid version constraint"));
    }

    #[test]
    fn test_get_resolved_component() {
        let registry = seeded_registry();
        let component = get_resolved_component(
            &registry,
            "text_block",
            "^1.0.0",
            FallbackStrategy::Strict,
        )
        .unwrap();
        assert_eq!(component.version, v("1.2.0"));

        assert!(get_resolved_component(
            &registry,
            "text_block",
            "^9.0.0",
            FallbackStrategy::Strict
        )
        .is_none());
    }

    #[test]
    fn test_resolve_manifest_aggregates() {
        let registry = seeded_registry();
        let manifest = StoryManifest::new("1.0.0")
            .require("text_block", "^1.0.0")
            .require("choice_gate", "^2.0.0")
            .require("video_block", "^1.0.0");

        let outcome = resolve_manifest(&registry, &manifest, FallbackStrategy::Strict);
        assert!(!outcome.fully_resolved());
        assert_eq!(outcome.resolved.get("text_block"), Some(&v("1.2.0")));
        assert_eq!(outcome.resolved.get("choice_gate"), Some(&v("2.1.0")));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].component_type, "video_block");
    }

    #[test]
    fn test_resolve_with_dependencies_walks_tree() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                ComponentRegistration::new("story_gate", "1.0.0", "renderers/story")
                    .with_dependency("text_block", "^1.0.0"),
            )
            .unwrap();
        registry
            .register(ComponentRegistration::new("text_block", "1.4.0", "renderers/text"))
            .unwrap();

        let manifest = StoryManifest::new("1.0.0").require("story_gate", "^1.0.0");
        let outcome = resolve_with_dependencies(&registry, &manifest, FallbackStrategy::Strict);

        assert!(outcome.fully_resolved());
        assert_eq!(outcome.resolved.get("story_gate"), Some(&v("1.0.0")));
        assert_eq!(outcome.resolved.get("text_block"), Some(&v("1.4.0")));
    }

    #[test]
    fn test_dependency_cycles_are_tolerated() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                ComponentRegistration::new("a_block", "1.0.0", "renderers/a")
                    .with_dependency("b_block", "^1.0.0"),
            )
            .unwrap();
        registry
            .register(
                ComponentRegistration::new("b_block", "1.0.0", "renderers/b")
                    .with_dependency("a_block", "^1.0.0"),
            )
            .unwrap();

        let manifest = StoryManifest::new("1.0.0").require("a_block", "^1.0.0");
        let outcome = resolve_with_dependencies(&registry, &manifest, FallbackStrategy::Strict);

        assert!(outcome.fully_resolved());
        assert_eq!(outcome.resolved.len(), 2);
    }

    #[test]
    fn test_dependency_failure_is_reported() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                ComponentRegistration::new("story_gate", "1.0.0", "renderers/story")
                    .with_dependency("missing_block", "^1.0.0"),
            )
            .unwrap();

        let manifest = StoryManifest::new("1.0.0").require("story_gate", "^1.0.0");
        let outcome = resolve_with_dependencies(&registry, &manifest, FallbackStrategy::Strict);

        assert!(!outcome.fully_resolved());
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.failures[0].component_type, "missing_block");
    }
}
