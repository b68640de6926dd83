//! In-memory store of versioned renderer component bindings
//!
//! The registry maps `(component_type, exact version)` pairs to
//! registered bindings. Hosts normally register everything once at
//! process start against the shared [`global`] store; tests build
//! isolated instances with [`ComponentRegistry::new`].
//!
//! Lifecycle: construct -> `register` per component -> `mark_initialized`
//! -> read. Initialization is advisory bookkeeping for startup logging,
//! never a gate: queries work before and after.

use crate::{Constraint, Error, PropertyDef, Result, Version};
use fabula_core::{IndexMap, ValueMap};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Component category, derived from the type-name suffix
///
/// Always recomputed from the name so the registry and any derived
/// summaries cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Passive content (`*_block`)
    Block,
    /// Unlock/choice mechanics (`*_gate`)
    Gate,
    /// Everything else
    Other,
}

/// Derive the category from a component type name
pub fn categorize(component_type: &str) -> ComponentCategory {
    if component_type.ends_with("_block") {
        ComponentCategory::Block
    } else if component_type.ends_with("_gate") {
        ComponentCategory::Gate
    } else {
        ComponentCategory::Other
    }
}

/// Registration input for one component implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRegistration {
    /// Component type tag (matches `StoryNode::node_type`)
    pub component_type: String,
    /// Version string, strict `major.minor.patch`
    pub version: String,
    /// Opaque renderer binding key for the host UI layer
    pub binding: String,
    /// Declared props schema
    #[serde(default)]
    pub props_schema: Vec<PropertyDef>,
    /// Default props merged under the node payload
    #[serde(default)]
    pub default_props: ValueMap,
    /// Components this one depends on: type -> version constraint
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

impl ComponentRegistration {
    /// Create a registration
    pub fn new(
        component_type: impl Into<String>,
        version: impl Into<String>,
        binding: impl Into<String>,
    ) -> Self {
        Self {
            component_type: component_type.into(),
            version: version.into(),
            binding: binding.into(),
            props_schema: Vec::new(),
            default_props: ValueMap::new(),
            dependencies: IndexMap::new(),
        }
    }

    /// Add a props-schema entry
    pub fn with_prop(mut self, prop: PropertyDef) -> Self {
        self.props_schema.push(prop);
        self
    }

    /// Add a default prop
    pub fn with_default_prop(
        mut self,
        key: impl Into<String>,
        value: impl Into<fabula_core::Value>,
    ) -> Self {
        self.default_props.insert(key.into(), value.into());
        self
    }

    /// Declare a dependency on another component type
    pub fn with_dependency(
        mut self,
        component_type: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        self.dependencies
            .insert(component_type.into(), constraint.into());
        self
    }
}

/// A registered component implementation at one exact version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredComponent {
    pub component_type: String,
    /// Parsed version, validated at registration
    pub version: Version,
    /// The original version string
    pub version_string: String,
    pub binding: String,
    pub props_schema: Vec<PropertyDef>,
    pub default_props: ValueMap,
    pub dependencies: IndexMap<String, String>,
}

impl RegisteredComponent {
    /// Category derived from the type name
    pub fn category(&self) -> ComponentCategory {
        categorize(&self.component_type)
    }
}

/// Per-category registration counts for startup logging
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrySummary {
    pub component_types: usize,
    pub registrations: usize,
    pub blocks: usize,
    pub gates: usize,
    pub other: usize,
}

/// The versioned component store
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    /// type -> version string -> component
    components: IndexMap<String, IndexMap<String, RegisteredComponent>>,
    initialized: bool,
}

impl ComponentRegistry {
    /// Create an empty, isolated registry (used by tests and tools)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component implementation
    ///
    /// An unparseable version string is a hard error. Registering the
    /// same `(type, version)` twice logs a warning and keeps the last
    /// write.
    pub fn register(&mut self, registration: ComponentRegistration) -> Result<()> {
        let version = Version::parse(&registration.version)
            .ok_or_else(|| Error::InvalidVersion(registration.version.clone()))?;
        let version_string = version.to_string();

        let versions = self
            .components
            .entry(registration.component_type.clone())
            .or_default();
        if versions.contains_key(&version_string) {
            tracing::warn!(
                component_type = %registration.component_type,
                version = %version_string,
                "overwriting existing component registration"
            );
        }
        versions.insert(
            version_string.clone(),
            RegisteredComponent {
                component_type: registration.component_type,
                version,
                version_string,
                binding: registration.binding,
                props_schema: registration.props_schema,
                default_props: registration.default_props,
                dependencies: registration.dependencies,
            },
        );
        Ok(())
    }

    /// Highest registered version satisfying the constraint
    pub fn find_by_constraint(
        &self,
        component_type: &str,
        constraint: &Constraint,
    ) -> Option<&RegisteredComponent> {
        self.components
            .get(component_type)?
            .values()
            .filter(|c| constraint.satisfies(&c.version))
            .max_by_key(|c| c.version)
    }

    /// Highest registered version regardless of constraints
    pub fn get_latest(&self, component_type: &str) -> Option<&RegisteredComponent> {
        self.components
            .get(component_type)?
            .values()
            .max_by_key(|c| c.version)
    }

    /// Exact version lookup
    pub fn get_exact(
        &self,
        component_type: &str,
        version: &Version,
    ) -> Option<&RegisteredComponent> {
        self.components
            .get(component_type)?
            .get(&version.to_string())
    }

    /// Check if any version of the type is registered
    pub fn has_component_type(&self, component_type: &str) -> bool {
        self.components
            .get(component_type)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Check if an exact version of the type is registered
    pub fn has_version(&self, component_type: &str, version: &Version) -> bool {
        self.get_exact(component_type, version).is_some()
    }

    /// Registered versions of a type, ascending
    pub fn versions_of(&self, component_type: &str) -> Vec<Version> {
        let mut versions: Vec<Version> = self
            .components
            .get(component_type)
            .map(|v| v.values().map(|c| c.version).collect())
            .unwrap_or_default();
        versions.sort();
        versions
    }

    /// Iterate over the registered component type names
    pub fn component_types(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Total number of registered `(type, version)` pairs
    pub fn len(&self) -> usize {
        self.components.values().map(|v| v.len()).sum()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark startup registration as finished (advisory only)
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Whether `mark_initialized` has been called
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Remove every registration and reset the initialized flag
    pub fn clear(&mut self) {
        self.components.clear();
        self.initialized = false;
    }

    /// Per-category counts, recomputed on demand
    pub fn summary(&self) -> RegistrySummary {
        let mut summary = RegistrySummary {
            component_types: self.components.len(),
            ..RegistrySummary::default()
        };
        for versions in self.components.values() {
            for component in versions.values() {
                summary.registrations += 1;
                match component.category() {
                    ComponentCategory::Block => summary.blocks += 1,
                    ComponentCategory::Gate => summary.gates += 1,
                    ComponentCategory::Other => summary.other += 1,
                }
            }
        }
        summary
    }
}

static GLOBAL_REGISTRY: OnceLock<Mutex<ComponentRegistry>> = OnceLock::new();

/// The process-wide registry shared by the host application
///
/// Registration is expected to happen once at startup, before
/// concurrent reads begin (write-once/read-many).
pub fn global() -> &'static Mutex<ComponentRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Mutex::new(ComponentRegistry::new()))
}

/// Register a component in the process-wide registry
pub fn register_component(registration: ComponentRegistration) -> Result<()> {
    global()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register(registration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn text_block(version: &str) -> ComponentRegistration {
        ComponentRegistration::new("text_block", version, "renderers/text")
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("text_block"), ComponentCategory::Block);
        assert_eq!(categorize("choice_gate"), ComponentCategory::Gate);
        assert_eq!(categorize("end"), ComponentCategory::Other);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry.register(text_block("1.2.0")).unwrap();

        assert!(registry.has_component_type("text_block"));
        assert!(!registry.has_component_type("video_block"));
        assert!(registry.has_version("text_block", &v("1.2.0")));
        assert!(!registry.has_version("text_block", &v("1.1.0")));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.versions_of("text_block"),
            vec![v("1.0.0"), v("1.2.0")]
        );
    }

    #[test]
    fn test_register_invalid_version_is_hard_error() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(
            registry.register(text_block("1.2")),
            Err(Error::InvalidVersion("1.2".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry
            .register(ComponentRegistration::new(
                "text_block",
                "1.0.0",
                "renderers/text-v2",
            ))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_exact("text_block", &v("1.0.0")).unwrap().binding,
            "renderers/text-v2"
        );
    }

    #[test]
    fn test_find_by_constraint_picks_highest() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry.register(text_block("1.2.0")).unwrap();
        registry.register(text_block("2.0.0")).unwrap();

        let found = registry
            .find_by_constraint("text_block", &Constraint::parse("^1.0.0").unwrap())
            .unwrap();
        assert_eq!(found.version, v("1.2.0"));

        assert!(registry
            .find_by_constraint("text_block", &Constraint::parse("^3.0.0").unwrap())
            .is_none());
    }

    #[test]
    fn test_get_latest_ignores_constraints() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry.register(text_block("2.0.0")).unwrap();
        assert_eq!(registry.get_latest("text_block").unwrap().version, v("2.0.0"));
    }

    #[test]
    fn test_initialized_is_advisory() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        // Queries work before initialization is marked
        assert!(registry.has_component_type("text_block"));
        assert!(!registry.is_initialized());

        registry.mark_initialized();
        assert!(registry.is_initialized());
        assert!(registry.has_component_type("text_block"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry.mark_initialized();

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_summary_counts_by_category() {
        let mut registry = ComponentRegistry::new();
        registry.register(text_block("1.0.0")).unwrap();
        registry.register(text_block("1.1.0")).unwrap();
        registry
            .register(ComponentRegistration::new("choice_gate", "1.0.0", "renderers/choice"))
            .unwrap();
        registry
            .register(ComponentRegistration::new("end", "1.0.0", "renderers/end"))
            .unwrap();

        let summary = registry.summary();
        assert_eq!(summary.component_types, 3);
        assert_eq!(summary.registrations, 4);
        assert_eq!(summary.blocks, 2);
        assert_eq!(summary.gates, 1);
        assert_eq!(summary.other, 1);
    }

    #[test]
    fn test_global_registry_lifecycle() {
        // Keep this the only test touching the shared store, with a
        // type name no other test uses
        register_component(ComponentRegistration::new(
            "global_smoke_block",
            "1.0.0",
            "renderers/smoke",
        ))
        .unwrap();

        let registry = global().lock().unwrap();
        assert!(registry.has_component_type("global_smoke_block"));
    }
}
