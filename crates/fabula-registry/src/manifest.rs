//! Story manifests - what a story requires from the registry

use fabula_core::IndexMap;
use serde::{Deserialize, Serialize};

/// A story's declared component requirements
///
/// Resolved against the live registry at load time; the optional
/// `resolved_components` records the outcome for display or caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryManifest {
    /// component type -> version constraint
    #[serde(default)]
    pub required_components: IndexMap<String, String>,
    /// Engine version the story was authored against
    pub engine_version: String,
    /// Concrete versions settled on by a previous resolution
    #[serde(default)]
    pub resolved_components: Option<IndexMap<String, String>>,
}

impl StoryManifest {
    /// Create an empty manifest for the given engine version
    pub fn new(engine_version: impl Into<String>) -> Self {
        Self {
            required_components: IndexMap::new(),
            engine_version: engine_version.into(),
            resolved_components: None,
        }
    }

    /// Require a component type under a version constraint
    pub fn require(
        mut self,
        component_type: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        self.required_components
            .insert(component_type.into(), constraint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_builder() {
        let manifest = StoryManifest::new("1.0.0")
            .require("text_block", "^1.0.0")
            .require("choice_gate", "~2.1.0");

        assert_eq!(manifest.engine_version, "1.0.0");
        assert_eq!(manifest.required_components.len(), 2);
        assert_eq!(
            manifest.required_components.get("choice_gate"),
            Some(&"~2.1.0".to_string())
        );
        assert!(manifest.resolved_components.is_none());
    }

    #[test]
    fn test_manifest_round_trip() {
        let manifest = StoryManifest::new("1.0.0").require("text_block", "^1.0.0");
        let encoded = ron::to_string(&manifest).unwrap();
        let decoded: StoryManifest = ron::from_str(&encoded).unwrap();
        assert_eq!(manifest, decoded);
    }
}
