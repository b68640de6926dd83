//! Fabula Registry - versioned renderer component bindings
//!
//! The engine core reports nodes by `node_type`; this crate is how a
//! host UI layer turns that tag plus a version constraint into a
//! concrete renderer binding:
//! - Semantic version parsing, comparison, and range constraints
//! - The in-memory `ComponentRegistry` of registered implementations
//! - Constraint resolution with strict/latest/compatible fallbacks
//! - `StoryManifest`, a story's declared component requirements
//!
//! Registration happens once at process start against the [`global`]
//! store; tests and tools build isolated registries with
//! [`ComponentRegistry::new`].

mod error;
mod manifest;
mod registry;
pub mod resolve;
mod schema;
mod version;

pub use error::{Error, Result};
pub use manifest::StoryManifest;
pub use registry::{
    categorize, global, register_component, ComponentCategory, ComponentRegistration,
    ComponentRegistry, RegisteredComponent, RegistrySummary,
};
pub use resolve::{
    get_resolved_component, resolve_manifest, resolve_version, resolve_with_dependencies,
    FallbackStrategy, ManifestResolution, ResolutionResult,
};
pub use schema::{PropertyDef, PropertyType};
pub use version::{
    sort_ascending, sort_descending, Constraint, ConstraintOp, Version, VersionPart,
};
