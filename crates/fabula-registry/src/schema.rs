//! Props schema definitions for registered components
//!
//! A component declares the shape of the node payload it renders. The
//! engine does not enforce these schemas at play time; authoring tools
//! and the audit layer use them.

use fabula_core::Value;
use serde::{Deserialize, Serialize};

/// Definition of one prop a component accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Prop name
    pub name: String,
    /// Prop type
    pub property_type: PropertyType,
    /// Whether the node payload must supply this prop
    #[serde(default)]
    pub required: bool,
    /// Fallback when the payload omits it
    #[serde(default)]
    pub default: Option<Value>,
    /// Description for authoring tools
    #[serde(default)]
    pub description: String,
}

/// Prop type enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
}

impl PropertyDef {
    /// Create a bool prop
    pub fn bool(name: impl Into<String>) -> Self {
        Self::typed(name, PropertyType::Bool)
    }

    /// Create an int prop
    pub fn int(name: impl Into<String>) -> Self {
        Self::typed(name, PropertyType::Int)
    }

    /// Create a float prop
    pub fn float(name: impl Into<String>) -> Self {
        Self::typed(name, PropertyType::Float)
    }

    /// Create a string prop
    pub fn string(name: impl Into<String>) -> Self {
        Self::typed(name, PropertyType::String)
    }

    fn typed(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    /// Make this prop required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
