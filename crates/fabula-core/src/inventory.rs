//! Inventory items and the actions that change them

use crate::ValueMap;
use serde::{Deserialize, Serialize};

/// An item held in a play session's inventory
///
/// Quantity is always positive while the item is present; session
/// transforms drop an item outright when its quantity reaches zero
/// rather than keeping a zero entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique within one inventory
    pub id: String,
    /// Display name
    pub name: String,
    /// Flavor text
    #[serde(default)]
    pub description: Option<String>,
    /// Icon or artwork URL for the host UI
    #[serde(default)]
    pub image_url: Option<String>,
    /// Author-defined extra data
    #[serde(default)]
    pub metadata: ValueMap,
    /// How many the player holds
    pub quantity: u32,
}

impl InventoryItem {
    /// Create a new item
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
            metadata: ValueMap::new(),
            quantity,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the image URL
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Add a metadata field
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// How `update_inventory` changes an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    /// Add the item's quantity to the held quantity
    Add,
    /// Subtract the item's quantity; the entry is dropped at zero
    Remove,
    /// Replace the held quantity outright (zero drops the entry)
    Set,
}
