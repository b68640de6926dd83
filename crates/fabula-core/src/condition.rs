//! Condition language for gating story edges
//!
//! Conditions are recursive boolean expression trees loaded from story
//! data and evaluated at runtime against the current game state and
//! inventory.

use crate::{InventoryItem, Value, ValueMap};
use serde::{Deserialize, Serialize};

/// A boolean expression over game state and inventory
///
/// Comparators fail closed: a type mismatch (comparing a string with
/// `greater_than`, say) makes the condition false rather than an error.
/// The one deliberate exception is `Unknown`, which captures operator
/// tags this engine version does not recognize and evaluates to *pass*,
/// so malformed story data degrades to an always-open edge instead of
/// locking the player out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// All sub-conditions must pass (empty list passes vacuously)
    And { conditions: Vec<Condition> },
    /// At least one sub-condition must pass (empty list fails)
    Or { conditions: Vec<Condition> },
    /// Strict equality against a game-state value, including type
    Equals { key: String, value: Value },
    /// Strict inequality against a game-state value
    NotEquals { key: String, value: Value },
    /// Numeric comparison; fails if either side is non-numeric
    GreaterThan { key: String, value: Value },
    /// Numeric comparison; fails if either side is non-numeric
    LessThan { key: String, value: Value },
    /// Substring test; fails if either side is not a string
    Contains { key: String, value: Value },
    /// Negated substring test; still fails closed on non-strings
    NotContains { key: String, value: Value },
    /// Inventory holds the item with quantity > 0
    HasItem {
        #[serde(rename = "value")]
        item: String,
    },
    /// Inventory does not hold the item
    NotHasItem {
        #[serde(rename = "value")]
        item: String,
    },
    /// Unrecognized operator tag from story data
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// Evaluate against the given game state and inventory
    pub fn evaluate(&self, state: &ValueMap, inventory: &[InventoryItem]) -> bool {
        match self {
            Condition::And { conditions } => {
                conditions.iter().all(|c| c.evaluate(state, inventory))
            }
            Condition::Or { conditions } => {
                conditions.iter().any(|c| c.evaluate(state, inventory))
            }
            Condition::Equals { key, value } => state.get(key) == Some(value),
            Condition::NotEquals { key, value } => state.get(key) != Some(value),
            Condition::GreaterThan { key, value } => {
                compare_numeric(state.get(key), value, |lhs, rhs| lhs > rhs)
            }
            Condition::LessThan { key, value } => {
                compare_numeric(state.get(key), value, |lhs, rhs| lhs < rhs)
            }
            Condition::Contains { key, value } => {
                substring_check(state.get(key), value).unwrap_or(false)
            }
            Condition::NotContains { key, value } => {
                // Fail closed on non-strings rather than negating to true
                substring_check(state.get(key), value)
                    .map(|found| !found)
                    .unwrap_or(false)
            }
            Condition::HasItem { item } => holds_item(inventory, item),
            Condition::NotHasItem { item } => !holds_item(inventory, item),
            Condition::Unknown => {
                tracing::warn!("unknown condition operator in story data, treating as pass");
                true
            }
        }
    }

    // === Constructor helpers ===

    /// All of the given conditions must pass
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    /// Any of the given conditions may pass
    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    /// Game-state key equals the value
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Equals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Game-state key does not equal the value
    pub fn not_equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::NotEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Game-state key is numerically greater than the value
    pub fn greater_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::GreaterThan {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Game-state key is numerically less than the value
    pub fn less_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::LessThan {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Game-state string contains the value as a substring
    pub fn contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Contains {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Inventory holds the item
    pub fn has_item(item: impl Into<String>) -> Self {
        Condition::HasItem { item: item.into() }
    }

    /// Inventory does not hold the item
    pub fn not_has_item(item: impl Into<String>) -> Self {
        Condition::NotHasItem { item: item.into() }
    }
}

/// Evaluate an optional condition; absent conditions always pass
pub fn evaluate_condition(
    condition: Option<&Condition>,
    state: &ValueMap,
    inventory: &[InventoryItem],
) -> bool {
    condition.map_or(true, |c| c.evaluate(state, inventory))
}

fn compare_numeric(lhs: Option<&Value>, rhs: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (lhs.and_then(|v| v.as_float()), rhs.as_float()) {
        (Some(l), Some(r)) => cmp(l, r),
        _ => false,
    }
}

/// Substring test; `None` when either side is not a string
fn substring_check(lhs: Option<&Value>, rhs: &Value) -> Option<bool> {
    let haystack = lhs.and_then(|v| v.as_str())?;
    let needle = rhs.as_str()?;
    Some(haystack.contains(needle))
}

fn holds_item(inventory: &[InventoryItem], item: &str) -> bool {
    inventory.iter().any(|i| i.id == item && i.quantity > 0)
}
