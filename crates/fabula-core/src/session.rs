//! Session state snapshots and their pure transforms
//!
//! A [`SessionState`] is an immutable snapshot of play progress. Every
//! transform returns a new state and leaves its input untouched; the
//! executor swaps its held state wholesale on each mutation so queries
//! always observe a consistent snapshot, never a half-applied one.

use crate::{EdgeId, IndexSet, InventoryItem, NodeId, ValueMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the append-only choice history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    /// Node the choice was made at
    pub node_id: NodeId,
    /// Edge the player took
    pub edge_id: EdgeId,
    /// When the choice was made
    pub at: DateTime<Utc>,
}

/// Immutable snapshot of play progress
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    /// Current node; `None` before the story is started
    pub current_node: Option<NodeId>,
    /// Player-authored flags and counters
    pub game_state: ValueMap,
    /// Held items, ordered, ids unique, quantities always > 0
    pub inventory: Vec<InventoryItem>,
    /// Every node that has ever been current
    pub visited: IndexSet<NodeId>,
    /// Append-only record of traversed choice edges
    pub choice_history: Vec<ChoiceRecord>,
}

impl SessionState {
    /// A fresh, unstarted session
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session anchored at the given node (used for restart)
    pub fn anchored_at(node: impl Into<NodeId>) -> Self {
        Self::new().with_current_node(node)
    }

    /// Move to a node, marking it visited
    pub fn with_current_node(&self, node: impl Into<NodeId>) -> Self {
        let node = node.into();
        let mut next = self.clone();
        next.visited.insert(node.clone());
        next.current_node = Some(node);
        next
    }

    /// Shallow-merge updates into the game state; later keys win
    pub fn with_game_state(&self, updates: ValueMap) -> Self {
        let mut next = self.clone();
        for (key, value) in updates {
            next.game_state.insert(key, value);
        }
        next
    }

    /// Add an item, merging quantity when the id is already held
    pub fn with_item_added(&self, item: InventoryItem) -> Self {
        let mut next = self.clone();
        match next.inventory.iter_mut().find(|held| held.id == item.id) {
            Some(held) => held.quantity = held.quantity.saturating_add(item.quantity),
            None if item.quantity > 0 => next.inventory.push(item),
            None => {}
        }
        next
    }

    /// Subtract from an item's quantity, dropping the entry at zero
    pub fn with_item_removed(&self, id: &str, quantity: u32) -> Self {
        let mut next = self.clone();
        if let Some(held) = next.inventory.iter_mut().find(|held| held.id == id) {
            held.quantity = held.quantity.saturating_sub(quantity);
        }
        next.inventory.retain(|held| held.quantity > 0);
        next
    }

    /// Replace an item's quantity outright; zero drops the entry
    pub fn with_item_set(&self, item: InventoryItem) -> Self {
        let mut next = self.clone();
        next.inventory.retain(|held| held.id != item.id);
        if item.quantity > 0 {
            next.inventory.push(item);
        }
        next
    }

    /// Append a choice-history entry stamped with the current time
    pub fn with_choice(&self, node_id: NodeId, edge_id: EdgeId) -> Self {
        let mut next = self.clone();
        next.choice_history.push(ChoiceRecord {
            node_id,
            edge_id,
            at: Utc::now(),
        });
        next
    }

    /// Check if the inventory holds an item
    pub fn has_item(&self, id: &str) -> bool {
        self.inventory.iter().any(|held| held.id == id)
    }

    /// Held quantity of an item; zero when absent
    pub fn item_quantity(&self, id: &str) -> u32 {
        self.inventory
            .iter()
            .find(|held| held.id == id)
            .map(|held| held.quantity)
            .unwrap_or(0)
    }

    /// Check if a node has ever been current
    pub fn has_visited(&self, node: &NodeId) -> bool {
        self.visited.contains(node)
    }

    /// Convert to the plain persisted shape
    pub fn to_session(&self) -> StorySession {
        StorySession {
            current_node_id: self.current_node.clone(),
            game_state: self.game_state.clone(),
            inventory: self.inventory.clone(),
            visited_nodes: self.visited.iter().cloned().collect(),
            choice_history: self.choice_history.clone(),
        }
    }

    /// Rebuild a snapshot from the persisted shape
    pub fn from_session(session: StorySession) -> Self {
        Self {
            current_node: session.current_node_id,
            game_state: session.game_state,
            inventory: session.inventory,
            visited: session.visited_nodes.into_iter().collect(),
            choice_history: session.choice_history,
        }
    }
}

/// The plain persisted shape of a play session
///
/// Every field defaults so a partial session (an old save, or one
/// written by an earlier schema) still restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorySession {
    #[serde(default)]
    pub current_node_id: Option<NodeId>,
    #[serde(default)]
    pub game_state: ValueMap,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub visited_nodes: Vec<NodeId>,
    #[serde(default)]
    pub choice_history: Vec<ChoiceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn test_transforms_do_not_mutate_input() {
        let state = SessionState::new();
        let moved = state.with_current_node("n1");

        assert!(state.current_node.is_none());
        assert!(state.visited.is_empty());
        assert_eq!(moved.current_node, Some(NodeId::new("n1")));
        assert!(moved.has_visited(&"n1".into()));
    }

    #[test]
    fn test_game_state_merge_later_keys_win() {
        let mut first = ValueMap::new();
        first.insert("gold".into(), Value::Int(5));
        first.insert("name".into(), Value::String("Ada".into()));

        let mut second = ValueMap::new();
        second.insert("gold".into(), Value::Int(9));

        let state = SessionState::new().with_game_state(first).with_game_state(second);
        assert_eq!(state.game_state.get("gold"), Some(&Value::Int(9)));
        assert_eq!(
            state.game_state.get("name"),
            Some(&Value::String("Ada".into()))
        );
    }

    #[test]
    fn test_inventory_add_merges_quantity() {
        let state = SessionState::new()
            .with_item_added(InventoryItem::new("key", "Brass Key", 2))
            .with_item_added(InventoryItem::new("key", "Brass Key", 3));

        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.item_quantity("key"), 5);
    }

    #[test]
    fn test_inventory_remove_clamps_and_drops() {
        let state = SessionState::new().with_item_added(InventoryItem::new("key", "Brass Key", 2));

        let one_left = state.with_item_removed("key", 1);
        assert_eq!(one_left.item_quantity("key"), 1);

        // Removing past zero drops the entry entirely
        let gone = one_left.with_item_removed("key", 5);
        assert!(!gone.has_item("key"));
        assert!(gone.inventory.is_empty());
    }

    #[test]
    fn test_inventory_set() {
        let state = SessionState::new()
            .with_item_added(InventoryItem::new("key", "Brass Key", 2))
            .with_item_set(InventoryItem::new("key", "Brass Key", 7));
        assert_eq!(state.item_quantity("key"), 7);

        let cleared = state.with_item_set(InventoryItem::new("key", "Brass Key", 0));
        assert!(!cleared.has_item("key"));
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let state = SessionState::new().with_item_added(InventoryItem::new("dust", "Dust", 0));
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn test_choice_history_appends() {
        let state = SessionState::new()
            .with_choice("n1".into(), "e1".into())
            .with_choice("n2".into(), "e2".into());

        assert_eq!(state.choice_history.len(), 2);
        assert_eq!(state.choice_history[0].edge_id, EdgeId::new("e1"));
        assert_eq!(state.choice_history[1].node_id, NodeId::new("n2"));
    }

    #[test]
    fn test_anchored_at_is_fresh() {
        let played = SessionState::new()
            .with_current_node("n1")
            .with_current_node("n2")
            .with_item_added(InventoryItem::new("key", "Brass Key", 1))
            .with_choice("n1".into(), "e1".into());

        let restarted = SessionState::anchored_at("n1");
        assert_eq!(restarted.current_node, Some(NodeId::new("n1")));
        assert_eq!(restarted.visited.len(), 1);
        assert!(restarted.inventory.is_empty());
        assert!(restarted.choice_history.is_empty());
        // The original is untouched
        assert_eq!(played.visited.len(), 2);
    }

    #[test]
    fn test_session_round_trip() {
        let state = SessionState::new()
            .with_current_node("n1")
            .with_current_node("n2")
            .with_item_added(InventoryItem::new("key", "Brass Key", 2))
            .with_choice("n1".into(), "e1".into());

        let restored = SessionState::from_session(state.to_session());
        assert_eq!(restored, state);
    }

    #[test]
    fn test_persisted_shape_round_trip() {
        let state = SessionState::new()
            .with_current_node("n1")
            .with_item_added(InventoryItem::new("key", "Brass Key", 2));

        let encoded = ron::to_string(&state.to_session()).unwrap();
        let decoded: StorySession = ron::from_str(&encoded).unwrap();
        assert_eq!(SessionState::from_session(decoded), state);
    }

    #[test]
    fn test_partial_session_restores() {
        // Only a current node persisted; everything else defaults
        let decoded: StorySession =
            ron::from_str(r#"(current_node_id: Some("n3"))"#).unwrap();
        let state = SessionState::from_session(decoded);
        assert_eq!(state.current_node, Some(NodeId::new("n3")));
        assert!(state.game_state.is_empty());
        assert!(state.inventory.is_empty());
    }
}
