//! Engine events emitted by the story executor
//!
//! Events are delivered synchronously to subscribed listeners, always
//! after the state change they describe has been committed.

use crate::{EdgeId, InventoryAction, NodeId};
use serde::{Deserialize, Serialize};

/// A typed event describing one committed engine transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// `start()` succeeded
    StoryStarted,
    /// The current node changed to `node_id`
    NodeEntered { node_id: NodeId },
    /// The previous node was left
    NodeExited { node_id: NodeId },
    /// A legal edge was traversed
    EdgeTraversed {
        edge_id: EdgeId,
        from: NodeId,
        to: NodeId,
    },
    /// Game-state keys were merged
    StateUpdated { keys: Vec<String> },
    /// The inventory changed
    InventoryChanged {
        item_id: String,
        action: InventoryAction,
    },
    /// The session reached a terminal end node with no exits
    StoryCompleted { node_id: NodeId },
    /// `reset()` returned the session to the start node
    StoryRestarted,
}

impl EngineEvent {
    /// Short tag for logging and audit counters
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::StoryStarted => "story_started",
            EngineEvent::NodeEntered { .. } => "node_entered",
            EngineEvent::NodeExited { .. } => "node_exited",
            EngineEvent::EdgeTraversed { .. } => "edge_traversed",
            EngineEvent::StateUpdated { .. } => "state_updated",
            EngineEvent::InventoryChanged { .. } => "inventory_changed",
            EngineEvent::StoryCompleted { .. } => "story_completed",
            EngineEvent::StoryRestarted => "story_restarted",
        }
    }
}

/// A subscribed event observer
pub type EventListener = Box<dyn FnMut(&EngineEvent)>;
