//! Story node and edge definitions
//!
//! Nodes and edges are plain data supplied by the host's story loader.
//! The engine never mutates them after load; structural edits mean
//! rebuilding the graph.

use crate::{Condition, EdgeId, NodeId, Value, ValueMap};
use serde::{Deserialize, Serialize};

/// Node type tag for terminal story nodes
pub const END_NODE_TYPE: &str = "end";

/// A unit of story content with a declared component type
///
/// `node_type` names the renderer component vocabulary entry
/// (e.g. `text_block`, `choice_gate`, `end`); `data` is the opaque
/// payload that component consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    /// Unique identifier
    pub id: NodeId,
    /// Human-readable label used by authoring tools
    pub node_key: String,
    /// Component type tag
    pub node_type: String,
    /// Opaque payload for the renderer component
    #[serde(default)]
    pub data: ValueMap,
}

impl StoryNode {
    /// Create a new story node
    pub fn new(
        id: impl Into<NodeId>,
        node_key: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_key: node_key.into(),
            node_type: node_type.into(),
            data: ValueMap::new(),
        }
    }

    /// Add a payload field
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Check if this node is a terminal `end` node
    pub fn is_ending(&self) -> bool {
        self.node_type == END_NODE_TYPE
    }
}

/// The kind of a story edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Automatic continuation, taken by `complete_current_node`
    Default,
    /// Player-selected branch
    Choice,
    /// Branch gated on game state or inventory
    Conditional,
}

/// A directed, possibly conditional transition between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryEdge {
    /// Unique identifier
    pub id: EdgeId,
    /// Node this edge leaves from
    pub source: NodeId,
    /// Node this edge leads to
    pub target: NodeId,
    /// Edge kind
    pub edge_type: EdgeType,
    /// Ascending precedence (lower values resolve first)
    #[serde(default)]
    pub priority: i32,
    /// Gate condition; an edge without one always passes
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Display label for choice edges
    #[serde(default)]
    pub label: Option<String>,
}

impl StoryEdge {
    /// Create a new edge of the given type
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type,
            priority: 0,
            condition: None,
            label: None,
        }
    }

    /// Create a default (auto-continue) edge
    pub fn auto(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self::new(id, source, target, EdgeType::Default)
    }

    /// Create a choice edge
    pub fn choice(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self::new(id, source, target, EdgeType::Choice)
    }

    /// Create a conditional edge
    pub fn conditional(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        condition: Condition,
    ) -> Self {
        Self::new(id, source, target, EdgeType::Conditional).with_condition(condition)
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the gate condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ending() {
        let node = StoryNode::new("n1", "intro", "text_block");
        assert!(!node.is_ending());

        let node = StoryNode::new("n2", "finale", END_NODE_TYPE);
        assert!(node.is_ending());
    }

    #[test]
    fn test_node_data() {
        let node = StoryNode::new("n1", "intro", "text_block")
            .with_data("text", "Once upon a time")
            .with_data("duration", 3i64);

        assert_eq!(
            node.data.get("text").and_then(|v| v.as_str()),
            Some("Once upon a time")
        );
        assert_eq!(node.data.get("duration").and_then(|v| v.as_int()), Some(3));
    }

    #[test]
    fn test_edge_builders() {
        let edge = StoryEdge::choice("e1", "n1", "n2")
            .with_priority(2)
            .with_label("Open the door");

        assert_eq!(edge.edge_type, EdgeType::Choice);
        assert_eq!(edge.priority, 2);
        assert_eq!(edge.label.as_deref(), Some("Open the door"));
        assert!(edge.condition.is_none());

        let gated = StoryEdge::conditional("e2", "n1", "n3", Condition::has_item("key"));
        assert_eq!(gated.edge_type, EdgeType::Conditional);
        assert!(gated.condition.is_some());
    }
}
