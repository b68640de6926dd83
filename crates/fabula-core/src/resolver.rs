//! Edge resolution under current session state
//!
//! Given a node and the live game state and inventory, resolution
//! filters the node's outgoing edges to those whose conditions pass,
//! orders the survivors by priority, and partitions them by edge type.
//! Resolution is deterministic: the same inputs always produce the same
//! categorized, sorted set.

use crate::{
    evaluate_condition, EdgeId, EdgeType, InventoryItem, NodeId, StoryEdge, StoryGraph, ValueMap,
};

/// The legal transitions out of a node under current state
#[derive(Debug, Clone, Default)]
pub struct ResolvedEdges {
    /// First surviving `default` edge, if any; additional defaults are
    /// still present in `all` but carry no special role
    pub default: Option<StoryEdge>,
    /// All surviving choice edges, priority order
    pub choices: Vec<StoryEdge>,
    /// All surviving conditional edges, priority order
    pub conditional: Vec<StoryEdge>,
    /// Every survivor in priority order, regardless of type
    pub all: Vec<StoryEdge>,
}

impl ResolvedEdges {
    /// Check if no edge survived resolution
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Number of surviving edges
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Check if a specific edge survived resolution
    pub fn contains(&self, id: &EdgeId) -> bool {
        self.all.iter().any(|e| e.id == *id)
    }

    /// Look up a surviving edge by id
    pub fn get(&self, id: &EdgeId) -> Option<&StoryEdge> {
        self.all.iter().find(|e| e.id == *id)
    }

    /// Iterate over the survivors in priority order
    pub fn iter(&self) -> impl Iterator<Item = &StoryEdge> {
        self.all.iter()
    }
}

/// Resolve a node's outgoing edges under the given state
pub fn resolve_edges(
    graph: &StoryGraph,
    node_id: &NodeId,
    state: &ValueMap,
    inventory: &[InventoryItem],
) -> ResolvedEdges {
    let mut survivors: Vec<StoryEdge> = graph
        .outgoing_edges(node_id)
        .filter(|edge| evaluate_condition(edge.condition.as_ref(), state, inventory))
        .cloned()
        .collect();
    // Stable sort keeps load order among equal priorities
    survivors.sort_by_key(|edge| edge.priority);

    let mut resolved = ResolvedEdges::default();
    for edge in &survivors {
        match edge.edge_type {
            EdgeType::Default => {
                if resolved.default.is_none() {
                    resolved.default = Some(edge.clone());
                }
            }
            EdgeType::Choice => resolved.choices.push(edge.clone()),
            EdgeType::Conditional => resolved.conditional.push(edge.clone()),
        }
    }
    resolved.all = survivors;
    resolved
}

/// Check whether a single edge passes its condition right now
///
/// False when the edge does not exist at all.
pub fn is_edge_available(
    graph: &StoryGraph,
    edge_id: &EdgeId,
    state: &ValueMap,
    inventory: &[InventoryItem],
) -> bool {
    graph
        .edge(edge_id)
        .map(|edge| evaluate_condition(edge.condition.as_ref(), state, inventory))
        .unwrap_or(false)
}

/// Check whether an edge can be traversed from a specific node
///
/// The edge must originate at `from` and pass its condition.
pub fn can_traverse_edge(
    graph: &StoryGraph,
    from: &NodeId,
    edge_id: &EdgeId,
    state: &ValueMap,
    inventory: &[InventoryItem],
) -> bool {
    graph
        .edge(edge_id)
        .map(|edge| {
            edge.source == *from && evaluate_condition(edge.condition.as_ref(), state, inventory)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, StoryNode};

    fn gated_graph() -> StoryGraph {
        StoryGraph::new(
            vec![
                StoryNode::new("hub", "hub", "choice_gate"),
                StoryNode::new("left", "left", "text_block"),
                StoryNode::new("right", "right", "text_block"),
                StoryNode::new("secret", "secret", "text_block"),
            ],
            vec![
                StoryEdge::choice("to-right", "hub", "right").with_priority(5),
                StoryEdge::choice("to-left", "hub", "left").with_priority(1),
                StoryEdge::conditional("to-secret", "hub", "secret", Condition::has_item("key"))
                    .with_priority(3),
                StoryEdge::auto("continue", "hub", "left").with_priority(10),
            ],
            "hub",
        )
    }

    #[test]
    fn test_resolution_sorts_and_partitions() {
        let graph = gated_graph();
        let inventory = vec![InventoryItem::new("key", "Brass Key", 1)];
        let resolved = resolve_edges(&graph, &"hub".into(), &ValueMap::new(), &inventory);

        let order: Vec<_> = resolved.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["to-left", "to-secret", "to-right", "continue"]);

        assert_eq!(resolved.choices.len(), 2);
        assert_eq!(resolved.conditional.len(), 1);
        assert_eq!(
            resolved.default.as_ref().map(|e| e.id.as_str()),
            Some("continue")
        );
    }

    #[test]
    fn test_failed_conditions_filtered_out() {
        let graph = gated_graph();
        let resolved = resolve_edges(&graph, &"hub".into(), &ValueMap::new(), &[]);

        assert!(!resolved.contains(&"to-secret".into()));
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let graph = gated_graph();
        let a = resolve_edges(&graph, &"hub".into(), &ValueMap::new(), &[]);
        let b = resolve_edges(&graph, &"hub".into(), &ValueMap::new(), &[]);

        let ids = |r: &ResolvedEdges| r.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_first_default_wins() {
        let graph = StoryGraph::new(
            vec![
                StoryNode::new("a", "a", "text_block"),
                StoryNode::new("b", "b", "text_block"),
            ],
            vec![
                StoryEdge::auto("d2", "a", "b").with_priority(2),
                StoryEdge::auto("d1", "a", "b").with_priority(1),
            ],
            "a",
        );
        let resolved = resolve_edges(&graph, &"a".into(), &ValueMap::new(), &[]);
        assert_eq!(resolved.default.as_ref().map(|e| e.id.as_str()), Some("d1"));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_edge_availability_checks() {
        let graph = gated_graph();
        let state = ValueMap::new();

        assert!(!is_edge_available(&graph, &"to-secret".into(), &state, &[]));
        let inventory = vec![InventoryItem::new("key", "Brass Key", 1)];
        assert!(is_edge_available(&graph, &"to-secret".into(), &state, &inventory));
        assert!(!is_edge_available(&graph, &"ghost".into(), &state, &inventory));

        assert!(can_traverse_edge(&graph, &"hub".into(), &"to-left".into(), &state, &[]));
        // Wrong source node
        assert!(!can_traverse_edge(&graph, &"left".into(), &"to-left".into(), &state, &[]));
    }
}
