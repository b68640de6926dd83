//! Indexed, immutable story graph
//!
//! The graph is pure data-indexing: one pass over the loaded nodes and
//! edges builds lookup maps and source/target adjacency lists, after
//! which every accessor is O(1) or O(degree). No validation happens
//! here: a graph can be built over edges that reference nonexistent
//! nodes; the audit layer catches that downstream. There is no mutation
//! API: changing a story's structure means building a new graph.

use crate::{EdgeId, IndexMap, NodeId, StoryEdge, StoryNode};
use std::collections::HashMap;

/// Derived index over a fixed node/edge set plus a declared start node
#[derive(Debug, Clone)]
pub struct StoryGraph {
    nodes: IndexMap<NodeId, StoryNode>,
    edges: IndexMap<EdgeId, StoryEdge>,
    /// Edges leaving each node
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    /// Edges arriving at each node
    incoming: HashMap<NodeId, Vec<EdgeId>>,
    start: NodeId,
}

impl StoryGraph {
    /// Build the graph indexes in one pass
    ///
    /// Duplicate node or edge ids keep the last occurrence; dangling
    /// edge endpoints are indexed as-is and reported by the validator.
    pub fn new(
        nodes: Vec<StoryNode>,
        edges: Vec<StoryEdge>,
        start: impl Into<NodeId>,
    ) -> Self {
        let mut node_map = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            node_map.insert(node.id.clone(), node);
        }

        let mut edge_map = IndexMap::with_capacity(edges.len());
        let mut outgoing: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        let mut incoming: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        for edge in edges {
            outgoing
                .entry(edge.source.clone())
                .or_default()
                .push(edge.id.clone());
            incoming
                .entry(edge.target.clone())
                .or_default()
                .push(edge.id.clone());
            edge_map.insert(edge.id.clone(), edge);
        }

        Self {
            nodes: node_map,
            edges: edge_map,
            outgoing,
            incoming,
            start: start.into(),
        }
    }

    /// The declared start node id
    pub fn start_node_id(&self) -> &NodeId {
        &self.start
    }

    /// The declared start node, if it exists in the node set
    pub fn start_node(&self) -> Option<&StoryNode> {
        self.nodes.get(&self.start)
    }

    /// Look up a node by id
    pub fn node(&self, id: &NodeId) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Look up an edge by id
    pub fn edge(&self, id: &EdgeId) -> Option<&StoryEdge> {
        self.edges.get(id)
    }

    /// Check if a node id exists
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ids of edges leaving the node
    pub fn outgoing(&self, id: &NodeId) -> &[EdgeId] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of edges arriving at the node
    pub fn incoming(&self, id: &NodeId) -> &[EdgeId] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges leaving the node
    pub fn outgoing_edges(&self, id: &NodeId) -> impl Iterator<Item = &StoryEdge> {
        self.outgoing(id).iter().filter_map(|e| self.edges.get(e))
    }

    /// Edges arriving at the node
    pub fn incoming_edges(&self, id: &NodeId) -> impl Iterator<Item = &StoryEdge> {
        self.incoming(id).iter().filter_map(|e| self.edges.get(e))
    }

    /// Iterate over all nodes in load order
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    /// Iterate over all edges in load order
    pub fn edges(&self) -> impl Iterator<Item = &StoryEdge> {
        self.edges.values()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
