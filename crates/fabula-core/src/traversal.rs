//! Graph traversal and structural queries
//!
//! Pure algorithms over a [`StoryGraph`]: reachability, exhaustive path
//! enumeration, cycle detection, terminal/orphan queries, and
//! topological ordering. All of them tolerate malformed graphs (dangling
//! edges, unreachable regions) and never error; the audit layer turns
//! their findings into a validation report.

use crate::{IndexSet, NodeId, StoryGraph};
use std::collections::{HashSet, VecDeque};

/// Depth limit used by [`find_paths`]
///
/// Bounds runtime on near-cyclic graphs where the number of simple
/// paths explodes.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 100;

/// Breadth-first closure from a start node over outgoing edges
///
/// Includes the start node itself. Cycles are handled by the visited
/// set; a start node missing from the graph yields an empty set.
pub fn reachable_nodes(graph: &StoryGraph, start: &NodeId) -> IndexSet<NodeId> {
    let mut visited = IndexSet::new();
    if !graph.contains_node(start) {
        return visited;
    }

    let mut frontier = VecDeque::new();
    visited.insert(start.clone());
    frontier.push_back(start.clone());

    while let Some(current) = frontier.pop_front() {
        for edge in graph.outgoing_edges(&current) {
            if graph.contains_node(&edge.target) && visited.insert(edge.target.clone()) {
                frontier.push_back(edge.target.clone());
            }
        }
    }

    visited
}

/// Enumerate every simple path between two nodes, up to the default
/// depth limit
pub fn find_paths(graph: &StoryGraph, from: &NodeId, to: &NodeId) -> Vec<Vec<NodeId>> {
    find_all_paths(graph, from, to, DEFAULT_MAX_PATH_DEPTH)
}

/// Enumerate every simple path between two nodes
///
/// Depth-first with backtracking. The visited guard is per-path, not
/// global, so reconvergent branches still yield every distinct path.
/// Returns an empty list when the target is unreachable or only
/// reachable beyond `max_depth`.
pub fn find_all_paths(
    graph: &StoryGraph,
    from: &NodeId,
    to: &NodeId,
    max_depth: usize,
) -> Vec<Vec<NodeId>> {
    let mut paths = Vec::new();
    if !graph.contains_node(from) || !graph.contains_node(to) {
        return paths;
    }

    let mut path = vec![from.clone()];
    let mut on_path: HashSet<NodeId> = HashSet::from([from.clone()]);
    paths_rec(graph, to, max_depth, &mut path, &mut on_path, &mut paths);
    paths
}

fn paths_rec(
    graph: &StoryGraph,
    to: &NodeId,
    max_depth: usize,
    path: &mut Vec<NodeId>,
    on_path: &mut HashSet<NodeId>,
    paths: &mut Vec<Vec<NodeId>>,
) {
    let current = path.last().cloned().unwrap_or_else(|| to.clone());
    if current == *to {
        paths.push(path.clone());
        return;
    }
    if path.len() > max_depth {
        return;
    }

    for edge in graph.outgoing_edges(&current) {
        let next = &edge.target;
        if !graph.contains_node(next) || on_path.contains(next) {
            continue;
        }
        path.push(next.clone());
        on_path.insert(next.clone());
        paths_rec(graph, to, max_depth, path, on_path, paths);
        on_path.remove(next);
        path.pop();
    }
}

/// Detect cycles via depth-first search with a recursion stack
///
/// Each reported cycle is the stack slice from the back-edge target to
/// the current node, closed by re-appending the target: a self-loop on
/// `n` reports as `[n, n]`.
pub fn detect_cycles(graph: &StoryGraph) -> Vec<Vec<NodeId>> {
    let mut cycles = Vec::new();
    let mut finished: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut on_stack: HashSet<NodeId> = HashSet::new();

    for node in graph.nodes() {
        if !finished.contains(&node.id) {
            cycles_rec(
                graph,
                &node.id,
                &mut stack,
                &mut on_stack,
                &mut finished,
                &mut cycles,
            );
        }
    }

    cycles
}

fn cycles_rec(
    graph: &StoryGraph,
    node: &NodeId,
    stack: &mut Vec<NodeId>,
    on_stack: &mut HashSet<NodeId>,
    finished: &mut HashSet<NodeId>,
    cycles: &mut Vec<Vec<NodeId>>,
) {
    stack.push(node.clone());
    on_stack.insert(node.clone());

    for edge in graph.outgoing_edges(node) {
        let target = &edge.target;
        if !graph.contains_node(target) {
            continue;
        }
        if on_stack.contains(target) {
            // Back edge: the cycle runs from the target's stack position
            // to the top, closed by the target itself
            let position = stack.iter().position(|n| n == target).unwrap_or(0);
            let mut cycle: Vec<NodeId> = stack[position..].to_vec();
            cycle.push(target.clone());
            cycles.push(cycle);
        } else if !finished.contains(target) {
            cycles_rec(graph, target, stack, on_stack, finished, cycles);
        }
    }

    stack.pop();
    on_stack.remove(node);
    finished.insert(node.clone());
}

/// Nodes declared with the terminal `end` type
pub fn end_nodes(graph: &StoryGraph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.is_ending())
        .map(|n| n.id.clone())
        .collect()
}

/// Nodes with no incoming edges, excluding the declared start
pub fn orphaned_nodes(graph: &StoryGraph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.id != *graph.start_node_id() && graph.incoming(&n.id).is_empty())
        .map(|n| n.id.clone())
        .collect()
}

/// Nodes the start node cannot reach
pub fn unreachable_nodes(graph: &StoryGraph) -> Vec<NodeId> {
    let reachable = reachable_nodes(graph, graph.start_node_id());
    graph
        .nodes()
        .filter(|n| !reachable.contains(&n.id))
        .map(|n| n.id.clone())
        .collect()
}

/// Non-`end` nodes with zero outgoing edges
///
/// These strand the player without declaring a conclusion, so they are
/// treated as authoring bugs rather than valid terminals.
pub fn dead_end_nodes(graph: &StoryGraph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| !n.is_ending() && graph.outgoing(&n.id).is_empty())
        .map(|n| n.id.clone())
        .collect()
}

/// Topological ordering over all nodes, disconnected components included
///
/// Returns `None` as soon as any cycle exists. Otherwise a reverse
/// post-order DFS: every edge's source precedes its target.
pub fn topological_sort(graph: &StoryGraph) -> Option<Vec<NodeId>> {
    if !detect_cycles(graph).is_empty() {
        return None;
    }

    let mut order = Vec::with_capacity(graph.node_count());
    let mut visited: HashSet<NodeId> = HashSet::new();
    for node in graph.nodes() {
        if !visited.contains(&node.id) {
            post_order(graph, &node.id, &mut visited, &mut order);
        }
    }
    order.reverse();
    Some(order)
}

fn post_order(
    graph: &StoryGraph,
    node: &NodeId,
    visited: &mut HashSet<NodeId>,
    order: &mut Vec<NodeId>,
) {
    visited.insert(node.clone());
    for edge in graph.outgoing_edges(node) {
        if graph.contains_node(&edge.target) && !visited.contains(&edge.target) {
            post_order(graph, &edge.target, visited, order);
        }
    }
    order.push(node.clone());
}
