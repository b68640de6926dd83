//! Fabula Audit - offline validation of story graphs
//!
//! Composes the core traversal algorithms, the condition analyzer, and
//! the component registry into one categorized report. Validation is a
//! load-time sanity pass: findings never block loading (the executor's
//! own transition guards are what hold at runtime), so [`load_story`]
//! hands back both the graph and its report and lets the host decide.

mod report;

pub use report::{ErrorCode, ValidationError, ValidationReport, ValidationWarning, WarningCode};

use fabula_core::{analyze, traversal, StoryEdge, StoryGraph, StoryNode};
use fabula_registry::ComponentRegistry;

/// Validate a story graph against the live registry
///
/// An empty graph or a missing start node makes further checks
/// meaningless, so those two short-circuit. Everything else accumulates:
/// dangling edge endpoints, unreachable nodes, dead ends, cycles,
/// malformed edge conditions, and node types the registry does not know.
/// Orphaned nodes and the absence of any end node are advisory only (a
/// story may legitimately conclude through direct navigation), but
/// worth flagging.
pub fn validate_graph(graph: &StoryGraph, registry: &ComponentRegistry) -> ValidationReport {
    let mut report = ValidationReport::clean();

    if graph.node_count() == 0 {
        report
            .errors
            .push(ValidationError::new(ErrorCode::EmptyGraph, "story has no nodes"));
        return report;
    }
    if graph.start_node().is_none() {
        report.errors.push(
            ValidationError::new(
                ErrorCode::MissingStartNode,
                format!("start node {} does not exist", graph.start_node_id()),
            )
            .at_node(graph.start_node_id().clone()),
        );
        return report;
    }

    check_edge_endpoints(graph, &mut report);
    check_reachability(graph, &mut report);
    check_dead_ends(graph, &mut report);
    check_cycles(graph, &mut report);
    check_conditions(graph, &mut report);
    check_component_types(graph, registry, &mut report);
    check_orphans(graph, &mut report);
    check_endings(graph, &mut report);

    report
}

/// A graph built from loaded story data, together with its findings
#[derive(Debug, Clone)]
pub struct LoadedStory {
    pub graph: StoryGraph,
    pub report: ValidationReport,
}

/// Build a story graph and validate it in one step
///
/// Validation failures do not block loading; the caller gets both the
/// graph and the report and decides severity.
pub fn load_story(
    nodes: Vec<StoryNode>,
    edges: Vec<StoryEdge>,
    start: impl Into<fabula_core::NodeId>,
    registry: &ComponentRegistry,
) -> LoadedStory {
    let graph = StoryGraph::new(nodes, edges, start);
    let report = validate_graph(&graph, registry);
    LoadedStory { graph, report }
}

fn check_edge_endpoints(graph: &StoryGraph, report: &mut ValidationReport) {
    for edge in graph.edges() {
        if !graph.contains_node(&edge.source) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::InvalidEdgeSource,
                    format!("edge {} leaves nonexistent node {}", edge.id, edge.source),
                )
                .at_edge(edge.id.clone()),
            );
        }
        if !graph.contains_node(&edge.target) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::InvalidEdgeTarget,
                    format!("edge {} targets nonexistent node {}", edge.id, edge.target),
                )
                .at_edge(edge.id.clone()),
            );
        }
    }
}

fn check_reachability(graph: &StoryGraph, report: &mut ValidationReport) {
    for node_id in traversal::unreachable_nodes(graph) {
        report.errors.push(
            ValidationError::new(
                ErrorCode::UnreachableNode,
                format!("node {} cannot be reached from the start", node_id),
            )
            .at_node(node_id),
        );
    }
}

fn check_dead_ends(graph: &StoryGraph, report: &mut ValidationReport) {
    for node_id in traversal::dead_end_nodes(graph) {
        report.errors.push(
            ValidationError::new(
                ErrorCode::DeadEndNode,
                format!("node {} has no outgoing edges and is not an end node", node_id),
            )
            .at_node(node_id),
        );
    }
}

fn check_cycles(graph: &StoryGraph, report: &mut ValidationReport) {
    for cycle in traversal::detect_cycles(graph) {
        let path: Vec<&str> = cycle.iter().map(|n| n.as_str()).collect();
        let anchor = cycle.first().cloned();
        let mut error = ValidationError::new(
            ErrorCode::CycleDetected,
            format!("cycle detected: {}", path.join(" -> ")),
        );
        if let Some(node_id) = anchor {
            error = error.at_node(node_id);
        }
        report.errors.push(error);
    }
}

fn check_conditions(graph: &StoryGraph, report: &mut ValidationReport) {
    for edge in graph.edges() {
        let Some(condition) = &edge.condition else {
            continue;
        };
        for issue in analyze::check_condition(condition) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::InvalidCondition,
                    format!("edge {} condition: {}", edge.id, issue),
                )
                .at_edge(edge.id.clone()),
            );
        }
    }
}

fn check_component_types(
    graph: &StoryGraph,
    registry: &ComponentRegistry,
    report: &mut ValidationReport,
) {
    for node in graph.nodes() {
        if !registry.has_component_type(&node.node_type) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::MissingComponentType,
                    format!(
                        "node {} has type {:?} with no registered component",
                        node.id, node.node_type
                    ),
                )
                .at_node(node.id.clone()),
            );
        }
    }
}

fn check_orphans(graph: &StoryGraph, report: &mut ValidationReport) {
    for node_id in traversal::orphaned_nodes(graph) {
        report.warnings.push(
            ValidationWarning::new(
                WarningCode::OrphanedNode,
                format!("node {} has no incoming edges", node_id),
            )
            .at_node(node_id),
        );
    }
}

fn check_endings(graph: &StoryGraph, report: &mut ValidationReport) {
    if traversal::end_nodes(graph).is_empty() {
        report.warnings.push(ValidationWarning::new(
            WarningCode::NoEndNode,
            "story declares no end node",
        ));
    }
}
