//! Validation report types
//!
//! Findings are data, never errors: a failed validation does not stop a
//! story from loading. The host decides how loud each finding is.

use fabula_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Category of a hard validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The graph has no nodes at all
    EmptyGraph,
    /// The declared start node is missing from the node set
    MissingStartNode,
    /// An edge's source references a nonexistent node
    InvalidEdgeSource,
    /// An edge's target references a nonexistent node
    InvalidEdgeTarget,
    /// A node the start can never reach
    UnreachableNode,
    /// A non-end node with no way out
    DeadEndNode,
    /// A cycle in the story graph
    CycleDetected,
    /// A structurally malformed edge condition
    InvalidCondition,
    /// A node whose type has no registered component
    MissingComponentType,
}

/// Category of an advisory finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// A non-start node with no incoming edges
    OrphanedNode,
    /// The story declares no end node anywhere
    NoEndNode,
}

/// One hard finding, anchored to the node or edge it concerns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub node_id: Option<NodeId>,
    #[serde(default)]
    pub edge_id: Option<EdgeId>,
}

impl ValidationError {
    /// Create a finding with no anchor
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            node_id: None,
            edge_id: None,
        }
    }

    /// Anchor the finding to a node
    pub fn at_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Anchor the finding to an edge
    pub fn at_edge(mut self, edge_id: EdgeId) -> Self {
        self.edge_id = Some(edge_id);
        self
    }
}

/// One advisory finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: WarningCode,
    pub message: String,
    #[serde(default)]
    pub node_id: Option<NodeId>,
}

impl ValidationWarning {
    /// Create a warning with no anchor
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            node_id: None,
        }
    }

    /// Anchor the warning to a node
    pub fn at_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }
}

/// Everything the validator found, categorized
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// A report with no findings
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether the graph passed with no hard errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Findings of one error category
    pub fn errors_of(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }

    /// One-line description for startup logging
    pub fn summary(&self) -> String {
        if self.is_valid() && self.warnings.is_empty() {
            "valid".to_string()
        } else {
            format!(
                "{} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = ValidationReport::clean();
        assert!(report.is_valid());
        assert_eq!(report.summary(), "valid");

        report.errors.push(
            ValidationError::new(ErrorCode::DeadEndNode, "node stuck has no way out")
                .at_node("stuck".into()),
        );
        report.warnings.push(ValidationWarning::new(
            WarningCode::NoEndNode,
            "story declares no end node",
        ));

        assert!(!report.is_valid());
        assert_eq!(report.summary(), "1 error(s), 1 warning(s)");
        assert_eq!(report.errors_of(ErrorCode::DeadEndNode).count(), 1);
        assert_eq!(report.errors_of(ErrorCode::CycleDetected).count(), 0);
    }
}
