//! Fabula Core - interactive-fiction execution engine
//!
//! This crate provides the story engine proper:
//! - Dynamic value types (`Value`, `ValueMap`)
//! - Story node/edge definitions and the indexed `StoryGraph`
//! - A recursive condition language with evaluator and analyzer
//! - Graph traversal algorithms (reachability, paths, cycles, ordering)
//! - Immutable session snapshots with copy-on-write transforms
//! - Edge resolution under live game state
//! - The `StoryExecutor` state machine with typed engine events
//!
//! ## Design Notes
//!
//! - **Pure data in, pure data out**: the engine performs no I/O. The
//!   host loads nodes and edges, persists `StorySession` snapshots, and
//!   renders whatever the `ExecutionContext` reports.
//! - **Single writer**: an executor drives one play session and assumes
//!   exclusive access; every operation runs to completion synchronously.
//! - **Errors split by audience**: caller misuse is a hard `Error`;
//!   degraded-but-playable situations are returned as data.

pub mod analyze;
mod condition;
mod error;
mod event;
mod executor;
mod graph;
mod ids;
mod inventory;
mod resolver;
mod session;
mod story;
pub mod traversal;
mod value;

pub use condition::{evaluate_condition, Condition};
pub use error::{Error, Result};
pub use event::{EngineEvent, EventListener};
pub use executor::{ExecutionContext, StoryExecutor};
pub use graph::StoryGraph;
pub use ids::{EdgeId, NodeId};
pub use inventory::{InventoryAction, InventoryItem};
pub use resolver::{can_traverse_edge, is_edge_available, resolve_edges, ResolvedEdges};
pub use session::{ChoiceRecord, SessionState, StorySession};
pub use story::{EdgeType, StoryEdge, StoryNode, END_NODE_TYPE};
pub use value::{Value, ValueMap};

// Re-exported so dependent crates share the same deterministic map types
pub use indexmap::{IndexMap, IndexSet};
