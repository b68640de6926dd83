//! Story executor - the session state machine
//!
//! The executor owns a [`StoryGraph`] and the current [`SessionState`],
//! replacing the state wholesale on every mutation so queries always see
//! a consistent snapshot. After each mutation it recomputes a cached
//! [`ExecutionContext`]; repeated reads between mutations are O(1).
//!
//! Events are delivered to listeners synchronously, after the mutation
//! has been committed. Exclusive access (`&mut self`) means a listener
//! cannot re-enter the executor during delivery; a panicking listener is
//! isolated so the remaining listeners still run.

use crate::{
    resolve_edges, EdgeId, EngineEvent, Error, EventListener, InventoryAction, InventoryItem,
    NodeId, Result, ResolvedEdges, SessionState, StoryGraph, StoryNode, StorySession, ValueMap,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Drives one play session through a story graph
pub struct StoryExecutor {
    graph: StoryGraph,
    state: SessionState,
    listeners: Vec<EventListener>,
    context: ExecutionContext,
    /// Guards the once-per-session `StoryCompleted` emission
    completed_emitted: bool,
}

impl StoryExecutor {
    /// Create an executor for a fresh, unstarted session
    pub fn new(graph: StoryGraph) -> Self {
        let state = SessionState::new();
        let context = build_context(&graph, &state);
        Self {
            graph,
            state,
            listeners: Vec::new(),
            context,
            completed_emitted: false,
        }
    }

    /// Create an executor resuming a persisted session
    ///
    /// Like [`restore`](Self::restore), this re-emits no lifecycle
    /// events: resuming is not re-starting.
    pub fn with_session(graph: StoryGraph, session: StorySession) -> Self {
        let mut executor = Self::new(graph);
        executor.restore(session);
        executor
    }

    /// Subscribe a synchronous event listener
    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The cached execution context for the current state
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// The graph this executor plays
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// Check if the story has been started
    pub fn is_started(&self) -> bool {
        self.state.current_node.is_some()
    }

    /// Check if the session has reached a terminal end node
    pub fn is_complete(&self) -> bool {
        self.context.is_complete
    }

    /// The current node id, if started
    pub fn current_node_id(&self) -> Option<&NodeId> {
        self.state.current_node.as_ref()
    }

    /// Check if an edge is in the currently resolved set
    ///
    /// This is the guard callers should use before [`navigate`](Self::navigate).
    pub fn can_navigate(&self, edge_id: &EdgeId) -> bool {
        self.context.edges.contains(edge_id)
    }

    /// Start the story at the graph's declared start node
    ///
    /// Emits `StoryStarted` then `NodeEntered`.
    pub fn start(&mut self) -> Result<()> {
        if self.is_started() {
            return Err(Error::AlreadyStarted);
        }
        let start = self.graph.start_node_id().clone();
        if !self.graph.contains_node(&start) {
            return Err(Error::NodeNotFound(start));
        }

        self.state = self.state.with_current_node(start.clone());
        self.refresh_context();
        self.emit(EngineEvent::StoryStarted);
        self.emit(EngineEvent::NodeEntered { node_id: start });
        Ok(())
    }

    /// Traverse an edge out of the current node
    ///
    /// The edge must be in the currently resolved, condition-filtered
    /// set: an edge that exists in the graph but fails its condition, or
    /// that belongs to another node, is a hard error rather than a
    /// silent no-op. Emits `EdgeTraversed`, `NodeExited`, `NodeEntered`,
    /// and `StoryCompleted` when the new node concludes the story.
    pub fn navigate(&mut self, edge_id: &EdgeId) -> Result<()> {
        let from = self
            .state
            .current_node
            .clone()
            .ok_or(Error::NotStarted)?;
        let edge = self
            .context
            .edges
            .get(edge_id)
            .cloned()
            .ok_or_else(|| Error::EdgeNotAvailable {
                edge: edge_id.clone(),
                node: from.clone(),
            })?;
        if !self.graph.contains_node(&edge.target) {
            return Err(Error::NodeNotFound(edge.target));
        }

        let to = edge.target.clone();
        self.state = self
            .state
            .with_choice(from.clone(), edge_id.clone())
            .with_current_node(to.clone());
        self.refresh_context();

        self.emit(EngineEvent::EdgeTraversed {
            edge_id: edge_id.clone(),
            from: from.clone(),
            to: to.clone(),
        });
        self.emit(EngineEvent::NodeExited { node_id: from });
        self.emit(EngineEvent::NodeEntered {
            node_id: to.clone(),
        });
        if self.context.is_complete && !self.completed_emitted {
            self.completed_emitted = true;
            self.emit(EngineEvent::StoryCompleted { node_id: to });
        }
        Ok(())
    }

    /// Advance through the current node's default edge
    ///
    /// How "continue"-style content nodes move on without a player
    /// choice. Hard error when no default edge is available.
    pub fn complete_current_node(&mut self) -> Result<()> {
        let current = self
            .state
            .current_node
            .clone()
            .ok_or(Error::NotStarted)?;
        let default = self
            .context
            .edges
            .default
            .clone()
            .ok_or(Error::NoDefaultEdge(current))?;
        self.navigate(&default.id)
    }

    /// Jump directly to a node, bypassing edge legality
    ///
    /// Only checks that the node exists. This is the trusted-caller
    /// escape hatch used by restart and programmatic jumps; player
    /// traversal must go through [`navigate`](Self::navigate). Emits
    /// `NodeExited` (when a node was current) then `NodeEntered`.
    pub fn navigate_to_node(&mut self, node_id: &NodeId) -> Result<()> {
        if !self.graph.contains_node(node_id) {
            return Err(Error::NodeNotFound(node_id.clone()));
        }

        let previous = self.state.current_node.clone();
        self.state = self.state.with_current_node(node_id.clone());
        self.refresh_context();

        if let Some(previous) = previous {
            self.emit(EngineEvent::NodeExited { node_id: previous });
        }
        self.emit(EngineEvent::NodeEntered {
            node_id: node_id.clone(),
        });
        Ok(())
    }

    /// Merge updates into the game state
    ///
    /// Does not change traversal position, but the resolved edge set is
    /// recomputed since edge availability may depend on the new values.
    /// Emits `StateUpdated`.
    pub fn update_game_state(&mut self, updates: ValueMap) {
        let keys: Vec<String> = updates.keys().cloned().collect();
        self.state = self.state.with_game_state(updates);
        self.refresh_context();
        self.emit(EngineEvent::StateUpdated { keys });
    }

    /// Apply an inventory action
    ///
    /// Emits `InventoryChanged` and recomputes the resolved edge set,
    /// since item predicates may now pass or fail.
    pub fn update_inventory(&mut self, item: InventoryItem, action: InventoryAction) {
        let item_id = item.id.clone();
        self.state = match action {
            InventoryAction::Add => self.state.with_item_added(item),
            InventoryAction::Remove => self.state.with_item_removed(&item.id, item.quantity),
            InventoryAction::Set => self.state.with_item_set(item),
        };
        self.refresh_context();
        self.emit(EngineEvent::InventoryChanged { item_id, action });
    }

    /// Restart at the start node with cleared state and inventory
    ///
    /// The graph is untouched. Emits `StoryRestarted` then `NodeEntered`.
    pub fn reset(&mut self) -> Result<()> {
        let start = self.graph.start_node_id().clone();
        if !self.graph.contains_node(&start) {
            return Err(Error::NodeNotFound(start));
        }

        self.state = SessionState::anchored_at(start.clone());
        self.completed_emitted = false;
        self.refresh_context();
        self.emit(EngineEvent::StoryRestarted);
        self.emit(EngineEvent::NodeEntered { node_id: start });
        Ok(())
    }

    /// Snapshot the session for the host to persist
    pub fn serialize(&self) -> StorySession {
        self.state.to_session()
    }

    /// Replace the session wholesale from a persisted snapshot
    ///
    /// Deliberately asymmetric with [`start`](Self::start): restoring is
    /// a resume, so no lifecycle events are re-emitted.
    pub fn restore(&mut self, session: StorySession) {
        self.state = SessionState::from_session(session);
        self.refresh_context();
        self.completed_emitted = self.context.is_complete;
    }

    fn refresh_context(&mut self) {
        self.context = build_context(&self.graph, &self.state);
    }

    fn emit(&mut self, event: EngineEvent) {
        for listener in &mut self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                tracing::warn!(event = event.name(), "event listener panicked");
            }
        }
    }
}

/// Read-only snapshot of the executor's current situation
///
/// Rebuilt after every mutation and cached, so repeated queries between
/// mutations are cheap and always consistent with each other.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The current node, if started and present in the graph
    pub current_node: Option<StoryNode>,
    /// The resolved, condition-filtered edges out of the current node
    pub edges: ResolvedEdges,
    /// Copy of the game state
    pub game_state: ValueMap,
    /// Copy of the inventory
    pub inventory: Vec<InventoryItem>,
    /// Copy of the visited-node set
    pub visited: crate::IndexSet<NodeId>,
    /// Whether `start()` has run
    pub is_started: bool,
    /// Whether the session sits at a terminal end node with no exits
    pub is_complete: bool,
    /// Number of recorded choices
    pub choice_count: usize,
}

fn build_context(graph: &StoryGraph, state: &SessionState) -> ExecutionContext {
    let current_node = state
        .current_node
        .as_ref()
        .and_then(|id| graph.node(id))
        .cloned();
    let edges = match &state.current_node {
        Some(id) => resolve_edges(graph, id, &state.game_state, &state.inventory),
        None => ResolvedEdges::default(),
    };
    let is_complete = current_node
        .as_ref()
        .map(|node| node.is_ending())
        .unwrap_or(false)
        && edges.is_empty();

    ExecutionContext {
        current_node,
        game_state: state.game_state.clone(),
        inventory: state.inventory.clone(),
        visited: state.visited.clone(),
        is_started: state.current_node.is_some(),
        is_complete,
        choice_count: state.choice_history.len(),
        edges,
    }
}
