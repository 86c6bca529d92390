//! Workflow state machine.

/// The state of one workflow invocation.
///
/// State transitions:
/// ```text
/// Received ──► Validating ──► Persisting ──► InventoryUpdating ──► EventPublishing ──► Completed
///                  │              │                  ▲                    │
///                  └──────────────┴──► Rejected      └────── next order ──┘
/// ```
///
/// Only `Validating` and `Persisting` can reject. Once an invocation passes
/// `Persisting` its orders are committed and it always reaches `Completed`,
/// whatever happens to the stock updates and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowState {
    /// Request accepted, nothing checked yet.
    #[default]
    Received,

    /// Fetching product snapshots and checking stock.
    Validating,

    /// Writing order rows.
    Persisting,

    /// Writing the decremented stock back to the inventory service.
    InventoryUpdating,

    /// Emitting the `order_created` event.
    EventPublishing,

    /// All steps attempted (terminal state).
    Completed,

    /// Validation or persistence failed; no row exists (terminal state).
    Rejected,
}

impl WorkflowState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Persisting)
                | (Validating, Rejected)
                | (Persisting, InventoryUpdating)
                | (Persisting, Rejected)
                | (InventoryUpdating, EventPublishing)
                | (EventPublishing, InventoryUpdating)
                | (EventPublishing, Completed)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::Rejected)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Received => "Received",
            WorkflowState::Validating => "Validating",
            WorkflowState::Persisting => "Persisting",
            WorkflowState::InventoryUpdating => "InventoryUpdating",
            WorkflowState::EventPublishing => "EventPublishing",
            WorkflowState::Completed => "Completed",
            WorkflowState::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks and logs the state of a running invocation.
#[derive(Debug, Default)]
pub(crate) struct StateTracker {
    state: WorkflowState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> WorkflowState {
        self.state
    }

    pub(crate) fn enter(&mut self, next: WorkflowState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal workflow transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "workflow transition");
        self.state = next;
    }
}
