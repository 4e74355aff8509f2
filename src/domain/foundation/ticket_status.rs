//! TicketStatus enum for the support ticket lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Open -> InProgress | Resolved | Closed
    /// - InProgress -> Resolved | Closed
    /// - Resolved -> Closed
    pub fn can_transition_to(&self, target: &TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, target),
            (Open, InProgress)
                | (Open, Resolved)
                | (Open, Closed)
                | (InProgress, Resolved)
                | (InProgress, Closed)
                | (Resolved, Closed)
        )
    }

    /// Returns true if the ticket has reached at least InProgress.
    ///
    /// Escalated sessions require their parent ticket to satisfy this.
    pub fn is_at_least_in_progress(&self) -> bool {
        !matches!(self, TicketStatus::Open)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "InProgress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}
