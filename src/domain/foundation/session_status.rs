//! SessionStatus enum for the support chat session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a support chat session.
///
/// A session starts `Active`, may move through the operator hand-off states,
/// and always ends `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    WaitingOperator,
    WithOperator,
    Closed,
}

impl SessionStatus {
    /// Returns true if the session still accepts inbound messages.
    pub fn accepts_messages(&self) -> bool {
        !matches!(self, SessionStatus::Closed)
    }

    /// Returns true if the session has been handed to an operator queue.
    pub fn is_escalated(&self) -> bool {
        matches!(
            self,
            SessionStatus::WaitingOperator | SessionStatus::WithOperator
        )
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Active -> WaitingOperator | Closed
    /// - WaitingOperator -> WithOperator | Closed
    /// - WithOperator -> Closed
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Active, WaitingOperator)
                | (Active, Closed)
                | (WaitingOperator, WithOperator)
                | (WaitingOperator, Closed)
                | (WithOperator, Closed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "Active",
            SessionStatus::WaitingOperator => "WaitingOperator",
            SessionStatus::WithOperator => "WithOperator",
            SessionStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}
