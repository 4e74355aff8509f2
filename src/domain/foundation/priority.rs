//! TicketPriority value object (1 to 3 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Ticket priority: 1 (low) to 3 (high).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum TicketPriority {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TicketPriority {
    /// Creates a TicketPriority from an integer, returning error if out of range.
    pub fn try_from_i8(value: i8) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(TicketPriority::Low),
            2 => Ok(TicketPriority::Medium),
            3 => Ok(TicketPriority::High),
            _ => Err(ValidationError::out_of_range(
                "priority",
                1,
                3,
                value as i32,
            )),
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> i8 {
        *self as i8
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
