//! SupportTicket aggregate entity.
//!
//! A ticket is the durable record of one user's support case. It is created
//! once per new conversation and survives across escalations; its status is
//! driven by escalation and resolution events.

use crate::domain::foundation::{
    DomainError, ErrorCode, TicketId, TicketPriority, TicketStatus, Timestamp, UserId,
    ValidationError,
};
use serde::{Deserialize, Serialize};

/// Maximum length for a ticket title.
pub const MAX_TITLE_LENGTH: usize = 255;

/// How many characters of the initial message become the ticket title.
const TITLE_PREFIX_CHARS: usize = 50;

/// Support ticket aggregate.
///
/// # Invariants
///
/// - `title` is 1-255 characters
/// - status transitions follow [`TicketStatus::can_transition_to`]
/// - the description is append-only after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    id: TicketId,
    user_id: UserId,
    title: String,
    description: String,
    status: TicketStatus,
    priority: TicketPriority,
    assigned_operator: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    resolved_at: Option<Timestamp>,
}

impl SupportTicket {
    /// Create a new open ticket with the lowest priority.
    ///
    /// # Errors
    ///
    /// - `EmptyField` / `InvalidFormat` if the title is empty or too long
    pub fn new(
        id: TicketId,
        user_id: UserId,
        title: String,
        description: String,
    ) -> Result<Self, ValidationError> {
        Self::validate_title(&title)?;

        let now = Timestamp::now();
        Ok(Self {
            id,
            user_id,
            title,
            description,
            status: TicketStatus::Open,
            priority: TicketPriority::Low,
            assigned_operator: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        })
    }

    /// Reconstitute a ticket from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TicketId,
        user_id: UserId,
        title: String,
        description: String,
        status: TicketStatus,
        priority: TicketPriority,
        assigned_operator: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
        resolved_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            description,
            status,
            priority,
            assigned_operator,
            created_at,
            updated_at,
            resolved_at,
        }
    }

    /// Derives a ticket title from the first message of a conversation.
    pub fn title_from_message(initial_message: &str) -> String {
        let prefix: String = initial_message.chars().take(TITLE_PREFIX_CHARS).collect();
        if initial_message.chars().count() > TITLE_PREFIX_CHARS {
            format!("Support: {}...", prefix)
        } else {
            format!("Support: {}", prefix)
        }
    }

    /// Returns the ticket ID.
    pub fn id(&self) -> &TicketId {
        &self.id
    }

    /// Returns the owner's user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the ticket title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the ticket description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current status.
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the priority.
    pub fn priority(&self) -> TicketPriority {
        self.priority
    }

    /// Returns the assigned operator, if any.
    pub fn assigned_operator(&self) -> Option<&str> {
        self.assigned_operator.as_deref()
    }

    /// Returns when the ticket was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the ticket was last updated.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns when the ticket was resolved, if it was.
    pub fn resolved_at(&self) -> Option<&Timestamp> {
        self.resolved_at.as_ref()
    }

    /// Checks if the given user owns this ticket.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Marks the ticket as being worked by an operator.
    ///
    /// Called when the session escalates. Appends the escalation reason to
    /// the description and, when a priority is given, replaces the current
    /// one. A no-op on the status when the ticket is already in progress.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the ticket is resolved or closed
    pub fn escalate(
        &mut self,
        reason: Option<&str>,
        priority: Option<TicketPriority>,
    ) -> Result<(), DomainError> {
        match self.status {
            TicketStatus::Open => {
                self.status = TicketStatus::InProgress;
            }
            TicketStatus::InProgress => {}
            other => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Cannot escalate a ticket in status {}", other),
                ));
            }
        }

        if let Some(reason) = reason {
            self.description.push_str("\n\nEscalation reason: ");
            self.description.push_str(reason);
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks the ticket as resolved.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the transition is not allowed
    pub fn resolve(&mut self) -> Result<(), DomainError> {
        self.transition_to(TicketStatus::Resolved)?;
        self.resolved_at = Some(Timestamp::now());
        Ok(())
    }

    /// Closes the ticket.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the ticket is already closed
    pub fn close(&mut self) -> Result<(), DomainError> {
        self.transition_to(TicketStatus::Closed)
    }

    fn transition_to(&mut self, target: TicketStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move ticket from {} to {}", self.status, target),
            ));
        }
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn validate_title(title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::invalid_format(
                "title",
                format!("exceeds {} characters", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }
}
