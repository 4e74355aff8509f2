//! Support store port (tickets, sessions, messages).
//!
//! Defines the persistence contract for the chat state machine. The write
//! methods that carry several records are COMMIT UNITS: an implementation
//! must apply everything in one transaction or fail the whole call, so that
//! partial conversations, un-accounted knowledge usage, or half-applied
//! escalations are never observable.

use crate::domain::foundation::{
    DomainError, KnowledgeEntryId, MessageId, SessionId, TicketId, UserId,
};
use crate::domain::support::{SupportMessage, SupportSession, SupportTicket};
use async_trait::async_trait;

/// Everything created when a conversation starts: ticket, session, and the
/// initial user message. One atomic unit.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub ticket: SupportTicket,
    pub session: SupportSession,
    pub initial_message: SupportMessage,
}

/// Everything persisted for one processed chat turn. One atomic unit.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    /// Session snapshot with the incremented turn counter (and, when the
    /// turn escalated, the new status).
    pub session: SupportSession,
    pub user_message: SupportMessage,
    pub bot_message: SupportMessage,
    /// When set, the store increments this entry's usage counter as an
    /// atomic read-modify-write inside the same transaction.
    pub used_entry: Option<KnowledgeEntryId>,
    /// Updated ticket, present only when the turn escalated.
    pub ticket: Option<SupportTicket>,
}

/// Everything persisted for a manual escalation. One atomic unit.
#[derive(Debug, Clone)]
pub struct EscalationCommit {
    pub session: SupportSession,
    pub ticket: SupportTicket,
    pub handoff_message: SupportMessage,
}

/// Repository port for ticket/session/message persistence.
///
/// Implementations must ensure:
/// - each `commit_*` / `create_conversation` call is a single transaction
/// - `DatabaseError` on any persistence failure, with the unit rolled back
#[async_trait]
pub trait SupportStore: Send + Sync {
    /// Persist a new ticket + session + initial message atomically.
    async fn create_conversation(&self, conversation: &NewConversation)
        -> Result<(), DomainError>;

    /// Find a session by its ID. Returns `None` if not found.
    async fn find_session(&self, id: &SessionId) -> Result<Option<SupportSession>, DomainError>;

    /// Find a ticket by its ID. Returns `None` if not found.
    async fn find_ticket(&self, id: &TicketId) -> Result<Option<SupportTicket>, DomainError>;

    /// Persist one processed turn atomically.
    async fn commit_turn(&self, turn: &TurnCommit) -> Result<(), DomainError>;

    /// Persist a manual escalation atomically.
    async fn commit_escalation(&self, escalation: &EscalationCommit) -> Result<(), DomainError>;

    /// Update a session in place (close, operator hand-off).
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session does not exist
    async fn update_session(&self, session: &SupportSession) -> Result<(), DomainError>;

    /// Set the helpfulness flag on a message.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message does not exist
    async fn set_message_feedback(
        &self,
        id: &MessageId,
        is_helpful: bool,
    ) -> Result<(), DomainError>;

    /// All messages of a conversation, oldest first: the session's messages
    /// plus the ticket-level ones (the opening message).
    async fn list_conversation_messages(
        &self,
        ticket_id: &TicketId,
        session_id: &SessionId,
    ) -> Result<Vec<SupportMessage>, DomainError>;

    /// The user's tickets, newest first.
    async fn list_tickets_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, DomainError>;
}
