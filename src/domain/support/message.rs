//! SupportMessage entity.
//!
//! Messages are append-only; the only mutation ever applied is the user's
//! helpfulness feedback on a bot answer.

use crate::domain::foundation::{
    KnowledgeEntryId, MessageId, MessageKind, SessionId, TicketId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// One message in a support conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportMessage {
    id: MessageId,
    ticket_id: TicketId,
    session_id: Option<SessionId>,
    kind: MessageKind,
    content: String,
    sender_id: Option<UserId>,
    /// Set only when a bot answer was sourced from the knowledge base; the
    /// referenced entry's usage counter moves in the same commit unit.
    knowledge_entry_id: Option<KnowledgeEntryId>,
    is_helpful: Option<bool>,
    created_at: Timestamp,
}

impl SupportMessage {
    /// Creates a message written by the end user.
    pub fn user(
        ticket_id: TicketId,
        session_id: SessionId,
        sender_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            ticket_id,
            session_id: Some(session_id),
            kind: MessageKind::User,
            content: content.into(),
            sender_id: Some(sender_id),
            knowledge_entry_id: None,
            is_helpful: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates the conversation-opening user message.
    ///
    /// Attached to the ticket only: the session's turn counter counts
    /// session-attached user messages, and the opening message precedes
    /// turn one.
    pub fn opening(ticket_id: TicketId, sender_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            ticket_id,
            session_id: None,
            kind: MessageKind::User,
            content: content.into(),
            sender_id: Some(sender_id),
            knowledge_entry_id: None,
            is_helpful: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a message produced by the automated assistant.
    pub fn bot(ticket_id: TicketId, session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            ticket_id,
            session_id: Some(session_id),
            kind: MessageKind::Bot,
            content: content.into(),
            sender_id: None,
            knowledge_entry_id: None,
            is_helpful: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a message written by a human operator.
    pub fn operator(
        ticket_id: TicketId,
        session_id: SessionId,
        operator_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            ticket_id,
            session_id: Some(session_id),
            kind: MessageKind::Operator,
            content: content.into(),
            sender_id: Some(operator_id),
            knowledge_entry_id: None,
            is_helpful: None,
            created_at: Timestamp::now(),
        }
    }

    /// Tags a bot message with the knowledge entry it was sourced from.
    pub fn with_knowledge_ref(mut self, entry_id: KnowledgeEntryId) -> Self {
        self.knowledge_entry_id = Some(entry_id);
        self
    }

    /// Reconstitute a message from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MessageId,
        ticket_id: TicketId,
        session_id: Option<SessionId>,
        kind: MessageKind,
        content: String,
        sender_id: Option<UserId>,
        knowledge_entry_id: Option<KnowledgeEntryId>,
        is_helpful: Option<bool>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            ticket_id,
            session_id,
            kind,
            content,
            sender_id,
            knowledge_entry_id,
            is_helpful,
            created_at,
        }
    }

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the ticket this message belongs to.
    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Returns the session this message belongs to, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Returns who produced the message.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the sender, when known.
    pub fn sender_id(&self) -> Option<&UserId> {
        self.sender_id.as_ref()
    }

    /// Returns the knowledge entry this answer was sourced from, if any.
    pub fn knowledge_entry_id(&self) -> Option<&KnowledgeEntryId> {
        self.knowledge_entry_id.as_ref()
    }

    /// Returns the user's helpfulness feedback (tri-state).
    pub fn is_helpful(&self) -> Option<bool> {
        self.is_helpful
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Records the user's helpfulness feedback. Idempotent.
    pub fn set_feedback(&mut self, is_helpful: bool) {
        self.is_helpful = Some(is_helpful);
    }
}
