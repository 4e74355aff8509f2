//! Response DTOs exposed by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    KnowledgeEntryId, MessageId, MessageKind, SessionId, SessionStatus, TicketId, TicketPriority,
    TicketStatus, Timestamp,
};
use crate::domain::support::{KnowledgeEntry, SupportMessage, SupportTicket};

/// Result of starting a new conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: SessionId,
    pub ticket_id: TicketId,
    pub status: SessionStatus,
}

/// The bot's reply to one processed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBotResponse {
    /// The answer text shown to the user.
    pub message: String,
    /// Who produced the answer (always `Bot` here).
    pub message_kind: MessageKind,
    /// Set when the answer came from the knowledge base.
    pub knowledge_entry_id: Option<KnowledgeEntryId>,
    /// True once the session has been handed to an operator.
    pub is_escalated: bool,
    /// Quick-reply suggestions; empty once escalated or late in the
    /// conversation.
    pub suggestions: Vec<String>,
    pub session_id: SessionId,
    /// User questions asked in this session so far.
    pub questions_count: u32,
}

/// One message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: MessageId,
    pub kind: MessageKind,
    pub content: String,
    pub knowledge_entry_id: Option<KnowledgeEntryId>,
    pub is_helpful: Option<bool>,
    pub created_at: Timestamp,
}

impl From<&SupportMessage> for MessageView {
    fn from(message: &SupportMessage) -> Self {
        Self {
            id: *message.id(),
            kind: message.kind(),
            content: message.content().to_string(),
            knowledge_entry_id: message.knowledge_entry_id().copied(),
            is_helpful: message.is_helpful(),
            created_at: *message.created_at(),
        }
    }
}

/// A session's full message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Messages, oldest first.
    pub messages: Vec<MessageView>,
    /// Whether the UI should offer the manual escalation control.
    pub can_escalate: bool,
}

/// Summary of one ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketView {
    pub id: TicketId,
    pub title: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: Timestamp,
}

impl From<&SupportTicket> for TicketView {
    fn from(ticket: &SupportTicket) -> Self {
        Self {
            id: *ticket.id(),
            title: ticket.title().to_string(),
            status: ticket.status(),
            priority: ticket.priority(),
            created_at: *ticket.created_at(),
        }
    }
}

/// A frequently used knowledge entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularEntry {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub usage_count: u64,
}

impl From<&KnowledgeEntry> for PopularEntry {
    fn from(entry: &KnowledgeEntry) -> Self {
        Self {
            category: entry.category().to_string(),
            question: entry.question().to_string(),
            answer: entry.answer().to_string(),
            usage_count: entry.usage_count(),
        }
    }
}
