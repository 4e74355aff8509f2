//! Support-chat domain: tickets, sessions, messages, knowledge base.

mod knowledge;
mod matcher;
mod message;
mod policy;
mod session;
mod ticket;

pub use knowledge::KnowledgeEntry;
pub use matcher::{KnowledgeMatch, KnowledgeMatcher, DEFAULT_MIN_SCORE};
pub use message::SupportMessage;
pub use policy::{
    Action, EscalationPolicy, DEFAULT_ESCALATION_TURN_LIMIT, DEFAULT_KNOWLEDGE_SCORE_THRESHOLD,
};
pub use session::SupportSession;
pub use ticket::SupportTicket;
