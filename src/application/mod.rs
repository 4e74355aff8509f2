//! Application layer - session orchestration over the ports.

mod dto;
mod error;
mod knowledge_cache;
mod orchestrator;

pub use dto::{ChatBotResponse, MessageView, PopularEntry, SessionStarted, TicketView, Transcript};
pub use error::ChatError;
pub use knowledge_cache::KnowledgeCache;
pub use orchestrator::SessionOrchestrator;
