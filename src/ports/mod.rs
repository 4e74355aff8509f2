//! Ports: contracts between the application core and its adapters.

mod answer_provider;
mod knowledge_store;
mod support_store;

pub use answer_provider::{AnswerProvider, ProviderError};
pub use knowledge_store::KnowledgeStore;
pub use support_store::{EscalationCommit, NewConversation, SupportStore, TurnCommit};
