//! In-memory adapters.
//!
//! Process-local implementations of the persistence and provider ports,
//! used by the application tests and by local development without a
//! database. The stores honor the same commit-unit semantics as the
//! Postgres adapters: each commit method applies everything under one lock
//! acquisition or nothing at all.

mod knowledge_store;
mod provider;
mod support_store;

pub use knowledge_store::InMemoryKnowledgeStore;
pub use provider::StaticAnswerProvider;
pub use support_store::InMemorySupportStore;
