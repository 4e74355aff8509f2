//! Knowledge store port (read side).
//!
//! Read-only access to the curated knowledge base. Usage-counter increments
//! are NOT here: they ride inside [`super::TurnCommit`] so that accounting
//! and message persistence share one commit unit.

use crate::domain::foundation::DomainError;
use crate::domain::support::KnowledgeEntry;
use async_trait::async_trait;

/// Repository port for knowledge-base reads.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// All active entries, ascending by ID.
    ///
    /// The ordering is part of the contract: the matcher breaks score ties
    /// by first-encountered, so the active set must come back in a stable,
    /// documented order.
    async fn list_active(&self) -> Result<Vec<KnowledgeEntry>, DomainError>;

    /// The most-used active entries, usage count descending.
    async fn top_by_usage(&self, limit: u32) -> Result<Vec<KnowledgeEntry>, DomainError>;
}
