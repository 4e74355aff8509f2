//! Process-scoped knowledge cache.
//!
//! The active knowledge set changes rarely (an administrative tool edits it)
//! while the matcher reads it on every message, so it is loaded once and kept
//! until an explicit refresh. Stale reads between edits and refresh are
//! acceptable.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::foundation::DomainError;
use crate::domain::support::KnowledgeEntry;
use crate::ports::KnowledgeStore;

/// Cached view of the active knowledge entries, in ascending-id order.
pub struct KnowledgeCache {
    store: Arc<dyn KnowledgeStore>,
    entries: RwLock<Option<Arc<Vec<KnowledgeEntry>>>>,
}

impl KnowledgeCache {
    /// Creates an empty cache over the given store.
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(None),
        }
    }

    /// Returns the active set, loading it on first use.
    pub async fn active(&self) -> Result<Arc<Vec<KnowledgeEntry>>, DomainError> {
        if let Some(entries) = self.entries.read().await.as_ref() {
            return Ok(Arc::clone(entries));
        }

        let mut slot = self.entries.write().await;
        // another task may have loaded while we waited for the write lock
        if let Some(entries) = slot.as_ref() {
            return Ok(Arc::clone(entries));
        }

        let loaded = Arc::new(self.store.list_active().await?);
        info!(entries = loaded.len(), "knowledge cache loaded");
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Reloads the cache from the store. Returns the new entry count.
    pub async fn refresh(&self) -> Result<usize, DomainError> {
        let loaded = Arc::new(self.store.list_active().await?);
        let count = loaded.len();
        *self.entries.write().await = Some(loaded);
        info!(entries = count, "knowledge cache refreshed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKnowledgeStore;
    use crate::domain::foundation::KnowledgeEntryId;

    fn entry(question: &str) -> KnowledgeEntry {
        KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "general".to_string(),
            question.to_string(),
            "answer".to_string(),
            String::new(),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn loads_lazily_and_serves_from_cache() {
        let store = InMemoryKnowledgeStore::new();
        store.insert(entry("first"));
        let cache = KnowledgeCache::new(Arc::new(store.clone()));

        assert_eq!(cache.active().await.unwrap().len(), 1);

        // a store change is not visible until refresh
        store.insert(entry("second"));
        assert_eq!(cache.active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_picks_up_new_entries() {
        let store = InMemoryKnowledgeStore::new();
        store.insert(entry("first"));
        let cache = KnowledgeCache::new(Arc::new(store.clone()));
        cache.active().await.unwrap();

        store.insert(entry("second"));
        assert_eq!(cache.refresh().await.unwrap(), 2);
        assert_eq!(cache.active().await.unwrap().len(), 2);
    }
}
