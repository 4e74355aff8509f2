//! In-memory knowledge store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{DomainError, ErrorCode, KnowledgeEntryId, Timestamp};
use crate::domain::support::KnowledgeEntry;
use crate::ports::KnowledgeStore;

/// In-memory knowledge base.
///
/// Entries live in a `BTreeMap` keyed by ID, so `list_active` comes back in
/// ascending ID order without an explicit sort. Clones share the same
/// underlying map, which lets a paired [`super::InMemorySupportStore`]
/// apply usage increments to the same data the matcher reads.
#[derive(Clone, Default)]
pub struct InMemoryKnowledgeStore {
    entries: Arc<Mutex<BTreeMap<KnowledgeEntryId, KnowledgeEntry>>>,
}

impl InMemoryKnowledgeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given entries.
    pub fn with_entries(entries: Vec<KnowledgeEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock().unwrap();
            for entry in entries {
                map.insert(*entry.id(), entry);
            }
        }
        store
    }

    /// Inserts or replaces an entry.
    pub fn insert(&self, entry: KnowledgeEntry) {
        self.entries.lock().unwrap().insert(*entry.id(), entry);
    }

    /// Returns an entry by ID, if present.
    pub fn get(&self, id: &KnowledgeEntryId) -> Option<KnowledgeEntry> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    /// Bumps an entry's usage counter. Used by the paired support store
    /// inside its turn commit.
    pub(crate) fn increment_usage(&self, id: &KnowledgeEntryId) -> Result<(), DomainError> {
        let mut map = self.entries.lock().unwrap();
        let entry = map.get(id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::KnowledgeEntryNotFound,
                format!("Knowledge entry {} not found", id),
            )
        })?;

        let bumped = KnowledgeEntry::reconstitute(
            *entry.id(),
            entry.category().to_string(),
            entry.question().to_string(),
            entry.answer().to_string(),
            entry.keywords().to_string(),
            entry.faq_url().map(String::from),
            entry.usage_count() + 1,
            entry.is_active(),
            *entry.created_at(),
            Timestamp::now(),
        );
        map.insert(*id, bumped);
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn list_active(&self) -> Result<Vec<KnowledgeEntry>, DomainError> {
        let map = self.entries.lock().unwrap();
        Ok(map.values().filter(|e| e.is_active()).cloned().collect())
    }

    async fn top_by_usage(&self, limit: u32) -> Result<Vec<KnowledgeEntry>, DomainError> {
        let map = self.entries.lock().unwrap();
        let mut active: Vec<KnowledgeEntry> =
            map.values().filter(|e| e.is_active()).cloned().collect();
        active.sort_by(|a, b| b.usage_count().cmp(&a.usage_count()));
        active.truncate(limit as usize);
        Ok(active)
    }
}
