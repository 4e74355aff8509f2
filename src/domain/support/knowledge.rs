//! KnowledgeEntry entity.
//!
//! A curated question/answer pair used for lexical matching against incoming
//! support questions. Entries are created and edited by an administrative
//! collaborator outside this core; here they are read-only except for the
//! usage counter and the active flag.

use crate::domain::foundation::{KnowledgeEntryId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// A knowledge-base entry.
///
/// # Invariants
///
/// - `category`, `question` and `answer` are non-empty
/// - `usage_count` is monotonic; it only moves via the store's atomic
///   increment when the entry is chosen for an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    id: KnowledgeEntryId,
    category: String,
    question: String,
    answer: String,
    /// Comma-separated free-text keywords, matched case-insensitively.
    keywords: String,
    faq_url: Option<String>,
    usage_count: u64,
    active: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl KnowledgeEntry {
    /// Create a new active entry.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if category, question or answer is empty
    pub fn new(
        id: KnowledgeEntryId,
        category: String,
        question: String,
        answer: String,
        keywords: String,
        faq_url: Option<String>,
    ) -> Result<Self, ValidationError> {
        if category.trim().is_empty() {
            return Err(ValidationError::empty_field("category"));
        }
        if question.trim().is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        if answer.trim().is_empty() {
            return Err(ValidationError::empty_field("answer"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            category,
            question,
            answer,
            keywords,
            faq_url,
            usage_count: 0,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute an entry from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: KnowledgeEntryId,
        category: String,
        question: String,
        answer: String,
        keywords: String,
        faq_url: Option<String>,
        usage_count: u64,
        active: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            category,
            question,
            answer,
            keywords,
            faq_url,
            usage_count,
            active,
            created_at,
            updated_at,
        }
    }

    /// Returns the entry ID.
    pub fn id(&self) -> &KnowledgeEntryId {
        &self.id
    }

    /// Returns the category name.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the curated question.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the curated answer.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns the raw comma-separated keyword field.
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// Returns the optional FAQ URL.
    pub fn faq_url(&self) -> Option<&str> {
        self.faq_url.as_deref()
    }

    /// Returns how many times this entry answered a question.
    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Returns whether the entry participates in matching.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns when the entry was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the entry was last updated.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> KnowledgeEntry {
        KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "billing".to_string(),
            "How do I pay an invoice".to_string(),
            "Open the billing page and choose a payment method.".to_string(),
            "invoice,payment,pay".to_string(),
            Some("https://faq.example.com/billing".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn new_entry_starts_active_with_zero_usage() {
        let e = entry();
        assert!(e.is_active());
        assert_eq!(e.usage_count(), 0);
    }

    #[test]
    fn rejects_empty_question() {
        let result = KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "billing".to_string(),
            "  ".to_string(),
            "answer".to_string(),
            String::new(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_answer() {
        let result = KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "billing".to_string(),
            "question".to_string(),
            String::new(),
            String::new(),
            None,
        );
        assert!(result.is_err());
    }
}
