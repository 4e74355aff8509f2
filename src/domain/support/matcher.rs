//! Lexical knowledge-base matcher.
//!
//! Scores an incoming message against every active knowledge entry with a
//! small additive point scheme. This is a deliberately simple heuristic, not
//! a statistical model: the point values and thresholds are load-bearing
//! because existing knowledge-base content has been tuned against them.

use crate::domain::foundation::KnowledgeEntryId;
use serde::{Deserialize, Serialize};

use super::KnowledgeEntry;

/// Default minimum score an entry must reach to be considered a match at all.
pub const DEFAULT_MIN_SCORE: u32 = 2;

/// A scored match against one knowledge entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    pub entry_id: KnowledgeEntryId,
    /// The entry's answer, with the FAQ link appended when one exists.
    pub answer: String,
    pub question: String,
    pub category: String,
    pub score: u32,
    pub faq_url: Option<String>,
}

/// Scores messages against the active knowledge set.
///
/// Deterministic and free of I/O; the caller supplies the active entries in
/// ascending-id order so tie-breaking stays reproducible.
#[derive(Debug, Clone)]
pub struct KnowledgeMatcher {
    min_score: u32,
}

impl KnowledgeMatcher {
    /// Creates a matcher with the given score floor.
    pub fn new(min_score: u32) -> Self {
        Self { min_score }
    }

    /// Returns the configured score floor.
    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    /// Finds the best-scoring entry for a message.
    ///
    /// Returns `None` when no entry reaches the score floor or the set is
    /// empty. On equal scores the first entry encountered wins; only a
    /// strictly higher score replaces the current best.
    pub fn find_best(&self, entries: &[KnowledgeEntry], message: &str) -> Option<KnowledgeMatch> {
        let message = message.to_lowercase();

        let mut best: Option<&KnowledgeEntry> = None;
        let mut best_score = 0u32;

        for entry in entries {
            let score = score_entry(entry, &message);
            if score > best_score {
                best_score = score;
                best = Some(entry);
            }
        }

        let entry = best?;
        if best_score < self.min_score {
            return None;
        }

        let answer = match entry.faq_url() {
            Some(url) => format!("{} 🔗 More details: {}", entry.answer(), url),
            None => entry.answer().to_string(),
        };

        Some(KnowledgeMatch {
            entry_id: *entry.id(),
            answer,
            question: entry.question().to_string(),
            category: entry.category().to_string(),
            score: best_score,
            faq_url: entry.faq_url().map(str::to_string),
        })
    }
}

impl Default for KnowledgeMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE)
    }
}

/// Scores one entry against an already lower-cased message.
///
/// Point scheme (cumulative, never deduplicated):
/// - +3 per question word longer than 3 chars found in the message
/// - +2 per comma-separated keyword longer than 2 chars found in the message
/// - +1 if the category name is found in the message
/// - +1 (once) if any question word longer than 4 chars is found in the
///   message; this intentionally overlaps with the first rule
fn score_entry(entry: &KnowledgeEntry, message_lower: &str) -> u32 {
    let mut score = 0u32;

    let question_lower = entry.question().to_lowercase();
    for word in question_lower.split_whitespace() {
        if word.chars().count() > 3 && message_lower.contains(word) {
            score += 3;
        }
    }

    for keyword in entry.keywords().split(',') {
        let keyword = keyword.trim().to_lowercase();
        if keyword.chars().count() > 2 && message_lower.contains(&keyword) {
            score += 2;
        }
    }

    if message_lower.contains(&entry.category().to_lowercase()) {
        score += 1;
    }

    if question_lower
        .split_whitespace()
        .any(|word| word.chars().count() > 4 && message_lower.contains(word))
    {
        score += 1;
    }

    score
}
