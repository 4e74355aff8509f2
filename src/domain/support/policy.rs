//! Escalation policy.
//!
//! Pure decision function combining knowledge-match quality and session turn
//! count. A strong lexical match is cheap and precise; repeated unresolved
//! turns mean the automated path is failing and a human should step in;
//! otherwise we fall back to the generative provider.

use crate::domain::foundation::KnowledgeEntryId;
use serde::{Deserialize, Serialize};

use super::KnowledgeMatch;

/// Knowledge-match score at or above which the cached answer is used.
pub const DEFAULT_KNOWLEDGE_SCORE_THRESHOLD: u32 = 3;

/// User-turn count at or above which an unmatched question escalates.
pub const DEFAULT_ESCALATION_TURN_LIMIT: u32 = 5;

/// What to do with one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Answer from the knowledge base and account the usage.
    UseKnowledge { entry_id: KnowledgeEntryId },
    /// Ask the external answer provider.
    AskProvider,
    /// Hand the session to a human operator.
    Escalate,
}

/// Decides between knowledge answer, generated answer, and escalation.
///
/// Thresholds are configuration so operators can tune them without a rebuild.
#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    knowledge_score_threshold: u32,
    escalation_turn_limit: u32,
}

impl EscalationPolicy {
    /// Creates a policy with the given thresholds.
    pub fn new(knowledge_score_threshold: u32, escalation_turn_limit: u32) -> Self {
        Self {
            knowledge_score_threshold,
            escalation_turn_limit,
        }
    }

    /// Returns the knowledge-score threshold.
    pub fn knowledge_score_threshold(&self) -> u32 {
        self.knowledge_score_threshold
    }

    /// Returns the escalation turn limit.
    pub fn escalation_turn_limit(&self) -> u32 {
        self.escalation_turn_limit
    }

    /// Decides the action for one message. Pure: identical inputs always
    /// yield the identical action.
    ///
    /// Rules, in order:
    /// 1. match with score >= threshold -> `UseKnowledge`
    /// 2. turn_count >= limit -> `Escalate`
    /// 3. otherwise -> `AskProvider`
    pub fn decide(&self, best_match: Option<&KnowledgeMatch>, turn_count: u32) -> Action {
        if let Some(m) = best_match {
            if m.score >= self.knowledge_score_threshold {
                return Action::UseKnowledge { entry_id: m.entry_id };
            }
        }

        if turn_count >= self.escalation_turn_limit {
            return Action::Escalate;
        }

        Action::AskProvider
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_KNOWLEDGE_SCORE_THRESHOLD,
            DEFAULT_ESCALATION_TURN_LIMIT,
        )
    }
}
