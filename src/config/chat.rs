//! Chat policy configuration
//!
//! The matcher and escalation thresholds live here so operators can tune
//! them without a rebuild. The defaults mirror the values the knowledge-base
//! content was tuned against.

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::support::{
    DEFAULT_ESCALATION_TURN_LIMIT, DEFAULT_KNOWLEDGE_SCORE_THRESHOLD, DEFAULT_MIN_SCORE,
};

/// Chat policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Minimum matcher score for an entry to count as a match at all
    #[serde(default = "default_min_match_score")]
    pub min_match_score: u32,

    /// Matcher score at or above which the knowledge answer is used
    #[serde(default = "default_knowledge_score_threshold")]
    pub knowledge_score_threshold: u32,

    /// User-turn count at or above which an unmatched question escalates
    #[serde(default = "default_escalation_turn_limit")]
    pub escalation_turn_limit: u32,
}

impl ChatConfig {
    /// Validate chat policy configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.knowledge_score_threshold < self.min_match_score {
            return Err(ValidationError::InvalidScoreThresholds);
        }
        if self.escalation_turn_limit == 0 {
            return Err(ValidationError::InvalidTurnLimit);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            min_match_score: default_min_match_score(),
            knowledge_score_threshold: default_knowledge_score_threshold(),
            escalation_turn_limit: default_escalation_turn_limit(),
        }
    }
}

fn default_min_match_score() -> u32 {
    DEFAULT_MIN_SCORE
}

fn default_knowledge_score_threshold() -> u32 {
    DEFAULT_KNOWLEDGE_SCORE_THRESHOLD
}

fn default_escalation_turn_limit() -> u32 {
    DEFAULT_ESCALATION_TURN_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.min_match_score, 2);
        assert_eq!(config.knowledge_score_threshold, 3);
        assert_eq!(config.escalation_turn_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_threshold_below_min_score() {
        let config = ChatConfig {
            min_match_score: 4,
            knowledge_score_threshold: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_turn_limit() {
        let config = ChatConfig {
            escalation_turn_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
