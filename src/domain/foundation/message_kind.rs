//! MessageKind enum for chat message senders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a support chat message, by who produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Written by the end user.
    User,
    /// Produced by the automated assistant.
    Bot,
    /// Written by a human operator after escalation.
    Operator,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::User => "User",
            MessageKind::Bot => "Bot",
            MessageKind::Operator => "Operator",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(serde_json::to_string(&MessageKind::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&MessageKind::Bot).unwrap(), "\"bot\"");
        assert_eq!(
            serde_json::to_string(&MessageKind::Operator).unwrap(),
            "\"operator\""
        );
    }

    #[test]
    fn deserializes_from_snake_case_json() {
        let kind: MessageKind = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(kind, MessageKind::Operator);
    }
}
