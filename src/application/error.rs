//! Application-level error type.
//!
//! The orchestrator exposes a small error surface to its callers (the
//! transport layer): what went missing, what was rejected, and an opaque
//! processing failure for everything infrastructural. Provider failures
//! never appear here; they are absorbed into the fallback answer.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors surfaced by the session orchestrator.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The addressed session, ticket, or message does not exist for this
    /// caller. Also returned for resources owned by someone else, so
    /// existence is not leaked.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not valid in the resource's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The request itself is malformed (empty message, bad rating).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A persistence or internal failure; the commit unit was rolled back.
    #[error("Processing failure: {0}")]
    Processing(String),
}

impl From<DomainError> for ChatError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionNotFound
            | ErrorCode::TicketNotFound
            | ErrorCode::MessageNotFound
            | ErrorCode::KnowledgeEntryNotFound => ChatError::NotFound(err.message),

            ErrorCode::SessionClosed | ErrorCode::InvalidStateTransition => {
                ChatError::InvalidState(err.message)
            }

            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => ChatError::Validation(err.message),

            // ownership failures read as not-found to the caller
            ErrorCode::Forbidden => ChatError::NotFound(err.message),

            ErrorCode::ProviderUnavailable
            | ErrorCode::DatabaseError
            | ErrorCode::InternalError => ChatError::Processing(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_map_to_not_found() {
        let err: ChatError =
            DomainError::new(ErrorCode::SessionNotFound, "Session missing").into();
        assert!(matches!(err, ChatError::NotFound(_)));
    }

    #[test]
    fn state_codes_map_to_invalid_state() {
        let err: ChatError = DomainError::new(ErrorCode::SessionClosed, "closed").into();
        assert!(matches!(err, ChatError::InvalidState(_)));
    }

    #[test]
    fn forbidden_reads_as_not_found() {
        let err: ChatError = DomainError::new(ErrorCode::Forbidden, "not yours").into();
        assert!(matches!(err, ChatError::NotFound(_)));
    }

    #[test]
    fn database_errors_map_to_processing() {
        let err: ChatError = DomainError::new(ErrorCode::DatabaseError, "boom").into();
        assert!(matches!(err, ChatError::Processing(_)));
    }
}
