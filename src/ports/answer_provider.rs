//! Answer provider port.
//!
//! Contract for the external generative answer service used when no
//! knowledge-base match is strong enough. Every failure mode here is
//! RECOVERABLE: the orchestrator absorbs it into a fixed fallback message
//! and never surfaces it to the user.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of the external answer provider. Expected, not fatal.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The bearer-token exchange failed (network error or non-success status).
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The completion endpoint was unreachable or returned a non-success status.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The completion call exceeded its bounded timeout.
    #[error("Provider timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered but returned no choices.
    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

impl ProviderError {
    /// Creates an unavailable error from any displayable cause.
    pub fn unavailable(cause: impl std::fmt::Display) -> Self {
        ProviderError::Unavailable(cause.to_string())
    }

    /// Creates a token exchange error from any displayable cause.
    pub fn token_exchange(cause: impl std::fmt::Display) -> Self {
        ProviderError::TokenExchangeFailed(cause.to_string())
    }
}

/// Port for single-turn completion against the external provider.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Generate an answer for one user message.
    ///
    /// `context` is a short free-text summary of the conversation so far
    /// (turn count and topic); it is folded into the provider prompt.
    async fn complete(&self, message: &str, context: &str) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn answer_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn AnswerProvider) {}
    }

    #[test]
    fn errors_display_their_cause() {
        let err = ProviderError::token_exchange("status 401");
        assert_eq!(format!("{}", err), "Token exchange failed: status 401");

        let err = ProviderError::Timeout { timeout_secs: 30 };
        assert_eq!(format!("{}", err), "Provider timed out after 30s");
    }
}
