//! Scripted answer provider.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::{AnswerProvider, ProviderError};

/// Answer provider that returns canned responses, for tests and local
/// development without provider credentials.
pub struct StaticAnswerProvider {
    responses: Mutex<Vec<Result<String, ProviderError>>>,
    fallback: String,
    calls: Mutex<Vec<String>>,
}

impl StaticAnswerProvider {
    /// Creates a provider that always answers with the same text.
    pub fn always(answer: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: answer.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider that plays the given results in order, then
    /// falls back to a fixed answer.
    pub fn scripted(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            // reversed so pop() plays front to back
            responses: Mutex::new(responses.into_iter().rev().collect()),
            fallback: "This is a generated answer.".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider that always fails.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The messages this provider was asked about, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn is_failing(&self) -> bool {
        self.fallback.is_empty()
    }
}

#[async_trait]
impl AnswerProvider for StaticAnswerProvider {
    async fn complete(&self, message: &str, _context: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(message.to_string());

        if let Some(scripted) = self.responses.lock().unwrap().pop() {
            return scripted;
        }
        if self.is_failing() {
            return Err(ProviderError::unavailable("scripted failure"));
        }
        Ok(self.fallback.clone())
    }
}
