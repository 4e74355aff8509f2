//! GigaChat client - implementation of AnswerProvider against the GigaChat API.
//!
//! The provider uses an OAuth-style exchange: a static API credential is
//! traded for a short-lived bearer token (about 30 minutes), which is then
//! reused for completion calls until a safety margin before expiry. Refresh
//! is lazy: the expiry check runs before every completion call, never in the
//! background.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GigaChatConfig::new(credential)
//!     .with_model("GigaChat-Pro")
//!     .with_completion_timeout(Duration::from_secs(30));
//!
//! let client = GigaChatClient::new(config);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::ports::{AnswerProvider, ProviderError};

/// Configuration for the GigaChat client.
#[derive(Debug, Clone)]
pub struct GigaChatConfig {
    /// Static API credential for the token exchange.
    credential: Secret<String>,
    /// OAuth token-exchange endpoint.
    pub oauth_url: String,
    /// Completion API base URL.
    pub base_url: String,
    /// OAuth scope sent with the token exchange.
    pub scope: String,
    /// Model name sent with completion requests.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Completion sampling temperature.
    pub temperature: f32,
    /// Completion request timeout.
    pub completion_timeout: Duration,
    /// Token lifetime granted by the provider.
    pub token_lifetime: Duration,
    /// Safety margin subtracted from the lifetime.
    pub token_safety_margin: Duration,
}

impl GigaChatConfig {
    /// Creates a configuration with the given credential and API defaults.
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: Secret::new(credential.into()),
            oauth_url: "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string(),
            base_url: "https://gigachat.devices.sberbank.ru/api/v1".to_string(),
            scope: "GIGACHAT_API_PERS".to_string(),
            model: "GigaChat".to_string(),
            max_tokens: 150,
            temperature: 0.5,
            completion_timeout: Duration::from_secs(30),
            token_lifetime: Duration::from_secs(1800),
            token_safety_margin: Duration::from_secs(300),
        }
    }

    /// Builds a client configuration from the application settings.
    ///
    /// Returns `None` when no credential is configured.
    pub fn from_settings(settings: &ProviderConfig) -> Option<Self> {
        let credential = settings.credential.clone().filter(|c| !c.is_empty())?;
        Some(Self {
            credential: Secret::new(credential),
            oauth_url: settings.oauth_url.clone(),
            base_url: settings.base_url.clone(),
            scope: settings.scope.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            completion_timeout: settings.completion_timeout(),
            token_lifetime: Duration::from_secs(settings.token_lifetime_secs),
            token_safety_margin: Duration::from_secs(settings.token_safety_margin_secs),
        })
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the OAuth endpoint.
    pub fn with_oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = url.into();
        self
    }

    /// Sets the completion API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the completion request timeout.
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Effective duration a fetched token is trusted for.
    fn effective_token_lifetime(&self) -> Duration {
        self.token_lifetime.saturating_sub(self.token_safety_margin)
    }

    /// Exposes the credential (for making requests).
    fn credential(&self) -> &str {
        self.credential.expose_secret()
    }
}

/// A cached bearer token with its local expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// GigaChat API client.
///
/// The token cache is process-wide; holding the cache lock across a refresh
/// collapses concurrent refreshes into one in-flight exchange.
pub struct GigaChatClient {
    config: GigaChatConfig,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl GigaChatClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: GigaChatConfig) -> Self {
        let client = Client::builder()
            .timeout(config.completion_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            token: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, exchanging the credential when the
    /// cached one is missing or past its safety margin.
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid(Instant::now()) {
                return Ok(token.value.clone());
            }
        }
        // Expired or absent; drop it before the exchange so a failed
        // refresh never leaves a stale token behind.
        *cached = None;

        let exchanged = self.exchange_token().await?;
        debug!("provider token refreshed");

        let token = CachedToken {
            value: exchanged.access_token,
            expires_at: Instant::now() + self.config.effective_token_lifetime(),
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Exchanges the static credential for a bearer token.
    async fn exchange_token(&self) -> Result<TokenResponse, ProviderError> {
        // Fresh correlation id on every exchange, per the provider contract.
        let correlation_id = Uuid::new_v4();

        let response = self
            .client
            .post(&self.config.oauth_url)
            .header("Authorization", format!("Basic {}", self.config.credential()))
            .header("Accept", "application/json")
            .header("RqUID", correlation_id.to_string())
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::token_exchange(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::token_exchange(format!(
                "status {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::token_exchange(format!("invalid token payload: {}", e)))
    }

    /// Issues one completion request with an already valid token.
    async fn request_completion(
        &self,
        token: &str,
        prompt: String,
    ) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_secs: self.config.completion_timeout.as_secs(),
                    }
                } else {
                    ProviderError::unavailable(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::unavailable(format!(
                "status {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::unavailable(format!("invalid completion payload: {}", e)))?;

        extract_content(completion)
    }
}

#[async_trait]
impl AnswerProvider for GigaChatClient {
    async fn complete(&self, message: &str, context: &str) -> Result<String, ProviderError> {
        let token = self.bearer_token().await?;
        let prompt = build_prompt(message, context);

        match self.request_completion(&token, prompt).await {
            Ok(content) => Ok(content),
            Err(err) => {
                warn!(error = %err, "completion request failed");
                Err(err)
            }
        }
    }
}

/// Builds the fixed single-turn prompt framing for the provider.
fn build_prompt(message: &str, context: &str) -> String {
    format!(
        "You are a support assistant for a hosting provider.\n{context}\n\n\
         The user asks: {message}\n\n\
         Answer briefly (at most 50 words) and point to the detailed FAQ \
         article when one exists.\n\
         If the question is not about hosting, ask the user to rephrase it."
    )
}

/// Pulls the first choice's content out of a completion response.
fn extract_content(response: CompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyCompletion)
}

// ----- GigaChat API Types -----

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}
