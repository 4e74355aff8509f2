//! Answer provider configuration (GigaChat-style OAuth + completion API)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Answer provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Static API credential exchanged for short-lived bearer tokens
    pub credential: Option<String>,

    /// OAuth token-exchange endpoint
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,

    /// Completion API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth scope sent with the token exchange
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Model name sent with completion requests
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Completion sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion request timeout in seconds
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    /// Bearer token lifetime granted by the provider, in seconds
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,

    /// Safety margin subtracted from the lifetime before a token is
    /// considered expired, in seconds
    #[serde(default = "default_token_margin")]
    pub token_safety_margin_secs: u64,
}

impl ProviderConfig {
    /// Get completion timeout as Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// Effective seconds a fetched token is trusted for
    pub fn effective_token_lifetime_secs(&self) -> u64 {
        self.token_lifetime_secs
            .saturating_sub(self.token_safety_margin_secs)
    }

    /// Check if a credential is configured
    pub fn has_credential(&self) -> bool {
        self.credential.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_credential() {
            return Err(ValidationError::MissingRequired("PROVIDER_CREDENTIAL"));
        }
        if !self.oauth_url.starts_with("https://") || !self.base_url.starts_with("https://") {
            return Err(ValidationError::ProviderUrlMustBeHttps);
        }
        if self.completion_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.token_safety_margin_secs >= self.token_lifetime_secs {
            return Err(ValidationError::InvalidTokenMargin);
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            credential: None,
            oauth_url: default_oauth_url(),
            base_url: default_base_url(),
            scope: default_scope(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            completion_timeout_secs: default_completion_timeout(),
            token_lifetime_secs: default_token_lifetime(),
            token_safety_margin_secs: default_token_margin(),
        }
    }
}

fn default_oauth_url() -> String {
    "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string()
}

fn default_base_url() -> String {
    "https://gigachat.devices.sberbank.ru/api/v1".to_string()
}

fn default_scope() -> String {
    "GIGACHAT_API_PERS".to_string()
}

fn default_model() -> String {
    "GigaChat".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.5
}

fn default_completion_timeout() -> u64 {
    30
}

fn default_token_lifetime() -> u64 {
    1800 // 30 minutes
}

fn default_token_margin() -> u64 {
    300 // 5 minutes
}
