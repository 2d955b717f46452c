//! LLM provider abstraction for the optional refinement pass.
//!
//! This module provides a trait-based abstraction over chat-completion
//! providers with support for testing via a fake implementation.

mod fake;
mod mistral;

pub use fake::FakeProvider;
pub use mistral::MistralProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is
/// responsible for making API calls and returning the model's text response.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt to the LLM and get a text response.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Get the provider name (e.g., "mistral", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name (e.g., "mistral-large-latest").
    fn model_name(&self) -> &str;
}

/// Build a provider from environment variables.
///
/// - `SKILLET_REFINER`: "mistral" | "fake" (default "fake")
/// - `SKILLET_REFINER_MODEL`: model name (provider-specific)
/// - `MISTRAL_API_KEY`: API key for Mistral
pub fn provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("SKILLET_REFINER").unwrap_or_else(|_| "fake".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "mistral" => {
            let api_key = std::env::var("MISTRAL_API_KEY")
                .map_err(|_| LlmError::NotConfigured("MISTRAL_API_KEY not set".to_string()))?;
            let model = std::env::var("SKILLET_REFINER_MODEL")
                .unwrap_or_else(|_| "mistral-large-latest".to_string());
            Ok(Box::new(MistralProvider::new(api_key, model)))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
