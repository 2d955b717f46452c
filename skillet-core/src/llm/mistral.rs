//! Mistral LLM provider.

use super::{LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Mistral chat-completions provider.
#[derive(Debug)]
pub struct MistralProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl MistralProvider {
    /// Create a new MistralProvider with the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Mistral API request format.
#[derive(Debug, Serialize)]
struct MistralRequest {
    model: String,
    messages: Vec<MistralMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct MistralMessage {
    role: String,
    content: String,
}

/// Mistral API response format.
#[derive(Debug, Deserialize)]
struct MistralResponse {
    choices: Vec<MistralChoice>,
}

#[derive(Debug, Deserialize)]
struct MistralChoice {
    message: MistralResponseMessage,
}

#[derive(Debug, Deserialize)]
struct MistralResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct MistralApiError {
    message: String,
}

/// Error response from the Mistral API.
#[derive(Debug, Deserialize)]
struct MistralErrorResponse {
    error: MistralApiError,
}

#[async_trait]
impl LlmProvider for MistralProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = MistralRequest {
            model: self.model.clone(),
            messages: vec![MistralMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            // Low temperature for consistent, factual output.
            temperature: 0.1,
            max_tokens: 2000,
            top_p: 0.9,
        };

        let response = self
            .client
            .post("https://api.mistral.ai/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if status != 200 {
            // Try to parse error response
            if let Ok(error_response) = serde_json::from_str::<MistralErrorResponse>(&body) {
                return Err(LlmError::ApiError {
                    status,
                    message: error_response.error.message,
                });
            }
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let response: MistralResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "mistral"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
