//! Hosted-inference client for the classification, detection, OCR, and
//! transcription capabilities, backed by the Hugging Face inference API.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{
    Classification, Detection, InferenceError, ObjectDetector, SpeechTranscriber, TextClassifier,
    TextRecognizer, TextSpan, Transcript,
};
use crate::media::{AudioClip, FrameImage};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
const DETECTION_MODEL: &str = "facebook/detr-resnet-50";
const OCR_MODEL: &str = "microsoft/trocr-base-printed";
const ASR_MODEL: &str = "openai/whisper-base";

/// Shared client for all hosted-inference capabilities.
#[derive(Debug)]
pub struct HfInferenceClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl HfInferenceClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from `HUGGINGFACE_API_KEY`.
    pub fn from_env() -> Result<Self, InferenceError> {
        let api_key = std::env::var("HUGGINGFACE_API_KEY")
            .map_err(|_| InferenceError::NotConfigured("HUGGINGFACE_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Override the API base URL (for self-hosted endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        model: &str,
        body: &B,
    ) -> Result<R, InferenceError> {
        let url = format!("{}/{}", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        if status != 200 {
            return Err(InferenceError::Api {
                status,
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| InferenceError::Parse(e.to_string()))
    }

    async fn post_bytes<R: for<'de> Deserialize<'de>>(
        &self,
        model: &str,
        bytes: Vec<u8>,
    ) -> Result<R, InferenceError> {
        let url = format!("{}/{}", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        if status != 200 {
            return Err(InferenceError::Api {
                status,
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| InferenceError::Parse(e.to_string()))
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

#[derive(Serialize)]
struct ImageRequest {
    inputs: String,
}

#[derive(Deserialize)]
struct DetectionResponse {
    label: String,
    score: f32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
struct AsrResponse {
    text: String,
}

#[async_trait]
impl TextClassifier for HfInferenceClient {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Classification, InferenceError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let response: ZeroShotResponse = self.post_json(ZERO_SHOT_MODEL, &request).await?;

        if response.labels.is_empty() {
            return Err(InferenceError::Parse(
                "Zero-shot response carried no labels".to_string(),
            ));
        }

        Ok(Classification {
            labels: response.labels,
            scores: response.scores,
        })
    }
}

#[async_trait]
impl ObjectDetector for HfInferenceClient {
    async fn detect(&self, frame: &FrameImage) -> Result<Vec<Detection>, InferenceError> {
        let request = ImageRequest {
            inputs: base64::engine::general_purpose::STANDARD.encode(&frame.bytes),
        };

        let response: Vec<DetectionResponse> = self.post_json(DETECTION_MODEL, &request).await?;

        Ok(response
            .into_iter()
            .map(|d| Detection {
                label: d.label,
                score: d.score,
            })
            .collect())
    }
}

#[async_trait]
impl TextRecognizer for HfInferenceClient {
    async fn read(&self, frame: &FrameImage) -> Result<Vec<TextSpan>, InferenceError> {
        let request = ImageRequest {
            inputs: base64::engine::general_purpose::STANDARD.encode(&frame.bytes),
        };

        let response: Vec<GeneratedText> = self.post_json(OCR_MODEL, &request).await?;

        // The OCR model reports no span scores; treat returned text as
        // fully confident and let callers threshold on their side.
        Ok(response
            .into_iter()
            .filter(|g| !g.generated_text.trim().is_empty())
            .map(|g| TextSpan {
                text: g.generated_text.trim().to_string(),
                score: 1.0,
            })
            .collect())
    }
}

#[async_trait]
impl SpeechTranscriber for HfInferenceClient {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, InferenceError> {
        let response: AsrResponse = self.post_bytes(ASR_MODEL, clip.bytes.clone()).await?;

        // The hosted endpoint returns plain text without per-segment
        // confidences; 0.7 matches the default assumed when segment data
        // is unavailable.
        Ok(Transcript {
            text: response.text.trim().to_string(),
            confidence: 0.7,
            segments: Vec::new(),
        })
    }
}
