//! Model-inference capability interfaces.
//!
//! The extractors treat every model as a black box behind one of these
//! traits: zero-shot classification, object detection, OCR, and speech
//! transcription. Implementations should be stateless and thread-safe.

mod fake;
mod hugging_face;

pub use fake::{FakeClassifier, FakeDetector, FakeRecognizer, FakeTranscriber};
pub use hugging_face::HfInferenceClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::media::{AudioClip, FrameImage};

/// Error type for inference calls.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference request failed: {0}")]
    Request(String),

    #[error("Inference API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse inference response: {0}")]
    Parse(String),

    #[error("Inference backend not configured: {0}")]
    NotConfigured(String),
}

/// One detected object in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub score: f32,
}

/// One recognized text span in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub score: f32,
}

/// Zero-shot classification result: labels ordered by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl Classification {
    /// The best label and its score, if any.
    pub fn top(&self) -> Option<(&str, f32)> {
        match (self.labels.first(), self.scores.first()) {
            (Some(label), Some(score)) => Some((label.as_str(), *score)),
            _ => None,
        }
    }
}

/// A timed transcript segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_secs: f32,
    pub end_secs: f32,
    pub confidence: f32,
}

/// A speech transcription result.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Zero-shot text classification over caller-supplied candidate labels.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Classification, InferenceError>;
}

/// Object detection over a single frame.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    async fn detect(&self, frame: &FrameImage) -> Result<Vec<Detection>, InferenceError>;
}

/// OCR over a single frame.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn read(&self, frame: &FrameImage) -> Result<Vec<TextSpan>, InferenceError>;
}

/// Speech-to-text over an extracted audio clip.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, InferenceError>;
}
