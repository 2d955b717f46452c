//! Deterministic fake inference backends for testing.
//!
//! These return canned responses so tests run without network access or
//! API costs. Each fake can also be configured to fail, for exercising the
//! degradation paths.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    Classification, Detection, InferenceError, ObjectDetector, SpeechTranscriber, TextClassifier,
    TextRecognizer, TextSpan, Transcript, TranscriptSegment,
};
use crate::media::{AudioClip, FrameImage};

/// Fake zero-shot classifier matched on prompt substrings.
#[derive(Debug, Default)]
pub struct FakeClassifier {
    /// (text contains, label, score) rules checked in order.
    rules: Vec<(String, String, f32)>,
    default: Option<(String, f32)>,
    fail: bool,
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `label` with `score` when the input contains `text_contains`.
    pub fn with_rule(mut self, text_contains: &str, label: &str, score: f32) -> Self {
        self.rules
            .push((text_contains.to_lowercase(), label.to_string(), score));
        self
    }

    /// Label returned when no rule matches.
    pub fn with_default(mut self, label: &str, score: f32) -> Self {
        self.default = Some((label.to_string(), score));
        self
    }

    /// A classifier whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextClassifier for FakeClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Classification, InferenceError> {
        if self.fail {
            return Err(InferenceError::Request(
                "FakeClassifier configured to fail".to_string(),
            ));
        }

        let text_lower = text.to_lowercase();
        let chosen = self
            .rules
            .iter()
            .find(|(pattern, label, _)| {
                text_lower.contains(pattern) && candidate_labels.contains(&label.as_str())
            })
            .map(|(_, label, score)| (label.clone(), *score))
            .or_else(|| self.default.clone());

        match chosen {
            Some((label, score)) => {
                // Remaining candidates follow with a uniform remainder so the
                // response shape matches a real zero-shot result.
                let mut labels = vec![label.clone()];
                let mut scores = vec![score];
                let rest: Vec<_> = candidate_labels
                    .iter()
                    .filter(|l| **l != label)
                    .collect();
                let remainder = if rest.is_empty() {
                    0.0
                } else {
                    (1.0 - score).max(0.0) / rest.len() as f32
                };
                for l in rest {
                    labels.push((*l).to_string());
                    scores.push(remainder);
                }
                Ok(Classification { labels, scores })
            }
            None => Err(InferenceError::Request(format!(
                "FakeClassifier: no rule for input (first 80 chars): {}",
                text.chars().take(80).collect::<String>()
            ))),
        }
    }
}

/// Fake object detector with an optional per-call response queue.
#[derive(Debug, Default)]
pub struct FakeDetector {
    queued: Mutex<VecDeque<Vec<Detection>>>,
    constant: Vec<Detection>,
    fail: bool,
}

impl FakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector that returns the same labels for every frame.
    pub fn with_labels(labels: &[(&str, f32)]) -> Self {
        Self {
            constant: labels
                .iter()
                .map(|(label, score)| Detection {
                    label: (*label).to_string(),
                    score: *score,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Queue a response for the next call; once the queue drains, the
    /// constant response is used.
    pub fn queue_response(self, labels: &[(&str, f32)]) -> Self {
        self.queued.lock().unwrap().push_back(
            labels
                .iter()
                .map(|(label, score)| Detection {
                    label: (*label).to_string(),
                    score: *score,
                })
                .collect(),
        );
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ObjectDetector for FakeDetector {
    async fn detect(&self, _frame: &FrameImage) -> Result<Vec<Detection>, InferenceError> {
        if self.fail {
            return Err(InferenceError::Request(
                "FakeDetector configured to fail".to_string(),
            ));
        }
        if let Some(response) = self.queued.lock().unwrap().pop_front() {
            return Ok(response);
        }
        Ok(self.constant.clone())
    }
}

/// Fake OCR backend.
#[derive(Debug, Default)]
pub struct FakeRecognizer {
    spans: Vec<TextSpan>,
    fail: bool,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str, score: f32) -> Self {
        Self {
            spans: vec![TextSpan {
                text: text.to_string(),
                score,
            }],
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    async fn read(&self, _frame: &FrameImage) -> Result<Vec<TextSpan>, InferenceError> {
        if self.fail {
            return Err(InferenceError::Request(
                "FakeRecognizer configured to fail".to_string(),
            ));
        }
        Ok(self.spans.clone())
    }
}

/// Fake speech transcriber.
#[derive(Debug, Default)]
pub struct FakeTranscriber {
    transcript: Option<Transcript>,
    fail: bool,
}

impl FakeTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcriber returning the given text as a single segment.
    pub fn with_text(text: &str, confidence: f32) -> Self {
        Self {
            transcript: Some(Transcript {
                text: text.to_string(),
                confidence,
                segments: vec![TranscriptSegment {
                    text: text.to_string(),
                    start_secs: 0.0,
                    end_secs: 10.0,
                    confidence,
                }],
            }),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SpeechTranscriber for FakeTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<Transcript, InferenceError> {
        if self.fail {
            return Err(InferenceError::Request(
                "FakeTranscriber configured to fail".to_string(),
            ));
        }
        self.transcript.clone().ok_or_else(|| {
            InferenceError::Request("FakeTranscriber: no transcript configured".to_string())
        })
    }
}
