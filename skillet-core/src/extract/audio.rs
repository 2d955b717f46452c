//! Audio phase: audio acquisition, quality gating, transcription, and
//! transcript mining.
//!
//! Acquisition walks an ordered list of [`AudioTrackExtractor`] strategies;
//! the phase fails only when every strategy fails. A low quality score is a
//! warning, not a failure: partial and noisy transcripts are still usable
//! evidence.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::inference::{SpeechTranscriber, Transcript};
use crate::media::{AudioClip, AudioTrackExtractor, VideoHandle};
use crate::types::{
    Evidence, Measurement, MeasurementKind, Phase, PhaseResult, PhaseStatus, RecipeFields,
    TimeMention, TimeMentionKind,
};
use crate::vocab;

/// Confidence reported when the audio phase fails outright.
const FAILED_CONFIDENCE: f32 = 0.1;

/// Quality score below which a degraded-confidence warning is logged.
const QUALITY_WARN_THRESHOLD: f32 = 0.3;

static MEASUREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (\d+(?:\.\d+)?)\s*
        (cups?|tablespoons?|tbsp|teaspoons?|tsp|ounces?|oz|pounds?|lbs?|lb
        |grams?|kilograms?|kg|liters?|milliliters?|ml|g|l)\b",
    )
    .unwrap()
});

static DURATION_MIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(minutes?|mins?)\b").unwrap());
static DURATION_SEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(seconds?|secs?)\b").unwrap());
static DURATION_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(hours?|hrs?)\b").unwrap());
static FOR_MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for\s+(\d+)\s*(minutes?|mins?)\b").unwrap());
static COOK_FOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cook\s+for\s+(\d+)").unwrap());
static BAKE_FOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"bake\s+for\s+(\d+)").unwrap());
static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"until\s+(golden|brown|tender|crispy|done)").unwrap());
static APPROX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:about|around)\s+(\d+)\s*(minutes?|mins?)\b").unwrap());

/// Everything mined from a transcript.
#[derive(Debug, Clone, Default)]
pub(crate) struct TranscriptAnalysis {
    pub actions: Vec<String>,
    pub ingredients: Vec<String>,
    pub measurements: Vec<Measurement>,
    pub time_mentions: Vec<TimeMention>,
    pub instruction_sentences: Vec<String>,
    pub cooking_term_count: u32,
    pub cooking_density: f32,
}

/// Speech-based recipe extractor.
pub struct AudioExtractor {
    strategies: Vec<Arc<dyn AudioTrackExtractor>>,
    transcriber: Arc<dyn SpeechTranscriber>,
}

impl AudioExtractor {
    pub fn new(
        strategies: Vec<Arc<dyn AudioTrackExtractor>>,
        transcriber: Arc<dyn SpeechTranscriber>,
    ) -> Self {
        Self {
            strategies,
            transcriber,
        }
    }

    /// Extract spoken cooking evidence from a video's audio track.
    ///
    /// Never propagates errors: acquisition or transcription failure yields
    /// a failed result and the pipeline continues without this phase.
    pub async fn extract(&self, video: &dyn VideoHandle) -> PhaseResult {
        let Some(clip) = self.acquire_clip(video).await else {
            tracing::warn!("all audio extraction strategies failed");
            return PhaseResult::failed(Phase::Audio, FAILED_CONFIDENCE);
        };

        let quality = audio_quality_score(&clip);
        if quality < QUALITY_WARN_THRESHOLD {
            tracing::warn!(
                quality,
                "low audio quality, continuing with degraded confidence"
            );
        }

        let transcript = match self.transcriber.transcribe(&clip).await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                return PhaseResult::failed(Phase::Audio, FAILED_CONFIDENCE);
            }
        };

        let analysis = analyze_transcript(&transcript.text);
        let instructions = format_instructions(&analysis.instruction_sentences);
        let confidence = audio_confidence(&transcript, &analysis, quality);

        PhaseResult {
            phase: Phase::Audio,
            status: PhaseStatus::Completed,
            fields: RecipeFields {
                instructions,
                ..RecipeFields::default()
            },
            confidence,
            evidence: Evidence::Audio {
                transcript: transcript.text,
                transcription_confidence: transcript.confidence,
                quality_score: quality,
                actions: analysis.actions,
                mentioned_ingredients: analysis.ingredients,
                measurements: analysis.measurements,
                time_mentions: analysis.time_mentions,
                instruction_sentences: analysis.instruction_sentences,
                cooking_term_count: analysis.cooking_term_count,
            },
        }
    }

    /// Try each acquisition strategy in order.
    async fn acquire_clip(&self, video: &dyn VideoHandle) -> Option<AudioClip> {
        for strategy in &self.strategies {
            match strategy.extract(video).await {
                Ok(clip) => {
                    tracing::debug!(strategy = strategy.name(), "audio extracted");
                    return Some(clip);
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "audio extraction strategy failed");
                }
            }
        }
        None
    }
}

/// Mean of four quality factors: duration, audible energy, SNR, and sample
/// rate fitness for speech recognition.
pub(crate) fn audio_quality_score(clip: &AudioClip) -> f32 {
    let duration_factor = (clip.duration_secs / 5.0).min(1.0);
    let energy_factor = (clip.rms_energy * 10.0).min(1.0);
    let snr_factor = (clip.snr_db / 20.0).clamp(0.0, 1.0);
    let rate_factor = if clip.sample_rate >= 16_000 {
        1.0
    } else {
        clip.sample_rate as f32 / 16_000.0
    };

    (duration_factor + energy_factor + snr_factor + rate_factor) / 4.0
}

/// Mine a transcript for cooking signal.
pub(crate) fn analyze_transcript(text: &str) -> TranscriptAnalysis {
    let text_lower = text.to_lowercase();

    let actions: Vec<String> = vocab::ACTION_VERBS
        .iter()
        .filter(|verb| text_lower.contains(**verb))
        .map(|verb| (*verb).to_string())
        .collect();

    let ingredients: Vec<String> = vocab::SPOKEN_INGREDIENTS
        .iter()
        .filter(|ingredient| text_lower.contains(**ingredient))
        .map(|ingredient| (*ingredient).to_string())
        .collect();

    let measurements = extract_measurements(&text_lower);
    let time_mentions = extract_time_mentions(&text_lower);
    let instruction_sentences = extract_instruction_sentences(text);

    let cooking_term_count = vocab::ACTION_VERBS
        .iter()
        .chain(vocab::SPOKEN_INGREDIENTS.iter())
        .chain(vocab::EQUIPMENT.iter())
        .filter(|term| text_lower.contains(**term))
        .count() as u32;

    let word_count = text.split_whitespace().count().max(1);
    let cooking_density = cooking_term_count as f32 / word_count as f32;

    TranscriptAnalysis {
        actions,
        ingredients,
        measurements,
        time_mentions,
        instruction_sentences,
        cooking_term_count,
        cooking_density,
    }
}

/// Extract `<number> <unit>` measurement pairs.
pub(crate) fn extract_measurements(text_lower: &str) -> Vec<Measurement> {
    const WEIGHT_UNITS: &[&str] = &[
        "ounce", "ounces", "oz", "pound", "pounds", "lb", "lbs", "gram", "grams", "g", "kilogram",
        "kilograms", "kg",
    ];

    MEASUREMENT_RE
        .captures_iter(text_lower)
        .filter_map(|caps| {
            let amount: f64 = caps[1].parse().ok()?;
            let unit = caps[2].to_string();
            let kind = if WEIGHT_UNITS.contains(&unit.as_str()) {
                MeasurementKind::Weight
            } else {
                MeasurementKind::Volume
            };
            Some(Measurement {
                amount,
                unit,
                kind,
                text: caps[0].to_string(),
            })
        })
        .collect()
}

/// Extract typed timing cues. Patterns overlap on purpose: a span like
/// "cook for 10 minutes" counts as both a duration and a cooking time, which
/// matches how the mentions are averaged downstream.
pub(crate) fn extract_time_mentions(text_lower: &str) -> Vec<TimeMention> {
    let mut mentions = Vec::new();

    let mut push_numeric = |re: &Regex, kind: TimeMentionKind, to_minutes: fn(f64) -> f64| {
        for caps in re.captures_iter(text_lower) {
            if let Ok(value) = caps[1].parse::<f64>() {
                mentions.push(TimeMention {
                    kind,
                    minutes: Some(to_minutes(value)),
                    text: caps[0].to_string(),
                });
            }
        }
    };

    push_numeric(&DURATION_MIN_RE, TimeMentionKind::Duration, |v| v);
    push_numeric(&DURATION_SEC_RE, TimeMentionKind::Duration, |v| v / 60.0);
    push_numeric(&DURATION_HOUR_RE, TimeMentionKind::Duration, |v| v * 60.0);
    push_numeric(&FOR_MINUTES_RE, TimeMentionKind::CookingTime, |v| v);
    push_numeric(&COOK_FOR_RE, TimeMentionKind::CookingTime, |v| v);
    push_numeric(&BAKE_FOR_RE, TimeMentionKind::BakingTime, |v| v);
    push_numeric(&APPROX_RE, TimeMentionKind::Approximate, |v| v);

    for caps in CONDITION_RE.captures_iter(text_lower) {
        mentions.push(TimeMention {
            kind: TimeMentionKind::Condition,
            minutes: None,
            text: caps[0].to_string(),
        });
    }

    mentions
}

/// Keep sentences that score at least 2 on the cooking-relevance rubric:
/// action verb +2, ingredient +1, time unit +1, measurement +1.
pub(crate) fn extract_instruction_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| sentence.len() >= 10)
        .filter_map(|sentence| {
            let lower = sentence.to_lowercase();

            let mut score = 0;
            if vocab::contains_any(&lower, vocab::ACTION_VERBS) {
                score += 2;
            }
            if vocab::contains_any(&lower, vocab::SPOKEN_INGREDIENTS) {
                score += 1;
            }
            if vocab::contains_any(&lower, vocab::TIME_UNITS) {
                score += 1;
            }
            if MEASUREMENT_RE.is_match(&lower) {
                score += 1;
            }

            if score >= 2 {
                Some(capitalize_sentence(sentence))
            } else {
                None
            }
        })
        .take(10)
        .collect()
}

fn capitalize_sentence(sentence: &str) -> String {
    let mut chars = sentence.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    if capitalized.ends_with('.') {
        capitalized
    } else {
        format!("{}.", capitalized)
    }
}

/// Numbered instruction block, or None when nothing survived the rubric.
fn format_instructions(sentences: &[String]) -> Option<String> {
    if sentences.is_empty() {
        return None;
    }
    Some(
        sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| format!("{}. {}", i + 1, sentence))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Confidence: base 0.3, transcription and quality terms, cooking-term
/// density, 0.05 per mined category, and word-count bonuses; capped at 0.95.
fn audio_confidence(transcript: &Transcript, analysis: &TranscriptAnalysis, quality: f32) -> f32 {
    let mut score: f32 = 0.3;

    score += transcript.confidence * 0.3;
    score += quality * 0.2;
    score += (analysis.cooking_density * 2.0).min(0.2);

    if !analysis.actions.is_empty() {
        score += 0.05;
    }
    if !analysis.ingredients.is_empty() {
        score += 0.05;
    }
    if !analysis.time_mentions.is_empty() {
        score += 0.05;
    }
    if !analysis.measurements.is_empty() {
        score += 0.05;
    }
    if !analysis.instruction_sentences.is_empty() {
        score += 0.05;
    }

    let words = transcript.word_count();
    if words > 50 {
        score += 0.1;
    } else if words > 20 {
        score += 0.05;
    }

    score.min(0.95)
}
