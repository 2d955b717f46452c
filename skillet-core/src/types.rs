use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable input for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub source_url: String,
    pub enable_visual: bool,
    pub enable_audio: bool,
    /// Processing budget for the whole run, in seconds.
    pub max_processing_secs: u64,
}

impl ExtractionRequest {
    /// Request with both optional phases enabled and the default 30s budget.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            enable_visual: true,
            enable_audio: true,
            max_processing_secs: 30,
        }
    }
}

/// Extraction phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Text,
    Visual,
    Audio,
}

impl Phase {
    /// Numeric phase id used in progress payloads.
    pub fn id(&self) -> u8 {
        match self {
            Phase::Text => 1,
            Phase::Visual => 2,
            Phase::Audio => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Text => "text",
            Phase::Visual => "visual",
            Phase::Audio => "audio",
        }
    }
}

/// Status of a phase or of the run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Fixed recipe category label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MainCourse,
    Desserts,
    Starters,
    Beverages,
    Snacks,
    Breakfast,
    Salads,
    SideDishes,
}

impl Category {
    /// Candidate labels in the order handed to the zero-shot classifier.
    pub const LABELS: &'static [&'static str] = &[
        "Main Course",
        "Desserts",
        "Starters",
        "Beverages",
        "Snacks",
        "Breakfast",
        "Salads",
        "Side Dishes",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MainCourse => "Main Course",
            Category::Desserts => "Desserts",
            Category::Starters => "Starters",
            Category::Beverages => "Beverages",
            Category::Snacks => "Snacks",
            Category::Breakfast => "Breakfast",
            Category::Salads => "Salads",
            Category::SideDishes => "Side Dishes",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Main Course" => Some(Category::MainCourse),
            "Desserts" => Some(Category::Desserts),
            "Starters" => Some(Category::Starters),
            "Beverages" => Some(Category::Beverages),
            "Snacks" => Some(Category::Snacks),
            "Breakfast" => Some(Category::Breakfast),
            "Salads" => Some(Category::Salads),
            "Side Dishes" => Some(Category::SideDishes),
            _ => None,
        }
    }
}

/// Recipe difficulty bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const LABELS: &'static [&'static str] = &["Easy", "Medium", "Hard"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Dietary tags derived from text evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryTag {
    Vegan,
    Vegetarian,
    GlutenFree,
    DairyFree,
    NutFree,
    Keto,
    Paleo,
}

/// A data source that contributed to the fused recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Text,
    Audio,
    Visual,
}

/// Partial recipe produced by a single phase. Every field is optional or
/// empty-able; a failed phase carries the default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub dietary_tags: BTreeSet<DietaryTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub tags: Vec<String>,
}

/// A `<number> <unit>` pair mined from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub amount: f64,
    pub unit: String,
    pub kind: MeasurementKind,
    /// Matched span, kept for debugging.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Volume,
    Weight,
}

/// A timing cue mined from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMention {
    pub kind: TimeMentionKind,
    /// Normalized minutes; absent for condition cues ("until golden").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMentionKind {
    Duration,
    CookingTime,
    BakingTime,
    Approximate,
    Condition,
}

/// Per-frame stats kept as visual evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub index: u32,
    pub labels_detected: u32,
    pub ocr_chars: u32,
}

/// Source-specific side data retained for fusion and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Evidence {
    Text {
        source_text: String,
    },
    Visual {
        detected_ingredients: Vec<String>,
        ocr_text: String,
        frames_processed: u32,
        frame_summaries: Vec<FrameSummary>,
    },
    Audio {
        transcript: String,
        transcription_confidence: f32,
        quality_score: f32,
        actions: Vec<String>,
        mentioned_ingredients: Vec<String>,
        measurements: Vec<Measurement>,
        time_mentions: Vec<TimeMention>,
        instruction_sentences: Vec<String>,
        cooking_term_count: u32,
    },
}

impl Evidence {
    /// Empty evidence of the right shape for a failed phase.
    pub fn empty(phase: Phase) -> Self {
        match phase {
            Phase::Text => Evidence::Text {
                source_text: String::new(),
            },
            Phase::Visual => Evidence::Visual {
                detected_ingredients: Vec::new(),
                ocr_text: String::new(),
                frames_processed: 0,
                frame_summaries: Vec::new(),
            },
            Phase::Audio => Evidence::Audio {
                transcript: String::new(),
                transcription_confidence: 0.0,
                quality_score: 0.0,
                actions: Vec::new(),
                mentioned_ingredients: Vec::new(),
                measurements: Vec::new(),
                time_mentions: Vec::new(),
                instruction_sentences: Vec::new(),
                cooking_term_count: 0,
            },
        }
    }
}

/// Uniform output contract of every extractor.
///
/// A failed result still carries valid (possibly empty) fields and a low
/// confidence; extractors never propagate errors to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub fields: RecipeFields,
    pub confidence: f32,
    pub evidence: Evidence,
}

impl PhaseResult {
    /// A failed result for the given phase with empty fields.
    pub fn failed(phase: Phase, confidence: f32) -> Self {
        Self {
            phase,
            status: PhaseStatus::Failed,
            fields: RecipeFields::default(),
            confidence,
            evidence: Evidence::empty(phase),
        }
    }
}

/// Terminal output of a pipeline run. Every field has a value; immutable
/// after creation and the only artifact handed downstream for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub category: Category,
    pub cooking_time_minutes: u32,
    pub difficulty: Difficulty,
    pub dietary_tags: BTreeSet<DietaryTag>,
    pub instructions: String,
    pub tags: Vec<String>,
    pub overall_confidence: f32,
    pub data_sources_used: BTreeSet<DataSource>,
    pub fusion_timestamp: DateTime<Utc>,
}

/// Clamp a cooking time into the supported range.
pub fn clamp_cooking_time(minutes: i64) -> u32 {
    minutes.clamp(MIN_COOKING_TIME_MINUTES as i64, MAX_COOKING_TIME_MINUTES as i64) as u32
}

pub const MIN_COOKING_TIME_MINUTES: u32 = 5;
pub const MAX_COOKING_TIME_MINUTES: u32 = 240;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for label in Category::LABELS {
            let category = Category::from_label(label).unwrap();
            assert_eq!(category.as_str(), *label);
        }
    }

    #[test]
    fn cooking_time_is_clamped_to_range() {
        assert_eq!(clamp_cooking_time(0), 5);
        assert_eq!(clamp_cooking_time(10), 10);
        assert_eq!(clamp_cooking_time(1000), 240);
        assert_eq!(clamp_cooking_time(-3), 5);
    }

    #[test]
    fn failed_result_has_empty_fields() {
        let result = PhaseResult::failed(Phase::Audio, 0.1);
        assert_eq!(result.status, PhaseStatus::Failed);
        assert!(result.fields.ingredients.is_empty());
        assert!(result.confidence < 0.2);
        assert!(matches!(result.evidence, Evidence::Audio { .. }));
    }
}
