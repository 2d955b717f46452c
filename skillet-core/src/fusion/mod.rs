//! Weighted fusion of phase results into one recipe.
//!
//! Sources carry fixed weights reflecting observed reliability: captions are
//! explicit, spoken instructions are detailed, visual cues are weakest. The
//! five field derivations are independent and each has its own fallback, so
//! a failed sub-task never blocks the others.

mod refine;

pub use refine::{EvidenceBundle, RefinementError, RefinementPass};

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;

use crate::inference::TextClassifier;
use crate::types::{
    clamp_cooking_time, Category, DataSource, Difficulty, Evidence, FusedRecipe, PhaseResult,
    TimeMention, TimeMentionKind,
};
use crate::vocab;

/// Fixed source weights.
#[derive(Debug, Clone, Copy)]
pub struct SourceWeights {
    pub text: f32,
    pub audio: f32,
    pub visual: f32,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            text: 0.60,
            audio: 0.30,
            visual: 0.10,
        }
    }
}

/// Confidence assigned to the text-only fallback recipe.
const FALLBACK_CONFIDENCE: f32 = 0.4;

/// Instructions used when no source produced any.
const GENERIC_INSTRUCTIONS: &str = "1. Prepare all ingredients as described in the recipe.\n\
     2. Follow the cooking method mentioned in the description.\n\
     3. Season and adjust to taste.\n\
     4. Serve as directed.";

/// Words a derived title must contain to be considered food-related.
const TITLE_FOOD_WORDS: &[&str] = &[
    "recipe", "dish", "sauce", "soup", "salad", "pasta", "chicken", "beef", "cake",
];

static AMOUNT_UNIT_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d+\s*(?:cups?|tbsp|tablespoons?|tsp|teaspoons?|oz|ounces?|lbs?|pounds?|grams?|ml|liters?)\s+([a-z]+)",
    )
    .unwrap()
});
static WORD_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([a-z]+)\s+(?:cups?|tbsp|tablespoons?|tsp|teaspoons?|oz|ounces?|lbs?|pounds?|grams?|ml|liters?)\b",
    )
    .unwrap()
});
static ACTION_NOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:add|use|mix|combine|stir|chop|slice|dice)\s+(?:the\s+)?([a-z]+)").unwrap()
});

/// Combines phase results into one [`FusedRecipe`].
pub struct FusionEngine {
    classifier: Arc<dyn TextClassifier>,
    weights: SourceWeights,
    inclusion_threshold: f32,
}

/// Phase results admitted into the fusion, after inclusion filtering.
struct FusionContext<'a> {
    text: &'a PhaseResult,
    audio: Option<&'a PhaseResult>,
    visual: Option<&'a PhaseResult>,
}

impl<'a> FusionContext<'a> {
    fn text_source(&self) -> &str {
        match &self.text.evidence {
            Evidence::Text { source_text } => source_text,
            _ => "",
        }
    }

    fn transcript(&self) -> &str {
        match self.audio.map(|a| &a.evidence) {
            Some(Evidence::Audio { transcript, .. }) => transcript,
            _ => "",
        }
    }

    fn ocr_text(&self) -> &str {
        match self.visual.map(|v| &v.evidence) {
            Some(Evidence::Visual { ocr_text, .. }) => ocr_text,
            _ => "",
        }
    }

    fn audio_time_mentions(&self) -> &[TimeMention] {
        match self.audio.map(|a| &a.evidence) {
            Some(Evidence::Audio { time_mentions, .. }) => time_mentions,
            _ => &[],
        }
    }

    fn audio_cooking_term_count(&self) -> u32 {
        match self.audio.map(|a| &a.evidence) {
            Some(Evidence::Audio {
                cooking_term_count, ..
            }) => *cooking_term_count,
            _ => 0,
        }
    }

    fn visual_ingredients(&self) -> &[String] {
        match self.visual.map(|v| &v.evidence) {
            Some(Evidence::Visual {
                detected_ingredients,
                ..
            }) => detected_ingredients,
            _ => &[],
        }
    }

    fn audio_instructions(&self) -> Option<&str> {
        self.audio.and_then(|a| a.fields.instructions.as_deref())
    }
}

impl FusionEngine {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self {
            classifier,
            weights: SourceWeights::default(),
            inclusion_threshold: 0.3,
        }
    }

    /// Override the inclusion threshold for audio/visual participation.
    pub fn with_inclusion_threshold(mut self, threshold: f32) -> Self {
        self.inclusion_threshold = threshold;
        self
    }

    /// Fuse the available phase results into one recipe.
    ///
    /// Text always participates; audio and visual participate only when
    /// present and above the inclusion threshold. Never returns an error:
    /// every field derivation has its own rule-based fallback.
    pub async fn fuse(
        &self,
        text: &PhaseResult,
        audio: Option<&PhaseResult>,
        visual: Option<&PhaseResult>,
    ) -> FusedRecipe {
        let ctx = FusionContext {
            text,
            audio: audio.filter(|a| a.confidence > self.inclusion_threshold),
            visual: visual.filter(|v| v.confidence > self.inclusion_threshold),
        };

        let (category, difficulty) =
            tokio::join!(self.classify_category(&ctx), self.classify_difficulty(&ctx));
        let ingredients = merge_ingredients(&ctx);
        let title = derive_title(&ctx);
        let cooking_time_minutes = derive_cooking_time(&ctx, &ingredients);

        let instructions = ctx
            .audio_instructions()
            .map(|s| s.to_string())
            .or_else(|| ctx.text.fields.instructions.clone())
            .unwrap_or_else(|| GENERIC_INSTRUCTIONS.to_string());

        let mut data_sources_used = std::collections::BTreeSet::new();
        data_sources_used.insert(DataSource::Text);
        if ctx.audio.is_some() {
            data_sources_used.insert(DataSource::Audio);
        }
        if ctx.visual.is_some() {
            data_sources_used.insert(DataSource::Visual);
        }

        let mut recipe = FusedRecipe {
            title,
            ingredients,
            category,
            cooking_time_minutes,
            difficulty,
            dietary_tags: ctx.text.fields.dietary_tags.clone(),
            instructions,
            tags: ctx.text.fields.tags.clone(),
            overall_confidence: 0.0,
            data_sources_used,
            fusion_timestamp: Utc::now(),
        };

        recipe.overall_confidence = self.overall_confidence(&ctx, &recipe);

        tracing::debug!(
            confidence = recipe.overall_confidence,
            sources = recipe.data_sources_used.len(),
            "fusion completed"
        );

        recipe
    }

    /// Recipe built from the text phase alone, used when fusion itself is
    /// unavailable (e.g. timed out). Fixed 0.4 confidence.
    pub fn text_only_fallback(text: &PhaseResult) -> FusedRecipe {
        let fields = &text.fields;
        let title = if fields.ingredients.is_empty() {
            "Delicious Recipe".to_string()
        } else {
            format!(
                "{} Recipe",
                fields
                    .ingredients
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        FusedRecipe {
            title,
            ingredients: fields.ingredients.clone(),
            category: fields.category.unwrap_or(Category::MainCourse),
            cooking_time_minutes: fields.cooking_time_minutes.unwrap_or(30),
            difficulty: fields.difficulty.unwrap_or(Difficulty::Medium),
            dietary_tags: fields.dietary_tags.clone(),
            instructions: fields
                .instructions
                .clone()
                .unwrap_or_else(|| GENERIC_INSTRUCTIONS.to_string()),
            tags: fields.tags.clone(),
            overall_confidence: FALLBACK_CONFIDENCE,
            data_sources_used: std::iter::once(DataSource::Text).collect(),
            fusion_timestamp: Utc::now(),
        }
    }

    /// Classify the category over the weighted evidence text, falling back
    /// to the text phase's value and then keyword rules.
    async fn classify_category(&self, ctx: &FusionContext<'_>) -> Category {
        let weighted = weighted_classification_text(ctx);
        if !weighted.is_empty() {
            match self.classifier.classify(&weighted, Category::LABELS).await {
                Ok(result) => {
                    if let Some(category) =
                        result.top().and_then(|(label, _)| Category::from_label(label))
                    {
                        return category;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "fusion category classification failed");
                }
            }
        }
        fallback_category(ctx)
    }

    /// Classify difficulty over a complexity summary, falling back to a
    /// score over ingredient count and cooking time.
    async fn classify_difficulty(&self, ctx: &FusionContext<'_>) -> Difficulty {
        let complexity = complexity_analysis_text(ctx);
        if !complexity.is_empty() {
            match self
                .classifier
                .classify(&complexity, Difficulty::LABELS)
                .await
            {
                Ok(result) => {
                    if let Some(difficulty) =
                        result.top().and_then(|(label, _)| Difficulty::from_label(label))
                    {
                        return difficulty;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "fusion difficulty classification failed");
                }
            }
        }
        fallback_difficulty(ctx)
    }

    /// Weighted average of participating confidences plus the fusion boost,
    /// per-source boost, and completeness bonuses; hard-capped at 0.95.
    fn overall_confidence(&self, ctx: &FusionContext<'_>, recipe: &FusedRecipe) -> f32 {
        let mut weighted = self.weights.text * ctx.text.confidence;
        let mut total_weight = self.weights.text;
        let mut source_count = 1;

        if let Some(audio) = ctx.audio {
            weighted += self.weights.audio * audio.confidence;
            total_weight += self.weights.audio;
            source_count += 1;
        }
        if let Some(visual) = ctx.visual {
            weighted += self.weights.visual * visual.confidence;
            total_weight += self.weights.visual;
            source_count += 1;
        }

        let mut score = weighted / total_weight;

        score += 0.15;
        score += (source_count as f32 * 0.05).min(0.15);

        if recipe.title.len() > 5 {
            score += 0.05;
        }
        if recipe.ingredients.len() >= 3 {
            score += 0.05;
        }
        // Category and cooking time are always populated after fusion, so
        // these bonuses effectively always apply; the formula is kept in its
        // observed shape rather than normalized.
        score += 0.03;
        if recipe.cooking_time_minutes > 0 {
            score += 0.02;
        }

        score.min(0.95)
    }
}

/// Weighted concatenation handed to the classifier: text evidence repeated
/// three times, transcript once, OCR truncated, total capped at 500 chars.
fn weighted_classification_text(ctx: &FusionContext<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    let source = ctx.text_source();
    if !source.is_empty() {
        parts.extend([source; 3]);
    }

    let transcript = ctx.transcript();
    if !transcript.is_empty() {
        parts.push(transcript);
    }

    let ocr = ctx.ocr_text();
    let ocr_trimmed: String;
    if !ocr.is_empty() {
        ocr_trimmed = ocr.chars().take(100).collect();
        parts.push(&ocr_trimmed);
    }

    parts.join(" ").chars().take(500).collect()
}

/// Complexity summary for difficulty classification; text evidence carries
/// double weight.
fn complexity_analysis_text(ctx: &FusionContext<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();

    let fields = &ctx.text.fields;
    if !fields.ingredients.is_empty() || fields.instructions.is_some() {
        let summary = format!(
            "Number of ingredients: {}. Instructions: {}. Ingredient list: {}",
            fields.ingredients.len(),
            fields
                .instructions
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(200)
                .collect::<String>(),
            fields
                .ingredients
                .iter()
                .take(8)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        );
        parts.push(summary.clone());
        parts.push(summary);
    }

    if let Some(instructions) = ctx.audio_instructions() {
        parts.push(format!(
            "Spoken instructions: {}. Cooking techniques mentioned: {}",
            instructions.chars().take(150).collect::<String>(),
            ctx.audio_cooking_term_count(),
        ));
    }

    parts.join(". ").chars().take(400).collect()
}

/// Title from the prioritized evidence texts, then the ingredient fallback.
fn derive_title(ctx: &FusionContext<'_>) -> String {
    for candidate in [ctx.text_source(), ctx.transcript(), ctx.ocr_text()] {
        if let Some(title) = title_from_text(candidate) {
            return title;
        }
    }

    let ingredients = &ctx.text.fields.ingredients;
    if !ingredients.is_empty() {
        return format!(
            "{} Recipe",
            ingredients
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    "Delicious Recipe".to_string()
}

/// First food-related sentence of usable title length.
fn title_from_text(text: &str) -> Option<String> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            len > 5 && len < 80 && vocab::contains_any(&line.to_lowercase(), TITLE_FOOD_WORDS)
        })
        .map(|line| line.to_string())
}

/// Explicit text time, else the average of audio time mentions, else a
/// default scaled by ingredient count. Always clamped.
fn derive_cooking_time(ctx: &FusionContext<'_>, merged_ingredients: &[String]) -> u32 {
    if let Some(time) = ctx.text.fields.cooking_time_minutes {
        if (5..=240).contains(&time) {
            return time;
        }
    }

    let audio_minutes: Vec<f64> = ctx
        .audio_time_mentions()
        .iter()
        .filter(|mention| mention.kind != TimeMentionKind::Condition)
        .filter_map(|mention| mention.minutes)
        .collect();
    if !audio_minutes.is_empty() {
        let avg = audio_minutes.iter().sum::<f64>() / audio_minutes.len() as f64;
        if (5.0..=240.0).contains(&avg) {
            return clamp_cooking_time(avg.round() as i64);
        }
    }

    let default = if merged_ingredients.len() > 8 {
        45
    } else if merged_ingredients.len() > 5 {
        35
    } else {
        25
    };
    clamp_cooking_time(default)
}

/// Union of ingredients: text first, then audio-derived, then visual;
/// case-insensitive word-overlap dedup, capped.
fn merge_ingredients(ctx: &FusionContext<'_>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();

    for ingredient in &ctx.text.fields.ingredients {
        push_unless_similar(&mut merged, ingredient);
    }
    for ingredient in audio_ingredients_from_transcript(ctx.transcript()) {
        push_unless_similar(&mut merged, &ingredient);
    }
    for ingredient in ctx.visual_ingredients() {
        push_unless_similar(&mut merged, ingredient);
    }

    merged.truncate(vocab::MAX_INGREDIENTS);
    merged
}

fn push_unless_similar(merged: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim().to_lowercase();
    if candidate.is_empty() {
        return;
    }
    if !merged.iter().any(|existing| ingredients_similar(existing, &candidate)) {
        merged.push(candidate);
    }
}

/// Two ingredient names are similar when they share any word.
fn ingredients_similar(a: &str, b: &str) -> bool {
    a.split_whitespace()
        .any(|word_a| b.split_whitespace().any(|word_b| word_a == word_b))
}

/// Simple ingredient mining over a transcript: measured nouns and objects of
/// cooking verbs.
fn audio_ingredients_from_transcript(transcript: &str) -> Vec<String> {
    let text_lower = transcript.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    let mut push = |word: &str| {
        if word.len() > 2
            && word.chars().all(|c| c.is_alphabetic())
            && !found.iter().any(|f| f == word)
        {
            found.push(word.to_string());
        }
    };

    for caps in AMOUNT_UNIT_WORD_RE.captures_iter(&text_lower) {
        push(&caps[1]);
    }
    for caps in WORD_UNIT_RE.captures_iter(&text_lower) {
        push(&caps[1]);
    }
    for caps in ACTION_NOUN_RE.captures_iter(&text_lower) {
        push(&caps[1]);
    }

    found.truncate(10);
    found
}

/// Keyword category fallback used by fusion; the lists differ from the text
/// extractor's own fallback on purpose.
fn fallback_category(ctx: &FusionContext<'_>) -> Category {
    if let Some(category) = ctx.text.fields.category {
        return category;
    }

    let combined = format!("{} {}", ctx.text_source(), ctx.transcript()).to_lowercase();
    if vocab::contains_any(&combined, &["dessert", "sweet", "cake", "cookie"]) {
        Category::Desserts
    } else if vocab::contains_any(&combined, &["drink", "smoothie", "juice"]) {
        Category::Beverages
    } else if vocab::contains_any(&combined, &["salad", "greens"]) {
        Category::Salads
    } else if vocab::contains_any(&combined, &["breakfast", "morning"]) {
        Category::Breakfast
    } else {
        Category::MainCourse
    }
}

/// Score-based difficulty fallback; bands differ from the text extractor's.
fn fallback_difficulty(ctx: &FusionContext<'_>) -> Difficulty {
    let mut score = 0;

    let ingredient_count = ctx
        .text
        .fields
        .ingredients
        .len()
        .max(ctx.visual_ingredients().len());
    if ingredient_count > 10 {
        score += 2;
    } else if ingredient_count > 6 {
        score += 1;
    }

    let cooking_time = ctx.text.fields.cooking_time_minutes.unwrap_or(0);
    if cooking_time > 60 {
        score += 2;
    } else if cooking_time > 30 {
        score += 1;
    }

    if score >= 3 {
        Difficulty::Hard
    } else if score >= 1 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::FakeClassifier;
    use crate::types::{Phase, PhaseStatus, RecipeFields};

    fn text_result(confidence: f32) -> PhaseResult {
        PhaseResult {
            phase: Phase::Text,
            status: PhaseStatus::Completed,
            fields: RecipeFields {
                ingredients: vec![
                    "tomato".to_string(),
                    "garlic".to_string(),
                    "basil".to_string(),
                ],
                category: Some(Category::MainCourse),
                cooking_time_minutes: Some(20),
                difficulty: Some(Difficulty::Easy),
                dietary_tags: std::iter::once(crate::types::DietaryTag::Vegan).collect(),
                instructions: Some("1. Cook the pasta.".to_string()),
                tags: vec!["main-course".to_string()],
            },
            confidence,
            evidence: Evidence::Text {
                source_text: "Fresh tomato pasta recipe with garlic and basil".to_string(),
            },
        }
    }

    fn audio_result(confidence: f32) -> PhaseResult {
        PhaseResult {
            phase: Phase::Audio,
            status: PhaseStatus::Completed,
            fields: RecipeFields {
                instructions: Some("1. Add 2 cups flour and stir.".to_string()),
                ..RecipeFields::default()
            },
            confidence,
            evidence: Evidence::Audio {
                transcript: "add 2 cups flour then stir the onion for 15 minutes".to_string(),
                transcription_confidence: 0.8,
                quality_score: 0.8,
                actions: vec!["add".to_string(), "stir".to_string()],
                mentioned_ingredients: vec!["flour".to_string()],
                measurements: vec![],
                time_mentions: vec![TimeMention {
                    kind: TimeMentionKind::Duration,
                    minutes: Some(15.0),
                    text: "15 minutes".to_string(),
                }],
                instruction_sentences: vec!["Add 2 cups flour and stir.".to_string()],
                cooking_term_count: 4,
            },
        }
    }

    fn engine() -> FusionEngine {
        FusionEngine::new(Arc::new(
            FakeClassifier::new()
                .with_rule("pasta", "Main Course", 0.9)
                .with_rule("ingredients", "Easy", 0.8),
        ))
    }

    #[tokio::test]
    async fn text_only_fusion_uses_text_fields() {
        let text = text_result(0.6);
        let recipe = engine().fuse(&text, None, None).await;

        assert_eq!(recipe.category, Category::MainCourse);
        assert_eq!(recipe.cooking_time_minutes, 20);
        assert_eq!(recipe.ingredients[..3].len(), 3);
        assert_eq!(
            recipe.data_sources_used,
            std::iter::once(DataSource::Text).collect()
        );
        assert!(recipe.dietary_tags.contains(&crate::types::DietaryTag::Vegan));
    }

    #[tokio::test]
    async fn text_only_confidence_is_text_plus_fixed_boosts() {
        let text = text_result(0.6);
        let recipe = engine().fuse(&text, None, None).await;

        // 0.6 + 0.15 fusion boost + 0.05 one source + 0.05 title
        // + 0.05 ingredients + 0.03 category + 0.02 time
        let expected: f32 = 0.6 + 0.15 + 0.05 + 0.05 + 0.05 + 0.03 + 0.02;
        assert!((recipe.overall_confidence - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn fusion_is_deterministic_excluding_timestamp() {
        let text = text_result(0.6);
        let audio = audio_result(0.7);
        let engine = engine();

        let mut a = engine.fuse(&text, Some(&audio), None).await;
        let mut b = engine.fuse(&text, Some(&audio), None).await;
        a.fusion_timestamp = b.fusion_timestamp;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn low_confidence_audio_is_excluded() {
        let text = text_result(0.6);
        let audio = audio_result(0.2);
        let recipe = engine().fuse(&text, Some(&audio), None).await;

        assert!(!recipe.data_sources_used.contains(&DataSource::Audio));
        // Audio instructions must not leak in either.
        assert_eq!(recipe.instructions, "1. Cook the pasta.");
    }

    #[tokio::test]
    async fn participating_audio_contributes_instructions_and_ingredients() {
        let text = text_result(0.6);
        let audio = audio_result(0.7);
        let recipe = engine().fuse(&text, Some(&audio), None).await;

        assert!(recipe.data_sources_used.contains(&DataSource::Audio));
        assert_eq!(recipe.instructions, "1. Add 2 cups flour and stir.");
        // "flour" arrives via the measured-noun pattern, "onion" via the
        // action-object pattern.
        assert!(recipe.ingredients.contains(&"flour".to_string()));
        assert!(recipe.ingredients.contains(&"onion".to_string()));
        // Text ingredients keep their leading position.
        assert_eq!(recipe.ingredients[0], "tomato");
    }

    #[tokio::test]
    async fn audio_time_average_is_used_when_text_has_none() {
        let mut text = text_result(0.6);
        text.fields.cooking_time_minutes = None;
        let audio = audio_result(0.7);
        let recipe = engine().fuse(&text, Some(&audio), None).await;

        assert_eq!(recipe.cooking_time_minutes, 15);
    }

    #[tokio::test]
    async fn complexity_default_applies_without_any_time_evidence() {
        let mut text = text_result(0.6);
        text.fields.cooking_time_minutes = None;
        let recipe = engine().fuse(&text, None, None).await;

        // Three merged ingredients fall in the smallest band.
        assert_eq!(recipe.cooking_time_minutes, 25);
    }

    #[tokio::test]
    async fn classifier_failure_falls_back_to_text_category() {
        let text = text_result(0.6);
        let engine = FusionEngine::new(Arc::new(FakeClassifier::failing()));
        let recipe = engine.fuse(&text, None, None).await;

        assert_eq!(recipe.category, Category::MainCourse);
    }

    #[tokio::test]
    async fn confidence_never_exceeds_cap() {
        let text = text_result(0.9);
        let audio = audio_result(0.95);
        let recipe = engine().fuse(&text, Some(&audio), None).await;

        assert!(recipe.overall_confidence <= 0.95);
    }

    #[test]
    fn text_only_fallback_has_fixed_confidence() {
        let text = text_result(0.6);
        let recipe = FusionEngine::text_only_fallback(&text);

        assert!((recipe.overall_confidence - 0.4).abs() < f32::EPSILON);
        assert_eq!(
            recipe.data_sources_used,
            std::iter::once(DataSource::Text).collect()
        );
        assert_eq!(recipe.title, "tomato, garlic, basil Recipe");
    }

    #[test]
    fn title_prefers_food_sentences_of_usable_length() {
        assert_eq!(
            title_from_text("Hi all! Fresh tomato pasta recipe with garlic. Enjoy"),
            Some("Fresh tomato pasta recipe with garlic".to_string())
        );
        assert_eq!(title_from_text("ok"), None);
        assert_eq!(title_from_text("a completely unrelated sentence"), None);
    }

    #[test]
    fn ingredient_similarity_merges_overlapping_names() {
        let mut merged = vec!["olive oil".to_string()];
        push_unless_similar(&mut merged, "Oil");
        push_unless_similar(&mut merged, "garlic");
        assert_eq!(merged, vec!["olive oil".to_string(), "garlic".to_string()]);
    }

    #[test]
    fn weighted_text_repeats_text_evidence() {
        let text = text_result(0.6);
        let ctx = FusionContext {
            text: &text,
            audio: None,
            visual: None,
        };
        let weighted = weighted_classification_text(&ctx);
        assert!(weighted.len() <= 500);
        assert_eq!(weighted.matches("tomato pasta recipe").count(), 3);
    }
}
