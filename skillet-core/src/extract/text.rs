//! Text phase: derives a draft recipe from caption and description alone.
//!
//! This phase always runs first and never fails; every model-backed step has
//! a rule-based fallback.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::inference::TextClassifier;
use crate::types::{
    clamp_cooking_time, Category, DietaryTag, Difficulty, Evidence, Phase, PhaseResult,
    PhaseStatus, RecipeFields,
};
use crate::vocab;

static RANGE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*-\s*(\d+)\s*(minutes?|mins?|hours?|hrs?)").unwrap()
});
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[-\s]*(minutes?|mins?)\b").unwrap());
static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[-\s]*(hours?|hrs?)\b").unwrap());
static COOK_FOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:cook|bake)\s+for\s+(\d+)").unwrap());
static NUMBERED_STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s*([^.]+\.)").unwrap());

/// Keywords that mark a sentence as an instruction when no numbered steps
/// are present.
const INSTRUCTION_KEYWORDS: &[&str] = &[
    "heat", "cook", "add", "mix", "stir", "bake", "fry", "boil", "season",
];

/// Text-based recipe extractor.
pub struct TextExtractor {
    classifier: Arc<dyn TextClassifier>,
}

impl TextExtractor {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }

    /// Extract a draft recipe from the description and caption.
    ///
    /// Never fails: classifier errors fall back to keyword heuristics with a
    /// confidence penalty.
    pub async fn extract(&self, description: &str, caption: &str) -> PhaseResult {
        let combined = format!("{} {}", description, caption).trim().to_string();
        let text_lower = combined.to_lowercase();

        let ingredients = vocab::find_ingredients(&combined);
        let (category, classifier_fell_back) = self.categorize(&combined).await;
        let cooking_time = estimate_cooking_time(&text_lower);
        let difficulty = determine_difficulty(ingredients.len(), cooking_time, &text_lower);
        let dietary_tags = infer_dietary_tags(&text_lower);
        let tags = generate_tags(&ingredients, category, &text_lower);
        let instructions = draft_instructions(&combined);

        let confidence = text_confidence(&combined, ingredients.len(), classifier_fell_back);

        PhaseResult {
            phase: Phase::Text,
            status: PhaseStatus::Completed,
            fields: RecipeFields {
                ingredients,
                category: Some(category),
                cooking_time_minutes: Some(cooking_time),
                difficulty: Some(difficulty),
                dietary_tags,
                instructions,
                tags,
            },
            confidence,
            evidence: Evidence::Text {
                source_text: combined,
            },
        }
    }

    /// Classify the category, falling back to keyword rules. Returns the
    /// category and whether the fallback path was taken.
    async fn categorize(&self, text: &str) -> (Category, bool) {
        let snippet: String = text.chars().take(500).collect();
        match self.classifier.classify(&snippet, Category::LABELS).await {
            Ok(classification) => match classification.top().and_then(|(l, _)| Category::from_label(l)) {
                Some(category) => (category, false),
                None => (keyword_category(&text.to_lowercase()), true),
            },
            Err(e) => {
                tracing::warn!(error = %e, "category classifier unavailable, using keyword fallback");
                (keyword_category(&text.to_lowercase()), true)
            }
        }
    }
}

/// Keyword-based category fallback used when the classifier is unavailable.
fn keyword_category(text_lower: &str) -> Category {
    if vocab::contains_any(text_lower, &["cake", "sweet", "dessert", "cookie", "chocolate"]) {
        Category::Desserts
    } else if vocab::contains_any(text_lower, &["smoothie", "juice", "drink", "latte", "cocktail"])
    {
        Category::Beverages
    } else if text_lower.contains("salad") {
        Category::Salads
    } else if vocab::contains_any(text_lower, &["breakfast", "brunch", "pancake", "oatmeal"]) {
        Category::Breakfast
    } else if text_lower.contains("snack") {
        Category::Snacks
    } else if vocab::contains_any(text_lower, &["appetizer", "starter", "soup"]) {
        Category::Starters
    } else if text_lower.contains("side dish") {
        Category::SideDishes
    } else {
        Category::MainCourse
    }
}

/// Parse an explicit time mention, taking the upper bound of ranges.
fn parse_explicit_time(text_lower: &str) -> Option<i64> {
    if let Some(caps) = RANGE_TIME_RE.captures(text_lower) {
        let upper: i64 = caps[2].parse().ok()?;
        let unit = &caps[3];
        return Some(if unit.starts_with('h') { upper * 60 } else { upper });
    }
    if let Some(caps) = MINUTES_RE.captures(text_lower) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = HOURS_RE.captures(text_lower) {
        let hours: i64 = caps[1].parse().ok()?;
        return Some(hours * 60);
    }
    // Bare "cook for N" mentions default to minutes.
    if let Some(caps) = COOK_FOR_RE.captures(text_lower) {
        return caps[1].parse().ok();
    }
    None
}

/// Estimate cooking time from text. Explicit mentions win; otherwise a base
/// estimate is adjusted per detected ingredient and textual cue.
fn estimate_cooking_time(text_lower: &str) -> u32 {
    if let Some(explicit) = parse_explicit_time(text_lower) {
        return clamp_cooking_time(explicit);
    }

    let mut minutes: i64 = 20;
    for (ingredient, added) in vocab::INGREDIENT_TIME_ADJUSTMENTS {
        if text_lower.contains(ingredient) {
            minutes += added;
        }
    }
    for (cue, adjustment) in vocab::TIME_CUE_ADJUSTMENTS {
        if text_lower.contains(cue) {
            minutes += adjustment;
        }
    }

    clamp_cooking_time(minutes)
}

/// Score-banded difficulty: ingredient count, cooking time, techniques, and
/// equipment each contribute.
fn determine_difficulty(ingredient_count: usize, cooking_time: u32, text_lower: &str) -> Difficulty {
    let mut score = 0;

    if ingredient_count > 12 {
        score += 3;
    } else if ingredient_count > 8 {
        score += 2;
    } else if ingredient_count > 5 {
        score += 1;
    }

    if cooking_time > 120 {
        score += 3;
    } else if cooking_time > 60 {
        score += 2;
    } else if cooking_time > 30 {
        score += 1;
    }

    for technique in vocab::ADVANCED_TECHNIQUES {
        if text_lower.contains(technique) {
            score += 2;
        }
    }

    if vocab::contains_any(text_lower, vocab::COMPLEX_EQUIPMENT) {
        score += 1;
    }

    if score >= 6 {
        Difficulty::Hard
    } else if score >= 3 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// Dietary tags by negative inference over ingredient keyword sets, plus
/// explicit phrase matches.
fn infer_dietary_tags(text_lower: &str) -> BTreeSet<DietaryTag> {
    let mut tags = BTreeSet::new();
    if text_lower.trim().is_empty() {
        return tags;
    }

    let has_meat = vocab::contains_any(text_lower, vocab::MEAT_KEYWORDS);
    let has_dairy = vocab::contains_any(text_lower, vocab::DAIRY_KEYWORDS);
    let has_eggs = vocab::contains_any(text_lower, vocab::EGG_KEYWORDS);
    let has_gluten = vocab::contains_any(text_lower, vocab::GLUTEN_KEYWORDS);
    let has_nuts = vocab::contains_any(text_lower, vocab::NUT_KEYWORDS);

    if (!has_meat && !has_dairy && !has_eggs)
        || vocab::contains_any(text_lower, vocab::VEGAN_PHRASES)
    {
        tags.insert(DietaryTag::Vegan);
    }
    if !has_meat || vocab::contains_any(text_lower, vocab::VEGETARIAN_PHRASES) {
        tags.insert(DietaryTag::Vegetarian);
    }
    if !has_gluten || vocab::contains_any(text_lower, vocab::GLUTEN_FREE_PHRASES) {
        tags.insert(DietaryTag::GlutenFree);
    }
    if !has_dairy || vocab::contains_any(text_lower, vocab::DAIRY_FREE_PHRASES) {
        tags.insert(DietaryTag::DairyFree);
    }
    if !has_nuts || vocab::contains_any(text_lower, vocab::NUT_FREE_PHRASES) {
        tags.insert(DietaryTag::NutFree);
    }
    if vocab::contains_any(text_lower, vocab::KETO_PHRASES) {
        tags.insert(DietaryTag::Keto);
    }
    if vocab::contains_any(text_lower, vocab::PALEO_PHRASES) {
        tags.insert(DietaryTag::Paleo);
    }

    tags
}

/// Generate descriptive tags: category, top ingredients, cooking methods,
/// cuisines, and meal timing. Deduplicated in insertion order, capped at 10.
fn generate_tags(ingredients: &[String], category: Category, text_lower: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String, tags: &mut Vec<String>| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    push(
        category.as_str().to_lowercase().replace(' ', "-"),
        &mut tags,
    );

    for ingredient in ingredients.iter().take(4) {
        if ingredient.len() > 2 {
            push(ingredient.replace(' ', "-"), &mut tags);
        }
    }

    for (method, keywords) in vocab::COOKING_METHODS {
        if vocab::contains_any(text_lower, keywords) {
            push((*method).to_string(), &mut tags);
        }
    }

    for (cuisine, keywords) in vocab::CUISINES {
        if vocab::contains_any(text_lower, keywords) {
            push((*cuisine).to_string(), &mut tags);
        }
    }

    if vocab::contains_any(text_lower, &["breakfast", "brunch"]) {
        push("breakfast".to_string(), &mut tags);
    } else if vocab::contains_any(text_lower, &["lunch", "dinner", "supper"]) {
        push("dinner".to_string(), &mut tags);
    }

    tags.truncate(10);
    tags
}

/// Draft instructions: numbered steps if present, else instruction-keyword
/// sentences, else a generic outline.
fn draft_instructions(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let steps: Vec<String> = NUMBERED_STEP_RE
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect();
    if !steps.is_empty() {
        return Some(
            steps
                .iter()
                .enumerate()
                .map(|(i, step)| format!("{}. {}", i + 1, step))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let instruction_sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            !sentence.is_empty() && INSTRUCTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .take(6)
        .collect();
    if !instruction_sentences.is_empty() {
        return Some(
            instruction_sentences
                .iter()
                .enumerate()
                .map(|(i, sentence)| format!("{}. {}.", i + 1, sentence))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    Some(
        "1. Prepare all ingredients as described in the recipe.\n\
         2. Follow the cooking method mentioned in the description.\n\
         3. Season and adjust to taste.\n\
         4. Serve as directed."
            .to_string(),
    )
}

/// Confidence: base 0.5 plus text-length, ingredient-count, and
/// cooking-keyword boosts; penalized when the classifier fell back;
/// capped at 0.9.
fn text_confidence(text: &str, ingredient_count: usize, classifier_fell_back: bool) -> f32 {
    let mut score: f32 = 0.5;

    if text.len() > 100 {
        score += 0.1;
    }
    if text.len() > 300 {
        score += 0.1;
    }
    if ingredient_count >= 3 {
        score += 0.1;
    }
    if ingredient_count >= 6 {
        score += 0.1;
    }
    if vocab::contains_any(&text.to_lowercase(), vocab::COOKING_WORDS) {
        score += 0.1;
    }
    if classifier_fell_back {
        score -= 0.1;
    }

    score.clamp(0.0, 0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::FakeClassifier;

    fn extractor_with_rule(contains: &str, label: &str) -> TextExtractor {
        TextExtractor::new(Arc::new(
            FakeClassifier::new().with_rule(contains, label, 0.8),
        ))
    }

    #[tokio::test]
    async fn vegan_pasta_caption_extracts_expected_fields() {
        let extractor = extractor_with_rule("pasta", "Main Course");
        let result = extractor
            .extract("", "Quick 10-minute vegan pasta with tomatoes, garlic, basil")
            .await;

        assert_eq!(result.status, PhaseStatus::Completed);
        let ingredients = &result.fields.ingredients;
        assert!(ingredients.contains(&"tomato".to_string()));
        assert!(ingredients.contains(&"garlic".to_string()));
        assert!(ingredients.contains(&"basil".to_string()));
        assert_eq!(result.fields.category, Some(Category::MainCourse));
        assert_eq!(result.fields.cooking_time_minutes, Some(10));
        assert!(result.fields.dietary_tags.contains(&DietaryTag::Vegan));
        assert!(result.confidence >= 0.5);
    }

    #[tokio::test]
    async fn classifier_failure_falls_back_to_keywords_with_penalty() {
        let failing = TextExtractor::new(Arc::new(FakeClassifier::failing()));
        let working = extractor_with_rule("cake", "Desserts");

        let caption = "Rich chocolate cake with cream and sugar";
        let degraded = failing.extract("", caption).await;
        let normal = working.extract("", caption).await;

        assert_eq!(degraded.fields.category, Some(Category::Desserts));
        assert_eq!(degraded.status, PhaseStatus::Completed);
        assert!(degraded.confidence < normal.confidence);
    }

    #[tokio::test]
    async fn empty_text_yields_empty_low_signal_result() {
        let extractor = TextExtractor::new(Arc::new(FakeClassifier::failing()));
        let result = extractor.extract("", "").await;

        assert_eq!(result.status, PhaseStatus::Completed);
        assert!(result.fields.ingredients.is_empty());
        assert!(result.fields.dietary_tags.is_empty());
        assert!(result.fields.instructions.is_none());
        assert!(result.confidence <= 0.5);
    }

    #[test]
    fn explicit_time_beats_heuristics() {
        assert_eq!(estimate_cooking_time("ready in 45 minutes"), 45);
        assert_eq!(estimate_cooking_time("bake for 35 until done"), 35);
        assert_eq!(estimate_cooking_time("slow cook for 2 hours"), 120);
        assert_eq!(estimate_cooking_time("cook 20-25 minutes"), 25);
    }

    #[test]
    fn heuristic_time_adjusts_for_cues_and_clamps() {
        // base 20, pasta +15, quick -10
        assert_eq!(estimate_cooking_time("quick pasta dinner"), 25);
        // base 20, instant -15, quick... "instant" only
        assert_eq!(estimate_cooking_time("instant noodle-free snack"), 5);
        let long = estimate_cooking_time("slow braise then roast the beef");
        assert!(long <= 240);
    }

    #[test]
    fn difficulty_bands() {
        assert_eq!(determine_difficulty(2, 15, "simple toast"), Difficulty::Easy);
        assert_eq!(
            determine_difficulty(9, 70, "weekend project"),
            Difficulty::Medium
        );
        assert_eq!(
            determine_difficulty(13, 130, "sous vide then ferment"),
            Difficulty::Hard
        );
    }

    #[test]
    fn dietary_negative_inference() {
        let tags = infer_dietary_tags("tomato and basil soup");
        assert!(tags.contains(&DietaryTag::Vegan));
        assert!(tags.contains(&DietaryTag::Vegetarian));
        assert!(tags.contains(&DietaryTag::GlutenFree));

        let tags = infer_dietary_tags("chicken alfredo with cream and pasta");
        assert!(!tags.contains(&DietaryTag::Vegan));
        assert!(!tags.contains(&DietaryTag::Vegetarian));
        assert!(!tags.contains(&DietaryTag::GlutenFree));

        let tags = infer_dietary_tags("keto beef bowl");
        assert!(tags.contains(&DietaryTag::Keto));
    }

    #[test]
    fn numbered_steps_are_renumbered() {
        let text = "Great dish. 1. Chop the onions. 2. Fry them gently.";
        let instructions = draft_instructions(text).unwrap();
        assert!(instructions.starts_with("1. Chop the onions."));
        assert!(instructions.contains("2. Fry them gently."));
    }

    #[test]
    fn tags_include_category_and_ingredients() {
        let tags = generate_tags(
            &["tomato".to_string(), "garlic".to_string()],
            Category::MainCourse,
            "baked italian pasta dinner",
        );
        assert!(tags.contains(&"main-course".to_string()));
        assert!(tags.contains(&"tomato".to_string()));
        assert!(tags.contains(&"baked".to_string()));
        assert!(tags.contains(&"italian".to_string()));
        assert!(tags.contains(&"dinner".to_string()));
        assert!(tags.len() <= 10);
    }

    #[test]
    fn confidence_is_capped_at_point_nine() {
        let long_text = format!(
            "recipe {}",
            "tomato garlic basil chicken rice onion pepper ".repeat(20)
        );
        assert!(text_confidence(&long_text, 8, false) <= 0.9);
    }
}
