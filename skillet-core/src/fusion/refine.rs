//! Optional refinement pass over the fused recipe.
//!
//! A high-capability text model is given the complete multi-phase evidence
//! bundle and asked to re-derive a cleaner structured recipe. The pass is
//! strictly additive: any failure leaves the fusion result standing.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::llm::{LlmError, LlmProvider};
use crate::types::{
    clamp_cooking_time, Category, Difficulty, Evidence, FusedRecipe, PhaseResult,
};
use crate::vocab;

/// Placeholder description injected by source resolvers when a post has no
/// real caption; skipped when assembling evidence.
const PLACEHOLDER_MARKER: &str = "A recipe shared on Instagram";

/// Confidence assigned to a successfully refined recipe.
const REFINED_CONFIDENCE: f32 = 0.95;

/// Error type for the refinement pass. Never fatal to the run.
#[derive(Debug, Error)]
pub enum RefinementError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to parse refinement response: {0}")]
    Parse(String),
}

/// The complete evidence for one run, handed to the refinement model.
pub struct EvidenceBundle<'a> {
    pub source_url: &'a str,
    pub text: &'a PhaseResult,
    pub visual: Option<&'a PhaseResult>,
    pub audio: Option<&'a PhaseResult>,
    pub fused: &'a FusedRecipe,
}

/// Refinement pass over a fused recipe.
pub struct RefinementPass {
    provider: Arc<dyn LlmProvider>,
}

impl RefinementPass {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Re-derive the recipe from the full evidence bundle.
    ///
    /// On any failure the caller keeps the fused result; this method never
    /// needs to succeed for the pipeline to be correct.
    pub async fn run(&self, bundle: &EvidenceBundle<'_>) -> Result<FusedRecipe, RefinementError> {
        let prompt = render_refinement_prompt(bundle);

        tracing::debug!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            "running refinement pass"
        );

        let response = self.provider.complete(&prompt).await?;
        parse_refined_recipe(&response, bundle.fused)
    }
}

/// Render the refinement prompt: evidence ordered audio-first, because the
/// spoken track usually carries the most detailed instructions.
fn render_refinement_prompt(bundle: &EvidenceBundle<'_>) -> String {
    let mut evidence = serde_json::Map::new();

    if let Some(audio) = bundle.audio {
        if let Evidence::Audio {
            transcript,
            measurements,
            time_mentions,
            instruction_sentences,
            ..
        } = &audio.evidence
        {
            evidence.insert(
                "audio".to_string(),
                json!({
                    "transcript": transcript,
                    "measurements": measurements,
                    "time_mentions": time_mentions,
                    "instructions": instruction_sentences,
                    "confidence": audio.confidence,
                }),
            );
        }
    }

    evidence.insert(
        "fused_recipe".to_string(),
        serde_json::to_value(bundle.fused).unwrap_or_default(),
    );

    if let Some(visual) = bundle.visual {
        if let Evidence::Visual {
            detected_ingredients,
            ocr_text,
            ..
        } = &visual.evidence
        {
            evidence.insert(
                "visual".to_string(),
                json!({
                    "detected_ingredients": detected_ingredients,
                    "ocr_text": ocr_text,
                    "confidence": visual.confidence,
                }),
            );
        }
    }

    if let Evidence::Text { source_text } = &bundle.text.evidence {
        if !source_text.is_empty() && !source_text.contains(PLACEHOLDER_MARKER) {
            evidence.insert(
                "caption".to_string(),
                json!({
                    "text": source_text,
                    "confidence": bundle.text.confidence,
                }),
            );
        }
    }

    let evidence_json = serde_json::to_string_pretty(&serde_json::Value::Object(evidence))
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are an expert recipe analyst. Below is evidence extracted from a cooking video post ({url}) by text, video, and audio analysis.

EVIDENCE:
{evidence}

GUIDELINES:
- Prioritize the audio transcript: it carries the most detailed and accurate information.
- Cross-reference all sources for consistency and completeness.
- Create a proper title describing the actual dish being made.
- If information is missing, fill gaps with reasonable culinary knowledge.

Respond with JSON only, no markdown:
{{
  "title": "Clear recipe title",
  "ingredients": ["ingredient one", "ingredient two"],
  "category": "one of: Main Course, Desserts, Starters, Beverages, Snacks, Breakfast, Salads, Side Dishes",
  "cooking_time_minutes": 25,
  "difficulty": "Easy|Medium|Hard",
  "instructions": ["Step 1: ...", "Step 2: ..."]
}}"#,
        url = bundle.source_url,
        evidence = evidence_json,
    )
}

/// Shape of the model's JSON answer. Every field is optional; missing or
/// invalid values fall back to the fused recipe.
#[derive(Debug, Deserialize)]
struct RefinedRecipeJson {
    title: Option<String>,
    ingredients: Option<Vec<String>>,
    category: Option<String>,
    cooking_time_minutes: Option<i64>,
    difficulty: Option<String>,
    instructions: Option<InstructionsField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionsField {
    Steps(Vec<String>),
    Block(String),
}

/// Strip markdown code fences the model sometimes wraps JSON in.
fn strip_fences(content: &str) -> &str {
    let content = content.trim();
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    content.strip_suffix("```").unwrap_or(content).trim()
}

/// Parse and validate the model response, keeping fused values wherever the
/// answer is missing or out of range.
fn parse_refined_recipe(
    response: &str,
    fused: &FusedRecipe,
) -> Result<FusedRecipe, RefinementError> {
    let cleaned = strip_fences(response);
    let parsed: RefinedRecipeJson =
        serde_json::from_str(cleaned).map_err(|e| RefinementError::Parse(e.to_string()))?;

    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| t.len() > 5 && t.len() < 120)
        .unwrap_or_else(|| fused.title.clone());

    let mut ingredients: Vec<String> = parsed
        .ingredients
        .unwrap_or_default()
        .into_iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        ingredients = fused.ingredients.clone();
    }
    ingredients.truncate(vocab::MAX_INGREDIENTS);

    let category = parsed
        .category
        .as_deref()
        .and_then(Category::from_label)
        .unwrap_or(fused.category);

    let cooking_time_minutes = parsed
        .cooking_time_minutes
        .map(clamp_cooking_time)
        .unwrap_or(fused.cooking_time_minutes);

    let difficulty = parsed
        .difficulty
        .as_deref()
        .and_then(Difficulty::from_label)
        .unwrap_or(fused.difficulty);

    let instructions = match parsed.instructions {
        Some(InstructionsField::Steps(steps)) if !steps.is_empty() => steps.join("\n"),
        Some(InstructionsField::Block(block)) if !block.trim().is_empty() => block,
        _ => fused.instructions.clone(),
    };

    Ok(FusedRecipe {
        title,
        ingredients,
        category,
        cooking_time_minutes,
        difficulty,
        dietary_tags: fused.dietary_tags.clone(),
        instructions,
        tags: fused.tags.clone(),
        overall_confidence: REFINED_CONFIDENCE,
        data_sources_used: fused.data_sources_used.clone(),
        fusion_timestamp: Utc::now(),
    })
}
