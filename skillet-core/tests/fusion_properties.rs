//! Property-style tests for the extractor/fusion composition: bounds,
//! determinism, and degradation behavior.

use std::sync::Arc;

use skillet_core::{
    Category, DataSource, DietaryTag, FakeClassifier, FusionEngine, Phase, PhaseResult,
    TextExtractor,
};

fn classifier() -> Arc<FakeClassifier> {
    Arc::new(
        FakeClassifier::new()
            .with_rule("pasta", "Main Course", 0.9)
            .with_rule("cake", "Desserts", 0.9)
            .with_rule("ingredients", "Easy", 0.8),
    )
}

const CAPTIONS: &[&str] = &[
    "",
    "Quick 10-minute vegan pasta with tomatoes, garlic, basil",
    "Slow-braised beef with potatoes, carrots and red wine, cook for 3 hours",
    "Triple chocolate cake with cream, eggs and butter, bake for 45 minutes",
    "Just vibes",
    "🔥🔥🔥 best sandwich ever 🔥🔥🔥",
];

#[tokio::test]
async fn phase_and_fused_values_stay_within_bounds() {
    let extractor = TextExtractor::new(classifier());
    let engine = FusionEngine::new(classifier());

    for caption in CAPTIONS {
        let phase = extractor.extract("", caption).await;
        assert!(
            (0.0..=1.0).contains(&phase.confidence),
            "phase confidence out of bounds for {:?}",
            caption
        );
        if let Some(time) = phase.fields.cooking_time_minutes {
            assert!((5..=240).contains(&time), "time out of bounds for {:?}", caption);
        }

        let recipe = engine.fuse(&phase, None, None).await;
        assert!(
            (0.0..=1.0).contains(&recipe.overall_confidence),
            "fused confidence out of bounds for {:?}",
            caption
        );
        assert!((5..=240).contains(&recipe.cooking_time_minutes));
        assert!(!recipe.title.is_empty());
        assert!(!recipe.instructions.is_empty());
    }
}

#[tokio::test]
async fn fusion_is_a_pure_function_of_its_inputs() {
    let extractor = TextExtractor::new(classifier());
    let engine = FusionEngine::new(classifier());

    let phase = extractor
        .extract("", "Triple chocolate cake with cream, eggs and butter, bake for 45 minutes")
        .await;

    let first = engine.fuse(&phase, None, None).await;
    let mut second = engine.fuse(&phase, None, None).await;
    second.fusion_timestamp = first.fusion_timestamp;
    assert_eq!(first, second);

    // Fusion does not mutate its inputs either.
    let phase_again = extractor
        .extract("", "Triple chocolate cake with cream, eggs and butter, bake for 45 minutes")
        .await;
    assert_eq!(phase, phase_again);
}

#[tokio::test]
async fn failed_optional_phases_never_change_the_text_only_outcome() {
    let extractor = TextExtractor::new(classifier());
    let engine = FusionEngine::new(classifier());

    let text = extractor
        .extract("", "Quick 10-minute vegan pasta with tomatoes, garlic, basil")
        .await;
    let failed_visual = PhaseResult::failed(Phase::Visual, 0.15);
    let failed_audio = PhaseResult::failed(Phase::Audio, 0.1);

    let mut baseline = engine.fuse(&text, None, None).await;
    let mut degraded = engine
        .fuse(&text, Some(&failed_audio), Some(&failed_visual))
        .await;

    assert_eq!(
        degraded.data_sources_used,
        std::iter::once(DataSource::Text).collect()
    );
    baseline.fusion_timestamp = degraded.fusion_timestamp;
    assert_eq!(baseline, degraded);
}

#[tokio::test]
async fn vegan_pasta_caption_end_to_end() {
    let extractor = TextExtractor::new(classifier());
    let engine = FusionEngine::new(classifier());

    let phase = extractor
        .extract("", "Quick 10-minute vegan pasta with tomatoes, garlic, basil")
        .await;

    for ingredient in ["tomato", "garlic", "basil"] {
        assert!(phase.fields.ingredients.contains(&ingredient.to_string()));
    }
    assert_eq!(phase.fields.category, Some(Category::MainCourse));
    assert_eq!(phase.fields.cooking_time_minutes, Some(10));
    assert!(phase.fields.dietary_tags.contains(&DietaryTag::Vegan));
    assert!(phase.confidence >= 0.5);

    let recipe = engine.fuse(&phase, None, None).await;
    assert_eq!(recipe.ingredients[..phase.fields.ingredients.len()].to_vec(), phase.fields.ingredients);
    assert!(recipe.overall_confidence >= phase.confidence + 0.15);
    assert!(recipe.overall_confidence <= 0.95);
}

#[tokio::test]
async fn dessert_caption_lands_in_desserts_with_plausible_fields() {
    let extractor = TextExtractor::new(classifier());
    let phase = extractor
        .extract(
            "",
            "Triple chocolate cake with cream, eggs and butter, bake for 45 minutes",
        )
        .await;

    assert_eq!(phase.fields.category, Some(Category::Desserts));
    assert_eq!(phase.fields.cooking_time_minutes, Some(45));
    assert!(!phase.fields.dietary_tags.contains(&DietaryTag::Vegan));
    assert!(!phase.fields.dietary_tags.contains(&DietaryTag::DairyFree));
}
