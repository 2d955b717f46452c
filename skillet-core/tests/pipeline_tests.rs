//! End-to-end pipeline tests over mock capabilities.

use std::sync::Arc;

use futures::StreamExt;
use skillet_core::{
    Category, DataSource, ExtractionError, ExtractionPipeline, ExtractionRequest, FakeClassifier,
    FakeDetector, FakeProvider, FakeRecognizer, FakeTranscriber, MockAudioStrategy,
    MockMediaSource, PhaseStatus, PipelineConfig, PipelineStage, ProgressEvent, RunErrorKind,
    SourceError,
};

const URL: &str = "https://www.instagram.com/reel/test123/";
const VEGAN_PASTA_CAPTION: &str = "Quick 10-minute vegan pasta with tomatoes, garlic, basil";

fn classifier() -> Arc<FakeClassifier> {
    Arc::new(
        FakeClassifier::new()
            .with_rule("pasta", "Main Course", 0.9)
            .with_rule("ingredients", "Easy", 0.8),
    )
}

fn pipeline_over(media: MockMediaSource) -> ExtractionPipeline {
    ExtractionPipeline::new(
        Arc::new(media),
        classifier(),
        Arc::new(FakeDetector::with_labels(&[
            ("tomato", 0.8),
            ("basil", 0.7),
        ])),
        Arc::new(FakeRecognizer::with_text("FRESH PASTA step by step", 0.9)),
        Arc::new(FakeTranscriber::with_text(
            "add 2 cups flour and stir the sauce, cook for 10 minutes until golden",
            0.9,
        )),
        vec![Arc::new(MockAudioStrategy::working("demux"))],
        PipelineConfig::default(),
    )
}

async fn collect_events(pipeline: &ExtractionPipeline, request: ExtractionRequest) -> Vec<ProgressEvent> {
    pipeline.run(request).collect().await
}

fn final_recipe(events: &[ProgressEvent]) -> &skillet_core::FusedRecipe {
    events
        .last()
        .and_then(|event| event.recipe())
        .expect("final event must carry a recipe")
}

#[tokio::test]
async fn text_only_run_uses_text_source_alone() {
    let media = MockMediaSource::new().with_text_post(URL, VEGAN_PASTA_CAPTION, "");
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    let stages: Vec<PipelineStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Text,
            PipelineStage::Text,
            PipelineStage::Fusion,
            PipelineStage::Fusion,
        ]
    );

    let recipe = final_recipe(&events);
    assert_eq!(
        recipe.data_sources_used,
        std::iter::once(DataSource::Text).collect()
    );
    assert_eq!(recipe.category, Category::MainCourse);
    assert_eq!(recipe.cooking_time_minutes, 10);
    assert!(recipe.ingredients.contains(&"tomato".to_string()));

    // Text confidence 0.6 plus the fixed fusion boosts saturates the cap.
    assert!((recipe.overall_confidence - 0.95).abs() < 1e-6);
}

#[tokio::test]
async fn progress_is_monotone_and_ends_at_100() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    let percents: Vec<u8> = events.iter().map(|e| e.progress_percent).collect();
    let mut sorted = percents.clone();
    sorted.sort_unstable();
    assert_eq!(percents, sorted, "progress must be non-decreasing");

    let last = events.last().unwrap();
    assert_eq!(last.progress_percent, 100);
    assert_eq!(last.status, PhaseStatus::Completed);
    assert!(last.is_terminal());
}

#[tokio::test]
async fn full_multimodal_run_uses_all_three_sources() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    let stages: Vec<PipelineStage> = events.iter().map(|e| e.stage).collect();
    assert!(stages.contains(&PipelineStage::Visual));
    assert!(stages.contains(&PipelineStage::Audio));

    // Each stage emits exactly one processing and one terminal event.
    for stage in [PipelineStage::Text, PipelineStage::Visual, PipelineStage::Audio] {
        let of_stage: Vec<_> = events.iter().filter(|e| e.stage == stage).collect();
        assert_eq!(of_stage.len(), 2, "stage {:?}", stage);
        assert_eq!(of_stage[0].status, PhaseStatus::Processing);
        assert_ne!(of_stage[1].status, PhaseStatus::Processing);
    }

    let recipe = final_recipe(&events);
    assert_eq!(recipe.data_sources_used.len(), 3);
    assert!(recipe.data_sources_used.contains(&DataSource::Visual));
    assert!(recipe.data_sources_used.contains(&DataSource::Audio));
    // Text-sourced ingredients lead, audio-derived ones follow.
    assert_eq!(recipe.ingredients[0], "garlic");
    assert!(recipe.ingredients.contains(&"flour".to_string()));
}

#[tokio::test]
async fn disabled_optional_phases_are_skipped() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = pipeline_over(media);

    let mut request = ExtractionRequest::new(URL);
    request.enable_visual = false;
    request.enable_audio = false;

    let events = collect_events(&pipeline, request).await;
    assert!(events.iter().all(|e| e.stage != PipelineStage::Visual));
    assert!(events.iter().all(|e| e.stage != PipelineStage::Audio));

    let recipe = final_recipe(&events);
    assert_eq!(
        recipe.data_sources_used,
        std::iter::once(DataSource::Text).collect()
    );
}

#[tokio::test]
async fn dead_capabilities_degrade_to_text_only_completion() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = ExtractionPipeline::new(
        Arc::new(media),
        classifier(),
        Arc::new(FakeDetector::failing()),
        Arc::new(FakeRecognizer::failing()),
        Arc::new(FakeTranscriber::failing()),
        vec![
            Arc::new(MockAudioStrategy::failing("ffmpeg")),
            Arc::new(MockAudioStrategy::failing("demux")),
        ],
        PipelineConfig::default(),
    );

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    // Both optional phases report failed terminal events.
    let failed_stages: Vec<PipelineStage> = events
        .iter()
        .filter(|e| e.status == PhaseStatus::Failed)
        .map(|e| e.stage)
        .collect();
    assert!(failed_stages.contains(&PipelineStage::Visual));
    assert!(failed_stages.contains(&PipelineStage::Audio));

    // The run still completes with text-only data and non-empty fields.
    let last = events.last().unwrap();
    assert_eq!(last.status, PhaseStatus::Completed);
    assert_eq!(last.progress_percent, 100);
    let recipe = final_recipe(&events);
    assert_eq!(
        recipe.data_sources_used,
        std::iter::once(DataSource::Text).collect()
    );
    assert!(!recipe.ingredients.is_empty());
    assert!(!recipe.instructions.is_empty());
}

#[tokio::test]
async fn unresolvable_source_yields_single_failed_event() {
    let media = MockMediaSource::new().with_error(
        URL,
        SourceError::Restricted("the post is private".to_string()),
    );
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.status, PhaseStatus::Failed);
    assert_eq!(event.progress_percent, 100);
    assert_eq!(
        event.error.as_ref().unwrap().kind,
        RunErrorKind::ContentRestricted
    );
    assert!(event.recipe().is_none());
}

#[tokio::test]
async fn batch_mode_returns_only_the_terminal_recipe() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = pipeline_over(media);

    let recipe = pipeline
        .run_to_completion(ExtractionRequest::new(URL))
        .await
        .unwrap();
    assert_eq!(recipe.data_sources_used.len(), 3);
    assert!(recipe.overall_confidence > 0.0 && recipe.overall_confidence <= 0.95);
}

#[tokio::test]
async fn batch_mode_surfaces_source_errors() {
    let media = MockMediaSource::new()
        .with_error(URL, SourceError::Unavailable("HTTP 404".to_string()));
    let pipeline = pipeline_over(media);

    let result = pipeline.run_to_completion(ExtractionRequest::new(URL)).await;
    assert!(matches!(
        result,
        Err(ExtractionError::Source(SourceError::Unavailable(_)))
    ));
}

#[tokio::test]
async fn refinement_replaces_the_fused_recipe_when_it_parses() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 100);
    let pipeline = pipeline_over(media).with_refiner(Arc::new(FakeProvider::with_response(
        "recipe analyst",
        r#"{"title": "Ten-Minute Vegan Tomato Pasta", "ingredients": ["pasta", "tomato", "garlic", "basil"], "category": "Main Course", "cooking_time_minutes": 12, "difficulty": "Easy", "instructions": ["Step 1: Boil the pasta.", "Step 2: Toss with sauce."]}"#,
    )));

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    let last = events.last().unwrap();
    assert_eq!(last.stage, PipelineStage::Refinement);
    let recipe = final_recipe(&events);
    assert_eq!(recipe.title, "Ten-Minute Vegan Tomato Pasta");
    assert_eq!(recipe.cooking_time_minutes, 12);
    assert!((recipe.overall_confidence - 0.95).abs() < f32::EPSILON);

    // A fusion event preceded the refinement and carried the fused recipe.
    let fusion_recipe_events = events
        .iter()
        .filter(|e| e.stage == PipelineStage::Fusion && e.recipe().is_some())
        .count();
    assert_eq!(fusion_recipe_events, 1);
}

#[tokio::test]
async fn failed_refinement_leaves_the_fused_result_standing() {
    let media = MockMediaSource::new().with_text_post(URL, VEGAN_PASTA_CAPTION, "");
    // A provider with no responses configured always errors.
    let pipeline = pipeline_over(media).with_refiner(Arc::new(FakeProvider::new()));

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;

    let fused = events
        .iter()
        .find(|e| e.stage == PipelineStage::Fusion && e.recipe().is_some())
        .and_then(|e| e.recipe())
        .unwrap();
    let final_event = events.last().unwrap();
    assert_eq!(final_event.stage, PipelineStage::Refinement);
    assert_eq!(final_event.status, PhaseStatus::Completed);

    let last_recipe = final_recipe(&events);
    assert_eq!(last_recipe.title, fused.title);
    assert_eq!(last_recipe.overall_confidence, fused.overall_confidence);
}

#[tokio::test]
async fn events_serialize_to_snake_case_json() {
    let media = MockMediaSource::new().with_text_post(URL, VEGAN_PASTA_CAPTION, "");
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;
    let json = serde_json::to_string(&events[0]).unwrap();
    assert!(json.contains("\"progress_percent\":10"));
    assert!(json.contains("\"status\":\"processing\""));
    assert!(json.contains("\"stage\":\"text\""));

    let last_json = serde_json::to_value(events.last().unwrap()).unwrap();
    assert_eq!(last_json["status"], "completed");
    assert!(last_json["data"]["overall_confidence"].is_number());
}

#[tokio::test]
async fn same_run_id_is_stamped_on_every_event_of_a_run() {
    let media = MockMediaSource::new().with_video_post(URL, VEGAN_PASTA_CAPTION, "", 50);
    let pipeline = pipeline_over(media);

    let events = collect_events(&pipeline, ExtractionRequest::new(URL)).await;
    let run_id = events[0].run_id;
    assert!(events.iter().all(|e| e.run_id == run_id));
}
