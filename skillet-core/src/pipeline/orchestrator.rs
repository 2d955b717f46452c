//! The pipeline orchestrator.
//!
//! Drives the fixed phase sequence Text → [Visual] → [Audio] → Fusion →
//! [Refinement], emitting exactly one processing and one terminal event per
//! stage. A failed or timed-out phase contributes its low-confidence result
//! to fusion instead of aborting; only source resolution can fail a run.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tokio::time::{timeout, Instant};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::{ExtractionError, SourceError};
use crate::extract::{AudioExtractor, TextExtractor, VisualExtractor, VisualInput};
use crate::fusion::{EvidenceBundle, FusionEngine, RefinementPass};
use crate::inference::{ObjectDetector, SpeechTranscriber, TextClassifier, TextRecognizer};
use crate::llm::LlmProvider;
use crate::media::{AudioTrackExtractor, MediaSource};
use crate::pipeline::{EventData, PipelineStage, ProgressEvent};
use crate::types::{ExtractionRequest, FusedRecipe, Phase, PhaseResult, PhaseStatus};

// Progress checkpoints. Fixed positions keep the sequence monotone no
// matter which optional phases run.
const TEXT_START: u8 = 10;
const TEXT_DONE: u8 = 25;
const VISUAL_START: u8 = 40;
const VISUAL_DONE: u8 = 65;
const AUDIO_START: u8 = 75;
const AUDIO_DONE: u8 = 85;
const FUSION_START: u8 = 90;
const FUSION_DONE_BEFORE_REFINE: u8 = 95;
const REFINE_START: u8 = 97;
const DONE: u8 = 100;

/// One extraction pipeline, holding its capability implementations.
///
/// Every run owns its phase results exclusively; nothing is shared across
/// concurrent runs.
pub struct ExtractionPipeline {
    media: Arc<dyn MediaSource>,
    text: TextExtractor,
    visual: VisualExtractor,
    audio: AudioExtractor,
    fusion: FusionEngine,
    refiner: Option<RefinementPass>,
}

impl ExtractionPipeline {
    pub fn new(
        media: Arc<dyn MediaSource>,
        classifier: Arc<dyn TextClassifier>,
        detector: Arc<dyn ObjectDetector>,
        recognizer: Arc<dyn TextRecognizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
        audio_strategies: Vec<Arc<dyn AudioTrackExtractor>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            media,
            text: TextExtractor::new(classifier.clone()),
            visual: VisualExtractor::new(detector, recognizer, config.clone()),
            audio: AudioExtractor::new(audio_strategies, transcriber),
            fusion: FusionEngine::new(classifier)
                .with_inclusion_threshold(config.inclusion_threshold),
            refiner: None,
        }
    }

    /// Enable the refinement pass with the given provider.
    pub fn with_refiner(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.refiner = Some(RefinementPass::new(provider));
        self
    }

    /// Run the pipeline, yielding one ordered sequence of progress events.
    ///
    /// Streaming callers iterate this directly; batch callers use
    /// [`run_to_completion`](Self::run_to_completion).
    pub fn run(
        &self,
        request: ExtractionRequest,
    ) -> impl Stream<Item = ProgressEvent> + Send + '_ {
        stream! {
            let run_id = Uuid::new_v4();
            let started = Instant::now();
            let budget = Duration::from_secs(request.max_processing_secs.max(1));
            let remaining = move || budget.saturating_sub(started.elapsed());

            // Resolve the source. Failures here are the only fatal ones.
            let resolved = timeout(remaining(), self.media.resolve(&request.source_url))
                .instrument(info_span!("pipeline_phase", phase = "resolve"))
                .await;
            let media = match resolved {
                Ok(Ok(media)) => media,
                Ok(Err(error)) => {
                    tracing::warn!(url = %request.source_url, error = %error, "source resolution failed");
                    yield ProgressEvent::run_failed(run_id, &error);
                    return;
                }
                Err(_) => {
                    let error = SourceError::Unavailable("timed out resolving source".to_string());
                    yield ProgressEvent::run_failed(run_id, &error);
                    return;
                }
            };

            // Text phase: mandatory and unconditional.
            yield ProgressEvent::processing(
                run_id,
                PipelineStage::Text,
                TEXT_START,
                "Reading caption and description...",
            );
            let text_result = match timeout(
                remaining(),
                self.text
                    .extract(&media.description, &media.caption)
                    .instrument(info_span!("pipeline_phase", phase = "text")),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("text phase timed out");
                    PhaseResult::failed(Phase::Text, 0.1)
                }
            };
            let text_message = if text_result.status == PhaseStatus::Failed {
                "Text analysis failed, continuing with empty fields"
            } else {
                "Text analysis completed"
            };
            yield ProgressEvent::phase_terminal(
                run_id,
                PipelineStage::Text,
                TEXT_DONE,
                text_message,
                text_result.clone(),
            );

            // Visual phase: runs iff enabled and a video or thumbnail resolved.
            let mut visual_result: Option<PhaseResult> = None;
            if request.enable_visual
                && (media.video.is_some() || media.thumbnail_url.is_some())
            {
                yield ProgressEvent::processing(
                    run_id,
                    PipelineStage::Visual,
                    VISUAL_START,
                    "Analyzing video frames for ingredients...",
                );
                let result = self
                    .run_visual_phase(&media, remaining())
                    .instrument(info_span!("pipeline_phase", phase = "visual"))
                    .await;
                let message = if result.status == PhaseStatus::Failed {
                    "Visual analysis failed, continuing without it"
                } else {
                    "Visual analysis completed"
                };
                yield ProgressEvent::phase_terminal(
                    run_id,
                    PipelineStage::Visual,
                    VISUAL_DONE,
                    message,
                    result.clone(),
                );
                visual_result = Some(result);
            }

            // Audio phase: runs iff enabled and a video resolved.
            let mut audio_result: Option<PhaseResult> = None;
            if request.enable_audio {
                if let Some(video) = &media.video {
                    yield ProgressEvent::processing(
                        run_id,
                        PipelineStage::Audio,
                        AUDIO_START,
                        "Extracting and transcribing audio...",
                    );
                    let result = match timeout(
                        remaining(),
                        self.audio
                            .extract(video.as_ref())
                            .instrument(info_span!("pipeline_phase", phase = "audio")),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::warn!("audio phase timed out");
                            PhaseResult::failed(Phase::Audio, 0.1)
                        }
                    };
                    let message = if result.status == PhaseStatus::Failed {
                        "Audio transcription failed, continuing without it"
                    } else {
                        "Audio transcription completed"
                    };
                    yield ProgressEvent::phase_terminal(
                        run_id,
                        PipelineStage::Audio,
                        AUDIO_DONE,
                        message,
                        result.clone(),
                    );
                    audio_result = Some(result);
                }
            }

            // Fusion always runs once the selected phases are terminal.
            yield ProgressEvent::processing(
                run_id,
                PipelineStage::Fusion,
                FUSION_START,
                "Combining all sources into one recipe...",
            );
            let fused = match timeout(
                remaining(),
                self.fusion
                    .fuse(&text_result, audio_result.as_ref(), visual_result.as_ref())
                    .instrument(info_span!("pipeline_phase", phase = "fusion")),
            )
            .await
            {
                Ok(recipe) => recipe,
                Err(_) => {
                    tracing::warn!("fusion timed out, using text-only fallback");
                    FusionEngine::text_only_fallback(&text_result)
                }
            };

            match &self.refiner {
                Some(refiner) => {
                    yield ProgressEvent::recipe_completed(
                        run_id,
                        PipelineStage::Fusion,
                        FUSION_DONE_BEFORE_REFINE,
                        "Fusion completed",
                        fused.clone(),
                    );
                    yield ProgressEvent::processing(
                        run_id,
                        PipelineStage::Refinement,
                        REFINE_START,
                        "Refining the recipe with the full evidence bundle...",
                    );
                    let bundle = EvidenceBundle {
                        source_url: &request.source_url,
                        text: &text_result,
                        visual: visual_result.as_ref(),
                        audio: audio_result.as_ref(),
                        fused: &fused,
                    };
                    let final_recipe = match timeout(
                        remaining(),
                        refiner
                            .run(&bundle)
                            .instrument(info_span!("pipeline_phase", phase = "refine")),
                    )
                    .await
                    {
                        Ok(Ok(refined)) => refined,
                        Ok(Err(error)) => {
                            tracing::warn!(error = %error, "refinement failed, keeping fused result");
                            fused
                        }
                        Err(_) => {
                            tracing::warn!("refinement timed out, keeping fused result");
                            fused
                        }
                    };
                    yield ProgressEvent::recipe_completed(
                        run_id,
                        PipelineStage::Refinement,
                        DONE,
                        "Recipe extraction completed",
                        final_recipe,
                    );
                }
                None => {
                    yield ProgressEvent::recipe_completed(
                        run_id,
                        PipelineStage::Fusion,
                        DONE,
                        "Recipe extraction completed",
                        fused,
                    );
                }
            }
        }
    }

    /// Drain the event stream and return only the terminal recipe.
    pub async fn run_to_completion(
        &self,
        request: ExtractionRequest,
    ) -> Result<FusedRecipe, ExtractionError> {
        let stream = self.run(request);
        futures::pin_mut!(stream);

        let mut recipe = None;
        while let Some(event) = stream.next().await {
            if let Some(error) = &event.error {
                return Err(ExtractionError::Source(match error.kind {
                    crate::pipeline::RunErrorKind::SourceUnavailable => {
                        SourceError::Unavailable(error.message.clone())
                    }
                    crate::pipeline::RunErrorKind::ContentRestricted => {
                        SourceError::Restricted(error.message.clone())
                    }
                }));
            }
            if event.status == PhaseStatus::Completed {
                if let Some(EventData::Recipe(r)) = event.data {
                    recipe = Some(r);
                }
            }
        }

        recipe.ok_or(ExtractionError::Incomplete)
    }

    /// Visual extraction over the video, or the thumbnail when no video
    /// handle resolved. Any failure degrades to a failed phase result.
    async fn run_visual_phase(
        &self,
        media: &crate::media::ResolvedMedia,
        budget: Duration,
    ) -> PhaseResult {
        if let Some(video) = &media.video {
            return match timeout(budget, self.visual.extract(VisualInput::Video(video.as_ref())))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("visual phase timed out");
                    PhaseResult::failed(Phase::Visual, 0.15)
                }
            };
        }

        let Some(url) = media.thumbnail_url.as_deref() else {
            return PhaseResult::failed(Phase::Visual, 0.15);
        };
        match timeout(budget, self.media.fetch_image(url)).await {
            Ok(Ok(image)) => {
                match timeout(budget, self.visual.extract(VisualInput::Thumbnail(&image))).await {
                    Ok(result) => result,
                    Err(_) => PhaseResult::failed(Phase::Visual, 0.15),
                }
            }
            Ok(Err(error)) => {
                tracing::warn!(url, error = %error, "thumbnail fetch failed");
                PhaseResult::failed(Phase::Visual, 0.15)
            }
            Err(_) => {
                tracing::warn!(url, "thumbnail fetch timed out");
                PhaseResult::failed(Phase::Visual, 0.15)
            }
        }
    }
}
