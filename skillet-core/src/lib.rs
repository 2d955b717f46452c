//! Progressive multi-modal recipe extraction.
//!
//! Takes a cooking post URL and produces a structured recipe by running
//! independent extractors over caption text, video frames, and transcribed
//! audio, streaming intermediate results, and fusing the phase outputs into
//! one confident record. The pipeline degrades gracefully: a failed phase
//! lowers confidence instead of aborting the run.
//!
//! # Modules
//!
//! - [`types`] - data model (requests, phase results, fused recipes)
//! - [`media`] - media acquisition interfaces and mocks
//! - [`inference`] - model capability traits (classify, detect, OCR, transcribe)
//! - [`llm`] - LLM provider abstraction for the refinement pass
//! - [`extract`] - the text, visual, and audio extractors
//! - [`fusion`] - weighted fusion and the optional refinement pass
//! - [`pipeline`] - orchestrator and progress streaming

pub mod config;
pub mod error;
pub mod extract;
pub mod fusion;
pub mod inference;
pub mod llm;
pub mod media;
pub mod pipeline;
pub mod types;
pub mod vocab;

pub use config::PipelineConfig;
pub use error::{ExtractionError, MediaError, SourceError};
pub use extract::{AudioExtractor, TextExtractor, VisualExtractor, VisualInput};
pub use fusion::{EvidenceBundle, FusionEngine, RefinementError, RefinementPass, SourceWeights};
pub use inference::{
    Classification, Detection, FakeClassifier, FakeDetector, FakeRecognizer, FakeTranscriber,
    HfInferenceClient, InferenceError, ObjectDetector, SpeechTranscriber, TextClassifier,
    TextRecognizer, TextSpan, Transcript, TranscriptSegment,
};
pub use llm::{provider_from_env, FakeProvider, LlmError, LlmProvider, MistralProvider};
pub use media::{
    validate_post_url, AudioClip, AudioTrackExtractor, FrameImage, InstagramMediaSource,
    MediaSource, MockAudioStrategy, MockMediaSource, MockVideoHandle, PostKind, ResolvedMedia,
    TempArtifact, VideoHandle,
};
pub use pipeline::{
    EventData, ExtractionPipeline, PipelineStage, ProgressEvent, RunError, RunErrorKind,
};
pub use types::{
    clamp_cooking_time, Category, DataSource, DietaryTag, Difficulty, Evidence, ExtractionRequest,
    FusedRecipe, Measurement, MeasurementKind, Phase, PhaseResult, PhaseStatus, RecipeFields,
    TimeMention, TimeMentionKind,
};
