//! Pipeline configuration.

/// Tunables for a pipeline run.
///
/// Environment variables:
/// - `SKILLET_MAX_FRAMES`: frame budget for video analysis (default 10)
/// - `SKILLET_DETECTION_MIN_SCORE`: per-detection threshold (default 0.4)
/// - `SKILLET_OCR_MIN_SCORE`: per-text-span threshold (default 0.5)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frames sampled from a video.
    pub max_frames: u32,
    /// Minimum object-detection score for a label to count.
    pub detection_min_score: f32,
    /// Minimum OCR score for a text span to count.
    pub ocr_min_score: f32,
    /// Minimum confidence for audio/visual results to participate in fusion.
    pub inclusion_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frames: 10,
            detection_min_score: 0.4,
            ocr_min_score: 0.5,
            inclusion_threshold: 0.3,
        }
    }
}

impl PipelineConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_frames = std::env::var("SKILLET_MAX_FRAMES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_frames);

        let detection_min_score = std::env::var("SKILLET_DETECTION_MIN_SCORE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.detection_min_score);

        let ocr_min_score = std::env::var("SKILLET_OCR_MIN_SCORE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.ocr_min_score);

        Self {
            max_frames,
            detection_min_score,
            ocr_min_score,
            ..defaults
        }
    }
}
