//! Visual phase: frame sampling, object detection, and OCR.
//!
//! Frames are sampled non-uniformly: cooking videos front-load ingredient
//! prep, spend the middle on active cooking, and end on presentation, so the
//! budget is split 30/50/20 across those segments.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::inference::{ObjectDetector, TextRecognizer};
use crate::media::{FrameImage, VideoHandle};
use crate::types::{
    Evidence, FrameSummary, Phase, PhaseResult, PhaseStatus, RecipeFields,
};
use crate::vocab;

/// Confidence reported when the visual phase fails outright.
const FAILED_CONFIDENCE: f32 = 0.15;

/// What the visual phase has to work with.
pub enum VisualInput<'a> {
    Video(&'a dyn VideoHandle),
    Thumbnail(&'a FrameImage),
}

/// Frame-based recipe extractor.
pub struct VisualExtractor {
    detector: Arc<dyn ObjectDetector>,
    recognizer: Arc<dyn TextRecognizer>,
    config: PipelineConfig,
}

impl VisualExtractor {
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        recognizer: Arc<dyn TextRecognizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            recognizer,
            config,
        }
    }

    /// Analyze video frames or a single thumbnail.
    ///
    /// Never propagates errors: an unreadable source or dead detector yields
    /// a failed result and the pipeline continues without this phase.
    pub async fn extract(&self, input: VisualInput<'_>) -> PhaseResult {
        let frames = match self.gather_frames(input).await {
            Some(frames) if !frames.is_empty() => frames,
            _ => {
                tracing::warn!("no readable frames, visual phase degraded to failed");
                return PhaseResult::failed(Phase::Visual, FAILED_CONFIDENCE);
            }
        };

        let mut label_counts: HashMap<&'static str, u32> = HashMap::new();
        let mut detected: Vec<String> = Vec::new();
        let mut ocr_parts: Vec<String> = Vec::new();
        let mut frame_summaries: Vec<FrameSummary> = Vec::new();
        let mut any_frame_analyzed = false;

        for (index, frame) in frames.iter().enumerate() {
            let mut summary = FrameSummary {
                index: index as u32,
                ..FrameSummary::default()
            };

            match self.detector.detect(frame).await {
                Ok(detections) => {
                    any_frame_analyzed = true;
                    for detection in detections {
                        if detection.score < self.config.detection_min_score {
                            continue;
                        }
                        let Some(term) = vocab::food_term_for_label(&detection.label) else {
                            continue;
                        };
                        summary.labels_detected += 1;
                        let count = label_counts.entry(term).or_insert(0);
                        *count += 1;
                        if *count == 1 {
                            detected.push(term.to_string());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(frame = index, error = %e, "frame detection failed");
                }
            }

            match self.recognizer.read(frame).await {
                Ok(spans) => {
                    any_frame_analyzed = true;
                    let frame_text: Vec<String> = spans
                        .into_iter()
                        .filter(|span| span.score >= self.config.ocr_min_score)
                        .map(|span| span.text.trim().to_string())
                        .filter(|text| !text.is_empty())
                        .collect();
                    if !frame_text.is_empty() {
                        let joined = frame_text.join(" ");
                        summary.ocr_chars = joined.chars().count() as u32;
                        ocr_parts.push(joined);
                    }
                }
                Err(e) => {
                    tracing::warn!(frame = index, error = %e, "frame OCR failed");
                }
            }

            frame_summaries.push(summary);
        }

        if !any_frame_analyzed {
            tracing::warn!("all frame analyses failed, visual phase degraded to failed");
            return PhaseResult::failed(Phase::Visual, FAILED_CONFIDENCE);
        }

        let ocr_text = ocr_parts.join(" ");
        detected.truncate(vocab::MAX_INGREDIENTS);

        let consistency = ingredient_consistency(&label_counts);
        let confidence = visual_confidence(
            frames.len(),
            detected.len(),
            ocr_text.chars().count(),
            consistency,
        );

        PhaseResult {
            phase: Phase::Visual,
            status: PhaseStatus::Completed,
            fields: RecipeFields {
                ingredients: detected.clone(),
                ..RecipeFields::default()
            },
            confidence,
            evidence: Evidence::Visual {
                detected_ingredients: detected,
                ocr_text,
                frames_processed: frames.len() as u32,
                frame_summaries,
            },
        }
    }

    /// Collect the frames to analyze: strategic positions for a video, the
    /// single image for a thumbnail.
    async fn gather_frames(&self, input: VisualInput<'_>) -> Option<Vec<FrameImage>> {
        match input {
            VisualInput::Thumbnail(image) => Some(vec![image.clone()]),
            VisualInput::Video(video) => {
                let total = video.frame_count();
                if total == 0 {
                    return None;
                }
                let positions = strategic_positions(total, self.config.max_frames);
                let mut frames = Vec::with_capacity(positions.len());
                for position in positions {
                    match video.read_frame(position).await {
                        Ok(frame) => frames.push(frame),
                        Err(e) => {
                            tracing::warn!(position, error = %e, "frame read failed");
                        }
                    }
                }
                Some(frames)
            }
        }
    }
}

/// Evenly spaced integer positions across [start, end], inclusive.
fn linspace(start: u32, end: u32, count: u32) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![start];
    }
    let span = end.saturating_sub(start) as f64;
    (0..count)
        .map(|i| start + (span * i as f64 / (count - 1) as f64).round() as u32)
        .collect()
}

/// Frame positions weighted toward the structure of cooking videos:
/// 30% of the budget in the first 30% (prep), 50% in the middle (active
/// cooking), and the rest in the final 20% (presentation).
fn strategic_positions(total_frames: u32, max_frames: u32) -> Vec<u32> {
    if total_frames <= max_frames {
        return (0..total_frames).collect();
    }

    let prep_count = (max_frames as f64 * 0.3) as u32;
    let cooking_count = (max_frames as f64 * 0.5) as u32;
    let final_count = max_frames - prep_count - cooking_count;

    let prep_end = (total_frames as f64 * 0.3) as u32;
    let cooking_end = (total_frames as f64 * 0.8) as u32;

    let mut positions = Vec::new();
    positions.extend(linspace(0, prep_end, prep_count));
    positions.extend(linspace(prep_end, cooking_end, cooking_count));
    positions.extend(linspace(cooking_end, total_frames - 1, final_count));

    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Fraction of distinct ingredients that were seen in more than one frame.
fn ingredient_consistency(label_counts: &HashMap<&'static str, u32>) -> f32 {
    if label_counts.is_empty() {
        return 0.0;
    }
    let repeated = label_counts.values().filter(|count| **count > 1).count();
    repeated as f32 / label_counts.len() as f32
}

/// Confidence: base 0.35 plus frame-coverage, ingredient, OCR, and
/// consistency boosts, capped at 0.85.
fn visual_confidence(
    frames_processed: usize,
    ingredient_count: usize,
    ocr_chars: usize,
    consistency: f32,
) -> f32 {
    let mut score: f32 = 0.35;

    if frames_processed >= 6 {
        score += 0.15;
    } else if frames_processed >= 3 {
        score += 0.10;
    }

    if ingredient_count >= 3 {
        score += 0.15;
    } else if ingredient_count >= 1 {
        score += 0.10;
    }

    if ocr_chars > 20 {
        score += 0.10;
    }

    score += consistency * 0.10;

    score.min(0.85)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{FakeDetector, FakeRecognizer};
    use crate::media::MockVideoHandle;

    fn default_extractor(detector: FakeDetector, recognizer: FakeRecognizer) -> VisualExtractor {
        VisualExtractor::new(
            Arc::new(detector),
            Arc::new(recognizer),
            PipelineConfig::default(),
        )
    }

    #[test]
    fn strategic_positions_follow_the_30_50_20_split() {
        let positions = strategic_positions(1000, 10);
        assert!(positions.len() <= 10);
        assert!(positions.len() >= 8);

        let prep = positions.iter().filter(|p| **p <= 300).count();
        let cooking = positions.iter().filter(|p| **p > 300 && **p <= 800).count();
        let presentation = positions.iter().filter(|p| **p > 800).count();
        assert!(prep >= 2);
        assert!(cooking >= 4);
        assert!(presentation >= 1);

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, positions);
    }

    #[test]
    fn short_videos_use_every_frame() {
        assert_eq!(strategic_positions(4, 10), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn detects_and_deduplicates_food_across_frames() {
        let video = MockVideoHandle::with_frame_count(100);
        let extractor = default_extractor(
            FakeDetector::with_labels(&[("tomato", 0.8), ("laptop", 0.9), ("garlic", 0.7)]),
            FakeRecognizer::with_text("PASTA RECIPE step by step", 0.9),
        );

        let result = extractor.extract(VisualInput::Video(&video)).await;
        assert_eq!(result.status, PhaseStatus::Completed);
        assert_eq!(
            result.fields.ingredients,
            vec!["tomato".to_string(), "garlic".to_string()]
        );
        match &result.evidence {
            Evidence::Visual {
                ocr_text,
                frames_processed,
                ..
            } => {
                assert!(ocr_text.contains("PASTA RECIPE"));
                assert!(*frames_processed >= 8);
            }
            _ => panic!("wrong evidence variant"),
        }
        // Every frame repeats both labels, so consistency maxes the bonus.
        assert!(result.confidence > 0.7);
        assert!(result.confidence <= 0.85);
    }

    #[tokio::test]
    async fn low_scoring_detections_are_dropped() {
        let video = MockVideoHandle::with_frame_count(10);
        let extractor = default_extractor(
            FakeDetector::with_labels(&[("tomato", 0.2)]),
            FakeRecognizer::new(),
        );

        let result = extractor.extract(VisualInput::Video(&video)).await;
        assert!(result.fields.ingredients.is_empty());
        assert_eq!(result.status, PhaseStatus::Completed);
    }

    #[tokio::test]
    async fn thumbnail_path_processes_one_frame() {
        let image = FrameImage::new(vec![1, 2, 3]);
        let extractor = default_extractor(
            FakeDetector::with_labels(&[("broccoli", 0.9)]),
            FakeRecognizer::new(),
        );

        let result = extractor.extract(VisualInput::Thumbnail(&image)).await;
        assert_eq!(result.fields.ingredients, vec!["broccoli".to_string()]);
        match &result.evidence {
            Evidence::Visual {
                frames_processed, ..
            } => assert_eq!(*frames_processed, 1),
            _ => panic!("wrong evidence variant"),
        }
    }

    #[tokio::test]
    async fn unreadable_video_degrades_to_failed() {
        let video = MockVideoHandle::failing(20);
        let extractor = default_extractor(
            FakeDetector::with_labels(&[("tomato", 0.8)]),
            FakeRecognizer::new(),
        );

        let result = extractor.extract(VisualInput::Video(&video)).await;
        assert_eq!(result.status, PhaseStatus::Failed);
        assert!(result.confidence <= 0.2);
        assert!(result.fields.ingredients.is_empty());
    }

    #[tokio::test]
    async fn dead_detector_and_ocr_degrade_to_failed() {
        let video = MockVideoHandle::with_frame_count(10);
        let extractor = default_extractor(FakeDetector::failing(), FakeRecognizer::failing());

        let result = extractor.extract(VisualInput::Video(&video)).await;
        assert_eq!(result.status, PhaseStatus::Failed);
        assert!(result.confidence <= 0.2);
    }

    #[test]
    fn consistency_counts_repeated_ingredients() {
        let mut counts = HashMap::new();
        counts.insert("tomato", 3);
        counts.insert("garlic", 1);
        assert!((ingredient_consistency(&counts) - 0.5).abs() < f32::EPSILON);
        assert_eq!(ingredient_consistency(&HashMap::new()), 0.0);
    }

    #[test]
    fn confidence_caps_at_085() {
        assert!(visual_confidence(12, 8, 100, 1.0) <= 0.85);
        assert!((visual_confidence(0, 0, 0, 0.0) - 0.35).abs() < f32::EPSILON);
    }
}
