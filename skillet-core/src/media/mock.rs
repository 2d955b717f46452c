//! Mock media implementations for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{MediaError, SourceError};
use crate::media::{
    AudioClip, AudioTrackExtractor, FrameImage, MediaSource, ResolvedMedia, VideoHandle,
};

/// In-memory video handle serving pre-canned frames.
pub struct MockVideoHandle {
    frames: Vec<FrameImage>,
    failing: bool,
}

impl MockVideoHandle {
    /// A handle with `count` synthetic frames (each frame's bytes carry its
    /// index so fakes can respond per-frame).
    pub fn with_frame_count(count: u32) -> Self {
        let frames = (0..count)
            .map(|i| FrameImage::new(vec![(i % 256) as u8]))
            .collect();
        Self {
            frames,
            failing: false,
        }
    }

    pub fn with_frames(frames: Vec<FrameImage>) -> Self {
        Self {
            frames,
            failing: false,
        }
    }

    /// A handle whose frame reads always fail.
    pub fn failing(count: u32) -> Self {
        let mut handle = Self::with_frame_count(count);
        handle.failing = true;
        handle
    }
}

#[async_trait]
impl VideoHandle for MockVideoHandle {
    fn frame_count(&self) -> u32 {
        self.frames.len() as u32
    }

    async fn read_frame(&self, index: u32) -> Result<FrameImage, MediaError> {
        if self.failing {
            return Err(MediaError::Decode("mock frame read failure".to_string()));
        }
        self.frames
            .get(index as usize)
            .cloned()
            .ok_or_else(|| MediaError::Unavailable(format!("no frame at index {}", index)))
    }
}

/// Mock audio extraction strategy.
pub struct MockAudioStrategy {
    name: &'static str,
    clip: Option<AudioClip>,
}

impl MockAudioStrategy {
    /// A strategy that yields a clean 10-second clip.
    pub fn working(name: &'static str) -> Self {
        Self {
            name,
            clip: Some(AudioClip {
                bytes: vec![0; 1024],
                duration_secs: 10.0,
                sample_rate: 16000,
                rms_energy: 0.2,
                snr_db: 25.0,
            }),
        }
    }

    /// A strategy that yields a specific clip.
    pub fn with_clip(name: &'static str, clip: AudioClip) -> Self {
        Self {
            name,
            clip: Some(clip),
        }
    }

    /// A strategy that always fails.
    pub fn failing(name: &'static str) -> Self {
        Self { name, clip: None }
    }
}

#[async_trait]
impl AudioTrackExtractor for MockAudioStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn extract(&self, _video: &dyn VideoHandle) -> Result<AudioClip, MediaError> {
        self.clip
            .clone()
            .ok_or_else(|| MediaError::Decode(format!("{}: mock extraction failure", self.name)))
    }
}

/// Mock media source for testing, keyed by URL.
#[derive(Default)]
pub struct MockMediaSource {
    media: HashMap<String, ResolvedMedia>,
    errors: HashMap<String, SourceError>,
    images: HashMap<String, FrameImage>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register resolved media for a URL.
    pub fn with_media(mut self, url: &str, media: ResolvedMedia) -> Self {
        self.media.insert(url.to_string(), media);
        self
    }

    /// Register a resolution error for a URL.
    pub fn with_error(mut self, url: &str, error: SourceError) -> Self {
        self.errors.insert(url.to_string(), error);
        self
    }

    /// Register an image response for a URL.
    pub fn with_image(mut self, url: &str, image: FrameImage) -> Self {
        self.images.insert(url.to_string(), image);
        self
    }

    /// Convenience: text-only media with a caption and description.
    pub fn with_text_post(self, url: &str, description: &str, caption: &str) -> Self {
        self.with_media(url, ResolvedMedia::text_only(description, caption))
    }

    /// Convenience: media carrying a mock video with the given frame count.
    pub fn with_video_post(
        self,
        url: &str,
        description: &str,
        caption: &str,
        frame_count: u32,
    ) -> Self {
        self.with_media(
            url,
            ResolvedMedia {
                video: Some(Arc::new(MockVideoHandle::with_frame_count(frame_count))),
                thumbnail_url: None,
                description: description.to_string(),
                caption: caption.to_string(),
            },
        )
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, SourceError> {
        if let Some(error) = self.errors.get(url) {
            return Err(error.clone());
        }
        self.media
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::Unavailable(format!("No mock media for URL: {}", url)))
    }

    async fn fetch_image(&self, url: &str) -> Result<FrameImage, MediaError> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| MediaError::Unavailable(format!("No mock image for URL: {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_serves_registered_media() {
        let source =
            MockMediaSource::new().with_text_post("https://x/p/1/", "pasta night", "best pasta");
        let media = source.resolve("https://x/p/1/").await.unwrap();
        assert_eq!(media.description, "pasta night");
        assert!(media.video.is_none());
    }

    #[tokio::test]
    async fn mock_source_errors_for_unknown_urls() {
        let source = MockMediaSource::new();
        assert!(matches!(
            source.resolve("https://x/p/unknown/").await,
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn mock_video_serves_frames_by_index() {
        let video = MockVideoHandle::with_frame_count(4);
        assert_eq!(video.frame_count(), 4);
        let frame = video.read_frame(2).await.unwrap();
        assert_eq!(frame.bytes, vec![2]);
        assert!(video.read_frame(9).await.is_err());
    }
}
