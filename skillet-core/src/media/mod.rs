//! Media acquisition interfaces.
//!
//! The pipeline never downloads or decodes media itself; it talks to these
//! traits. Real implementations own their temporary artifacts (wrapped in
//! [`TempArtifact`] guards) so every exit path cleans up.

mod instagram;
mod mock;

pub use instagram::{validate_post_url, InstagramMediaSource, PostKind};
pub use mock::{MockAudioStrategy, MockMediaSource, MockVideoHandle};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{MediaError, SourceError};

/// An encoded still image (video frame or thumbnail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    pub bytes: Vec<u8>,
}

impl FrameImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// An extracted audio track plus the signal metrics needed for quality
/// scoring. `bytes` holds the encoded track (WAV for the real strategies).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub duration_secs: f32,
    pub sample_rate: u32,
    pub rms_energy: f32,
    pub snr_db: f32,
}

/// Frame-level access to a downloaded video. Implementations own the
/// underlying artifact and release it when dropped.
#[async_trait]
pub trait VideoHandle: Send + Sync {
    fn frame_count(&self) -> u32;

    async fn read_frame(&self, index: u32) -> Result<FrameImage, MediaError>;
}

/// One strategy for pulling the audio track out of a video. The audio
/// extractor tries strategies in order and fails only when all of them do.
#[async_trait]
pub trait AudioTrackExtractor: Send + Sync {
    /// Strategy name for logging (e.g. "ffmpeg", "container-demux").
    fn name(&self) -> &'static str;

    async fn extract(&self, video: &dyn VideoHandle) -> Result<AudioClip, MediaError>;
}

/// Everything the source resolver could learn about a post.
#[derive(Clone)]
pub struct ResolvedMedia {
    pub video: Option<Arc<dyn VideoHandle>>,
    pub thumbnail_url: Option<String>,
    pub description: String,
    pub caption: String,
}

impl ResolvedMedia {
    /// Metadata-only media with no video or thumbnail.
    pub fn text_only(description: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            video: None,
            thumbnail_url: None,
            description: description.into(),
            caption: caption.into(),
        }
    }
}

impl std::fmt::Debug for ResolvedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMedia")
            .field("video", &self.video.as_ref().map(|v| v.frame_count()))
            .field("thumbnail_url", &self.thumbnail_url)
            .field("description", &self.description)
            .field("caption", &self.caption)
            .finish()
    }
}

/// Resolves a source URL into media handles and static metadata.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Resolve a post URL. Fails with [`SourceError::Unavailable`] when the
    /// URL cannot be fetched or parsed, [`SourceError::Restricted`] when the
    /// content is private or deleted.
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, SourceError>;

    /// Fetch a standalone image (thumbnail) by URL.
    async fn fetch_image(&self, url: &str) -> Result<FrameImage, MediaError>;
}

/// Owns a temporary file and removes it on drop.
///
/// Implementations of [`VideoHandle`] and [`AudioTrackExtractor`] wrap their
/// downloaded artifacts in this guard.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %self.path.display(), error = %e, "failed to remove temp artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_artifact_removes_file_on_drop() {
        let path = std::env::temp_dir().join("skillet_temp_artifact_test");
        std::fs::write(&path, b"x").unwrap();
        {
            let _guard = TempArtifact::new(path.clone());
        }
        assert!(!path.exists());
    }

    #[test]
    fn temp_artifact_tolerates_missing_file() {
        let path = std::env::temp_dir().join("skillet_temp_artifact_missing");
        let _guard = TempArtifact::new(path);
    }
}
