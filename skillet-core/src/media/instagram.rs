//! Instagram media source backed by page-metadata scraping.
//!
//! Resolves post metadata (title, description, thumbnail) from Open Graph
//! tags, with Twitter-card tags as a fallback. Video download is not handled
//! here; callers that need video inject their own [`VideoHandle`] producer.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{MediaError, SourceError};
use crate::media::{FrameImage, MediaSource, ResolvedMedia};

/// Supported Instagram post kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Post,
    Reel,
    Tv,
}

/// Validate an Instagram post URL and classify the post kind.
pub fn validate_post_url(url: &str) -> Result<PostKind, SourceError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| SourceError::Unavailable(format!("Invalid URL: {}", e)))?;

    let host = parsed.host_str().unwrap_or_default();
    if !host.ends_with("instagram.com") {
        return Err(SourceError::Unavailable(
            "URL is not from Instagram".to_string(),
        ));
    }

    let path = parsed.path();
    if path.contains("/p/") {
        Ok(PostKind::Post)
    } else if path.contains("/reel/") {
        Ok(PostKind::Reel)
    } else if path.contains("/tv/") {
        Ok(PostKind::Tv)
    } else {
        Err(SourceError::Unavailable(
            "URL is not a supported Instagram post type".to_string(),
        ))
    }
}

/// Extract the account name from a post URL, for fallback captions.
fn username_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments().and_then(|mut segments| {
                segments
                    .next()
                    .filter(|s| !matches!(*s, "p" | "reel" | "tv") && !s.is_empty())
                    .map(|s| s.to_string())
            })
        })
        .unwrap_or_else(|| "instagram_user".to_string())
}

/// Scraping-based [`MediaSource`] for Instagram posts.
pub struct InstagramMediaSource {
    client: reqwest::Client,
}

impl InstagramMediaSource {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; Skillet/1.0)")
            .build()?;
        Ok(Self { client })
    }

    /// Pull a meta tag's content by `property`, falling back to `name`.
    fn meta_content(document: &Html, property: &str, name_fallback: &str) -> Option<String> {
        let by_property = Selector::parse(&format!(r#"meta[property="{}"]"#, property)).ok()?;
        if let Some(tag) = document.select(&by_property).next() {
            if let Some(content) = tag.value().attr("content") {
                return Some(content.to_string());
            }
        }

        let by_name = Selector::parse(&format!(r#"meta[name="{}"]"#, name_fallback)).ok()?;
        document
            .select(&by_name)
            .next()
            .and_then(|tag| tag.value().attr("content").map(|c| c.to_string()))
    }
}

#[async_trait]
impl MediaSource for InstagramMediaSource {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, SourceError> {
        validate_post_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Restricted(
                "The post is private or requires login".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Failed to read page: {}", e)))?;

        let (title, description, thumbnail_url) = {
            let document = Html::parse_document(&body);
            (
                Self::meta_content(&document, "og:title", "twitter:title"),
                Self::meta_content(&document, "og:description", "twitter:description"),
                Self::meta_content(&document, "og:image", "twitter:image"),
            )
        };

        let author = username_from_url(url);
        let caption = title.unwrap_or_else(|| format!("Instagram Recipe from @{}", author));
        let description = description
            .unwrap_or_else(|| "A recipe shared on Instagram. Perfect for food lovers!".to_string());

        tracing::debug!(url, author = %author, has_thumbnail = thumbnail_url.is_some(), "resolved instagram post");

        Ok(ResolvedMedia {
            video: None,
            thumbnail_url,
            description,
            caption,
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<FrameImage, MediaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Unavailable(format!("Image request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MediaError::Unavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        if bytes.is_empty() {
            return Err(MediaError::Decode("Empty image response".to_string()));
        }

        Ok(FrameImage::new(bytes.to_vec()))
    }
}
