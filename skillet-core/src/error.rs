use thiserror::Error;

/// Errors raised while resolving a source URL, before any phase has run.
/// These are the only errors that terminate a pipeline run.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Content restricted: {0}")]
    Restricted(String),
}

/// Errors from media handles (frame reads, audio track access).
#[derive(Error, Debug, Clone)]
pub enum MediaError {
    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("Media not available: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Terminal error for a pipeline run consumed in batch mode.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Pipeline ended without a terminal result")]
    Incomplete,
}
