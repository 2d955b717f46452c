//! Progress events emitted during a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SourceError;
use crate::types::{FusedRecipe, PhaseResult, PhaseStatus};

/// Stages reported in progress events, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Resolution,
    Text,
    Visual,
    Audio,
    Fusion,
    Refinement,
}

/// Payload attached to a terminal stage event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Phase(PhaseResult),
    Recipe(FusedRecipe),
}

/// Kind of a run-fatal error, surfaced on the terminal failure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    SourceUnavailable,
    ContentRestricted,
}

/// A run-fatal error carried by the terminal failure event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
}

impl From<&SourceError> for RunError {
    fn from(error: &SourceError) -> Self {
        match error {
            SourceError::Unavailable(message) => RunError {
                kind: RunErrorKind::SourceUnavailable,
                message: message.clone(),
            },
            SourceError::Restricted(message) => RunError {
                kind: RunErrorKind::ContentRestricted,
                message: message.clone(),
            },
        }
    }
}

/// A transient record emitted once per stage transition.
///
/// `progress_percent` is non-decreasing over the events of one run, and the
/// final event always reports 100 with a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub stage: PipelineStage,
    pub status: PhaseStatus,
    pub progress_percent: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    /// Stage-entry event.
    pub(crate) fn processing(
        run_id: Uuid,
        stage: PipelineStage,
        progress_percent: u8,
        message: &str,
    ) -> Self {
        Self {
            run_id,
            stage,
            status: PhaseStatus::Processing,
            progress_percent,
            message: message.to_string(),
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Stage-exit event for an extraction phase; the status mirrors the
    /// phase result (completed or failed).
    pub(crate) fn phase_terminal(
        run_id: Uuid,
        stage: PipelineStage,
        progress_percent: u8,
        message: &str,
        result: PhaseResult,
    ) -> Self {
        Self {
            run_id,
            stage,
            status: result.status,
            progress_percent,
            message: message.to_string(),
            data: Some(EventData::Phase(result)),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Stage-exit event carrying a recipe.
    pub(crate) fn recipe_completed(
        run_id: Uuid,
        stage: PipelineStage,
        progress_percent: u8,
        message: &str,
        recipe: FusedRecipe,
    ) -> Self {
        Self {
            run_id,
            stage,
            status: PhaseStatus::Completed,
            progress_percent,
            message: message.to_string(),
            data: Some(EventData::Recipe(recipe)),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Terminal failure event for an unrecoverable pre-phase error.
    pub(crate) fn run_failed(run_id: Uuid, error: &SourceError) -> Self {
        let run_error = RunError::from(error);
        let message = match run_error.kind {
            RunErrorKind::ContentRestricted => {
                "Failed to fetch content. The post might be private or deleted.".to_string()
            }
            RunErrorKind::SourceUnavailable => {
                format!("Failed to read the source: {}", run_error.message)
            }
        };
        Self {
            run_id,
            stage: PipelineStage::Resolution,
            status: PhaseStatus::Failed,
            progress_percent: 100,
            message,
            data: None,
            error: Some(run_error),
            timestamp: Utc::now(),
        }
    }

    /// The fused recipe, if this event carries one.
    pub fn recipe(&self) -> Option<&FusedRecipe> {
        match &self.data {
            Some(EventData::Recipe(recipe)) => Some(recipe),
            _ => None,
        }
    }

    /// True for the event that ends a run.
    pub fn is_terminal(&self) -> bool {
        self.progress_percent == 100
            && matches!(self.status, PhaseStatus::Completed | PhaseStatus::Failed)
    }
}
