#![allow(dead_code)]

//! Generation run state machine.
//!
//! A run moves `parsing → analyzing → optimizing → generating → complete`,
//! with `failed` reachable from any in-progress stage. Each stage drives the
//! progress bar toward a fixed checkpoint (25/50/75/100); a stage's
//! checkpoint is reached exactly when its work completes, so progress is
//! monotonically non-decreasing for the lifetime of a run. Failure resets
//! progress and never retains a partial result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resume::GeneratedResume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Parsing,
    Analyzing,
    Optimizing,
    Generating,
    Complete,
    Failed,
}

impl Stage {
    /// The progress value this stage drives toward while active.
    pub fn target_progress(&self) -> u8 {
        match self {
            Stage::Idle | Stage::Failed => 0,
            Stage::Parsing => 25,
            Stage::Analyzing => 50,
            Stage::Optimizing => 75,
            Stage::Generating | Stage::Complete => 100,
        }
    }

    /// The progress value already banked when this stage begins.
    pub fn entry_progress(&self) -> u8 {
        match self {
            Stage::Idle | Stage::Failed => 0,
            Stage::Parsing => 0,
            Stage::Analyzing => 25,
            Stage::Optimizing => 50,
            Stage::Generating => 75,
            Stage::Complete => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Stage::Parsing | Stage::Analyzing | Stage::Optimizing | Stage::Generating
        )
    }
}

/// Point-in-time view of a run, broadcast over the progress channel and
/// returned by the status route.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run_id: Uuid,
    pub stage: Stage,
    pub progress: u8,
    pub result: Option<GeneratedResume>,
    pub failure: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl RunSnapshot {
    /// Every run begins at `parsing` with progress 0.
    pub fn started(run_id: Uuid) -> Self {
        Self {
            run_id,
            stage: Stage::Parsing,
            progress: 0,
            result: None,
            failure: None,
            updated_at: Utc::now(),
        }
    }

    /// Advances to the next in-progress stage, banking the completed
    /// stage's checkpoint. Progress never moves backwards.
    pub fn advanced(&self, stage: Stage) -> Self {
        Self {
            run_id: self.run_id,
            stage,
            progress: stage.entry_progress().max(self.progress),
            result: None,
            failure: None,
            updated_at: Utc::now(),
        }
    }

    /// Terminal success: progress 100, result attached.
    pub fn completed(&self, resume: GeneratedResume) -> Self {
        Self {
            run_id: self.run_id,
            stage: Stage::Complete,
            progress: 100,
            result: Some(resume),
            failure: None,
            updated_at: Utc::now(),
        }
    }

    /// Terminal failure: progress reset, no partial result retained.
    pub fn failed(&self, reason: impl Into<String>) -> Self {
        Self {
            run_id: self.run_id,
            stage: Stage::Failed,
            progress: 0,
            result: None,
            failure: Some(reason.into()),
            updated_at: Utc::now(),
        }
    }
}
