//! Deployment outcome
//!
//! Built up stage by stage while a run executes, then frozen by
//! [`OutcomeBuilder::finish`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Stage, StageStatus, UpdateMode};

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// Finished with warnings only
    Partial,
    Failed,
    Aborted,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial success",
            RunStatus::Failed => "failed",
            RunStatus::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a run stopped without attempting the remaining stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    Validation,
    DataLoss,
    Locked,
    Interrupted,
}

impl AbortReason {
    pub fn exit_code(self) -> i32 {
        match self {
            AbortReason::Validation => 2,
            AbortReason::DataLoss => 3,
            AbortReason::Locked => 4,
            AbortReason::Interrupted => 130,
        }
    }
}

/// State of the application service when the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Running,
    Stopped,
    /// Not queried, or the query itself failed
    Unknown,
    /// No service name configured
    NotManaged,
}

impl ServiceStatus {
    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::NotManaged => "not managed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Immutable report of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOutcome {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<UpdateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub target: PathBuf,
    pub stages: Vec<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    pub service_status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained_snapshot: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeploymentOutcome {
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Success | RunStatus::Partial => 0,
            RunStatus::Failed => 1,
            RunStatus::Aborted => self.abort_reason.map(AbortReason::exit_code).unwrap_or(1),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Success | RunStatus::Partial)
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StageRecord> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Warning)
    }
}

/// Mutable accumulator used while the run is in progress
#[derive(Debug)]
pub struct OutcomeBuilder {
    target: PathBuf,
    mode: Option<UpdateMode>,
    source: Option<PathBuf>,
    stages: Vec<StageRecord>,
    abort_reason: Option<AbortReason>,
    service_status: ServiceStatus,
    retained_snapshot: Option<PathBuf>,
    error: Option<String>,
    started_at: DateTime<Utc>,
}

impl OutcomeBuilder {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            mode: None,
            source: None,
            stages: Vec::new(),
            abort_reason: None,
            service_status: ServiceStatus::Unknown,
            retained_snapshot: None,
            error: None,
            started_at: Utc::now(),
        }
    }

    pub fn resolved(&mut self, mode: UpdateMode, source: impl Into<PathBuf>) {
        self.mode = Some(mode);
        self.source = Some(source.into());
    }

    pub fn record(&mut self, stage: Stage, status: StageStatus, detail: Option<String>) {
        self.stages.push(StageRecord {
            stage,
            status,
            detail,
        });
    }

    pub fn abort(&mut self, reason: AbortReason, message: impl Into<String>) {
        self.abort_reason = Some(reason);
        self.error = Some(message.into());
    }

    /// Keep the first fatal error message; later ones are in the stage records
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    pub fn set_service_status(&mut self, status: ServiceStatus) {
        self.service_status = status;
    }

    pub fn retain_snapshot(&mut self, path: impl Into<PathBuf>) {
        self.retained_snapshot = Some(path.into());
    }

    pub fn has_failed(&self) -> bool {
        self.stages
            .iter()
            .any(|r| matches!(r.status, StageStatus::Failed | StageStatus::Aborted))
    }

    pub fn finish(self) -> DeploymentOutcome {
        let failed_stage = self
            .stages
            .iter()
            .find(|r| matches!(r.status, StageStatus::Failed | StageStatus::Aborted))
            .map(|r| r.stage);

        let status = if self.abort_reason.is_some() {
            RunStatus::Aborted
        } else if self.stages.iter().any(|r| r.status == StageStatus::Failed) {
            RunStatus::Failed
        } else if self.stages.iter().any(|r| r.status == StageStatus::Warning) {
            RunStatus::Partial
        } else {
            RunStatus::Success
        };

        DeploymentOutcome {
            status,
            abort_reason: self.abort_reason,
            mode: self.mode,
            source: self.source,
            target: self.target,
            stages: self.stages,
            failed_stage,
            service_status: self.service_status,
            retained_snapshot: self.retained_snapshot,
            error: self.error,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
