//! Run stages and their statuses

use serde::{Deserialize, Serialize};

/// One step of an update run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Resolve,
    Lock,
    ServiceStop,
    Snapshot,
    Pull,
    Deploy,
    Restore,
    Permissions,
    Dependencies,
    ServiceRestart,
    ProxyRestart,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Resolve,
        Stage::Lock,
        Stage::ServiceStop,
        Stage::Snapshot,
        Stage::Pull,
        Stage::Deploy,
        Stage::Restore,
        Stage::Permissions,
        Stage::Dependencies,
        Stage::ServiceRestart,
        Stage::ProxyRestart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Lock => "lock",
            Stage::ServiceStop => "service_stop",
            Stage::Snapshot => "snapshot",
            Stage::Pull => "pull",
            Stage::Deploy => "deploy",
            Stage::Restore => "restore",
            Stage::Permissions => "permissions",
            Stage::Dependencies => "dependencies",
            Stage::ServiceRestart => "service_restart",
            Stage::ProxyRestart => "proxy_restart",
        }
    }

    /// Stages whose failure only degrades the run to a partial success.
    pub fn failure_is_recoverable(self) -> bool {
        matches!(
            self,
            Stage::ServiceStop | Stage::Pull | Stage::Permissions | Stage::ProxyRestart
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Warning,
    Failed,
    Aborted,
}

impl StageStatus {
    pub fn is_problem(self) -> bool {
        matches!(
            self,
            StageStatus::Warning | StageStatus::Failed | StageStatus::Aborted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_execution_order() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }

    #[test]
    fn proxy_and_pull_failures_are_recoverable() {
        assert!(Stage::ProxyRestart.failure_is_recoverable());
        assert!(Stage::Pull.failure_is_recoverable());
        assert!(!Stage::ServiceRestart.failure_is_recoverable());
        assert!(!Stage::Restore.failure_is_recoverable());
    }
}
