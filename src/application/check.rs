//! Check Use Case
//!
//! Previews an update without mutating anything: resolves the source,
//! probes runtime state, runs the restore guard against what is on disk now,
//! and reports on dependencies, the service and the run lock.

use chrono::Utc;

use crate::application::services::ServiceController;
use crate::application::snapshot::probe_runtime_paths;
use crate::application::update::{UpdateOptions, UpdateUseCase};
use crate::domain::entities::{
    AbortReason, DependencyManifest, EntryState, InstallationTarget, PathKind, RecordState,
    SnapshotEntry, SnapshotManifest,
};
use crate::domain::ports::{CommandRunner, FileSystem};
use crate::domain::services::restore_guard;
use crate::infrastructure::lock::RunLock;

/// Result of a single check
#[derive(Debug, Clone)]
pub struct CheckItem {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    /// What the operator should do about it
    pub recommendation: Option<String>,
    /// How an update would abort on this error
    pub abort: Option<AbortReason>,
}

impl CheckItem {
    fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            message: message.into(),
            recommendation: None,
            abort: None,
        }
    }

    fn warning(name: &str, message: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.into(),
            recommendation: Some(recommendation.into()),
            abort: None,
        }
    }

    fn error(name: &str, message: impl Into<String>, abort: AbortReason) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.into(),
            recommendation: None,
            abort: Some(abort),
        }
    }

    fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

/// Result of the check operation
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub items: Vec<CheckItem>,
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl CheckResult {
    fn push(&mut self, item: CheckItem) {
        match item.status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Warning => self.warnings += 1,
            CheckStatus::Error => self.errors += 1,
        }
        self.items.push(item);
    }

    /// An update would get past every gate
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }

    /// Exit code the update would abort with, 0 when it would proceed
    pub fn exit_code(&self) -> i32 {
        self.items
            .iter()
            .find_map(|i| i.abort)
            .map(AbortReason::exit_code)
            .unwrap_or(0)
    }
}

/// Check Use Case
pub struct CheckUseCase<FS, R>
where
    FS: FileSystem,
    R: CommandRunner,
{
    update: UpdateUseCase<FS, R>,
}

impl<FS, R> CheckUseCase<FS, R>
where
    FS: FileSystem,
    R: CommandRunner,
{
    pub fn new(update: UpdateUseCase<FS, R>) -> Self {
        Self { update }
    }

    pub fn execute(&self, options: &UpdateOptions) -> CheckResult {
        self.execute_with_callback(options, |_| {})
    }

    /// Execute with a callback for each check (for streaming UI)
    pub fn execute_with_callback<F>(&self, options: &UpdateOptions, mut on_check: F) -> CheckResult
    where
        F: FnMut(&CheckItem),
    {
        let mut result = CheckResult::default();
        let mut emit = |item: CheckItem| {
            on_check(&item);
            result.push(item);
        };
        let fs = self.update.file_system();

        let target = match self.update.resolve(options) {
            Ok(resolved) => {
                let mut message = format!(
                    "{} from {}",
                    resolved.mode,
                    resolved.source.root().display()
                );
                if let Some(ignored) = &resolved.ignored_source {
                    message.push_str(&format!(" (ignoring {})", ignored.display()));
                }
                emit(CheckItem::pass("source", message));

                emit(if !resolved.source.has_vcs() {
                    CheckItem::pass("pull", "source is not a checkout; nothing to pull")
                } else if options.pull {
                    CheckItem::pass(
                        "pull",
                        format!("will fast-forward {}", resolved.source.root().display()),
                    )
                } else {
                    CheckItem::pass("pull", "checkout present; pulling disabled")
                });
                resolved.target
            }
            Err(e) => {
                emit(
                    CheckItem::error("source", e.to_string(), AbortReason::Validation).recommend(
                        "pass the directory holding backend/ and frontend/ as SOURCE",
                    ),
                );
                InstallationTarget::new(&options.target, options.layout.clone())
            }
        };

        let probes = probe_runtime_paths(fs, &target);
        for probe in &probes {
            let name = format!("runtime {}", probe.role.name());
            emit(match (probe.exists, probe.has_content) {
                (true, true) => {
                    CheckItem::pass(&name, format!("{} present", probe.relative.display()))
                }
                (true, false) => {
                    CheckItem::pass(&name, format!("{} present, empty", probe.relative.display()))
                }
                (false, _) => CheckItem::pass(&name, format!("{} absent", probe.relative.display())),
            });
        }

        let record = RecordState::load(fs, &target.record_path());
        match &record {
            RecordState::Missing => {
                emit(CheckItem::pass("install record", "none yet; treated as first install"))
            }
            RecordState::Loaded(r) => emit(CheckItem::pass(
                "install record",
                format!("last {} at {}", r.mode, r.completed_at.format("%Y-%m-%d %H:%M UTC")),
            )),
            RecordState::Unreadable(reason) => emit(CheckItem::warning(
                "install record",
                format!("unreadable: {}", reason),
                format!(
                    "missing runtime paths will abort the update; remove {} if the install is intact",
                    target.record_path().display()
                ),
            )),
        }

        // guard preview: treat current content as a perfect capture
        let entries = probes
            .iter()
            .map(|probe| {
                let state = if !probe.exists {
                    EntryState::Absent
                } else {
                    match fs.hash_tree(&probe.absolute) {
                        Ok(hash) => EntryState::Captured {
                            hash,
                            kind: if fs.is_dir(&probe.absolute) {
                                PathKind::Dir
                            } else {
                                PathKind::File
                            },
                        },
                        Err(e) => EntryState::Unverified {
                            reason: e.to_string(),
                        },
                    }
                };
                SnapshotEntry {
                    role: probe.role,
                    relative: probe.relative.clone(),
                    slot: probe.role.name().to_string(),
                    state,
                }
            })
            .collect();
        let manifest = SnapshotManifest {
            taken_at: Utc::now(),
            prior_state_seen: probes.iter().any(|p| p.has_content),
            entries,
        };
        emit(match restore_guard::precheck(&manifest, &record) {
            Ok(()) => CheckItem::pass("runtime guard", manifest.summary()),
            Err(v) => CheckItem::error(
                "runtime guard",
                format!("{}: {}", v.relative.display(), v.reason),
                AbortReason::DataLoss,
            )
            .recommend("inspect the path; remove the install record if the loss was intentional"),
        });

        let env = target.dependency_env();
        let manifest_path = target.manifest();
        emit(if !fs.is_dir(&env) {
            CheckItem::warning(
                "dependencies",
                format!("no environment at {}", env.display()),
                "create the virtual environment before updating",
            )
        } else if !fs.exists(&manifest_path) {
            CheckItem::warning(
                "dependencies",
                format!("no manifest at {}", manifest_path.display()),
                "the source tree should ship its requirements file",
            )
        } else {
            let count = fs
                .read(&manifest_path)
                .map(|content| DependencyManifest::parse(&content).len())
                .unwrap_or(0);
            CheckItem::pass("dependencies", format!("{} packages", count))
        });

        let services = ServiceController::new(
            self.update.runner(),
            &options.commands.systemctl,
            options.service.clone(),
            options.proxy.clone(),
        );
        let status = services.status();
        emit(match services.service() {
            Some(service) => CheckItem::pass("service", format!("{} {}", service, status.label())),
            None => CheckItem::pass("service", "not managed"),
        });

        emit(if RunLock::is_held(&target.lock_path()) {
            CheckItem::error(
                "lock",
                format!("another update is running against {}", target.root().display()),
                AbortReason::Locked,
            )
        } else {
            CheckItem::pass("lock", "free")
        });

        result
    }
}
