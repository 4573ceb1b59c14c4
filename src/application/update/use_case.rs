//! Update Use Case
//!
//! Runs the stages of one update in order:
//! 1. Resolve and validate the source tree
//! 2. Take the installation lock
//! 3. Stop the service
//! 4. Capture runtime state (and check the capture with the guard)
//! 5. Pull the source, if it is a checkout
//! 6. Replace code paths (external updates only)
//! 7. Restore runtime state
//! 8. Fix permissions
//! 9. Reinstall dependencies
//! 10. Start the service, then restart the proxy
//!
//! Stages never return early past the snapshot without deciding what happens
//! to it: released on success, retained when restore could not finish.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::deploy::DeploymentExecutor;
use crate::application::permissions::PermissionNormalizer;
use crate::application::restore::{RestoreError, RestoreExecutor};
use crate::application::services::{DependencyInstaller, ServiceController};
use crate::application::snapshot::{RuntimeSnapshot, SnapshotStore};
use crate::domain::entities::{
    AbortReason, DeploymentOutcome, InstallRecord, InstallationTarget, OutcomeBuilder,
    RecordState, ServiceStatus, SourceTree,
};
use crate::domain::ports::{CommandRunner, FileSystem, UpdateEvent, UpdateEventSink};
use crate::domain::services::{resolve_source, restore_guard};
use crate::domain::value_objects::{Stage, StageStatus, UpdateMode};
use crate::error::{InplaceError, InplaceResult};
use crate::infrastructure::lock::RunLock;
use crate::infrastructure::tools::Git;

use super::options::UpdateOptions;

/// Outcome of source resolution
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub mode: UpdateMode,
    pub source: SourceTree,
    pub target: InstallationTarget,
    /// Explicit source overridden by self-update detection
    pub ignored_source: Option<PathBuf>,
}

/// Update use case
///
/// Parameterized by its ports so tests can script commands and inject file
/// system faults.
pub struct UpdateUseCase<FS, R>
where
    FS: FileSystem,
    R: CommandRunner,
{
    fs: FS,
    runner: R,
    interrupted: Arc<AtomicBool>,
}

impl<FS, R> UpdateUseCase<FS, R>
where
    FS: FileSystem,
    R: CommandRunner,
{
    pub fn new(fs: FS, runner: R) -> Self {
        Self {
            fs,
            runner,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an interrupt flag (set from a Ctrl-C handler)
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn file_system(&self) -> &FS {
        &self.fs
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Decide the update mode and validate the source tree. No mutation.
    pub fn resolve(&self, options: &UpdateOptions) -> InplaceResult<ResolvedSource> {
        options.layout.validate()?;

        let root = self.canonical_or_self(&options.target);
        let origin = self.canonical_or_self(&options.origin);
        let explicit = match &options.source {
            Some(path) => Some(self.fs.canonicalize(path).map_err(|_| {
                InplaceError::InvalidSource {
                    root: path.clone(),
                    reason: "directory does not exist".to_string(),
                }
            })?),
            None => None,
        };

        let resolution = resolve_source(&root, &origin, explicit.as_deref());
        if let Some(ignored) = &resolution.ignored_source {
            warn!(
                source = %ignored.display(),
                "running from inside the installation; ignoring explicit source"
            );
        }

        let source = SourceTree::inspect(&self.fs, &resolution.source, &options.layout);
        source.validate()?;

        Ok(ResolvedSource {
            mode: resolution.mode,
            source,
            target: InstallationTarget::new(root, options.layout.clone()),
            ignored_source: resolution.ignored_source,
        })
    }

    /// Execute the update without event reporting
    pub fn execute(&self, options: &UpdateOptions) -> DeploymentOutcome {
        self.execute_with_events(options, Arc::new(crate::domain::ports::NoopEventSink))
    }

    /// Execute the update, reporting progress to `sink`
    pub fn execute_with_events(
        &self,
        options: &UpdateOptions,
        sink: Arc<dyn UpdateEventSink>,
    ) -> DeploymentOutcome {
        let mut run = Run {
            out: OutcomeBuilder::new(&options.target),
            sink: sink.as_ref(),
        };
        self.run_stages(options, &mut run);

        let outcome = run.out.finish();
        info!(status = %outcome.status, exit_code = outcome.exit_code(), "update finished");
        sink.on_event(UpdateEvent::Completed {
            status: outcome.status,
            exit_code: outcome.exit_code(),
        });
        outcome
    }

    fn run_stages(&self, options: &UpdateOptions, run: &mut Run<'_>) {
        // RESOLVE
        run.start(Stage::Resolve);
        let resolved = match self.resolve(options) {
            Ok(resolved) => resolved,
            Err(e) => {
                run.finish(Stage::Resolve, StageStatus::Aborted, Some(e.to_string()));
                run.out.abort(AbortReason::Validation, e.to_string());
                return;
            }
        };
        let mut detail = format!(
            "{} from {}",
            resolved.mode,
            resolved.source.root().display()
        );
        if let Some(ignored) = &resolved.ignored_source {
            detail.push_str(&format!(" (ignored {})", ignored.display()));
        }
        run.finish(Stage::Resolve, StageStatus::Completed, Some(detail));
        run.out
            .resolved(resolved.mode, resolved.source.root().to_path_buf());
        run.sink.on_event(UpdateEvent::Resolved {
            mode: resolved.mode,
            source: resolved.source.root().to_path_buf(),
            target: resolved.target.root().to_path_buf(),
        });
        let target = &resolved.target;

        // LOCK
        run.start(Stage::Lock);
        let _lock = match RunLock::acquire(&target.lock_path(), target.root()) {
            Ok(lock) => lock,
            Err(e @ InplaceError::RunInProgress { .. }) => {
                run.finish(Stage::Lock, StageStatus::Aborted, Some(e.to_string()));
                run.out.abort(AbortReason::Locked, e.to_string());
                return;
            }
            Err(e) => {
                run.finish(Stage::Lock, StageStatus::Failed, Some(e.to_string()));
                run.out.fail(e.to_string());
                return;
            }
        };
        run.finish(Stage::Lock, StageStatus::Completed, None);

        let services = ServiceController::new(
            &self.runner,
            &options.commands.systemctl,
            options.service.clone(),
            options.proxy.clone(),
        );

        // SERVICE_STOP
        run.start(Stage::ServiceStop);
        let was_active = services.status() == ServiceStatus::Running;
        match services.stop() {
            None => run.finish(
                Stage::ServiceStop,
                StageStatus::Skipped,
                Some("no service configured".to_string()),
            ),
            Some(Ok(())) => run.finish(
                Stage::ServiceStop,
                StageStatus::Completed,
                Some(format!(
                    "stopped {}{}",
                    services.service().unwrap_or_default(),
                    if was_active { "" } else { " (was not running)" }
                )),
            ),
            Some(Err(e)) => run.finish(Stage::ServiceStop, StageStatus::Warning, Some(e.to_string())),
        }

        // SNAPSHOT
        run.start(Stage::Snapshot);
        let record = RecordState::load(&self.fs, &target.record_path());
        let snapshot_dir = options
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| target.meta_dir());
        let snapshot = match SnapshotStore::new(&self.fs, snapshot_dir).capture(target, run.sink) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                run.finish(Stage::Snapshot, StageStatus::Failed, Some(e.to_string()));
                run.out.fail(e.to_string());
                self.resume_service(&services, was_active, run);
                return;
            }
        };
        if let Err(violation) = restore_guard::precheck(snapshot.manifest(), &record) {
            let err = InplaceError::DataLossPrevented {
                path: target.root().join(&violation.relative),
                reason: violation.reason,
            };
            run.finish(Stage::Snapshot, StageStatus::Aborted, Some(err.to_string()));
            run.out.abort(AbortReason::DataLoss, guard_message(&err));
            self.release(snapshot);
            self.resume_service(&services, was_active, run);
            return;
        }
        run.finish(
            Stage::Snapshot,
            StageStatus::Completed,
            Some(snapshot.manifest().summary()),
        );

        if self.check_interrupt(run) {
            self.release(snapshot);
            self.resume_service(&services, was_active, run);
            return;
        }

        // PULL
        run.start(Stage::Pull);
        let mut source = resolved.source.clone();
        let mut pulled = false;
        if !options.pull {
            run.finish(Stage::Pull, StageStatus::Skipped, Some("disabled".to_string()));
        } else if !source.has_vcs() {
            run.finish(
                Stage::Pull,
                StageStatus::Skipped,
                Some("source is not a checkout".to_string()),
            );
        } else {
            match Git::new(&self.runner, &options.commands.git).pull_ff_only(source.root()) {
                Ok(_) => {
                    source = SourceTree::inspect(&self.fs, source.root(), target.layout());
                    if let Err(e) = source.validate() {
                        run.finish(Stage::Pull, StageStatus::Aborted, Some(e.to_string()));
                        run.out.abort(AbortReason::Validation, e.to_string());
                        if resolved.mode == UpdateMode::SelfUpdate {
                            // the pull rewrote the installation itself
                            if !self.restore_stage(target, snapshot, &record, &resolved, run) {
                                return;
                            }
                        } else {
                            self.release(snapshot);
                        }
                        self.resume_service(&services, was_active, run);
                        return;
                    }
                    pulled = true;
                    run.finish(Stage::Pull, StageStatus::Completed, None);
                }
                Err(e) => {
                    warn!(error = %e, "pull failed; deploying the tree on disk");
                    run.finish(
                        Stage::Pull,
                        StageStatus::Warning,
                        Some(format!("{}; using local tree", e)),
                    );
                }
            }
        }

        if self.check_interrupt(run) {
            if resolved.mode == UpdateMode::SelfUpdate && pulled {
                if !self.restore_stage(target, snapshot, &record, &resolved, run) {
                    return;
                }
            } else {
                self.release(snapshot);
            }
            self.resume_service(&services, was_active, run);
            return;
        }

        // DEPLOY
        run.start(Stage::Deploy);
        let mut deploy_failed = false;
        match resolved.mode {
            UpdateMode::SelfUpdate => run.finish(
                Stage::Deploy,
                StageStatus::Skipped,
                Some("self-update: code already in place".to_string()),
            ),
            UpdateMode::ExternalUpdate => {
                match DeploymentExecutor::new(&self.fs).deploy(target, source.root()) {
                    Ok(report) => {
                        run.finish(Stage::Deploy, StageStatus::Completed, Some(report.summary()))
                    }
                    Err(e) => {
                        error!(error = %e, "deployment failed");
                        run.finish(Stage::Deploy, StageStatus::Failed, Some(e.to_string()));
                        run.out.fail(e.to_string());
                        deploy_failed = true;
                    }
                }
            }
        }

        // RESTORE
        if !self.restore_stage(target, snapshot, &record, &resolved, run) {
            return;
        }
        if deploy_failed {
            // deployment failed: the service stays down
            run.out.set_service_status(services.status());
            return;
        }

        // PERMISSIONS
        run.start(Stage::Permissions);
        let warnings = PermissionNormalizer::new(&self.fs, &self.runner, &options.commands.chown)
            .normalize(target, options.owner.as_ref());
        if warnings.is_empty() {
            run.finish(Stage::Permissions, StageStatus::Completed, None);
        } else {
            run.finish(Stage::Permissions, StageStatus::Warning, Some(warnings.join("; ")));
        }

        // DEPENDENCIES
        run.start(Stage::Dependencies);
        match DependencyInstaller::new(&self.fs, &self.runner).install(target) {
            Ok(outcome) if outcome.is_skip() => {
                run.finish(Stage::Dependencies, StageStatus::Warning, Some(outcome.detail()))
            }
            Ok(outcome) => {
                run.finish(Stage::Dependencies, StageStatus::Completed, Some(outcome.detail()))
            }
            Err(e) => {
                error!(error = %e, "dependency install failed");
                run.finish(Stage::Dependencies, StageStatus::Failed, Some(e.to_string()));
                run.out.fail(e.to_string());
            }
        }

        // SERVICE_RESTART
        run.start(Stage::ServiceRestart);
        match services.start() {
            None => {
                run.finish(
                    Stage::ServiceRestart,
                    StageStatus::Skipped,
                    Some("no service configured".to_string()),
                );
                run.out.set_service_status(ServiceStatus::NotManaged);
            }
            Some(Ok(())) => {
                let status = services.status();
                let service = services.service().unwrap_or_default();
                run.out.set_service_status(status);
                match status {
                    ServiceStatus::Stopped => {
                        let detail = format!("{} not active after start", service);
                        error!(%service, "service exited right after start");
                        run.finish(
                            Stage::ServiceRestart,
                            StageStatus::Failed,
                            Some(detail.clone()),
                        );
                        run.out.fail(detail);
                    }
                    ServiceStatus::Unknown => {
                        warn!(%service, "service started but its state could not be confirmed");
                        run.finish(
                            Stage::ServiceRestart,
                            StageStatus::Warning,
                            Some(format!("{} started, state unknown", service)),
                        );
                    }
                    _ => run.finish(
                        Stage::ServiceRestart,
                        StageStatus::Completed,
                        Some(format!("{} {}", service, status.label())),
                    ),
                }
            }
            Some(Err(e)) => {
                error!(error = %e, "service start failed");
                run.out.set_service_status(services.status());
                run.finish(Stage::ServiceRestart, StageStatus::Failed, Some(e.to_string()));
                run.out.fail(e.to_string());
            }
        }

        // PROXY_RESTART
        run.start(Stage::ProxyRestart);
        match services.restart_proxy() {
            None => run.finish(
                Stage::ProxyRestart,
                StageStatus::Skipped,
                Some("no proxy configured".to_string()),
            ),
            Some(Ok(())) => run.finish(
                Stage::ProxyRestart,
                StageStatus::Completed,
                services.proxy().map(|p| format!("restarted {}", p)),
            ),
            Some(Err(e)) => {
                warn!(error = %e, "proxy restart failed");
                run.finish(Stage::ProxyRestart, StageStatus::Warning, Some(e.to_string()));
            }
        }
    }

    /// Run RESTORE and settle the snapshot. Returns false when the run must
    /// stop here.
    fn restore_stage(
        &self,
        target: &InstallationTarget,
        snapshot: RuntimeSnapshot,
        record: &RecordState,
        resolved: &ResolvedSource,
        run: &mut Run<'_>,
    ) -> bool {
        run.start(Stage::Restore);
        let result = RestoreExecutor::new(&self.fs).restore(target, &snapshot, record, run.sink);
        match result {
            Ok(report) => {
                run.finish(Stage::Restore, StageStatus::Completed, Some(report.summary()));
                self.release(snapshot);
                self.write_record(target, resolved);
                true
            }
            Err(RestoreError::Guard(violation)) => {
                let err = InplaceError::DataLossPrevented {
                    path: target.root().join(&violation.relative),
                    reason: violation.reason,
                };
                let kept = snapshot.retain();
                run.finish(Stage::Restore, StageStatus::Aborted, Some(err.to_string()));
                run.out.abort(AbortReason::DataLoss, guard_message(&err));
                run.out.retain_snapshot(kept);
                run.out.set_service_status(ServiceStatus::Stopped);
                false
            }
            Err(e @ RestoreError::Io { .. }) => {
                error!(error = %e, "restore failed");
                let kept = snapshot.retain();
                run.finish(Stage::Restore, StageStatus::Failed, Some(e.to_string()));
                run.out.fail(format!(
                    "{}; runtime state kept at {}",
                    e,
                    kept.display()
                ));
                run.out.retain_snapshot(kept);
                run.out.set_service_status(ServiceStatus::Stopped);
                false
            }
        }
    }

    fn write_record(&self, target: &InstallationTarget, resolved: &ResolvedSource) {
        let mut record = InstallRecord::new(resolved.mode, resolved.source.root());
        for runtime in target.layout().runtime_paths() {
            if self.fs.has_content(&target.runtime_abs(runtime)) {
                record.runtime_present.insert(runtime.role);
            }
        }
        if let Err(e) = record.save(&self.fs, &target.record_path()) {
            warn!(error = %e, "could not write install record");
        }
    }

    fn release(&self, snapshot: RuntimeSnapshot) {
        let path = snapshot.path().to_path_buf();
        if let Err(e) = snapshot.release() {
            warn!(path = %path.display(), error = %e, "could not remove snapshot");
        }
    }

    /// Start the service again after an abort that touched nothing
    fn resume_service(&self, services: &ServiceController<'_>, was_active: bool, run: &mut Run<'_>) {
        if was_active {
            match services.start() {
                Some(Ok(())) => info!("service restarted after abort"),
                Some(Err(e)) => warn!(error = %e, "could not restart service after abort"),
                None => debug!("no service configured; nothing to restart after abort"),
            }
        }
        run.out.set_service_status(services.status());
    }

    fn check_interrupt(&self, run: &mut Run<'_>) -> bool {
        if !self.interrupted.load(Ordering::SeqCst) {
            return false;
        }
        warn!("interrupted before deployment");
        let err = InplaceError::Interrupted;
        run.out.abort(AbortReason::Interrupted, err.to_string());
        true
    }

    fn canonical_or_self(&self, path: &Path) -> PathBuf {
        if let Ok(canonical) = self.fs.canonicalize(path) {
            return canonical;
        }
        // not created yet: resolve the parent and keep the last component
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => self
                .fs
                .canonicalize(parent)
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf()),
            _ => path.to_path_buf(),
        }
    }
}

fn guard_message(err: &InplaceError) -> String {
    format!(
        "{}. Inspect the path; if the state was removed on purpose, delete the install record and rerun",
        err
    )
}

/// Per-run bookkeeping shared by the stage helpers
struct Run<'a> {
    out: OutcomeBuilder,
    sink: &'a dyn UpdateEventSink,
}

impl Run<'_> {
    fn start(&self, stage: Stage) {
        info!(%stage, "stage started");
        self.sink.on_event(UpdateEvent::StageStarted { stage });
    }

    fn finish(&mut self, stage: Stage, status: StageStatus, detail: Option<String>) {
        match status {
            StageStatus::Failed | StageStatus::Aborted => {
                error!(%stage, ?status, detail = detail.as_deref().unwrap_or(""), "stage ended")
            }
            StageStatus::Warning => {
                warn!(%stage, detail = detail.as_deref().unwrap_or(""), "stage ended with warning")
            }
            _ => info!(%stage, ?status, "stage ended"),
        }
        self.sink.on_event(UpdateEvent::StageFinished {
            stage,
            status,
            detail: detail.clone(),
        });
        self.out.record(stage, status, detail);
    }
}
