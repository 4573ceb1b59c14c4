use super::*;
use crate::domain::entities::{
    AbortReason, DeploymentOutcome, InstallRecord, InstallationTarget, Layout, RecordState,
    RunStatus, RuntimeRole, ServiceStatus,
};
use crate::domain::ports::{
    CommandError, CommandOutput, CommandRunner, CommandSpec, FileSystem, FsError, FsResult,
    UpdateEvent, UpdateEventSink,
};
use crate::domain::value_objects::{ContentHash, Stage, StageStatus, UpdateMode};
use crate::infrastructure::fs::LocalFs;
use crate::infrastructure::lock::RunLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Records every command and plays the part of systemctl
struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    active: Mutex<bool>,
    fail_on: Vec<String>,
    /// `start` exits 0 but the unit dies right away
    dies_on_start: bool,
}

impl ScriptedRunner {
    fn running() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            active: Mutex::new(true),
            fail_on: Vec::new(),
            dies_on_start: false,
        }
    }

    fn dying_on_start(mut self) -> Self {
        self.dies_on_start = true;
        self
    }

    fn failing(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn is_active(&self) -> bool {
        *self.active.lock().unwrap()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = spec.display();
        self.calls.lock().unwrap().push(line.clone());

        if self.fail_on.iter().any(|f| line.contains(f.as_str())) {
            return Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("scripted failure: {}", line),
            });
        }

        if spec.program == "systemctl" {
            let mut active = self.active.lock().unwrap();
            match spec.args.first().map(String::as_str) {
                Some("stop") => *active = false,
                Some("start") => *active = !self.dies_on_start,
                Some("is-active") => {
                    return Ok(CommandOutput {
                        code: Some(if *active { 0 } else { 3 }),
                        ..Default::default()
                    })
                }
                _ => {}
            }
        }
        Ok(CommandOutput {
            code: Some(0),
            ..Default::default()
        })
    }
}

impl CommandRunner for &ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (*self).run(spec)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// Copies into a snapshot holding directory silently write nothing
    EmptySnapshot,
    /// Copies into the staging area fail
    StagingFails,
}

/// `LocalFs` with one injected fault
struct FaultyFs {
    inner: LocalFs,
    fault: Fault,
}

impl FaultyFs {
    fn new(fault: Fault) -> Self {
        Self {
            inner: LocalFs::new(),
            fault,
        }
    }

    fn in_component(path: &Path, prefix: &str) -> bool {
        path.components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with(prefix))
    }
}

impl FileSystem for FaultyFs {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
    fn has_content(&self, path: &Path) -> bool {
        self.inner.has_content(path)
    }
    fn read(&self, path: &Path) -> FsResult<String> {
        self.inner.read(path)
    }
    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        self.inner.write(path, content)
    }
    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.inner.create_dir_all(path)
    }
    fn copy_tree(&self, from: &Path, to: &Path) -> FsResult<()> {
        match self.fault {
            Fault::EmptySnapshot if Self::in_component(to, "snapshot-") => Ok(()),
            Fault::StagingFails if Self::in_component(to, "staging") => {
                Err(FsError::Other("no space left on device".to_string()))
            }
            _ => self.inner.copy_tree(from, to),
        }
    }
    fn remove_tree(&self, path: &Path) -> FsResult<()> {
        self.inner.remove_tree(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        self.inner.rename(from, to)
    }
    fn hash_tree(&self, path: &Path) -> FsResult<ContentHash> {
        self.inner.hash_tree(path)
    }
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        self.inner.canonicalize(path)
    }
    fn ensure_owner_writable(&self, path: &Path) -> FsResult<()> {
        self.inner.ensure_owner_writable(path)
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<UpdateEvent>>,
}

impl UpdateEventSink for RecordingSink {
    fn on_event(&self, event: UpdateEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Site {
    _dir: TempDir,
    root: PathBuf,
    source: PathBuf,
    origin: PathBuf,
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// An installation with live state and a newer source tree next to it
fn site() -> Site {
    let dir = tempdir().unwrap();
    let root = dir.path().join("app");
    let source = dir.path().join("src");
    let origin = dir.path().join("src/scripts");

    write(&root.join("backend/main.py"), "v1");
    write(&root.join("backend/data/users.json"), "[\"alice\"]");
    write(&root.join("backend/.env"), "SECRET=live");
    write(&root.join("frontend/index.html"), "<v1>");
    write(&root.join("frontend/config.js"), "window.API='https://prod'");
    write(&root.join("backend/requirements.txt"), "fastapi\n");
    write(&root.join("venv/bin/pip"), "#!/bin/sh");

    write(&source.join("backend/main.py"), "v2");
    write(&source.join("backend/data/seed.json"), "[]");
    write(&source.join("backend/.env"), "SECRET=example");
    write(&source.join("frontend/index.html"), "<v2>");
    write(&source.join("frontend/config.js"), "window.API='http://localhost'");
    write(&source.join("scripts/update.sh"), "#!/bin/sh");
    write(&source.join("backend/requirements.txt"), "fastapi\nuvicorn\n");

    Site {
        _dir: dir,
        root,
        source,
        origin,
    }
}

fn options(site: &Site) -> UpdateOptions {
    UpdateOptions::new(&site.root, &site.origin)
        .with_service("app")
        .with_proxy("nginx")
}

fn stage_status(outcome: &DeploymentOutcome, stage: Stage) -> Option<StageStatus> {
    outcome.stage(stage).map(|r| r.status)
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[test]
fn external_update_replaces_code_and_keeps_state() {
    let site = site();
    let runner = ScriptedRunner::running();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Success, "{:?}", outcome);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.mode, Some(UpdateMode::ExternalUpdate));
    assert_eq!(read(&site.root.join("backend/main.py")), "v2");
    assert_eq!(read(&site.root.join("frontend/index.html")), "<v2>");
    assert_eq!(read(&site.root.join("backend/data/users.json")), "[\"alice\"]");
    assert!(!site.root.join("backend/data/seed.json").exists());
    assert_eq!(read(&site.root.join("backend/.env")), "SECRET=live");
    assert_eq!(
        read(&site.root.join("frontend/config.js")),
        "window.API='https://prod'"
    );
    assert_eq!(outcome.service_status, ServiceStatus::Running);
    assert!(runner.is_active());
}

#[test]
fn snapshot_is_removed_after_success() {
    let site = site();
    let runner = ScriptedRunner::running();

    UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    let leftovers = std::fs::read_dir(site.root.join(".inplace"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("snapshot-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn stages_run_in_order_and_service_is_stopped_first() {
    let site = site();
    let runner = ScriptedRunner::running();
    let sink = Arc::new(RecordingSink::default());

    UpdateUseCase::new(LocalFs::new(), &runner)
        .execute_with_events(&options(&site), sink.clone());

    let started: Vec<Stage> = sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            UpdateEvent::StageStarted { stage } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(started, Stage::ALL.to_vec());

    let calls = runner.calls();
    let stop = calls.iter().position(|c| c == "systemctl stop app").unwrap();
    let start = calls.iter().position(|c| c == "systemctl start app").unwrap();
    assert!(stop < start);
    assert_eq!(calls.last().unwrap(), "systemctl restart nginx");
}

#[test]
fn first_install_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("app");
    let source = dir.path().join("src");
    write(&source.join("backend/main.py"), "v1");
    write(&source.join("backend/data/seed.json"), "[]");
    write(&source.join("frontend/index.html"), "<v1>");
    let runner = ScriptedRunner::running();
    let opts = UpdateOptions::new(&root, dir.path().join("elsewhere")).with_source(&source);

    let first = UpdateUseCase::new(LocalFs::new(), &runner).execute(&opts);
    assert!(first.is_success(), "{:?}", first);
    let data = root.join("backend/data");
    assert!(data.is_dir());
    assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);

    // state written by the running app survives the next run
    write(&data.join("users.json"), "[\"bob\"]");
    let second = UpdateUseCase::new(LocalFs::new(), &runner).execute(&opts);
    assert!(second.is_success(), "{:?}", second);
    assert_eq!(read(&data.join("users.json")), "[\"bob\"]");
}

#[test]
fn successful_run_writes_install_record() {
    let site = site();
    let runner = ScriptedRunner::running();

    UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    let fs = LocalFs::new();
    let target = InstallationTarget::new(&site.root, Layout::default());
    match RecordState::load(&fs, &target.record_path()) {
        RecordState::Loaded(record) => {
            assert!(record.runtime_present.contains(&RuntimeRole::Data));
            assert!(record.runtime_present.contains(&RuntimeRole::Secrets));
            assert_eq!(record.mode, UpdateMode::ExternalUpdate);
        }
        other => panic!("expected a record, got {:?}", other),
    }
}

#[test]
fn self_update_leaves_code_and_state_untouched() {
    let site = site();
    let runner = ScriptedRunner::running();
    write(&site.root.join("scripts/update.sh"), "#!/bin/sh");
    let data_file = site.root.join("backend/data/users.json");
    let main = site.root.join("backend/main.py");
    let before_data = std::fs::metadata(&data_file).unwrap().modified().unwrap();
    let before_main = std::fs::metadata(&main).unwrap().modified().unwrap();

    let opts = UpdateOptions::new(&site.root, site.root.join("scripts"))
        .with_source(&site.source)
        .with_service("app");
    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&opts);

    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(outcome.mode, Some(UpdateMode::SelfUpdate));
    assert_eq!(stage_status(&outcome, Stage::Deploy), Some(StageStatus::Skipped));
    assert_eq!(read(&main), "v1");
    assert_eq!(
        std::fs::metadata(&data_file).unwrap().modified().unwrap(),
        before_data
    );
    assert_eq!(std::fs::metadata(&main).unwrap().modified().unwrap(), before_main);
    assert!(outcome
        .stage(Stage::Resolve)
        .and_then(|r| r.detail.as_deref())
        .unwrap()
        .contains("ignored"));
}

// ---------------------------------------------------------------------------
// Aborts
// ---------------------------------------------------------------------------

#[test]
fn empty_snapshot_aborts_before_touching_code() {
    let site = site();
    let runner = ScriptedRunner::running();

    let outcome =
        UpdateUseCase::new(FaultyFs::new(Fault::EmptySnapshot), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Aborted);
    assert_eq!(outcome.abort_reason, Some(AbortReason::DataLoss));
    assert_eq!(outcome.exit_code(), 3);
    assert_eq!(outcome.failed_stage, Some(Stage::Snapshot));
    assert_eq!(read(&site.root.join("backend/main.py")), "v1");
    assert_eq!(read(&site.root.join("backend/data/users.json")), "[\"alice\"]");
    assert!(outcome.stage(Stage::Deploy).is_none());
    // the service goes back to what it was doing
    assert!(runner.is_active());
}

#[test]
fn missing_state_that_record_saw_aborts() {
    let site = site();
    let runner = ScriptedRunner::running();
    let fs = LocalFs::new();
    let target = InstallationTarget::new(&site.root, Layout::default());
    let mut record = InstallRecord::new(UpdateMode::ExternalUpdate, &site.source);
    record.runtime_present.insert(RuntimeRole::Data);
    record.save(&fs, &target.record_path()).unwrap();
    std::fs::remove_dir_all(site.root.join("backend/data")).unwrap();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.abort_reason, Some(AbortReason::DataLoss));
    assert_eq!(outcome.exit_code(), 3);
    assert!(outcome.error.as_deref().unwrap().contains("backend/data"));
    assert_eq!(read(&site.root.join("backend/main.py")), "v1");
}

#[test]
fn held_lock_exits_without_side_effects() {
    let site = site();
    let runner = ScriptedRunner::running();
    let target = InstallationTarget::new(&site.root, Layout::default());
    let _held = RunLock::acquire(&target.lock_path(), &site.root).unwrap();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.abort_reason, Some(AbortReason::Locked));
    assert_eq!(outcome.exit_code(), 4);
    assert!(runner.calls().is_empty());
    assert_eq!(read(&site.root.join("backend/main.py")), "v1");
}

#[test]
fn invalid_source_is_a_validation_abort() {
    let site = site();
    std::fs::remove_dir_all(site.source.join("frontend")).unwrap();
    let runner = ScriptedRunner::running();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.abort_reason, Some(AbortReason::Validation));
    assert_eq!(outcome.exit_code(), 2);
    assert!(outcome.error.as_deref().unwrap().contains("frontend"));
    assert!(runner.calls().is_empty());
}

#[test]
fn interrupt_before_deploy_restarts_service() {
    let site = site();
    let runner = ScriptedRunner::running();
    let flag = Arc::new(AtomicBool::new(true));

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner)
        .with_interrupt(flag)
        .execute(&options(&site));

    assert_eq!(outcome.abort_reason, Some(AbortReason::Interrupted));
    assert_eq!(outcome.exit_code(), 130);
    assert_eq!(read(&site.root.join("backend/main.py")), "v1");
    assert!(runner.is_active());
}

#[test]
fn interrupt_without_managed_service_starts_nothing() {
    let site = site();
    let runner = ScriptedRunner::running();
    let opts = UpdateOptions::new(&site.root, &site.origin);

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner)
        .with_interrupt(Arc::new(AtomicBool::new(true)))
        .execute(&opts);

    assert_eq!(outcome.abort_reason, Some(AbortReason::Interrupted));
    assert_eq!(outcome.service_status, ServiceStatus::NotManaged);
    assert!(!runner.calls().iter().any(|c| c.starts_with("systemctl")));
}

// ---------------------------------------------------------------------------
// Degraded runs
// ---------------------------------------------------------------------------

#[test]
fn proxy_failure_is_partial_success() {
    let site = site();
    let runner = ScriptedRunner::running().failing("restart nginx");

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Partial);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        stage_status(&outcome, Stage::ProxyRestart),
        Some(StageStatus::Warning)
    );
    assert_eq!(outcome.service_status, ServiceStatus::Running);
}

#[test]
fn service_that_dies_after_start_fails_the_run() {
    let site = site();
    let runner = ScriptedRunner::running().dying_on_start();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Failed, "{:?}", outcome);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.failed_stage, Some(Stage::ServiceRestart));
    assert_eq!(outcome.service_status, ServiceStatus::Stopped);
    let restart = outcome.stage(Stage::ServiceRestart).unwrap();
    assert_eq!(restart.status, StageStatus::Failed);
    assert_eq!(restart.detail.as_deref(), Some("app not active after start"));
    // code and state are already in place
    assert_eq!(read(&site.root.join("backend/main.py")), "v2");
    assert_eq!(read(&site.root.join("backend/.env")), "SECRET=live");
}

#[test]
fn application_log_survives_external_update() {
    let site = site();
    write(&site.root.join("backend/app.log"), "2026-10-01 important history\n");
    let runner = ScriptedRunner::running();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Success, "{:?}", outcome);
    assert_eq!(
        read(&site.root.join("backend/app.log")),
        "2026-10-01 important history\n"
    );
    assert_eq!(read(&site.root.join("backend/main.py")), "v2");
}

#[test]
fn pull_failure_deploys_local_tree() {
    let site = site();
    std::fs::create_dir_all(site.source.join(".git")).unwrap();
    let runner = ScriptedRunner::running().failing("pull --ff-only");

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Partial);
    assert_eq!(stage_status(&outcome, Stage::Pull), Some(StageStatus::Warning));
    assert_eq!(read(&site.root.join("backend/main.py")), "v2");
}

#[test]
fn pull_is_skipped_without_checkout() {
    let site = site();
    let runner = ScriptedRunner::running();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(stage_status(&outcome, Stage::Pull), Some(StageStatus::Skipped));
    assert!(!runner.calls().iter().any(|c| c.starts_with("git")));
}

#[test]
fn deploy_failure_still_restores_state() {
    let site = site();
    let runner = ScriptedRunner::running();

    let outcome =
        UpdateUseCase::new(FaultyFs::new(Fault::StagingFails), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.failed_stage, Some(Stage::Deploy));
    assert_eq!(stage_status(&outcome, Stage::Restore), Some(StageStatus::Completed));
    assert_eq!(read(&site.root.join("backend/main.py")), "v1");
    assert_eq!(read(&site.root.join("backend/data/users.json")), "[\"alice\"]");
    assert!(!runner.is_active());
    assert!(outcome.stage(Stage::ServiceRestart).is_none());
}

#[test]
fn dependency_failure_still_starts_service() {
    let site = site();
    let runner = ScriptedRunner::running().failing("pip install");

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(Stage::Dependencies));
    assert_eq!(
        stage_status(&outcome, Stage::ServiceRestart),
        Some(StageStatus::Completed)
    );
    assert!(runner.is_active());
}

#[test]
fn missing_venv_is_a_warning() {
    let site = site();
    std::fs::remove_dir_all(site.root.join("venv")).unwrap();
    let runner = ScriptedRunner::running();

    let outcome = UpdateUseCase::new(LocalFs::new(), &runner).execute(&options(&site));

    assert_eq!(outcome.status, RunStatus::Partial);
    let deps = outcome.stage(Stage::Dependencies).unwrap();
    assert!(deps.detail.as_deref().unwrap().contains("no dependency environment"));
}

#[test]
fn resolve_reports_ignored_source_in_self_update() {
    let site = site();
    write(&site.root.join("scripts/update.sh"), "#!/bin/sh");
    let runner = ScriptedRunner::running();
    let opts = UpdateOptions::new(&site.root, site.root.join("scripts")).with_source(&site.source);

    let resolved = UpdateUseCase::new(LocalFs::new(), &runner)
        .resolve(&opts)
        .unwrap();

    assert_eq!(resolved.mode, UpdateMode::SelfUpdate);
    assert!(resolved.ignored_source.is_some());
}
