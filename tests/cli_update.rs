#![cfg(unix)]

mod common;

use common::*;

fn update(env: &TestEnv) -> TestResult {
    let release = env.release_root();
    env.run(&["update", release.to_str().unwrap(), "--yes"])
}

#[test]
fn update_replaces_code_and_keeps_runtime_state() {
    let env = TestEnv::new();

    let result = update(&env);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert_output_contains!(result, "Update Complete");
    assert_file_eq!(env, "backend/main.py", RELEASE_BACKEND);
    assert_file_eq!(env, "backend/data/users.json", LIVE_USERS);
    assert_file_eq!(env, "backend/.env", LIVE_SECRETS);
    assert_file_eq!(env, "frontend/config.js", LIVE_CLIENT_CONFIG);
    assert_file_eq!(env, "frontend/index.html", "<h1>v2</h1>\n");
}

#[test]
fn update_does_not_merge_release_data_into_live_state() {
    let env = TestEnv::new();

    let result = update(&env);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(!env.install_path("backend/data/seed.json").exists());
}

#[test]
fn update_restarts_service_and_proxy() {
    let env = TestEnv::new();

    let result = update(&env);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let calls = env.systemctl_calls();
    let stop = calls.iter().position(|c| c == "stop app").expect("app stopped");
    let start = calls.iter().position(|c| c == "start app").expect("app started");
    let proxy = calls
        .iter()
        .position(|c| c == "restart nginx")
        .expect("proxy restarted");
    assert!(stop < start && start < proxy, "{:?}", calls);
    assert!(env.is_active("app"));
}

#[test]
fn update_leaves_no_snapshot_behind() {
    let env = TestEnv::new();

    let result = update(&env);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let meta = env.install_path(".inplace");
    assert!(meta.join("record.json").exists());
    let leftovers: Vec<_> = list_all_files(&meta)
        .into_iter()
        .filter(|f| !f.ends_with("record.json") && !f.ends_with("lock"))
        .collect();
    assert!(leftovers.is_empty(), "snapshot left behind: {:?}", leftovers);
}

#[test]
fn proxy_failure_is_a_partial_success() {
    let env = TestEnv::new();
    env.fail_unit("nginx");

    let result = update(&env);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert_output_contains!(result, "with warnings");
    assert_file_eq!(env, "backend/main.py", RELEASE_BACKEND);
}

#[test]
fn service_start_failure_fails_the_run() {
    let env = TestEnv::new();
    env.fail_unit("app");

    let result = update(&env);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert_output_contains!(result, "Update Failed");
    // state was still restored before the start attempt
    assert_file_eq!(env, "backend/data/users.json", LIVE_USERS);
}

#[test]
fn first_install_into_empty_root_succeeds_with_warnings() {
    let env = TestEnv::fresh();

    let result = update(&env);

    // no dependency environment yet
    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert_output_contains!(result, "with warnings");
    assert_file_eq!(env, "backend/main.py", RELEASE_BACKEND);
    assert!(!env.install_path("backend/data/seed.json").exists());
}

#[test]
fn missing_state_after_a_recorded_run_aborts_with_data_loss() {
    let env = TestEnv::new();
    let first = update(&env);
    assert_eq!(first.exit_code, 0, "{}", first.combined_output());

    std::fs::remove_dir_all(env.install_path("backend/data")).unwrap();
    env.write_release("backend/main.py", "print('v3')\n");
    let second = update(&env);

    assert_eq!(second.exit_code, 3, "{}", second.combined_output());
    assert_file_eq!(env, "backend/main.py", RELEASE_BACKEND);
    assert!(env.is_active("app"), "service should be resumed after the abort");
}

#[test]
fn invalid_source_is_a_validation_error() {
    let env = TestEnv::new();
    std::fs::remove_dir_all(env.release_path("frontend")).unwrap();

    let result = update(&env);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert_file_eq!(env, "backend/main.py", INSTALLED_BACKEND);
    assert!(env.systemctl_calls().iter().all(|c| !c.starts_with("stop")));
}

#[test]
fn missing_install_root_is_a_validation_error() {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "[service]\nname = \"app\"\n").unwrap();
    let release = env.release_root();

    let result = env.run(&["update", release.to_str().unwrap(), "--yes"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert_output_contains!(result, "--target");
}

#[test]
fn target_flag_overrides_config() {
    let env = TestEnv::new();
    let other = env.dir.path().join("other");
    std::fs::create_dir_all(&other).unwrap();
    let release = env.release_root();

    let result = env.run(&[
        "update",
        release.to_str().unwrap(),
        "--target",
        other.to_str().unwrap(),
        "--yes",
    ]);

    assert!(result.exit_code == 0, "{}", result.combined_output());
    assert_eq!(
        std::fs::read_to_string(other.join("backend/main.py")).unwrap(),
        RELEASE_BACKEND
    );
    assert_file_eq!(env, "backend/main.py", INSTALLED_BACKEND);
}

#[test]
fn update_is_the_default_command() {
    let env = TestEnv::new();
    let release = env.release_root();

    let result = env.run(&[release.to_str().unwrap(), "--yes"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert_file_eq!(env, "backend/main.py", RELEASE_BACKEND);
}

#[test]
fn empty_service_flag_skips_service_management() {
    let env = TestEnv::new();
    let release = env.release_root();

    let result = env.run(&[
        "update",
        release.to_str().unwrap(),
        "--service",
        "",
        "--proxy",
        "",
        "--yes",
    ]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(env.systemctl_calls().is_empty(), "{:?}", env.systemctl_calls());
}

#[test]
fn json_update_streams_events_and_a_report() {
    let env = TestEnv::new();
    let release = env.release_root();

    let result = env.run(&["--json", "update", release.to_str().unwrap(), "--yes"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let events = result.events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["event"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(kinds.first(), Some(&"stage_start"));
    assert!(kinds.contains(&"start"));
    assert!(kinds.contains(&"path_captured"));
    assert!(kinds.contains(&"path_restored"));
    assert_eq!(kinds.iter().filter(|k| **k == "stage_end").count(), 11);

    let complete = events.iter().find(|e| e["event"] == "complete").unwrap();
    assert_eq!(complete["exit_code"], 0);

    let report = events.last().unwrap();
    assert_eq!(report["event"], "report");
    assert_eq!(report["command"], "update");
    assert_eq!(report["status"], "success");
}

#[test]
fn json_validation_failure_reports_exit_code() {
    let env = TestEnv::new();
    std::fs::remove_dir_all(env.release_path("backend")).unwrap();
    let release = env.release_root();

    let result = env.run(&["--json", "update", release.to_str().unwrap()]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    let report = result.events().pop().unwrap();
    assert_eq!(report["status"], "aborted");
}
