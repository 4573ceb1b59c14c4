//! Test environment builder for isolated inplace testing.
//!
//! Provides `TestEnv` - a temp directory holding an installation, a release
//! tree to deploy from, a stub `systemctl` and a config file wiring them
//! together, plus helpers to run the inplace binary against it.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use super::fixtures::*;

/// Environment variables that must not leak in from the developer's shell
const AMBIENT_VARS: &[&str] = &[
    "INPLACE_CONFIG",
    "INPLACE_TARGET",
    "INPLACE_SERVICE",
    "INPLACE_PROXY_SERVICE",
    "INPLACE_SERVICE_USER",
    "INPLACE_PULL",
    "INPLACE_LOG",
    "GITHUB_ACTIONS",
];

/// Result of running an inplace CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as NDJSON
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("not NDJSON ({e}): {l}\n\n{}", self.stdout))
            })
            .collect()
    }
}

/// Isolated installation plus release tree.
pub struct TestEnv {
    pub dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// A running installation at `install/` and a new release at `release/`
    pub fn new() -> Self {
        let env = Self::fresh();
        env.write_install("backend/main.py", INSTALLED_BACKEND);
        env.write_install("backend/requirements.txt", REQUIREMENTS);
        env.write_install("backend/data/users.json", LIVE_USERS);
        env.write_install("backend/.env", LIVE_SECRETS);
        env.write_install("frontend/index.html", "<h1>v1</h1>\n");
        env.write_install("frontend/config.js", LIVE_CLIENT_CONFIG);
        env.write_install("scripts/update.sh", "#!/bin/sh\n");
        env.write_executable(&env.install_path("venv/bin/pip"), PIP_STUB);
        env.set_active("app");
        env.set_active("nginx");
        env
    }

    /// A release tree and an empty installation root
    pub fn fresh() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let env = Self {
            dir,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_inplace")),
        };

        std::fs::create_dir_all(env.install_root()).expect("create install root");
        env.write_release("backend/main.py", RELEASE_BACKEND);
        env.write_release("backend/requirements.txt", REQUIREMENTS);
        env.write_release("backend/data/seed.json", "[]\n");
        env.write_release("backend/.env", "DATABASE_URL=sqlite://dev\n");
        env.write_release("frontend/index.html", "<h1>v2</h1>\n");
        env.write_release("frontend/config.js", RELEASE_CLIENT_CONFIG);
        env.write_release("scripts/update.sh", "#!/bin/sh\n# v2\n");

        env.write_executable(&env.tools_path("systemctl"), SYSTEMCTL_STUB);
        env.write_config("");
        env
    }

    pub fn install_root(&self) -> PathBuf {
        self.dir.path().join("install")
    }

    pub fn release_root(&self) -> PathBuf {
        self.dir.path().join("release")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn install_path(&self, relative: &str) -> PathBuf {
        self.install_root().join(relative)
    }

    pub fn release_path(&self, relative: &str) -> PathBuf {
        self.release_root().join(relative)
    }

    fn tools_path(&self, relative: &str) -> PathBuf {
        self.dir.path().join("tools").join(relative)
    }

    /// Rewrite config.toml; `extra` is appended after the generated sections
    pub fn write_config(&self, extra: &str) {
        let config = format!(
            "[install]\nroot = '{}'\n\n[service]\nname = \"app\"\nproxy = \"nginx\"\n\n[commands]\nsystemctl = '{}'\n\n{}",
            self.install_root().display(),
            self.tools_path("systemctl").display(),
            extra
        );
        std::fs::write(self.config_path(), config).expect("write config");
    }

    pub fn write_install(&self, relative: &str, content: &str) {
        write_file(&self.install_path(relative), content);
    }

    pub fn write_release(&self, relative: &str, content: &str) {
        write_file(&self.release_path(relative), content);
    }

    pub fn read_install(&self, relative: &str) -> String {
        std::fs::read_to_string(self.install_path(relative))
            .unwrap_or_else(|e| panic!("Failed to read install file {}: {}", relative, e))
    }

    fn write_executable(&self, path: &Path, content: &str) {
        write_file(path, content);
        let mut perms = std::fs::metadata(path).expect("stat stub").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).expect("chmod stub");
    }

    /// Mark a unit as running in the stub service manager
    pub fn set_active(&self, unit: &str) {
        write_file(&self.tools_path(&format!("{unit}.active")), "");
    }

    pub fn is_active(&self, unit: &str) -> bool {
        self.tools_path(&format!("{unit}.active")).exists()
    }

    /// Make every systemctl verb on `unit` fail
    pub fn fail_unit(&self, unit: &str) {
        write_file(&self.tools_path(&format!("{unit}.fail")), "");
    }

    /// systemctl invocations, oldest first
    pub fn systemctl_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.tools_path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Run inplace with the generated config
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.dir.path()).args(args);
        for key in AMBIENT_VARS {
            cmd.env_remove(key);
        }
        cmd.env("INPLACE_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env("TERM", "dumb");
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute inplace");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
