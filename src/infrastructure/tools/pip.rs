//! Dependency installer for a Python virtual environment

use std::path::{Path, PathBuf};

use crate::domain::ports::{CommandError, CommandOutput, CommandRunner, CommandSpec};

pub struct Pip<'a> {
    runner: &'a dyn CommandRunner,
    program: PathBuf,
}

impl<'a> Pip<'a> {
    /// Use the `pip` that lives inside `env`
    pub fn in_env(runner: &'a dyn CommandRunner, env: &Path) -> Self {
        Self {
            runner,
            program: Self::executable(env),
        }
    }

    pub fn executable(env: &Path) -> PathBuf {
        if cfg!(windows) {
            env.join("Scripts").join("pip.exe")
        } else {
            env.join("bin").join("pip")
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `pip install -r <manifest>`
    pub fn install_requirements(&self, manifest: &Path) -> Result<CommandOutput, CommandError> {
        let spec = CommandSpec::new(self.program.display().to_string())
            .arg("install")
            .arg("-r")
            .path_arg(manifest);
        self.runner.run_checked(&spec)
    }
}
