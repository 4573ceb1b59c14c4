//! Ownership changes

use std::path::Path;

use crate::domain::ports::{CommandError, CommandRunner, CommandSpec};

pub struct Chown<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> Chown<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// `chown [-R] <owner> <path>`; `owner` is `user` or `user:group`
    pub fn apply(&self, owner: &str, path: &Path, recursive: bool) -> Result<(), CommandError> {
        let mut spec = CommandSpec::new(&self.program);
        if recursive {
            spec = spec.arg("-R");
        }
        let spec = spec.arg(owner).path_arg(path);
        self.runner.run_checked(&spec).map(|_| ())
    }
}
