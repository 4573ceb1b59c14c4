//! Version-control pull

use std::path::Path;

use crate::domain::ports::{CommandError, CommandOutput, CommandRunner, CommandSpec};

pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// `git -C <dir> pull --ff-only`
    pub fn pull_ff_only(&self, dir: &Path) -> Result<CommandOutput, CommandError> {
        let spec = CommandSpec::new(&self.program)
            .arg("-C")
            .path_arg(dir)
            .arg("pull")
            .arg("--ff-only");
        self.runner.run_checked(&spec)
    }
}
