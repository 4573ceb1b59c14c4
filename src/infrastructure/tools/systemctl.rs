//! systemd service manager

use crate::domain::ports::{CommandError, CommandRunner, CommandSpec};

pub struct Systemctl<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> Systemctl<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn stop(&self, unit: &str) -> Result<(), CommandError> {
        self.runner.run_checked(&self.spec("stop", unit)).map(|_| ())
    }

    pub fn start(&self, unit: &str) -> Result<(), CommandError> {
        self.runner.run_checked(&self.spec("start", unit)).map(|_| ())
    }

    pub fn restart(&self, unit: &str) -> Result<(), CommandError> {
        self.runner
            .run_checked(&self.spec("restart", unit))
            .map(|_| ())
    }

    /// `is-active --quiet`: exit 0 means active, any other exit means not
    pub fn is_active(&self, unit: &str) -> Result<bool, CommandError> {
        let spec = CommandSpec::new(&self.program)
            .arg("is-active")
            .arg("--quiet")
            .arg(unit);
        Ok(self.runner.run(&spec)?.success())
    }

    fn spec(&self, verb: &str, unit: &str) -> CommandSpec {
        CommandSpec::new(&self.program).arg(verb).arg(unit)
    }
}
