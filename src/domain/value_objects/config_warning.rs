//! Configuration warning value object.

use std::path::PathBuf;

/// Non-fatal configuration warning surfaced to CLI users.
///
/// Raised while loading a config file, for example for an unknown key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the unknown key (`service.nmae`)
    pub key: String,
    pub file: PathBuf,
    /// 1-indexed line, if the key could be found
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl ConfigWarning {
    pub fn message(&self) -> String {
        let location = match self.line {
            Some(line) => format!("{}:{}", self.file.display(), line),
            None => self.file.display().to_string(),
        };
        match &self.suggestion {
            Some(s) => format!("unknown key '{}' in {} (did you mean '{}'?)", self.key, location, s),
            None => format!("unknown key '{}' in {}", self.key, location),
        }
    }
}
