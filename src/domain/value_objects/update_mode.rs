//! Update mode value object

use serde::{Deserialize, Serialize};

/// How new code reaches the installation.
///
/// Decided once by the source resolver and handed to every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// The orchestrator runs from inside the installation; the installation is
    /// its own source and code is never copied.
    SelfUpdate,
    /// Code is copied from a separate source tree.
    ExternalUpdate,
}

impl UpdateMode {
    pub fn copies_code(self) -> bool {
        matches!(self, UpdateMode::ExternalUpdate)
    }

    pub fn label(self) -> &'static str {
        match self {
            UpdateMode::SelfUpdate => "self-update",
            UpdateMode::ExternalUpdate => "external-update",
        }
    }
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
