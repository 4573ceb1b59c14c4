//! Installation layout: which paths are code and which are runtime state.
//!
//! The classification is static. Install and update both read it from the same
//! `Layout`, so a state path can never be treated as replaceable code.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InplaceError, InplaceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Dir,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeRole {
    Backend,
    Frontend,
    Scripts,
}

impl CodeRole {
    pub fn name(self) -> &'static str {
        match self {
            CodeRole::Backend => "backend",
            CodeRole::Frontend => "frontend",
            CodeRole::Scripts => "scripts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeRole {
    Data,
    Secrets,
    ClientConfig,
}

impl RuntimeRole {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeRole::Data => "data",
            RuntimeRole::Secrets => "secrets",
            RuntimeRole::ClientConfig => "client_config",
        }
    }
}

/// A replaceable subtree of the installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePath {
    pub role: CodeRole,
    pub relative: PathBuf,
    /// A source tree without this path is invalid.
    pub required: bool,
}

/// A path whose content must survive every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePath {
    pub role: RuntimeRole,
    pub relative: PathBuf,
    pub kind: PathKind,
}

/// Where a relative path falls in the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Runtime(RuntimeRole),
    Code(CodeRole),
    Unmanaged,
}

/// Static classification of an installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    code: Vec<CodePath>,
    runtime: Vec<RuntimePath>,
    log_file: PathBuf,
    dependency_env: PathBuf,
    manifest: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            code: vec![
                CodePath {
                    role: CodeRole::Backend,
                    relative: PathBuf::from("backend"),
                    required: true,
                },
                CodePath {
                    role: CodeRole::Frontend,
                    relative: PathBuf::from("frontend"),
                    required: true,
                },
                CodePath {
                    role: CodeRole::Scripts,
                    relative: PathBuf::from("scripts"),
                    required: false,
                },
            ],
            runtime: vec![
                RuntimePath {
                    role: RuntimeRole::Data,
                    relative: PathBuf::from("backend/data"),
                    kind: PathKind::Dir,
                },
                RuntimePath {
                    role: RuntimeRole::Secrets,
                    relative: PathBuf::from("backend/.env"),
                    kind: PathKind::File,
                },
                RuntimePath {
                    role: RuntimeRole::ClientConfig,
                    relative: PathBuf::from("frontend/config.js"),
                    kind: PathKind::File,
                },
            ],
            log_file: PathBuf::from("backend/app.log"),
            dependency_env: PathBuf::from("venv"),
            manifest: PathBuf::from("backend/requirements.txt"),
        }
    }
}

impl Layout {
    /// Build a layout from explicit parts and validate it.
    pub fn new(
        code: Vec<CodePath>,
        runtime: Vec<RuntimePath>,
        log_file: impl Into<PathBuf>,
        dependency_env: impl Into<PathBuf>,
        manifest: impl Into<PathBuf>,
    ) -> InplaceResult<Self> {
        let layout = Self {
            code,
            runtime,
            log_file: log_file.into(),
            dependency_env: dependency_env.into(),
            manifest: manifest.into(),
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn code_paths(&self) -> &[CodePath] {
        &self.code
    }

    pub fn runtime_paths(&self) -> &[RuntimePath] {
        &self.runtime
    }

    pub fn runtime_path(&self, role: RuntimeRole) -> Option<&RuntimePath> {
        self.runtime.iter().find(|p| p.role == role)
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn dependency_env(&self) -> &Path {
        &self.dependency_env
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// Classify a path relative to the installation root.
    ///
    /// Runtime paths win over the code subtree that contains them.
    pub fn classify(&self, relative: &Path) -> PathClass {
        if let Some(rt) = self
            .runtime
            .iter()
            .find(|rt| relative.starts_with(&rt.relative))
        {
            return PathClass::Runtime(rt.role);
        }
        if let Some(code) = self
            .code
            .iter()
            .find(|code| relative.starts_with(&code.relative))
        {
            return PathClass::Code(code.role);
        }
        PathClass::Unmanaged
    }

    pub fn validate(&self) -> InplaceResult<()> {
        if self.code.is_empty() {
            return Err(InplaceError::InvalidLayout(
                "at least one code path is required".to_string(),
            ));
        }

        let all = self
            .code
            .iter()
            .map(|c| &c.relative)
            .chain(self.runtime.iter().map(|r| &r.relative))
            .chain([&self.log_file, &self.dependency_env, &self.manifest]);
        for path in all {
            check_relative(path)?;
        }

        for (i, a) in self.code.iter().enumerate() {
            for b in self.code.iter().skip(i + 1) {
                if a.relative.starts_with(&b.relative) || b.relative.starts_with(&a.relative) {
                    return Err(InplaceError::InvalidLayout(format!(
                        "code paths '{}' and '{}' overlap",
                        a.relative.display(),
                        b.relative.display()
                    )));
                }
            }
        }

        for (i, a) in self.runtime.iter().enumerate() {
            for b in self.runtime.iter().skip(i + 1) {
                if a.relative.starts_with(&b.relative) || b.relative.starts_with(&a.relative) {
                    return Err(InplaceError::InvalidLayout(format!(
                        "runtime paths '{}' and '{}' overlap",
                        a.relative.display(),
                        b.relative.display()
                    )));
                }
            }
        }

        for rt in &self.runtime {
            if let Some(code) = self
                .code
                .iter()
                .find(|code| code.relative.starts_with(&rt.relative))
            {
                return Err(InplaceError::InvalidLayout(format!(
                    "runtime path '{}' would contain code path '{}'",
                    rt.relative.display(),
                    code.relative.display()
                )));
            }
        }

        Ok(())
    }
}

fn check_relative(path: &Path) -> InplaceResult<()> {
    if path.as_os_str().is_empty() {
        return Err(InplaceError::InvalidLayout("empty path".to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => {
                return Err(InplaceError::InvalidLayout(format!(
                    "'{}' must be relative to the installation root",
                    path.display()
                )))
            }
        }
    }
    Ok(())
}
