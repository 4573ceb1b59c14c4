//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{InplaceError, InplaceResult};

use super::types::Config;

pub use crate::domain::value_objects::ConfigWarning;

/// System-wide config location
pub const SYSTEM_CONFIG: &str = "/etc/inplace/config.toml";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> InplaceResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| InplaceError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_with_warnings(&content, path)
}

fn parse_with_warnings(content: &str, path: &Path) -> InplaceResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| InplaceError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| {
            let leaf = key.rsplit('.').next().unwrap_or(key.as_str()).to_string();
            ConfigWarning {
                line: find_line_number(content, &leaf),
                suggestion: suggest_key(&leaf),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Candidate config files, most specific first
pub fn config_candidates(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    if let Some(path) = env_path {
        return vec![path];
    }
    let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("inplace").join("config.toml"));
    }
    candidates
}

/// Load the first config that applies, or defaults, then apply environment
/// overrides.
///
/// An explicit path (flag or `INPLACE_CONFIG`) must exist; the standard
/// locations are optional.
pub fn discover(explicit: Option<&Path>) -> InplaceResult<(Config, Vec<ConfigWarning>)> {
    let env_path = std::env::var_os("INPLACE_CONFIG").map(PathBuf::from);
    let must_exist = explicit.is_some() || env_path.is_some();

    for candidate in config_candidates(explicit, env_path) {
        if must_exist || candidate.exists() {
            debug!(path = %candidate.display(), "loading config");
            let (config, warnings) = load_with_warnings(&candidate)?;
            return Ok((with_env_overrides(config), warnings));
        }
    }
    Ok((with_env_overrides(Config::default()), Vec::new()))
}

/// Apply environment variable overrides (INPLACE_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

pub(crate) fn apply_overrides<F>(mut config: Config, var: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(root) = var("INPLACE_TARGET").filter(|v| !v.is_empty()) {
        config.install.root = Some(PathBuf::from(root));
    }

    // empty values are meaningful here: they disable the unit
    if let Some(name) = var("INPLACE_SERVICE") {
        config.service.name = name;
    }
    if let Some(proxy) = var("INPLACE_PROXY_SERVICE") {
        config.service.proxy = proxy;
    }

    if let Some(user) = var("INPLACE_SERVICE_USER") {
        config.service.user = Some(user);
    }

    if let Some(val) = var("INPLACE_PULL") {
        let val = val.to_lowercase();
        config.source.pull = !matches!(val.as_str(), "false" | "0" | "no" | "off");
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| {
            let trimmed = line.trim_start();
            trimmed.starts_with(needle) || trimmed.starts_with(&format!("[{}", needle))
        })
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "install",
        "root",
        "layout",
        "backend",
        "frontend",
        "scripts",
        "data",
        "secrets",
        "client_config",
        "log_file",
        "env",
        "manifest",
        "service",
        "name",
        "proxy",
        "user",
        "group",
        "source",
        "pull",
        "commands",
        "systemctl",
        "git",
        "chown",
        "snapshot",
        "dir",
        "output",
        "color",
        "unicode",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 && dist > 0 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
pub(super) fn parse_for_test(content: &str) -> InplaceResult<(Config, Vec<ConfigWarning>)> {
    parse_with_warnings(content, Path::new("config.toml"))
}
