//! Dependency manifest (pip requirements format)
//!
//! Only the flat subset is understood: one requirement per line. Options
//! (`-r other.txt`, `--index-url ...`) and comments are skipped.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    pub requirements: Vec<Requirement>,
    /// Option lines that were not interpreted
    pub skipped_options: usize,
}

impl DependencyManifest {
    pub fn parse(content: &str) -> Self {
        let mut manifest = DependencyManifest::default();
        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('-') {
                manifest.skipped_options += 1;
                continue;
            }
            if let Some(req) = parse_requirement(line) {
                manifest.requirements.push(req);
            }
        }
        manifest
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.requirements
            .iter()
            .find(|r| normalize_name(&r.name) == wanted)
    }
}

// `#` starts a comment only at line start or after whitespace
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn parse_requirement(line: &str) -> Option<Requirement> {
    // environment markers are not evaluated
    let spec = line.split(';').next().unwrap_or(line).trim();
    let end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(spec.len());
    let name = &spec[..end];
    if name.is_empty() {
        return None;
    }

    let mut rest = spec[end..].trim_start();
    if rest.starts_with('[') {
        rest = match rest.find(']') {
            Some(close) => rest[close + 1..].trim_start(),
            None => "",
        };
    }
    let constraint = rest.trim();

    Some(Requirement {
        name: name.to_string(),
        constraint: (!constraint.is_empty()).then(|| constraint.to_string()),
    })
}

fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}
