//! Content Hash Value Object
//!
//! A validated, immutable hash representing the content of a file or a whole
//! directory tree. Used to verify snapshots and to detect unchanged state.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a new ContentHash from a raw hash string (with or without prefix)
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Create a ContentHash by computing SHA-256 of bytes
    pub fn from_bytes(content: &[u8]) -> Self {
        let hash = Sha256::digest(content);
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Get the full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Short form for reports (first 12 hex chars)
    pub fn short(&self) -> &str {
        let hex = self.hex();
        &hex[..hex.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<ContentHash> for String {
    fn from(h: ContentHash) -> Self {
        h.0
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Incremental hash over a directory tree.
///
/// Entries must be fed in a stable order (sorted relative paths). Each entry
/// contributes its kind, relative path and content so that renames, empty
/// directories and symlink targets all change the digest.
#[derive(Default)]
pub struct TreeHasher {
    inner: Sha256,
    entries: usize,
}

impl TreeHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&mut self, relative: &str) {
        self.add_record(b'd', relative, &[]);
    }

    pub fn add_file(&mut self, relative: &str, content: &[u8]) {
        self.add_record(b'f', relative, content);
    }

    pub fn add_symlink(&mut self, relative: &str, target: &str) {
        self.add_record(b'l', relative, target.as_bytes());
    }

    /// Number of entries hashed so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn finish(self) -> ContentHash {
        ContentHash(format!("{}{:x}", ContentHash::PREFIX, self.inner.finalize()))
    }

    fn add_record(&mut self, kind: u8, relative: &str, content: &[u8]) {
        self.inner.update([kind]);
        self.inner.update((relative.len() as u64).to_le_bytes());
        self.inner.update(relative.as_bytes());
        self.inner.update((content.len() as u64).to_le_bytes());
        self.inner.update(content);
        self.entries += 1;
    }
}
