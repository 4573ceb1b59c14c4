//! Custom assertion macros for CLI tests.
//!
//! These macros provide descriptive failure messages to aid debugging.

use std::path::Path;

/// List all files in a directory recursively (for debugging)
pub fn list_all_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(list_all_files(&path));
            } else {
                files.push(path.display().to_string());
            }
        }
    }
    files.sort();
    files
}

/// Assert that a file under the installation root has exactly this content.
///
/// # Example
/// ```ignore
/// assert_file_eq!(env, "backend/.env", LIVE_SECRETS);
/// ```
#[macro_export]
macro_rules! assert_file_eq {
    ($env:expr, $path:expr, $expected:expr) => {
        let full_path = $env.install_path($path);
        let actual = std::fs::read_to_string(&full_path).unwrap_or_else(|e| {
            panic!(
                "Expected '{}' to exist ({}).\nFiles found:\n  {}",
                $path,
                e,
                $crate::common::list_all_files(&$env.install_root()).join("\n  ")
            )
        });
        assert_eq!(actual, $expected, "unexpected content in '{}'", $path);
    };
}

/// Assert that command output contains a string.
///
/// # Example
/// ```ignore
/// assert_output_contains!(result, "Update Complete");
/// ```
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $expected:expr) => {
        let combined = $result.combined_output();
        assert!(
            combined.contains($expected),
            "Expected output to contain '{}'\n\nActual stdout:\n{}\n\nActual stderr:\n{}",
            $expected,
            $result.stdout,
            $result.stderr
        );
    };
}
