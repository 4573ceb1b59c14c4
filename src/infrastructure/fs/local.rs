//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use ignore::WalkBuilder;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};
use crate::domain::value_objects::{ContentHash, TreeHasher};

/// Local file system implementation
///
/// Provides atomic writes, attribute-preserving tree copies and tree hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn has_content(&self, path: &Path) -> bool {
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => std::fs::read_dir(path)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false),
            Ok(_) => true,
            Err(_) => false,
        }
    }

    fn read(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;

        // tempfile + rename in the same directory
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| FsError::io(parent, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| FsError::io(path, e))?;
        tmp.as_file().sync_all().map_err(|e| FsError::io(path, e))?;
        tmp.persist(path).map_err(|e| FsError::io(path, e.error))?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> FsResult<()> {
        if self.exists(to) {
            return Err(FsError::Other(format!(
                "refusing to copy over existing path {}",
                to.display()
            )));
        }
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        }
        copy_path(from, to)
    }

    fn remove_tree(&self, path: &Path) -> FsResult<()> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FsError::io(path, e)),
        };
        let result = if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        result.map_err(|e| FsError::io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        std::fs::rename(from, to).map_err(|e| FsError::io(from, e))
    }

    fn hash_tree(&self, path: &Path) -> FsResult<ContentHash> {
        let mut hasher = TreeHasher::new();
        for entry in sorted_walk(path) {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            let rel = relative_key(path, entry.path());
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                let target =
                    std::fs::read_link(entry.path()).map_err(|e| FsError::io(entry.path(), e))?;
                hasher.add_symlink(&rel, &target.to_string_lossy());
            } else if file_type.is_dir() {
                hasher.add_dir(&rel);
            } else {
                let bytes = std::fs::read(entry.path()).map_err(|e| FsError::io(entry.path(), e))?;
                hasher.add_file(&rel, &bytes);
            }
        }
        Ok(hasher.finish())
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        std::fs::canonicalize(path).map_err(|e| FsError::io(path, e))
    }

    #[cfg(unix)]
    fn ensure_owner_writable(&self, path: &Path) -> FsResult<()> {
        use std::os::unix::fs::PermissionsExt;

        for entry in WalkBuilder::new(path).standard_filters(false).hidden(false).build() {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                continue;
            }
            let wanted = if file_type.is_dir() { 0o700 } else { 0o600 };
            let meta = std::fs::metadata(entry.path()).map_err(|e| FsError::io(entry.path(), e))?;
            let mut perms = meta.permissions();
            let mode = perms.mode();
            if mode & wanted != wanted {
                perms.set_mode(mode | wanted);
                std::fs::set_permissions(entry.path(), perms)
                    .map_err(|e| FsError::io(entry.path(), e))?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn ensure_owner_writable(&self, _path: &Path) -> FsResult<()> {
        Ok(())
    }
}

fn sorted_walk(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn copy_path(src: &Path, dst: &Path) -> FsResult<()> {
    let meta = std::fs::symlink_metadata(src).map_err(|e| FsError::io(src, e))?;
    if meta.file_type().is_symlink() {
        return copy_symlink(src, dst);
    }
    if !meta.is_dir() {
        return copy_file(src, dst, &meta);
    }

    // directory attributes are applied last, deepest first, so a read-only
    // directory does not block its own contents and mtimes stay put
    let mut dirs = Vec::new();
    for entry in sorted_walk(src) {
        let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let out = dst.join(rel);
        let entry_meta =
            std::fs::symlink_metadata(entry.path()).map_err(|e| FsError::io(entry.path(), e))?;

        if entry_meta.file_type().is_symlink() {
            copy_symlink(entry.path(), &out)?;
        } else if entry_meta.is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| FsError::io(&out, e))?;
            dirs.push((out, entry_meta));
        } else {
            copy_file(entry.path(), &out, &entry_meta)?;
        }
    }

    for (dir, dir_meta) in dirs.into_iter().rev() {
        std::fs::set_permissions(&dir, dir_meta.permissions()).map_err(|e| FsError::io(&dir, e))?;
        let mtime = FileTime::from_last_modification_time(&dir_meta);
        filetime::set_file_mtime(&dir, mtime).map_err(|e| FsError::io(&dir, e))?;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, meta: &std::fs::Metadata) -> FsResult<()> {
    // std::fs::copy carries permission bits over
    std::fs::copy(src, dst).map_err(|e| FsError::io(dst, e))?;
    let atime = FileTime::from_last_access_time(meta);
    let mtime = FileTime::from_last_modification_time(meta);
    filetime::set_file_times(dst, atime, mtime).map_err(|e| FsError::io(dst, e))
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> FsResult<()> {
    let target = std::fs::read_link(src).map_err(|e| FsError::io(src, e))?;
    std::os::unix::fs::symlink(&target, dst).map_err(|e| FsError::io(dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> FsResult<()> {
    let meta = std::fs::metadata(src).map_err(|e| FsError::io(src, e))?;
    if meta.is_dir() {
        copy_path(&std::fs::canonicalize(src).map_err(|e| FsError::io(src, e))?, dst)
    } else {
        copy_file(src, dst, &meta)
    }
}
