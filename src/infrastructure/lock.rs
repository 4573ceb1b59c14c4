//! Installation-scoped run lock
//!
//! An exclusive advisory lock on `<root>/.inplace/lock`. The lock lives as
//! long as the returned guard; the operating system drops it if the process
//! dies.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{InplaceError, InplaceResult};

#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock without waiting.
    ///
    /// Fails with `RunInProgress` when another process holds it.
    pub fn acquire(path: &Path, root: &Path) -> InplaceResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind()
                || e.kind() == std::io::ErrorKind::WouldBlock
            {
                return Err(InplaceError::RunInProgress {
                    root: root.to_path_buf(),
                });
            }
            return Err(e.into());
        }

        // holder pid, for operators inspecting a stuck lock
        file.set_len(0)?;
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            debug!(path = %path.display(), error = %e, "could not record lock holder pid");
        }
        debug!(path = %path.display(), "run lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether another process holds the lock right now. Never creates the
    /// lock file.
    pub fn is_held(path: &Path) -> bool {
        let Ok(file) = File::open(path) else {
            return false;
        };
        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = file.unlock();
                false
            }
            Err(_) => true,
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "run lock released");
    }
}
