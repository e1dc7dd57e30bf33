//! # File I/O Module
//!
//! Write-side file operations for catalogue data:
//! - **Atomic writes**: write to `.tmp`, fsync, rename, so a reader never
//!   sees a half-written table or database
//! - **Build locks**: keep two processes from rebuilding the same SQLite
//!   database or exporting to the same file at once
//!
//! The OS lock (fs2) on `<target>.lock` decides who owns a build. The lock
//! file also carries a [`LockHolder`] record so a blocked build can report
//! who is in the way. The OS drops the lock when its process exits, so there
//! is no staleness bookkeeping.
//!
//! ## Example
//!
//! ```rust,no_run
//! use section_core::file_io::{atomic_write, BuildLock};
//! use std::path::Path;
//!
//! let path = Path::new("UB.json");
//! let lock = BuildLock::acquire(path, "export")?;
//! atomic_write(path, b"{}")?;
//! drop(lock);
//! # Ok::<(), section_core::errors::CatalogueError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CatalogueError, CatalogueResult};

/// Who is building a target, as written into its `.lock` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockHolder {
    /// What the holder is doing (`"build-sqlite"`, `"export"`)
    pub task: String,
    pub user: String,
    pub pid: u32,
    pub since: DateTime<Utc>,
}

impl LockHolder {
    fn current(task: &str) -> Self {
        LockHolder {
            task: task.to_string(),
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            since: Utc::now(),
        }
    }

    fn describe(&self) -> String {
        format!("{} by {} (pid {})", self.task, self.user, self.pid)
    }
}

/// Exclusive lock on a build target, released when dropped
#[derive(Debug)]
pub struct BuildLock {
    lock_path: PathBuf,
    /// Keeps the OS lock
    _file: File,
    holder: LockHolder,
}

impl BuildLock {
    /// Take the build lock for `target` without blocking.
    ///
    /// Fails with [`CatalogueError::FileLocked`] naming the current holder
    /// when another process owns it.
    pub fn acquire(target: &Path, task: &str) -> CatalogueResult<Self> {
        let lock_path = lock_path_for(target);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CatalogueError::file_error("open lock", lock_path.display().to_string(), e.to_string()))?;

        if file.try_lock_exclusive().is_err() {
            let (locked_by, locked_at) = match read_holder(&mut file) {
                Some(holder) => (holder.describe(), holder.since.to_rfc3339()),
                None => ("another process".to_string(), "unknown".to_string()),
            };
            tracing::warn!(path = %target.display(), holder = %locked_by, "build target is locked");
            return Err(CatalogueError::file_locked(
                target.display().to_string(),
                locked_by,
                locked_at,
            ));
        }

        let holder = LockHolder::current(task);
        write_holder(&mut file, &holder)
            .map_err(|e| CatalogueError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        tracing::debug!(path = %target.display(), task, "build lock acquired");

        Ok(BuildLock {
            lock_path,
            _file: file,
            holder,
        })
    }

    pub fn holder(&self) -> &LockHolder {
        &self.holder
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn read_holder(file: &mut File) -> Option<LockHolder> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_holder(file: &mut File, holder: &LockHolder) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(holder).map_err(std::io::Error::other)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&json)?;
    file.sync_all()
}

/// `UK_sections.sqlite3` -> `UK_sections.sqlite3.lock`
fn lock_path_for(target: &Path) -> PathBuf {
    with_suffix(target, "lock")
}

/// Temp path used while writing `target`
pub fn temp_path_for(target: &Path) -> PathBuf {
    with_suffix(target, "tmp")
}

fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut path = target.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

/// Write `bytes` to `path` via a synced temp file and a rename
pub fn atomic_write(path: &Path, bytes: &[u8]) -> CatalogueResult<()> {
    let tmp_path = temp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CatalogueError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file
        .write_all(bytes)
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CatalogueError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;

    commit_temp(&tmp_path, path)
}

/// Rename a finished temp file over its target, removing it on failure
pub fn commit_temp(tmp_path: &Path, path: &Path) -> CatalogueResult<()> {
    fs::rename(tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        CatalogueError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Serialize `value` as pretty JSON and write it atomically under a build lock
pub fn write_json_locked<T: Serialize>(path: &Path, value: &T) -> CatalogueResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CatalogueError::SerializationError {
        reason: e.to_string(),
    })?;
    let _lock = BuildLock::acquire(path, "export")?;
    atomic_write(path, json.as_bytes())
}
