//! JSON persistence primitives
//!
//! Data files are replaced whole through a sibling temp file and a rename, so
//! a reader sees either the previous or the new contents. Writers serialize on
//! an advisory lock taken on a `<file>.lock` sibling, which also covers other
//! processes sharing the same data directory. `update_json` re-reads the file
//! while holding that lock, so an update is applied on top of whatever the
//! last writer left behind instead of on a stale in-memory copy.

use std::ffi::OsString;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

fn store_error(action: &str, path: &Path, err: impl Display) -> LedgerError {
    LedgerError::Store(format!("could not {} {}: {}", action, path.display(), err))
}

/// `<dir>/<file name>.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> LedgerResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| store_error("create directory", dir, e))
        }
        _ => Ok(()),
    }
}

/// Exclusive advisory lock guarding one data file
///
/// Released when dropped.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Block until the lock for `target` is held
    pub fn exclusive(target: &Path) -> LedgerResult<Self> {
        ensure_parent(target)?;
        let lock_path = sibling(target, "lock");

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| store_error("open lock file", &lock_path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| store_error("lock", &lock_path, e))?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, "failed to release file lock");
        }
    }
}

/// Read a JSON file; a missing file yields `T::default()`
pub fn read_json<T>(path: &Path) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| store_error("parse", path, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(store_error("read", path, e)),
    }
}

/// Replace a JSON file in one step
///
/// Callers that may race with other writers hold the file's `FileLock`.
pub fn write_json_atomic<T>(path: &Path, data: &T) -> LedgerResult<()>
where
    T: Serialize + ?Sized,
{
    ensure_parent(path)?;
    let bytes = serde_json::to_vec_pretty(data).map_err(|e| store_error("serialize", path, e))?;
    let temp_path = sibling(path, "tmp");

    let replace = || -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    };

    replace().map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        store_error("write", path, e)
    })
}

/// Locked read-modify-write of a JSON file
///
/// `update` sees the current on-disk contents. Nothing is written when it
/// returns an error. On success the written value is returned so callers can
/// refresh their in-memory view.
pub fn update_json<T, F>(path: &Path, update: F) -> LedgerResult<T>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T) -> LedgerResult<()>,
{
    let _lock = FileLock::exclusive(path)?;

    let mut data: T = read_json(path)?;
    update(&mut data)?;
    write_json_atomic(path, &data)?;

    Ok(data)
}
