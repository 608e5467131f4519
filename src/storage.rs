//! Filesystem helpers shared by segment handles and the archive scanner.
//!
//! Vocabulary note:
//! - Signature writes require **atomicity** (temp file + rename) so a reader never observes a
//!   half-written signature.
//! - Stable-storage **durability** (survives power loss after reporting success)
//!   additionally requires explicit `fsync`/`sync_all` barriers and a parent-directory sync
//!   after the rename. Callers opt into that with [`atomic_write_durable`].

use crate::error::{HourglassError, HourglassResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// `fsync` the file at `path`.
pub fn sync_file(path: &Path) -> HourglassResult<()> {
    let f = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| HourglassError::io_at(path, e))?;
    f.sync_all().map_err(|e| HourglassError::io_at(path, e))?;
    Ok(())
}

/// `fsync` the parent directory of `path`, making creates and renames of `path` durable.
pub fn sync_parent_dir(path: &Path) -> HourglassResult<()> {
    let Some(parent) = path.parent() else {
        return Err(HourglassError::InvalidConfig(format!(
            "path has no parent directory: {path:?}"
        )));
    };
    let f = std::fs::File::open(parent).map_err(|e| HourglassError::io_at(parent, e))?;
    f.sync_all().map_err(|e| HourglassError::io_at(parent, e))?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `data` (write temp, `sync_all`, rename).
///
/// The parent directory sync after the rename is best-effort here; use
/// [`atomic_write_durable`] when the rename itself must survive power loss.
pub fn atomic_write(path: &Path, data: &[u8]) -> HourglassResult<()> {
    let tmp = temp_path_for(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HourglassError::io_at(parent, e))?;
    }

    let written = (|| -> std::io::Result<()> {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(data)?;
        f.sync_all()?;
        Ok(())
    })();
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(HourglassError::io_at(&tmp, e));
    }

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(HourglassError::io_at(path, e));
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

/// Atomically write `data` to `path` and require the parent directory sync to succeed.
pub fn atomic_write_durable(path: &Path, data: &[u8]) -> HourglassResult<()> {
    atomic_write(path, data)?;
    sync_file(path)?;
    sync_parent_dir(path)?;
    Ok(())
}

/// List the entries directly under `dir`, sorted by file name.
///
/// A missing `dir` is not an error: it yields an empty listing.
pub fn list_dir_sorted(dir: &Path) -> HourglassResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(HourglassError::io_at(dir, e)),
    };
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HourglassError::io_at(dir, e))?;
        out.push(entry.path());
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Recursively sum the sizes of all regular files under `root`.
///
/// This walks the whole tree (O(total files)) and can be slow on large roots.
/// Symlinks are not followed. Entries that disappear mid-walk are ignored; a missing
/// `root` counts as zero bytes.
pub fn disk_usage_bytes(root: &Path) -> HourglassResult<u64> {
    let mut total = 0u64;
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let meta = match std::fs::symlink_metadata(&p) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(HourglassError::io_at(&p, e)),
        };
        if meta.is_dir() {
            let entries = match std::fs::read_dir(&p) {
                Ok(it) => it,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(HourglassError::io_at(&p, e)),
            };
            for entry in entries {
                let entry = entry.map_err(|e| HourglassError::io_at(&p, e))?;
                stack.push(entry.path());
            }
        } else if meta.is_file() {
            total = total.saturating_add(meta.len());
        }
    }
    Ok(total)
}
