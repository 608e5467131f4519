//! Handle to one segment directory on disk.
//!
//! A handle is a path plus the timestamp decoded from its name. It holds no index state
//! and no open files: the storage engine opens [`SegmentDirectory::path`] itself. The only
//! file this crate interprets inside a segment is the signature (see [`crate::signature`]).

use crate::error::{HourglassError, HourglassResult};
use crate::formats::SIGNATURE_FILE_NAME;
use crate::naming;
use crate::signature::{IndexSignature, SignatureFile};
use crate::storage;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A segment directory under the root, identified by its path.
///
/// Equality is path equality.
#[derive(Debug, Clone)]
pub struct SegmentDirectory {
    path: PathBuf,
    name: String,
    created_at: DateTime<Utc>,
}

impl PartialEq for SegmentDirectory {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for SegmentDirectory {}

impl SegmentDirectory {
    /// Open (creating if absent) the segment `name` under `root`.
    ///
    /// Creates `root` as well if needed. `name` must be a valid segment name, otherwise the
    /// segment would be invisible to archive scans.
    pub fn create(root: &Path, name: &str) -> HourglassResult<Self> {
        let created_at = naming::decode(name)?;
        let path = root.join(name);
        std::fs::create_dir_all(&path).map_err(|e| HourglassError::io_at(&path, e))?;
        Ok(Self {
            path,
            name: name.to_string(),
            created_at,
        })
    }

    /// Bind to an existing segment path without touching the filesystem.
    ///
    /// Fails with `InvalidName` if the final path component is not a segment name.
    pub fn open(path: impl Into<PathBuf>) -> HourglassResult<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| HourglassError::InvalidName {
                name: path.display().to_string(),
                reason: "no utf-8 file name".into(),
            })?
            .to_string();
        let created_at = naming::decode(&name)?;
        Ok(Self {
            path,
            name,
            created_at,
        })
    }

    /// Directory path, for the storage engine to open.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instant encoded in the folder name.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the directory currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// The signature file of this segment.
    pub fn signature_file(&self) -> SignatureFile {
        SignatureFile::new(self.path.join(SIGNATURE_FILE_NAME))
    }

    /// Read the segment's signature (`SignatureMissing` if none was written).
    pub fn read_signature(&self) -> HourglassResult<IndexSignature> {
        self.signature_file().read()
    }

    /// Atomically write the segment's signature.
    pub fn write_signature(&self, sig: &IndexSignature) -> HourglassResult<()> {
        self.signature_file().write(sig)
    }

    /// Write the signature with stable-storage barriers.
    pub fn write_signature_durable(&self, sig: &IndexSignature) -> HourglassResult<()> {
        self.signature_file().write_durable(sig)
    }

    /// Total bytes of all files in this segment.
    pub fn disk_usage_bytes(&self) -> HourglassResult<u64> {
        storage::disk_usage_bytes(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_makes_root_and_segment_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("idx");
        let seg = SegmentDirectory::create(&root, "2024-01-02-03-04-05").unwrap();
        assert!(seg.exists());
        assert_eq!(seg.path(), root.join("2024-01-02-03-04-05"));
        assert_eq!(seg.name(), "2024-01-02-03-04-05");
        assert_eq!(naming::encode(seg.created_at()), seg.name());
    }

    #[test]
    fn create_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let a = SegmentDirectory::create(tmp.path(), "2024-01-02-03-04-05").unwrap();
        let b = SegmentDirectory::create(tmp.path(), "2024-01-02-03-04-05").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn create_rejects_non_segment_names() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SegmentDirectory::create(tmp.path(), "junk").unwrap_err();
        assert!(matches!(err, HourglassError::InvalidName { .. }));
        assert!(!tmp.path().join("junk").exists());
    }

    #[test]
    fn open_does_not_create() {
        let tmp = tempfile::tempdir().unwrap();
        let seg = SegmentDirectory::open(tmp.path().join("2024-01-02-03-04-05")).unwrap();
        assert!(!seg.exists());
    }

    #[test]
    fn signature_read_write_through_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let seg = SegmentDirectory::create(tmp.path(), "2024-01-02-03-04-05").unwrap();
        assert!(matches!(
            seg.read_signature().unwrap_err(),
            HourglassError::SignatureMissing(_)
        ));
        seg.write_signature(&IndexSignature::new(7)).unwrap();
        assert_eq!(seg.read_signature().unwrap().version, 7);
        assert!(seg.disk_usage_bytes().unwrap() > 0);
    }

    #[test]
    fn write_signature_into_missing_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the segment's parent would be: directory creation must fail.
        std::fs::write(tmp.path().join("blocker"), b"x").unwrap();
        let seg = SegmentDirectory::open(tmp.path().join("blocker/2024-01-02-03-04-05")).unwrap();
        let err = seg.write_signature(&IndexSignature::new(1)).unwrap_err();
        assert!(matches!(err, HourglassError::IoAt { .. }));
    }
}
