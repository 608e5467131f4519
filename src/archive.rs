//! Discovery of sealed (archived) segments under the root.
//!
//! Scans are strictly read-only: they list, stat and read signatures, and never create,
//! rename or delete anything.
//!
//! Entries that do not look like segments (foreign files, half-deleted directories,
//! unreadable entries) are skipped rather than failing the scan. Every skip is logged via
//! `tracing` and also returned as a [`ScanWarning`] so callers can act on it.

use crate::error::{HourglassError, HourglassResult};
use crate::segment::SegmentDirectory;
use crate::storage;
use std::fmt;
use std::path::{Path, PathBuf};

/// A non-fatal problem found while scanning the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// Entry name is not a segment name.
    InvalidName {
        /// Offending entry.
        path: PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },
    /// Entry has a segment name but is not a directory.
    NotADirectory {
        /// Offending entry.
        path: PathBuf,
    },
    /// Entry could not be inspected.
    Unreadable {
        /// Offending entry.
        path: PathBuf,
        /// I/O diagnostic.
        error: String,
    },
    /// Archived segment has no signature.
    SignatureMissing {
        /// Segment directory.
        path: PathBuf,
    },
    /// Archived segment's signature could not be decoded.
    SignatureCorrupt {
        /// Segment directory.
        path: PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },
}

impl ScanWarning {
    /// The entry the warning is about.
    pub fn path(&self) -> &Path {
        match self {
            ScanWarning::InvalidName { path, .. }
            | ScanWarning::NotADirectory { path }
            | ScanWarning::Unreadable { path, .. }
            | ScanWarning::SignatureMissing { path }
            | ScanWarning::SignatureCorrupt { path, .. } => path,
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::InvalidName { path, reason } => {
                write!(f, "potential index corruption, skipping {path:?}: {reason}")
            }
            ScanWarning::NotADirectory { path } => {
                write!(f, "skipping {path:?}: segment name but not a directory")
            }
            ScanWarning::Unreadable { path, error } => {
                write!(f, "skipping unreadable entry {path:?}: {error}")
            }
            ScanWarning::SignatureMissing { path } => {
                write!(f, "potential index corruption: no signature in {path:?}")
            }
            ScanWarning::SignatureCorrupt { path, reason } => {
                write!(f, "potential index corruption: bad signature in {path:?}: {reason}")
            }
        }
    }
}

fn report(warnings: &mut Vec<ScanWarning>, w: ScanWarning) {
    tracing::warn!(path = %w.path().display(), "{w}");
    warnings.push(w);
}

/// Archived segments, oldest first, plus whatever was skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ArchiveListing {
    /// Archived segment handles, ascending by timestamp.
    pub segments: Vec<SegmentDirectory>,
    /// Entries that were skipped.
    pub warnings: Vec<ScanWarning>,
}

/// Highest signature version among archived segments.
#[derive(Debug, Clone, Default)]
pub struct ArchivedVersion {
    /// Maximum version, or 0 if no archived segment has a readable signature.
    pub version: u64,
    /// Number of segments whose signature contributed.
    pub contributing: usize,
    /// Entries and signatures that were skipped.
    pub warnings: Vec<ScanWarning>,
}

/// Enumerates segment directories under a root, excluding the active one.
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    root: PathBuf,
    active: Option<PathBuf>,
}

impl ArchiveScanner {
    /// Scan `root`, treating every segment as archived.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: None,
        }
    }

    /// Exclude the segment at `active` (compared by path).
    pub fn excluding(mut self, active: impl Into<PathBuf>) -> Self {
        self.active = Some(active.into());
        self
    }

    /// Root being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List archived segments in ascending timestamp order.
    ///
    /// A missing root yields an empty listing. Failing to list the root itself is an error;
    /// problems with individual entries are skipped and reported.
    pub fn list(&self) -> HourglassResult<ArchiveListing> {
        let mut out = ArchiveListing::default();
        for path in storage::list_dir_sorted(&self.root)? {
            let is_active = self.active.as_deref() == Some(path.as_path());
            tracing::debug!(
                path = %path.display(),
                active = is_active,
                "scanning archive entry"
            );

            let seg = match SegmentDirectory::open(&path) {
                Ok(seg) => seg,
                Err(HourglassError::InvalidName { reason, .. }) => {
                    report(&mut out.warnings, ScanWarning::InvalidName { path, reason });
                    continue;
                }
                Err(e) => {
                    report(
                        &mut out.warnings,
                        ScanWarning::Unreadable {
                            path,
                            error: e.to_string(),
                        },
                    );
                    continue;
                }
            };
            if is_active {
                continue;
            }
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => out.segments.push(seg),
                Ok(_) => report(&mut out.warnings, ScanWarning::NotADirectory { path }),
                Err(e) => report(
                    &mut out.warnings,
                    ScanWarning::Unreadable {
                        path,
                        error: e.to_string(),
                    },
                ),
            }
        }
        Ok(out)
    }

    /// Highest signature version among archived segments.
    ///
    /// Segments without a readable signature are skipped (and reported); they never
    /// lower the result. Returns 0 when nothing contributes.
    pub fn max_version(&self) -> HourglassResult<ArchivedVersion> {
        let listing = self.list()?;
        let mut out = ArchivedVersion {
            warnings: listing.warnings,
            ..ArchivedVersion::default()
        };
        for seg in listing.segments {
            match seg.read_signature() {
                Ok(sig) => {
                    out.version = out.version.max(sig.version);
                    out.contributing += 1;
                }
                Err(HourglassError::SignatureMissing(_)) => report(
                    &mut out.warnings,
                    ScanWarning::SignatureMissing {
                        path: seg.path().to_path_buf(),
                    },
                ),
                Err(HourglassError::SignatureCorrupt { reason, .. }) => report(
                    &mut out.warnings,
                    ScanWarning::SignatureCorrupt {
                        path: seg.path().to_path_buf(),
                        reason,
                    },
                ),
                Err(e) => report(
                    &mut out.warnings,
                    ScanWarning::Unreadable {
                        path: seg.path().to_path_buf(),
                        error: e.to_string(),
                    },
                ),
            }
        }
        Ok(out)
    }
}
