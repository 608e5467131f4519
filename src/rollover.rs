//! The rollover manager: owns the active (writable) segment and rolls it forward on schedule.
//!
//! ## Contract
//!
//! - Exactly one segment is active at a time. It is published through an [`ArcSwap`], so
//!   readers calling [`RolloverManager::active_segment`] see either the old or the new handle,
//!   never a partially built one.
//! - A rollover for a given due boundary happens at most once: the check and the roll run
//!   under one lock, and the next boundary is recomputed before the lock is released.
//! - If creating the new segment fails, the scheduled boundary is left unchanged, so the
//!   next [`RolloverManager::check_and_roll`] retries.
//! - The next boundary is always strictly after the "now" the roll was decided at, so
//!   boundaries never move backwards.
//!
//! The expected driver discipline is one thread calling `check_and_roll` periodically and
//! any number of readers; `check_and_roll` is nevertheless safe to call concurrently.

use crate::archive::{ArchiveListing, ArchiveScanner, ArchivedVersion};
use crate::clock::{Clock, SystemClock};
use crate::error::HourglassResult;
use crate::naming;
use crate::scheduler::RollScheduler;
use crate::segment::SegmentDirectory;
use crate::signature::IndexSignature;
use crate::storage;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Knobs for [`RolloverManager::with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloverOptions {
    /// Write signatures with file + parent directory `fsync`.
    pub durable_signatures: bool,
}

/// Owns the active segment of a time-windowed index root.
pub struct RolloverManager {
    root: PathBuf,
    scheduler: Arc<dyn RollScheduler>,
    clock: Arc<dyn Clock>,
    options: RolloverOptions,
    active: ArcSwap<SegmentDirectory>,
    // Held across check + roll so one due boundary yields one rollover.
    next_roll: Mutex<DateTime<Utc>>,
    dirty: AtomicBool,
}

impl RolloverManager {
    /// Create a manager on the wall clock and roll once immediately.
    ///
    /// Failure to create the initial segment (and with it `root`) is returned as an error.
    pub fn new(
        root: impl Into<PathBuf>,
        scheduler: Arc<dyn RollScheduler>,
    ) -> HourglassResult<Self> {
        Self::with_options(
            root,
            scheduler,
            Arc::new(SystemClock),
            RolloverOptions::default(),
        )
    }

    /// Create a manager with an explicit clock.
    pub fn with_clock(
        root: impl Into<PathBuf>,
        scheduler: Arc<dyn RollScheduler>,
        clock: Arc<dyn Clock>,
    ) -> HourglassResult<Self> {
        Self::with_options(root, scheduler, clock, RolloverOptions::default())
    }

    /// Create a manager with an explicit clock and options.
    ///
    /// The first boundary is "now", so construction always rolls: the initial segment is named
    /// after the construction instant, and the dirty flag starts out set.
    pub fn with_options(
        root: impl Into<PathBuf>,
        scheduler: Arc<dyn RollScheduler>,
        clock: Arc<dyn Clock>,
        options: RolloverOptions,
    ) -> HourglassResult<Self> {
        let root = root.into();
        tracing::info!(
            root = %root.display(),
            scheduler = %scheduler.describe(),
            "starting rollover manager"
        );
        let now = clock.now();
        let first = open_segment(&root, &*scheduler, now)?;
        tracing::info!(path = %first.path().display(), "rolling forward to initial segment");
        let next = scheduler.next_roll_boundary(now);
        Ok(Self {
            root,
            scheduler,
            clock,
            options,
            active: ArcSwap::from_pointee(first),
            next_roll: Mutex::new(next),
            dirty: AtomicBool::new(true),
        })
    }

    /// Roll to a new segment if the scheduled boundary has passed.
    ///
    /// Returns `Ok(false)` when no rollover is due, `Ok(true)` when one happened. On error the
    /// active segment and the scheduled boundary are unchanged.
    pub fn check_and_roll(&self) -> HourglassResult<bool> {
        let now = self.clock.now();
        let mut next = self.next_roll.lock();
        if now < *next {
            return Ok(false);
        }
        let due = *next;
        let seg = match open_segment(&self.root, &*self.scheduler, due) {
            Ok(seg) => seg,
            Err(e) => {
                tracing::warn!(
                    root = %self.root.display(),
                    due = %due,
                    error = %e,
                    "rollover failed; will retry on next check"
                );
                return Err(e);
            }
        };
        tracing::info!(path = %seg.path().display(), "rolling forward with new path");
        self.active.store(Arc::new(seg));
        self.dirty.store(true, Ordering::Release);
        *next = self.scheduler.next_roll_boundary(now);
        Ok(true)
    }

    /// The segment currently accepting writes.
    ///
    /// This can lag "now" by up to one interval if `check_and_roll` has not run recently.
    pub fn active_segment(&self) -> Arc<SegmentDirectory> {
        self.active.load_full()
    }

    /// Whether a rollover happened since the flag was last cleared.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Acknowledge the last rollover.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Read and clear the dirty flag in one step.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// The next scheduled rollover boundary.
    pub fn next_roll_time(&self) -> DateTime<Utc> {
        *self.next_roll.lock()
    }

    /// Root directory holding all segments.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Total size of all files under the root. Walks the whole tree.
    pub fn disk_usage_bytes(&self) -> HourglassResult<u64> {
        storage::disk_usage_bytes(&self.root)
    }

    /// Instant encoded in a segment folder name.
    pub fn timestamp_of(&self, name: &str) -> HourglassResult<DateTime<Utc>> {
        naming::decode(name)
    }

    /// A scanner over the root that excludes the segment active right now.
    pub fn archive_scanner(&self) -> ArchiveScanner {
        let active = self.active.load();
        ArchiveScanner::new(&self.root).excluding(active.path())
    }

    /// Archived (non-active) segments, ascending by timestamp.
    pub fn list_archived_segments(&self) -> HourglassResult<ArchiveListing> {
        self.archive_scanner().list()
    }

    /// Highest signature version among archived segments (0 if none).
    pub fn max_archived_version(&self) -> HourglassResult<ArchivedVersion> {
        self.archive_scanner().max_version()
    }

    /// Read the signature of the segment at `path`.
    pub fn signature_of(&self, path: &Path) -> HourglassResult<IndexSignature> {
        SegmentDirectory::open(path)?.read_signature()
    }

    /// Overwrite the signature of the segment at `path`.
    pub fn save_signature(&self, path: &Path, sig: &IndexSignature) -> HourglassResult<()> {
        let seg = SegmentDirectory::open(path)?;
        self.write_signature(&seg, sig)
    }

    /// Checkpoint the active segment at `version`.
    pub fn seal_active(&self, version: u64) -> HourglassResult<Arc<SegmentDirectory>> {
        let seg = self.active_segment();
        self.write_signature(&seg, &IndexSignature::sealed(version, self.clock.now()))?;
        Ok(seg)
    }

    fn write_signature(
        &self,
        seg: &SegmentDirectory,
        sig: &IndexSignature,
    ) -> HourglassResult<()> {
        if self.options.durable_signatures {
            seg.write_signature_durable(sig)
        } else {
            seg.write_signature(sig)
        }
    }
}

fn open_segment(
    root: &Path,
    scheduler: &dyn RollScheduler,
    due: DateTime<Utc>,
) -> HourglassResult<SegmentDirectory> {
    let name = scheduler.folder_name(due);
    SegmentDirectory::create(root, &name)
}
