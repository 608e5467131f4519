//! `hourglass`: lifecycle of time-windowed index segment directories.
//!
//! Scope:
//! - segment naming (`naming`): timestamp <-> folder name, the only source of truth for which
//!   entries under the root are segments
//! - rollover scheduling (`scheduler`) and time source (`clock`)
//! - segment handles (`segment`) and their signature files (`signature`)
//! - the rollover manager (`rollover`), which owns the single writable segment
//! - archive discovery (`archive`): sealed segments and the highest committed version
//!
//! Non-goal: opening, querying or merging segment contents (that belongs to the storage
//! engine that consumes [`SegmentDirectory::path`]).
//!
//! ## Contract (what you can rely on)
//!
//! - **One active segment.** At any moment exactly one segment is active. Replacing it is an
//!   atomic publish: readers see the old or the new handle, never a half-built one.
//! - **Discoverable by name.** Every segment is a directory directly under the root whose
//!   name is `yyyy-MM-dd-HH-mm-ss` (UTC). Names sort in timestamp order. Anything else under
//!   the root is ignored by scans (and reported).
//! - **Read-only scans.** Listing archives and computing the archived version never create,
//!   rename or delete anything.
//! - **Retry on failure.** A rollover that fails to create its directory leaves the schedule
//!   untouched; the next check retries the same boundary.
//!
//! Terminology:
//! - *sealed* / *archived*: any segment that is not the active one.
//! - *signature*: small per-segment file carrying the segment's committed version.

pub mod archive;
pub mod clock;
pub mod config;
pub mod error;
pub mod formats;
pub mod naming;
pub mod rollover;
pub mod scheduler;
pub mod segment;
pub mod signature;
pub mod storage;

pub use archive::{ArchiveListing, ArchiveScanner, ArchivedVersion, ScanWarning};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RolloverConfig, ScheduleConfig};
pub use error::{HourglassError, HourglassResult};
pub use rollover::{RolloverManager, RolloverOptions};
pub use scheduler::{Frequency, HourglassScheduler, IntervalScheduler, RollScheduler};
pub use segment::SegmentDirectory;
pub use signature::IndexSignature;
