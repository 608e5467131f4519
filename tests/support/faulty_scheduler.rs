//! Scheduler wrapper with targeted fault injection.
//!
//! Important: this file lives under `tests/support/` so it is **not** compiled as a standalone
//! integration test target.

use chrono::{DateTime, Utc};
use hourglass::scheduler::RollScheduler;
use std::sync::{Arc, Mutex};

/// Fault-injection configuration.
#[derive(Default)]
pub struct FaultConfig {
    /// Hand out a folder name that is not a valid segment name.
    pub bad_folder_name: bool,
    /// Count of folder names requested.
    pub folder_name_calls: usize,
    /// Count of boundaries requested.
    pub boundary_calls: usize,
}

/// Wraps a real scheduler and can be told to misbehave.
pub struct FaultyScheduler<S> {
    inner: S,
    cfg: Arc<Mutex<FaultConfig>>,
}

impl<S: RollScheduler> FaultyScheduler<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cfg: Arc::new(Mutex::new(FaultConfig::default())),
        }
    }

    /// Access the shared fault config (for toggling failpoints and reading counters).
    pub fn cfg(&self) -> Arc<Mutex<FaultConfig>> {
        self.cfg.clone()
    }
}

impl<S: RollScheduler> RollScheduler for FaultyScheduler<S> {
    fn next_roll_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.cfg.lock().unwrap().boundary_calls += 1;
        self.inner.next_roll_boundary(now)
    }

    fn folder_name(&self, boundary: DateTime<Utc>) -> String {
        let mut cfg = self.cfg.lock().unwrap();
        cfg.folder_name_calls += 1;
        if cfg.bad_folder_name {
            return format!("bad-{}", boundary.timestamp());
        }
        drop(cfg);
        self.inner.folder_name(boundary)
    }

    fn describe(&self) -> String {
        format!("faulty({})", self.inner.describe())
    }
}
