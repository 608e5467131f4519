//! Serializable configuration for a rollover manager.
//!
//! Meant to be embedded in a host application's own config file:
//!
//! ```toml
//! [index]
//! root = "/var/lib/app/index"
//! durable_signatures = true
//!
//! [index.schedule]
//! frequency = "hourly"
//! at = "0 30"
//! ```

use crate::clock::SystemClock;
use crate::error::{HourglassError, HourglassResult};
use crate::rollover::{RolloverManager, RolloverOptions};
use crate::scheduler::{Frequency, HourglassScheduler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// When segments roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Rollover period.
    pub frequency: Frequency,
    /// Position within the period, `"ss mm hh"`.
    pub at: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Daily,
            at: "0 0 0".to_string(),
        }
    }
}

/// Everything needed to build a [`RolloverManager`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloverConfig {
    /// Directory holding all segment directories.
    pub root: PathBuf,
    /// Rollover schedule.
    pub schedule: ScheduleConfig,
    /// `fsync` signature files and their parent directory on write.
    pub durable_signatures: bool,
}

impl RolloverConfig {
    /// Config for `root` with the default (daily at midnight UTC) schedule.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Check the config without touching the filesystem.
    pub fn validate(&self) -> HourglassResult<()> {
        if self.root.as_os_str().is_empty() {
            return Err(HourglassError::InvalidConfig("root must not be empty".into()));
        }
        self.scheduler().map(|_| ())
    }

    /// The scheduler this config describes.
    pub fn scheduler(&self) -> HourglassResult<HourglassScheduler> {
        HourglassScheduler::new(self.schedule.frequency, &self.schedule.at)
    }

    /// The manager options this config describes.
    pub fn options(&self) -> RolloverOptions {
        RolloverOptions {
            durable_signatures: self.durable_signatures,
        }
    }
}

impl RolloverManager {
    /// Validate `config` and build a manager on the wall clock.
    pub fn from_config(config: &RolloverConfig) -> HourglassResult<Self> {
        config.validate()?;
        Self::with_options(
            config.root.clone(),
            Arc::new(config.scheduler()?),
            Arc::new(SystemClock),
            config.options(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_once_root_is_set() {
        assert!(RolloverConfig::default().validate().is_err());
        RolloverConfig::new("/tmp/idx").validate().unwrap();
    }

    #[test]
    fn bad_schedule_is_invalid_config() {
        let mut cfg = RolloverConfig::new("/tmp/idx");
        cfg.schedule.at = "99".into();
        assert!(matches!(
            cfg.validate().unwrap_err(),
            HourglassError::InvalidConfig(_)
        ));
    }

    #[test]
    fn config_roundtrips_through_postcard() {
        let cfg = RolloverConfig {
            root: "/data/idx".into(),
            schedule: ScheduleConfig {
                frequency: Frequency::Hourly,
                at: "0 30".into(),
            },
            durable_signatures: true,
        };
        let bytes = postcard::to_allocvec(&cfg).unwrap();
        let back: RolloverConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn from_config_builds_a_manager() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = RolloverConfig::new(tmp.path().join("idx"));
        cfg.schedule.frequency = Frequency::Minutely;
        let mgr = RolloverManager::from_config(&cfg).unwrap();
        assert!(mgr.active_segment().exists());
        assert!(mgr.next_roll_time() > mgr.active_segment().created_at());
    }
}
