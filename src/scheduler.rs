//! Rollover scheduling.
//!
//! A [`RollScheduler`] answers two questions for the rollover manager:
//! - given "now", when is the next rollover boundary (strictly after now)?
//! - what folder name does a boundary map to?
//!
//! Folder names must agree with [`naming::encode`]; the default method delegates to it,
//! and implementations should not override it unless they also control discovery.
//!
//! All arithmetic is in UTC, so there are no DST gaps or repeated hours.

use crate::error::{HourglassError, HourglassResult};
use crate::naming;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Decides when segments roll over and how boundaries are named.
pub trait RollScheduler: Send + Sync {
    /// First rollover boundary strictly after `now`.
    fn next_roll_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc>;

    /// Folder name for a boundary.
    fn folder_name(&self, boundary: DateTime<Utc>) -> String {
        naming::encode(boundary)
    }

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;
}

/// Granularity of a calendar schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Roll once a minute, at a fixed second.
    Minutely,
    /// Roll once an hour, at a fixed minute and second.
    Hourly,
    /// Roll once a day, at a fixed time of day.
    Daily,
}

impl Frequency {
    fn period_secs(self) -> i64 {
        match self {
            Frequency::Minutely => 60,
            Frequency::Hourly => 60 * 60,
            Frequency::Daily => 24 * 60 * 60,
        }
    }
}

/// Position of the rollover inside each period, parsed from `"ss mm hh"`.
///
/// Missing trailing fields default to zero. Fields coarser than the frequency are
/// ignored (an hourly schedule ignores `hh`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSpec {
    /// Second of the minute (0..=59).
    pub second: u32,
    /// Minute of the hour (0..=59).
    pub minute: u32,
    /// Hour of the day (0..=23).
    pub hour: u32,
}

impl ScheduleSpec {
    /// Parse `"ss mm hh"` (whitespace separated, up to three fields).
    pub fn parse(s: &str) -> HourglassResult<Self> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() > 3 {
            return Err(HourglassError::InvalidConfig(format!(
                "schedule {s:?} has {} fields, expected at most 3 (ss mm hh)",
                fields.len()
            )));
        }
        let field = |i: usize, what: &str, max: u32| -> HourglassResult<u32> {
            let Some(raw) = fields.get(i) else {
                return Ok(0);
            };
            let v: u32 = raw.parse().map_err(|_| {
                HourglassError::InvalidConfig(format!(
                    "schedule {s:?}: {what} {raw:?} is not a number"
                ))
            })?;
            if v > max {
                return Err(HourglassError::InvalidConfig(format!(
                    "schedule {s:?}: {what} {v} out of range 0..={max}"
                )));
            }
            Ok(v)
        };
        Ok(Self {
            second: field(0, "second", 59)?,
            minute: field(1, "minute", 59)?,
            hour: field(2, "hour", 23)?,
        })
    }

    fn offset_secs(&self, frequency: Frequency) -> i64 {
        let (h, m, s) = (
            i64::from(self.hour),
            i64::from(self.minute),
            i64::from(self.second),
        );
        match frequency {
            Frequency::Minutely => s,
            Frequency::Hourly => m * 60 + s,
            Frequency::Daily => h * 3600 + m * 60 + s,
        }
    }
}

/// Next instant strictly after `now` of the form `k * period + offset` (seconds since epoch).
fn next_aligned(now: DateTime<Utc>, period: i64, offset: i64) -> DateTime<Utc> {
    let secs = now.timestamp();
    let mut candidate = secs - secs.rem_euclid(period) + offset;
    let at = |c: i64| DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(c);
    while at(candidate) <= now {
        candidate += period;
    }
    at(candidate)
}

/// Calendar scheduler: roll every minute, hour or day at a fixed position.
#[derive(Debug, Clone)]
pub struct HourglassScheduler {
    frequency: Frequency,
    spec: ScheduleSpec,
}

impl HourglassScheduler {
    /// Build a scheduler from a frequency and a `"ss mm hh"` schedule string.
    pub fn new(frequency: Frequency, at: &str) -> HourglassResult<Self> {
        Ok(Self {
            frequency,
            spec: ScheduleSpec::parse(at)?,
        })
    }

    /// The configured frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The configured position within each period.
    pub fn spec(&self) -> ScheduleSpec {
        self.spec
    }
}

impl RollScheduler for HourglassScheduler {
    fn next_roll_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_aligned(
            now,
            self.frequency.period_secs(),
            self.spec.offset_secs(self.frequency),
        )
    }

    fn describe(&self) -> String {
        format!(
            "{:?} at {:02}:{:02}:{:02}",
            self.frequency, self.spec.hour, self.spec.minute, self.spec.second
        )
    }
}

/// Rolls on fixed, epoch-aligned intervals.
///
/// Intervals are whole seconds: segment names have second resolution, so a shorter
/// interval could map two boundaries to the same folder.
#[derive(Debug, Clone, Copy)]
pub struct IntervalScheduler {
    secs: i64,
}

impl IntervalScheduler {
    /// Build an interval scheduler. `interval` is truncated to whole seconds and must be >= 1s.
    pub fn new(interval: std::time::Duration) -> HourglassResult<Self> {
        let secs = i64::try_from(interval.as_secs())
            .map_err(|_| HourglassError::InvalidConfig("interval too large".into()))?;
        if secs == 0 {
            return Err(HourglassError::InvalidConfig(
                "rollover interval must be at least one second".into(),
            ));
        }
        Ok(Self { secs })
    }
}

impl RollScheduler for IntervalScheduler {
    fn next_roll_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_aligned(now, self.secs, 0)
    }

    fn describe(&self) -> String {
        format!("every {}s", self.secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn parse_schedule_fields() {
        assert_eq!(ScheduleSpec::parse("").unwrap(), ScheduleSpec::default());
        let s = ScheduleSpec::parse("30 15 2").unwrap();
        assert_eq!((s.second, s.minute, s.hour), (30, 15, 2));
        let s = ScheduleSpec::parse(" 5 ").unwrap();
        assert_eq!((s.second, s.minute, s.hour), (5, 0, 0));
    }

    #[test]
    fn parse_schedule_rejects_bad_input() {
        for bad in ["60", "0 60", "0 0 24", "a", "1 2 3 4", "-1"] {
            let err = ScheduleSpec::parse(bad).unwrap_err();
            assert!(matches!(err, HourglassError::InvalidConfig(_)), "{bad:?}");
        }
    }

    #[test]
    fn hourly_boundary_is_strictly_after_now() {
        let s = HourglassScheduler::new(Frequency::Hourly, "30 15").unwrap();
        assert_eq!(s.next_roll_boundary(t(10, 0, 0)), t(10, 15, 30));
        assert_eq!(s.next_roll_boundary(t(10, 15, 30)), t(11, 15, 30));
        assert_eq!(s.next_roll_boundary(t(10, 59, 59)), t(11, 15, 30));
    }

    #[test]
    fn subsecond_now_on_boundary_moves_to_next_period() {
        let s = HourglassScheduler::new(Frequency::Minutely, "0").unwrap();
        let now = t(10, 0, 0) + Duration::milliseconds(1);
        assert_eq!(s.next_roll_boundary(now), t(10, 1, 0));
    }

    #[test]
    fn daily_boundary_crosses_midnight() {
        let s = HourglassScheduler::new(Frequency::Daily, "0 0 3").unwrap();
        assert_eq!(s.next_roll_boundary(t(2, 59, 59)), t(3, 0, 0));
        let next = s.next_roll_boundary(t(3, 0, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap());
    }

    #[test]
    fn minutely_ignores_coarser_fields() {
        let s = HourglassScheduler::new(Frequency::Minutely, "10 45 7").unwrap();
        assert_eq!(s.next_roll_boundary(t(10, 0, 0)), t(10, 0, 10));
    }

    #[test]
    fn interval_scheduler_aligns_to_epoch() {
        let s = IntervalScheduler::new(std::time::Duration::from_secs(300)).unwrap();
        assert_eq!(s.next_roll_boundary(t(10, 2, 0)), t(10, 5, 0));
        assert_eq!(s.next_roll_boundary(t(10, 5, 0)), t(10, 10, 0));
        assert!(IntervalScheduler::new(std::time::Duration::from_millis(500)).is_err());
    }

    #[test]
    fn folder_name_delegates_to_codec() {
        let s = HourglassScheduler::new(Frequency::Hourly, "0 0").unwrap();
        assert_eq!(s.folder_name(t(1, 2, 3)), naming::encode(t(1, 2, 3)));
    }
}
