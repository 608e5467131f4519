//! Segment naming: timestamp <-> folder name.
//!
//! Segment directories are named after their creation boundary, formatted as
//! `yyyy-MM-dd-HH-mm-ss` in UTC. The format is fixed-width and zero-padded, so for
//! years `0000..=9999` lexicographic order of names equals chronological order of
//! the timestamps they encode.
//!
//! Decoding is strict: a name is valid only if it re-encodes to exactly itself.
//! This rejects near-misses such as `2024-1-02-03-04-05` that a lenient parser
//! would accept but which would break the ordering guarantee.

use crate::error::{HourglassError, HourglassResult};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// `strftime` pattern for segment names.
pub const SEGMENT_NAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Length of every valid segment name.
pub const SEGMENT_NAME_LEN: usize = "yyyy-MM-dd-HH-mm-ss".len();

/// Encode `ts` as a segment name. Sub-second precision is dropped.
pub fn encode(ts: DateTime<Utc>) -> String {
    ts.format(SEGMENT_NAME_FORMAT).to_string()
}

/// Decode a segment name back to the instant it encodes.
pub fn decode(name: &str) -> HourglassResult<DateTime<Utc>> {
    if name.len() != SEGMENT_NAME_LEN {
        return Err(invalid(name, format!("expected {SEGMENT_NAME_LEN} characters")));
    }
    let naive = NaiveDateTime::parse_from_str(name, SEGMENT_NAME_FORMAT)
        .map_err(|e| invalid(name, e.to_string()))?;
    let ts = naive.and_utc();
    if encode(ts) != name {
        return Err(invalid(name, "not in canonical form".to_string()));
    }
    Ok(ts)
}

/// Whether `name` is a valid segment name.
pub fn is_segment_name(name: &str) -> bool {
    decode(name).is_ok()
}

/// Drop sub-second precision, i.e. the instant `decode(encode(ts))` yields.
pub fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn invalid(name: &str, reason: String) -> HourglassError {
    HourglassError::InvalidName {
        name: name.to_string(),
        reason,
    }
}
