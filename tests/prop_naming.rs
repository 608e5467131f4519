//! Properties of the segment naming codec.

use chrono::{DateTime, Duration, Utc};
use hourglass::naming::{decode, encode, is_segment_name, SEGMENT_NAME_LEN};
use hourglass::{Frequency, HourglassScheduler, RollScheduler};
use proptest::prelude::*;

// 1970-01-01 ..= 9999-12-31, the range where names are fixed-width.
const MAX_SECS: i64 = 253_402_300_799;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        cases: 512,
        .. ProptestConfig::default()
    })]

    #[test]
    fn encode_is_monotonic(a in 0i64..=MAX_SECS, b in 0i64..=MAX_SECS) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(encode(at(lo)) < encode(at(hi)));
    }

    #[test]
    fn decode_inverts_encode(s in 0i64..=MAX_SECS) {
        let name = encode(at(s));
        prop_assert_eq!(name.len(), SEGMENT_NAME_LEN);
        prop_assert_eq!(decode(&name).unwrap(), at(s));
    }

    #[test]
    fn decode_never_panics(name in ".{0,32}") {
        let _ = decode(&name);
    }

    #[test]
    fn accepted_names_are_canonical(name in "[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}") {
        if let Ok(ts) = decode(&name) {
            prop_assert_eq!(encode(ts), name);
        }
    }

    #[test]
    fn scheduler_boundaries_are_strictly_after_now_and_named_validly(
        s in 0i64..(MAX_SECS - 2 * 86_400),
        freq in prop_oneof![Just(Frequency::Minutely), Just(Frequency::Hourly), Just(Frequency::Daily)],
        sec in 0u32..60, min in 0u32..60, hour in 0u32..24,
    ) {
        let sched = HourglassScheduler::new(freq, &format!("{sec} {min} {hour}")).unwrap();
        let now = at(s);
        let next = sched.next_roll_boundary(now);
        prop_assert!(next > now);
        prop_assert!(next - now <= Duration::days(1));
        prop_assert!(is_segment_name(&sched.folder_name(next)));
    }
}
