#![no_main]

use hourglass::naming;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(name) = std::str::from_utf8(data) {
        if let Ok(ts) = naming::decode(name) {
            assert_eq!(naming::encode(ts), name);
        }
    }
});
