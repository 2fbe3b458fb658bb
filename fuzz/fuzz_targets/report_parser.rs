#![no_main]

use libfuzzer_sys::fuzz_target;
use stackdrop::profile_report::parse_profile;

fuzz_target!(|data: &[u8]| {
    // Runtime output is decoded lossily before parsing, so do the same here
    let report = String::from_utf8_lossy(data);
    if let Some(breakdown) = parse_profile(&report) {
        assert!(breakdown.unknown_java >= 0.0);
        assert!(breakdown.not_walkable_java >= 0.0);
    }
});
