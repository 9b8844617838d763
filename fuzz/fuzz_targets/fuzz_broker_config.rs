//! Fuzz target for the broker properties parser and topic validation.
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_broker_config -- -max_total_time=60
//! ```
//!
//! Beyond "never panics", every parsed entry must have a non-empty key
//! without surrounding whitespace.

#![no_main]

use fio_producer::broker_config::parse_broker_config;
use fio_producer::validation::validate_topic_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(map) = parse_broker_config(data) {
        for key in map.keys() {
            assert!(!key.is_empty());
            assert_eq!(key.trim(), key);
        }
    }

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = validate_topic_name(s);
    }
});
