//! Fuzz test for the mutual-likes row parser
//!
//! The stored procedure's JSON output crosses a trust boundary, so the
//! parser must tolerate arbitrary shapes: wrong types, missing fields,
//! non-array payloads, counts as strings. Feeds it arbitrary JSON and
//! checks the row-drop invariants.
//!
//! Run with: cargo +nightly fuzz run mutual_rows_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use nestmatch_storage::parse_mutual_like_rows;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        // Parsing must never panic, whatever the shape.
        let parsed = parse_mutual_like_rows(&value);

        // Every surviving row met the mutuality threshold.
        for row in &parsed {
            assert!(
                row.liked_by_count >= 2,
                "sub-threshold row survived the parse"
            );
        }

        // Output can never exceed the input row count.
        if let Some(rows) = value.as_array() {
            assert!(parsed.len() <= rows.len());
        } else {
            assert!(parsed.is_empty(), "non-array payload must parse as empty");
        }
    }
});
