#![no_main]

use delivery_window::{loader::decode_event_line, moving_averages};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary lines must decode or fail cleanly, never panic
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(event) = decode_event_line(input) {
            let _ = moving_averages(&[event], 10);
        }
    }
});
