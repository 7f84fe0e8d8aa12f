#![no_main]

use libfuzzer_sys::fuzz_target;

// Text decode either yields a string that round-trips to the input bytes
// or rejects the payload; it must never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = sensorlink::codec::decode_text(data) {
        assert_eq!(text.as_bytes(), data);
    }
});
