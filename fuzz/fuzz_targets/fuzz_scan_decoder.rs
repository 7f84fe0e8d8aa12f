#![no_main]

use libfuzzer_sys::fuzz_target;

// The scan decoder must never panic on arbitrary payloads, and any
// accepted result must carry fully populated entries.
fuzz_target!(|data: &[u8]| {
    if let Ok(networks) = sensorlink::codec::decode_scan_results(data) {
        for net in &networks {
            let _ = net.ssid.len();
            let _ = net.signal_dbm;
        }
    }
});
