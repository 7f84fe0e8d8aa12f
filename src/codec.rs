//! Payload codecs for the channel wire formats.
//!
//! Stateless, pure functions. A decode failure never touches session
//! state; the caller drops the single offending payload and keeps the
//! session alive.
//!
//! Wire formats, fixed by the device firmware:
//! - push channels carry UTF-8 text;
//! - WiFi scan results are a JSON array of
//!   `{"ssid": "...", "rssi": -62, "open": false, "saved": true}`;
//! - credentials are written as `ssid:password`, forget as `FORGET:ssid`,
//!   scan trigger as the literal `SCAN`.

use std::fmt;

use serde::Deserialize;

use crate::session::WifiNetwork;

/// Trigger written to the WiFi scan channel to start a device-side scan.
pub const SCAN_COMMAND: &[u8] = b"SCAN";

/// Payload decode failure. Always scoped to one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    InvalidUtf8,
    InvalidJson(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "payload is not valid UTF-8"),
            Self::InvalidJson(detail) => write!(f, "payload is not valid scan JSON: {detail}"),
        }
    }
}

/// Decode a push-channel payload as UTF-8 text.
pub fn decode_text(bytes: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8)
}

#[derive(Debug, Deserialize)]
struct WireNetwork {
    ssid: String,
    rssi: i16,
    open: bool,
    saved: bool,
}

/// Decode a WiFi scan result payload.
///
/// The whole payload fails if any element is missing a field or has a
/// mistyped field; partial results are never surfaced.
pub fn decode_scan_results(bytes: &[u8]) -> Result<Vec<WifiNetwork>, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
    let wire: Vec<WireNetwork> =
        serde_json::from_str(text).map_err(|e| CodecError::InvalidJson(e.to_string()))?;
    Ok(wire
        .into_iter()
        .map(|w| WifiNetwork {
            ssid: w.ssid,
            signal_dbm: w.rssi,
            is_open: w.open,
            is_saved: w.saved,
        })
        .collect())
}

/// Encode a credential write as `ssid:password`.
///
/// The separator is not escaped: an SSID containing `:` corrupts the
/// device-side split. The device firmware owns the other half of this
/// format, so the limitation is documented rather than worked around.
pub fn encode_credentials(ssid: &str, password: &str) -> Vec<u8> {
    format!("{ssid}:{password}").into_bytes()
}

/// Encode a forget request as `FORGET:ssid`.
pub fn encode_forget(ssid: &str) -> Vec<u8> {
    format!("FORGET:{ssid}").into_bytes()
}
