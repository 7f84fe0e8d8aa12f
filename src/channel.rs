//! Fixed channel set and the per-session channel registry.
//!
//! The device exposes one service with up to nine characteristics, each a
//! logical channel with a fixed role. Identifiers and roles are static for
//! the life of the product; readiness is per session and re-derived from
//! scratch on every connect.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::ports::{ChannelHandle, LinkPort};
use crate::trace::TraceLog;

// ───────────────────────────────────────────────────────────────
// Wire identifiers (128-bit UUIDs, one service + nine characteristics)
// ───────────────────────────────────────────────────────────────

/// Service UUID advertised by the sensor; discovery filters on it.
pub const SERVICE_UUID: u128 = 0x4fafc201_1fb5_459e_8fcc_c5c9c331914b;

pub const CHAR_BUTTON: u128 = 0xbeb5483e_36e1_4688_b7f5_ea07361b26a8;
pub const CHAR_STATUS: u128 = 0x1c95d5e3_d8f7_413a_bf3d_7a2e5d7be87e;
pub const CHAR_WIFI_SCAN: u128 = 0x8e7f0d2a_44c1_49bb_9f30_6a85e2d41c77;
pub const CHAR_WIFI_CREDS: u128 = 0x2b3a91cf_0e66_4d8d_b7a4_91c2e85f03d1;
pub const CHAR_WIFI_STATUS: u128 = 0x6f1d8a94_527e_4ceb_8d1f_30b2a4c96e55;
pub const CHAR_SENSOR: u128 = 0xd4a1c0b8_7b35_4a90_a2c6_58e1f7d20943;
pub const CHAR_GPS: u128 = 0x93c2f6e1_1a0d_47b2_bd58_204c8e6a31f9;
pub const CHAR_CELL: u128 = 0x517e9adc_63f8_4f21_8b0a_c49d25e07b86;
pub const CHAR_RELAY: u128 = 0xae04b7d5_92c3_48e6_b1f0_7d36c1a85204;

// ───────────────────────────────────────────────────────────────
// Channel identity and roles
// ───────────────────────────────────────────────────────────────

/// How payloads move on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Device pushes values spontaneously; we subscribe and record the
    /// latest.
    Push,
    /// We write a trigger, device pushes a structured result back on the
    /// same channel.
    RequestPush,
    /// We write, device never pushes.
    WriteOnly,
    /// Device pushes payloads that trigger an outbound relay action, not a
    /// state update.
    PushTrigger,
}

impl ChannelRole {
    /// WriteOnly channels need no notification subscription; every other
    /// role does.
    pub fn requires_subscription(self) -> bool {
        !matches!(self, Self::WriteOnly)
    }
}

/// The nine fixed logical channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    ButtonState,
    StatusText,
    WifiScan,
    WifiCredentials,
    WifiStatus,
    SensorReading,
    GpsStatus,
    CellStatus,
    Relay,
}

impl ChannelId {
    pub const ALL: [ChannelId; 9] = [
        Self::ButtonState,
        Self::StatusText,
        Self::WifiScan,
        Self::WifiCredentials,
        Self::WifiStatus,
        Self::SensorReading,
        Self::GpsStatus,
        Self::CellStatus,
        Self::Relay,
    ];

    pub fn uuid(self) -> u128 {
        match self {
            Self::ButtonState => CHAR_BUTTON,
            Self::StatusText => CHAR_STATUS,
            Self::WifiScan => CHAR_WIFI_SCAN,
            Self::WifiCredentials => CHAR_WIFI_CREDS,
            Self::WifiStatus => CHAR_WIFI_STATUS,
            Self::SensorReading => CHAR_SENSOR,
            Self::GpsStatus => CHAR_GPS,
            Self::CellStatus => CHAR_CELL,
            Self::Relay => CHAR_RELAY,
        }
    }

    /// Reverse lookup from a characteristic UUID. `None` for identifiers
    /// this build does not know about (newer firmware may expose more).
    pub fn from_uuid(uuid: u128) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uuid() == uuid)
    }

    pub fn role(self) -> ChannelRole {
        match self {
            Self::ButtonState | Self::StatusText | Self::WifiStatus => ChannelRole::Push,
            Self::SensorReading | Self::GpsStatus | Self::CellStatus => ChannelRole::Push,
            Self::WifiScan => ChannelRole::RequestPush,
            Self::WifiCredentials => ChannelRole::WriteOnly,
            Self::Relay => ChannelRole::PushTrigger,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ButtonState => "button",
            Self::StatusText => "status",
            Self::WifiScan => "wifi-scan",
            Self::WifiCredentials => "wifi-credentials",
            Self::WifiStatus => "wifi-status",
            Self::SensorReading => "sensor",
            Self::GpsStatus => "gps",
            Self::CellStatus => "cell",
            Self::Relay => "relay",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ───────────────────────────────────────────────────────────────
// Per-session registry
// ───────────────────────────────────────────────────────────────

/// Registry build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The connected endpoint exposed none of the expected channels; it is
    /// not a compatible device.
    UnknownService,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownService => write!(f, "endpoint exposes no recognized channels"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    handle: ChannelHandle,
    ready: bool,
}

/// Maps each known channel to its transport handle and readiness for the
/// current session.
///
/// A channel is *ready* once its handle is stored and, for subscribed
/// roles, its subscription succeeded. Channels absent from the enumerated
/// set (GPS, cellular, and relay are optional on some hardware variants)
/// are simply not ready; writes and triggers on them are logged no-ops,
/// never errors.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    slots: HashMap<ChannelId, Slot>,
}

impl ChannelRegistry {
    /// Build the registry from the enumerated `(uuid, handle)` set,
    /// issuing subscriptions for every role that needs one.
    ///
    /// Unknown identifiers are ignored (forward compatibility). A failed
    /// subscription leaves that one channel not-ready and traces it; it
    /// does not fail the session.
    pub fn build(
        link: &mut impl LinkPort,
        enumerated: &[(u128, ChannelHandle)],
        trace: &mut TraceLog,
    ) -> Result<Self, RegistryError> {
        let mut slots = HashMap::new();

        for &(uuid, handle) in enumerated {
            let Some(channel) = ChannelId::from_uuid(uuid) else {
                debug!("ignoring unknown channel id {uuid:032x}");
                continue;
            };
            let ready = if channel.role().requires_subscription() {
                match link.subscribe(handle) {
                    Ok(()) => true,
                    Err(e) => {
                        trace.push(format!("Subscribe failed on {channel}: {e}"));
                        false
                    }
                }
            } else {
                true
            };
            slots.insert(channel, Slot { handle, ready });
        }

        if slots.is_empty() {
            return Err(RegistryError::UnknownService);
        }

        for channel in ChannelId::ALL {
            if !slots.contains_key(&channel) {
                trace.push(format!("Channel {channel} not present on device"));
            }
        }

        Ok(Self { slots })
    }

    pub fn is_ready(&self, channel: ChannelId) -> bool {
        self.slots.get(&channel).is_some_and(|s| s.ready)
    }

    pub fn handle(&self, channel: ChannelId) -> Option<ChannelHandle> {
        self.slots.get(&channel).map(|s| s.handle)
    }

    /// Readiness of every known channel, present or not.
    pub fn readiness(&self) -> HashMap<ChannelId, bool> {
        ChannelId::ALL
            .into_iter()
            .map(|c| (c, self.is_ready(c)))
            .collect()
    }
}
