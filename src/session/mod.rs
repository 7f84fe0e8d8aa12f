//! Session state machine: phase, observable snapshot, and the controller.
//!
//! ```text
//!   Idle ──▶ Discovering ──▶ Connecting ──▶ Connected
//!    ▲            │              │              │
//!    └────────────┘              ▼              ▼
//!   (stop)                  Disconnected ◀──────┘
//!                                │
//!                                └──▶ Discovering (re-scan)
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::channel::ChannelId;
use crate::events::Endpoint;
use crate::trace::LogEntry;

pub mod controller;

pub use controller::SessionController;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Discovering,
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// One WiFi network as reported by the device scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiNetwork {
    pub ssid: String,
    pub signal_dbm: i16,
    pub is_open: bool,
    /// Whether the device has stored credentials for this network.
    /// Flipped locally and optimistically by `forget_network`.
    pub is_saved: bool,
}

/// Point-in-time, read-only view of the whole session, published after
/// every processed input.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub discovered: Vec<Endpoint>,
    pub readiness: HashMap<ChannelId, bool>,
    /// Latest decoded text per push channel. Absent means no valid value
    /// this session.
    pub latest: HashMap<ChannelId, String>,
    /// Last complete scan result, sorted by descending signal strength.
    pub networks: Vec<WifiNetwork>,
    pub scan_pending: bool,
    pub log: Vec<LogEntry>,
}
