//! Port traits - the hexagonal boundary between the session core and the
//! outside world.
//!
//! ```text
//!   Link adapter ──▶ LinkPort ──▶ SessionController ──▶ RelaySink ──▶ HTTP adapter
//! ```
//!
//! The [`SessionController`](crate::session::controller::SessionController)
//! consumes these traits via generics at call sites, so the core never
//! touches a radio or a socket directly and the whole session logic is
//! testable with recording mocks.
//!
//! Discovery results, connect/disconnect signals, and channel payloads do
//! not come back through `LinkPort` return values. The transport delivers
//! them asynchronously as [`LinkEvent`](crate::events::LinkEvent)s, which
//! the runtime marshals onto the single coordination context.

use std::fmt;

// ───────────────────────────────────────────────────────────────
// Opaque transport tokens
// ───────────────────────────────────────────────────────────────

/// Opaque handle for one logical channel, minted by the link adapter during
/// enumeration. The core never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub u64);

/// Opaque identity of a discovered endpoint (a peripheral address or UUID,
/// depending on the platform transport).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId(pub String);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Link port (consumed transport capability)
// ───────────────────────────────────────────────────────────────

/// Errors from the synchronous `LinkPort` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The radio is off or the stack is not initialised yet.
    PoweredOff,
    /// Channel enumeration on the connected endpoint failed.
    EnumerateFailed,
    /// The transport rejected a subscription request.
    SubscribeFailed,
    /// The transport rejected or could not deliver a write.
    WriteFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoweredOff => write!(f, "link powered off"),
            Self::EnumerateFailed => write!(f, "channel enumeration failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::WriteFailed => write!(f, "write failed"),
        }
    }
}

/// The short-range wireless transport capability.
///
/// Discovery, connection, and notification delivery are owned by the
/// adapter; the session core only orchestrates. Calls that complete
/// asynchronously on a real stack (`connect`, `disconnect`,
/// `start_discovery`) are fire-and-forget here, with completion reported
/// as link events.
pub trait LinkPort {
    /// Whether the radio is powered and ready to scan.
    fn is_powered(&self) -> bool;

    /// Begin scanning for endpoints advertising `service_uuid`.
    fn start_discovery(&mut self, service_uuid: u128);

    /// Cancel an in-progress scan.
    fn stop_discovery(&mut self);

    /// Initiate a connection. Completion arrives as `Connected` or
    /// `ConnectFailed`.
    fn connect(&mut self, endpoint: &EndpointId);

    /// Initiate a disconnect. Completion arrives as `Disconnected`, which
    /// may also fire spontaneously at any time (device-initiated).
    fn disconnect(&mut self, endpoint: &EndpointId);

    /// Enumerate the logical channels the connected endpoint exposes, as
    /// `(characteristic UUID, handle)` pairs.
    fn enumerate(&mut self, endpoint: &EndpointId)
    -> Result<Vec<(u128, ChannelHandle)>, LinkError>;

    /// Subscribe to notifications on a channel.
    fn subscribe(&mut self, handle: ChannelHandle) -> Result<(), LinkError>;

    /// Write `bytes` to a channel.
    fn write(&mut self, handle: ChannelHandle, bytes: &[u8]) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Relay sink port (outbound cloud dispatch)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget dispatch of a prepared relay body to the cloud endpoint.
///
/// Implementations must not block the caller: the HTTP round trip runs on
/// its own task and reports back only as a
/// [`RelayOutcome`](crate::relay::RelayOutcome), which the coordinator
/// merely logs.
pub trait RelaySink {
    fn post(&mut self, body: String);
}
