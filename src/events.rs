//! Inbound link event alphabet.
//!
//! Everything the transport can tell the session core arrives as exactly
//! one of these variants, marshaled through the coordinator's single input
//! queue so the core processes them one at a time, in arrival order.

use crate::channel::ChannelId;
use crate::ports::EndpointId;

/// One endpoint seen during discovery. Immutable once captured; the
/// working set is discarded on leaving Discovering or on a successful
/// connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    /// Signal strength at discovery time, dBm.
    pub rssi: i16,
}

/// Asynchronous signals from the link adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// An advertisement matching the service filter was seen.
    Discovered(Endpoint),
    /// The pending connect attempt succeeded.
    Connected,
    /// The pending connect attempt failed.
    ConnectFailed(String),
    /// The link dropped, either requested or spontaneous.
    Disconnected,
    /// A notification payload arrived on a subscribed channel. The adapter
    /// resolves the characteristic identifier to a `ChannelId` before
    /// marshaling; payloads for unrecognized identifiers are dropped at
    /// the adapter edge.
    ChannelPayload { channel: ChannelId, bytes: Vec<u8> },
    /// Delivery confirmation for an acknowledged write.
    WriteAck { channel: ChannelId, ok: bool },
}
