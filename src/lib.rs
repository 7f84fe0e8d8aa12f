//! sensorlink: host-side session controller for FieldSense remote
//! sensors.
//!
//! Discovers a sensor over the short-range wireless link, establishes a
//! session, multiplexes the fixed channel set, drives WiFi provisioning,
//! and relays opportunistic device uploads to the cloud endpoint.
//!
//! Architecture: a synchronous [`session::SessionController`] core behind
//! port traits ([`ports::LinkPort`], [`ports::RelaySink`]), driven by one
//! tokio task ([`runtime::Coordinator`]) that serializes every input and
//! publishes [`session::SessionSnapshot`]s. Adapters live at the edges.

pub mod adapters;
pub mod channel;
pub mod codec;
pub mod config;
pub mod events;
pub mod ports;
pub mod relay;
pub mod runtime;
pub mod session;
pub mod trace;

pub use channel::{ChannelId, ChannelRegistry, ChannelRole, RegistryError};
pub use config::ControllerConfig;
pub use events::{Endpoint, LinkEvent};
pub use ports::{ChannelHandle, EndpointId, LinkError, LinkPort, RelaySink};
pub use relay::{RelayError, RelayOutcome};
pub use runtime::{Command, Coordinator, Input};
pub use session::{Phase, SessionController, SessionSnapshot, WifiNetwork};
pub use trace::{LogEntry, TraceLog, LOG_CAPACITY};
