//! Port implementations backed by real I/O.

pub mod http_relay;

pub use http_relay::HttpRelay;
