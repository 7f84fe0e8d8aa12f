//! The session coordinator.
//!
//! `SessionController` is the single owner of all session state. It is a
//! plain synchronous struct: the runtime feeds it one input at a time
//! (public operation, link event, or relay outcome) and every method runs
//! to completion before the next input is looked at. Ports are passed at
//! call sites so the whole controller is testable against recording mocks.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::channel::{ChannelId, ChannelRegistry, ChannelRole};
use crate::codec::{self, CodecError, SCAN_COMMAND};
use crate::config::ControllerConfig;
use crate::events::{Endpoint, LinkEvent};
use crate::ports::{EndpointId, LinkPort, RelaySink};
use crate::relay::{self, RelayOutcome};
use crate::session::{Phase, SessionSnapshot, WifiNetwork};
use crate::trace::TraceLog;

/// The endpoint a connect attempt targets. Captured before the discovery
/// working set is cleared so the name survives for logging.
#[derive(Debug, Clone)]
struct TargetDevice {
    id: EndpointId,
    name: String,
}

pub struct SessionController {
    config: ControllerConfig,
    phase: Phase,
    discovered: Vec<Endpoint>,
    target: Option<TargetDevice>,
    registry: ChannelRegistry,
    latest: HashMap<ChannelId, String>,
    networks: Vec<WifiNetwork>,
    scan_pending: bool,
    trace: TraceLog,
}

impl SessionController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            discovered: Vec::new(),
            target: None,
            registry: ChannelRegistry::default(),
            latest: HashMap::new(),
            networks: Vec::new(),
            scan_pending: false,
            trace: TraceLog::new(),
        }
    }

    // ── Lifecycle operations ──────────────────────────────────

    /// Begin discovery. Valid from Idle and Disconnected; a violated
    /// precondition or an unpowered radio is a logged no-op.
    pub fn start_discovery(&mut self, link: &mut impl LinkPort) {
        if !matches!(self.phase, Phase::Idle | Phase::Disconnected) {
            self.trace
                .push(format!("Cannot scan while {}", self.phase));
            return;
        }
        if !link.is_powered() {
            self.trace.push("Link not ready");
            return;
        }
        self.discovered.clear();
        self.phase = Phase::Discovering;
        link.start_discovery(self.config.service_uuid);
        info!("discovery started");
        self.trace.push("Scanning...");
    }

    /// Cancel discovery. A no-op outside Discovering.
    pub fn stop_discovery(&mut self, link: &mut impl LinkPort) {
        if self.phase != Phase::Discovering {
            debug!("stop_discovery ignored in phase {}", self.phase);
            return;
        }
        link.stop_discovery();
        self.discovered.clear();
        self.phase = Phase::Idle;
        self.trace.push("Stopped scanning");
    }

    /// Connect to a previously discovered endpoint. Valid only from
    /// Discovering, and only for an endpoint in the current working set.
    pub fn connect(&mut self, link: &mut impl LinkPort, endpoint: &EndpointId) {
        if self.phase != Phase::Discovering {
            self.trace
                .push(format!("Cannot connect while {}", self.phase));
            return;
        }
        let Some(found) = self.discovered.iter().find(|e| &e.id == endpoint) else {
            self.trace.push(format!("Unknown endpoint {endpoint}"));
            return;
        };
        let target = TargetDevice {
            id: found.id.clone(),
            name: found.name.clone(),
        };
        link.stop_discovery();
        self.discovered.clear();
        self.trace.push(format!("Connecting to {}", target.name));
        self.phase = Phase::Connecting;
        link.connect(&target.id);
        self.target = Some(target);
    }

    /// Request a disconnect. Valid from Connecting and Connected; the
    /// state reset happens only when the Disconnected signal arrives.
    pub fn disconnect(&mut self, link: &mut impl LinkPort) {
        if !matches!(self.phase, Phase::Connecting | Phase::Connected) {
            debug!("disconnect ignored in phase {}", self.phase);
            return;
        }
        if let Some(target) = &self.target {
            link.disconnect(&target.id);
            self.trace.push("Disconnecting");
        }
    }

    // ── WiFi provisioning operations ──────────────────────────

    /// Trigger a device-side WiFi scan. Requires Connected, a ready scan
    /// channel, and no scan already pending.
    pub fn scan_wifi(&mut self, link: &mut impl LinkPort) {
        if self.phase != Phase::Connected {
            self.trace.push("WiFi scan requires a connection");
            return;
        }
        if !self.registry.is_ready(ChannelId::WifiScan) {
            self.trace.push("WiFi scan channel not ready");
            return;
        }
        if self.scan_pending {
            self.trace.push("WiFi scan already in progress");
            return;
        }
        self.scan_pending = true;
        self.networks.clear();
        if self.write_channel(link, ChannelId::WifiScan, SCAN_COMMAND) {
            self.trace.push("Requested WiFi scan");
        }
    }

    /// Send join credentials for a network. The password never reaches
    /// the trace ring or the log facade.
    pub fn send_wifi_credentials(&mut self, link: &mut impl LinkPort, ssid: &str, password: &str) {
        if self.phase != Phase::Connected {
            self.trace.push("Credentials require a connection");
            return;
        }
        if !self.registry.is_ready(ChannelId::WifiCredentials) {
            self.trace.push("Credentials channel not ready");
            return;
        }
        let payload = codec::encode_credentials(ssid, password);
        if self.write_channel(link, ChannelId::WifiCredentials, &payload) {
            self.trace.push(format!("Sent credentials for {ssid}"));
        }
    }

    /// Ask the device to forget stored credentials for `ssid`. The local
    /// saved flag flips optimistically before the write; a later scan is
    /// the source of truth.
    pub fn forget_network(&mut self, link: &mut impl LinkPort, ssid: &str) {
        if self.phase != Phase::Connected {
            self.trace.push("Forget requires a connection");
            return;
        }
        if !self.registry.is_ready(ChannelId::WifiCredentials) {
            self.trace.push("Credentials channel not ready");
            return;
        }
        for net in &mut self.networks {
            if net.ssid == ssid {
                net.is_saved = false;
            }
        }
        let payload = codec::encode_forget(ssid);
        if self.write_channel(link, ChannelId::WifiCredentials, &payload) {
            self.trace.push(format!("Forgetting {ssid}"));
        }
    }

    // ── Inbound events ────────────────────────────────────────

    pub fn handle_event(
        &mut self,
        event: LinkEvent,
        link: &mut impl LinkPort,
        relay: &mut impl RelaySink,
    ) {
        match event {
            LinkEvent::Discovered(endpoint) => self.on_discovered(endpoint),
            LinkEvent::Connected => self.on_connected(link),
            LinkEvent::ConnectFailed(reason) => {
                self.trace.push(format!("Failed to connect: {reason}"));
                self.reset_to_disconnected();
            }
            LinkEvent::Disconnected => self.reset_to_disconnected(),
            LinkEvent::ChannelPayload { channel, bytes } => {
                self.on_payload(channel, &bytes, relay);
            }
            LinkEvent::WriteAck { channel, ok } => {
                if ok {
                    debug!("write acknowledged on {channel}");
                } else {
                    self.trace
                        .push(format!("Write rejected on {channel}"));
                    if let Some(target) = self.target.take() {
                        link.disconnect(&target.id);
                    }
                    self.reset_to_disconnected();
                }
            }
        }
    }

    fn on_discovered(&mut self, endpoint: Endpoint) {
        // Late discovery reports after leaving Discovering are stale.
        if self.phase != Phase::Discovering {
            debug!("dropping late discovery of {}", endpoint.id);
            return;
        }
        if self.discovered.iter().any(|e| e.id == endpoint.id) {
            return;
        }
        self.trace
            .push(format!("Found: {} (RSSI: {})", endpoint.name, endpoint.rssi));
        self.discovered.push(endpoint);
    }

    fn on_connected(&mut self, link: &mut impl LinkPort) {
        if self.phase != Phase::Connecting {
            debug!("dropping connect signal in phase {}", self.phase);
            return;
        }
        let Some(target) = self.target.clone() else {
            warn!("connect signal without a target");
            self.reset_to_disconnected();
            return;
        };
        self.phase = Phase::Connected;
        self.trace.push(format!("Connected to {}", target.name));

        let enumerated = match link.enumerate(&target.id) {
            Ok(set) => set,
            Err(e) => {
                self.trace.push(format!("Channel setup failed: {e}"));
                link.disconnect(&target.id);
                self.reset_to_disconnected();
                return;
            }
        };
        match ChannelRegistry::build(link, &enumerated, &mut self.trace) {
            Ok(registry) => {
                self.registry = registry;
                info!("session established with {}", target.name);
            }
            Err(e) => {
                self.trace.push(format!("{e}"));
                link.disconnect(&target.id);
                self.reset_to_disconnected();
            }
        }
    }

    fn on_payload(&mut self, channel: ChannelId, bytes: &[u8], relay: &mut impl RelaySink) {
        if self.phase != Phase::Connected {
            debug!("dropping payload on {channel} in phase {}", self.phase);
            return;
        }
        match channel.role() {
            ChannelRole::Push => match codec::decode_text(bytes) {
                Ok(value) => {
                    self.trace.push(format!("{channel}: {value}"));
                    self.latest.insert(channel, value);
                }
                Err(e) => self.drop_payload(channel, &e),
            },
            ChannelRole::RequestPush => match codec::decode_scan_results(bytes) {
                Ok(mut networks) => {
                    networks.sort_by(|a, b| b.signal_dbm.cmp(&a.signal_dbm));
                    self.trace
                        .push(format!("WiFi scan found {} networks", networks.len()));
                    self.networks = networks;
                    self.scan_pending = false;
                }
                // scan_pending stays set: no retry, no partial result.
                Err(e) => self.drop_payload(channel, &e),
            },
            ChannelRole::PushTrigger => match codec::decode_text(bytes) {
                Ok(text) => self.forward_relay(&text, relay),
                Err(e) => self.drop_payload(channel, &e),
            },
            ChannelRole::WriteOnly => {
                debug!("dropping unexpected payload on write-only {channel}");
            }
        }
    }

    fn drop_payload(&mut self, channel: ChannelId, err: &CodecError) {
        warn!("bad payload on {channel}: {err}");
        self.trace.push(format!("Bad payload on {channel}: {err}"));
    }

    fn forward_relay(&mut self, text: &str, relay: &mut impl RelaySink) {
        match relay::prepare_payload(text, &self.config) {
            Ok(body) => {
                self.trace.push("Relaying device upload");
                relay.post(body);
            }
            Err(e) => {
                self.trace.push(format!("Relay payload rejected: {e}"));
            }
        }
    }

    /// Record the result of a relay POST. Outcomes are informational
    /// only; the device payload is gone either way.
    pub fn note_relay_outcome(&mut self, outcome: &RelayOutcome) {
        match outcome {
            RelayOutcome::Accepted(status) => {
                self.trace.push(format!("Relay delivered ({status})"));
            }
            RelayOutcome::Rejected { status, body } => {
                self.trace.push(format!("Relay rejected: {status} {body}"));
            }
            RelayOutcome::TransportError(msg) => {
                self.trace.push(format!("Relay error: {msg}"));
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────

    /// Write to a ready channel; a transport-level failure tears the
    /// session down. Returns whether the write was issued.
    fn write_channel(&mut self, link: &mut impl LinkPort, channel: ChannelId, bytes: &[u8]) -> bool {
        let Some(handle) = self.registry.handle(channel) else {
            // Callers check readiness first; a missing handle here means a
            // race with a reset, which the reset already logged.
            debug!("no handle for {channel}");
            return false;
        };
        match link.write(handle, bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!("write failed on {channel}: {e}");
                self.trace.push(format!("Write failed on {channel}: {e}"));
                // Tear the physical link down too; the reset alone would
                // strand an established connection with no target left to
                // disconnect.
                if let Some(target) = self.target.take() {
                    link.disconnect(&target.id);
                }
                self.reset_to_disconnected();
                false
            }
        }
    }

    /// Collapse all session-scoped state. Idempotent: a second disconnect
    /// signal while already Disconnected logs nothing.
    fn reset_to_disconnected(&mut self) {
        if self.phase == Phase::Disconnected {
            return;
        }
        self.phase = Phase::Disconnected;
        self.discovered.clear();
        self.target = None;
        self.registry = ChannelRegistry::default();
        self.latest.clear();
        self.networks.clear();
        self.scan_pending = false;
        info!("session reset");
        self.trace.push("Disconnected");
    }

    // ── Observation ───────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            discovered: self.discovered.clone(),
            readiness: self.registry.readiness(),
            latest: self.latest.clone(),
            networks: self.networks.clone(),
            scan_pending: self.scan_pending,
            log: self.trace.snapshot(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn networks(&self) -> &[WifiNetwork] {
        &self.networks
    }

    pub fn latest(&self, channel: ChannelId) -> Option<&str> {
        self.latest.get(&channel).map(String::as_str)
    }

    pub fn scan_pending(&self) -> bool {
        self.scan_pending
    }

    pub fn log_len(&self) -> usize {
        self.trace.len()
    }
}
