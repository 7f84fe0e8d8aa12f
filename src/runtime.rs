//! The single coordination context.
//!
//! One tokio task owns the [`SessionController`] together with its link
//! and relay ports. Public operations, link events, and relay outcomes
//! all enter through one unbounded queue and are applied strictly in
//! arrival order; after every applied input a fresh [`SessionSnapshot`]
//! is published on a watch channel. Observers only ever see snapshots.

use anyhow::Context as _;
use log::debug;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::LinkEvent;
use crate::ports::{EndpointId, LinkPort, RelaySink};
use crate::relay::RelayOutcome;
use crate::session::{SessionController, SessionSnapshot};

/// Public operations, mirrored 1:1 onto controller methods.
#[derive(Debug, Clone)]
pub enum Command {
    StartDiscovery,
    StopDiscovery,
    Connect(EndpointId),
    Disconnect,
    ScanWifi,
    SendWifiCredentials { ssid: String, password: String },
    ForgetNetwork(String),
}

/// Everything that can enter the coordination context.
#[derive(Debug)]
pub enum Input {
    Command(Command),
    Link(LinkEvent),
    RelayOutcome(RelayOutcome),
}

/// Handle to a running coordinator task.
pub struct Coordinator {
    tx: mpsc::UnboundedSender<Input>,
    snapshots: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Coordinator {
    /// Spawn the coordinator, taking ownership of the controller and its
    /// ports.
    pub fn spawn(
        mut controller: SessionController,
        mut link: impl LinkPort + Send + 'static,
        mut relay: impl RelaySink + Send + 'static,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Input>();
        let (snap_tx, snapshots) = watch::channel(controller.snapshot());
        let cancel = CancellationToken::new();
        let child = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    input = rx.recv() => {
                        let Some(input) = input else { break };
                        apply(&mut controller, &mut link, &mut relay, input);
                        let _ = snap_tx.send(controller.snapshot());
                    }
                }
            }
            debug!("coordinator loop exited");
        });

        Self {
            tx,
            snapshots,
            cancel,
            task,
        }
    }

    /// A watch receiver yielding the latest snapshot.
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    // ── Enqueue helpers ───────────────────────────────────────
    //
    // Sends fail only after shutdown; a late caller's input is dropped
    // silently, matching the no-op semantics of inactive states.

    pub fn start_discovery(&self) {
        self.send(Input::Command(Command::StartDiscovery));
    }

    pub fn stop_discovery(&self) {
        self.send(Input::Command(Command::StopDiscovery));
    }

    pub fn connect(&self, endpoint: EndpointId) {
        self.send(Input::Command(Command::Connect(endpoint)));
    }

    pub fn disconnect(&self) {
        self.send(Input::Command(Command::Disconnect));
    }

    pub fn scan_wifi(&self) {
        self.send(Input::Command(Command::ScanWifi));
    }

    pub fn send_wifi_credentials(&self, ssid: impl Into<String>, password: impl Into<String>) {
        self.send(Input::Command(Command::SendWifiCredentials {
            ssid: ssid.into(),
            password: password.into(),
        }));
    }

    pub fn forget_network(&self, ssid: impl Into<String>) {
        self.send(Input::Command(Command::ForgetNetwork(ssid.into())));
    }

    /// Marshal a transport signal into the queue. Link adapters call this
    /// from their callback context.
    pub fn link_event(&self, event: LinkEvent) {
        self.send(Input::Link(event));
    }

    pub fn relay_outcome(&self, outcome: RelayOutcome) {
        self.send(Input::RelayOutcome(outcome));
    }

    /// Sender half for adapters that pump inputs themselves.
    pub fn input_sender(&self) -> mpsc::UnboundedSender<Input> {
        self.tx.clone()
    }

    fn send(&self, input: Input) {
        if self.tx.send(input).is_err() {
            debug!("coordinator gone, input dropped");
        }
    }

    /// Stop the loop and wait for the task to wind down.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        drop(self.tx);
        self.task.await.context("coordinator task panicked")?;
        Ok(())
    }
}

fn apply(
    controller: &mut SessionController,
    link: &mut impl LinkPort,
    relay: &mut impl RelaySink,
    input: Input,
) {
    match input {
        Input::Command(cmd) => match cmd {
            Command::StartDiscovery => controller.start_discovery(link),
            Command::StopDiscovery => controller.stop_discovery(link),
            Command::Connect(endpoint) => controller.connect(link, &endpoint),
            Command::Disconnect => controller.disconnect(link),
            Command::ScanWifi => controller.scan_wifi(link),
            Command::SendWifiCredentials { ssid, password } => {
                controller.send_wifi_credentials(link, &ssid, &password);
            }
            Command::ForgetNetwork(ssid) => controller.forget_network(link, &ssid),
        },
        Input::Link(event) => controller.handle_event(event, link, relay),
        Input::RelayOutcome(outcome) => controller.note_relay_outcome(&outcome),
    }
}

/// Pump classified relay outcomes from an adapter's outcome channel into
/// the coordinator queue. Exits when either side closes.
pub fn bridge_relay_outcomes(
    tx: mpsc::UnboundedSender<Input>,
    mut outcomes: mpsc::UnboundedReceiver<RelayOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            if tx.send(Input::RelayOutcome(outcome)).is_err() {
                break;
            }
        }
    })
}
