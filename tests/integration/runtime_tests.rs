//! Coordinator task: ordered input application and snapshot publication.

use std::time::Duration;

use tokio::time::timeout;

use sensorlink::adapters::HttpRelay;
use sensorlink::runtime::bridge_relay_outcomes;
use sensorlink::{Coordinator, EndpointId, Input, LinkEvent, Phase, RelayOutcome, RelaySink};

use crate::mock_link::{endpoint, MockLink, RecordingRelay, new_controller};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn full_session_is_observable_through_snapshots() {
    let coordinator = Coordinator::spawn(
        new_controller(),
        MockLink::new(),
        RecordingRelay::default(),
    );
    let mut snapshots = coordinator.snapshots();

    coordinator.start_discovery();
    timeout(WAIT, snapshots.wait_for(|s| s.phase == Phase::Discovering))
        .await
        .expect("discovering snapshot")
        .expect("coordinator alive");

    coordinator.link_event(LinkEvent::Discovered(endpoint("dev-1", "FieldSense-01", -50)));
    timeout(WAIT, snapshots.wait_for(|s| s.discovered.len() == 1))
        .await
        .expect("discovery snapshot")
        .expect("coordinator alive");

    coordinator.connect(EndpointId("dev-1".into()));
    coordinator.link_event(LinkEvent::Connected);
    let snap = timeout(WAIT, snapshots.wait_for(|s| s.phase == Phase::Connected))
        .await
        .expect("connected snapshot")
        .expect("coordinator alive")
        .clone();
    assert!(snap.readiness.values().all(|&ready| ready));

    coordinator.link_event(LinkEvent::Disconnected);
    timeout(WAIT, snapshots.wait_for(|s| s.phase == Phase::Disconnected))
        .await
        .expect("disconnected snapshot")
        .expect("coordinator alive");

    coordinator.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn relay_outcomes_reach_the_trace() {
    let coordinator = Coordinator::spawn(
        new_controller(),
        MockLink::new(),
        RecordingRelay::default(),
    );
    let mut snapshots = coordinator.snapshots();

    coordinator.relay_outcome(RelayOutcome::Accepted(200));
    let snap = timeout(WAIT, snapshots.wait_for(|s| !s.log.is_empty()))
        .await
        .expect("log snapshot")
        .expect("coordinator alive")
        .clone();
    assert!(snap.log[0].message.contains("Relay delivered (200)"));

    coordinator.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn http_relay_failure_arrives_through_the_outcome_bridge() {
    // Nothing listens on the discard port; the POST fails at connect time
    // and the classified outcome must still reach the input queue.
    let (mut relay, outcomes) = HttpRelay::new("http://127.0.0.1:9/readings");
    let (tx, mut inputs) = tokio::sync::mpsc::unbounded_channel();
    let bridge = bridge_relay_outcomes(tx, outcomes);

    relay.post(r#"{"temp": 72}"#.into());

    let input = timeout(WAIT, inputs.recv())
        .await
        .expect("outcome within deadline")
        .expect("bridge alive");
    match input {
        Input::RelayOutcome(RelayOutcome::TransportError(_)) => {}
        other => panic!("expected a transport error, got {other:?}"),
    }

    // Dropping the adapter closes the outcome channel and winds the
    // bridge down.
    drop(relay);
    timeout(WAIT, bridge)
        .await
        .expect("bridge exits")
        .expect("bridge task completes");
}

#[tokio::test]
async fn inputs_apply_in_arrival_order() {
    let coordinator = Coordinator::spawn(
        new_controller(),
        MockLink::new(),
        RecordingRelay::default(),
    );
    let mut snapshots = coordinator.snapshots();

    // A connect for an endpoint enqueued before its discovery event must
    // fail; the same command after the discovery event must succeed.
    coordinator.start_discovery();
    coordinator.connect(EndpointId("dev-1".into()));
    coordinator.link_event(LinkEvent::Discovered(endpoint("dev-1", "FieldSense-01", -50)));
    coordinator.connect(EndpointId("dev-1".into()));

    timeout(WAIT, snapshots.wait_for(|s| s.phase == Phase::Connecting))
        .await
        .expect("connecting snapshot")
        .expect("coordinator alive");

    coordinator.shutdown().await.expect("clean shutdown");
}
