//! WiFi provisioning: scan trigger, scan results, credentials, forget.

use sensorlink::{ChannelId, EndpointId, LinkEvent, Phase};

use crate::mock_link::{connect_session, LinkCall, MockLink, RecordingRelay, new_controller};

const SCAN_RESULT: &[u8] = br#"[
    {"ssid": "CoffeeShop", "rssi": -71, "open": true,  "saved": false},
    {"ssid": "HomeNet",    "rssi": -45, "open": false, "saved": true},
    {"ssid": "Neighbor",   "rssi": -82, "open": false, "saved": false}
]"#;

#[test]
fn scan_writes_trigger_and_sets_pending() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);

    controller.scan_wifi(&mut link);

    assert!(controller.scan_pending());
    assert_eq!(link.writes_to(ChannelId::WifiScan), vec![b"SCAN".to_vec()]);
}

#[test]
fn second_scan_while_pending_is_a_noop() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);

    controller.scan_wifi(&mut link);
    controller.scan_wifi(&mut link);

    assert_eq!(link.writes_to(ChannelId::WifiScan).len(), 1);
    assert!(controller
        .snapshot()
        .log
        .iter()
        .any(|e| e.message.contains("already in progress")));
}

#[test]
fn scan_outside_connected_is_a_noop() {
    let mut controller = new_controller();
    let mut link = MockLink::new();

    controller.scan_wifi(&mut link);

    assert!(!controller.scan_pending());
    assert!(link.calls.is_empty());
}

#[test]
fn scan_result_replaces_networks_sorted_by_signal() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);
    controller.scan_wifi(&mut link);

    controller.handle_event(
        LinkEvent::ChannelPayload {
            channel: ChannelId::WifiScan,
            bytes: SCAN_RESULT.to_vec(),
        },
        &mut link,
        &mut relay,
    );

    assert!(!controller.scan_pending());
    let ssids: Vec<_> = controller.networks().iter().map(|n| n.ssid.as_str()).collect();
    assert_eq!(ssids, ["HomeNet", "CoffeeShop", "Neighbor"]);
    assert!(controller.networks()[0].is_saved);
    assert!(controller.networks()[1].is_open);
}

#[test]
fn malformed_scan_result_leaves_pending_set() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);
    controller.scan_wifi(&mut link);
    let log_before = controller.log_len();

    controller.handle_event(
        LinkEvent::ChannelPayload {
            channel: ChannelId::WifiScan,
            bytes: br#"[{"ssid": "A"}]"#.to_vec(),
        },
        &mut link,
        &mut relay,
    );

    assert!(controller.scan_pending());
    assert!(controller.networks().is_empty());
    assert_eq!(controller.phase(), Phase::Connected);
    // Exactly one log entry for the dropped payload.
    assert_eq!(controller.log_len(), log_before + 1);
}

#[test]
fn credentials_are_joined_with_colon() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);

    controller.send_wifi_credentials(&mut link, "HomeNet", "hunter2");

    assert_eq!(
        link.writes_to(ChannelId::WifiCredentials),
        vec![b"HomeNet:hunter2".to_vec()]
    );
    let snap = controller.snapshot();
    assert!(snap.log[0].message.contains("HomeNet"));
    // The password must never appear in the trace.
    assert!(snap.log.iter().all(|e| !e.message.contains("hunter2")));
}

#[test]
fn open_network_credentials_carry_empty_password() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);

    controller.send_wifi_credentials(&mut link, "CoffeeShop", "");

    assert_eq!(
        link.writes_to(ChannelId::WifiCredentials),
        vec![b"CoffeeShop:".to_vec()]
    );
}

#[test]
fn credentials_outside_connected_are_a_noop() {
    let mut controller = new_controller();
    let mut link = MockLink::new();

    controller.send_wifi_credentials(&mut link, "HomeNet", "hunter2");

    assert!(link.calls.is_empty());
    assert!(controller.snapshot().log[0].message.contains("connection"));
}

#[test]
fn forget_flips_saved_flag_and_writes_once() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);
    controller.scan_wifi(&mut link);
    controller.handle_event(
        LinkEvent::ChannelPayload {
            channel: ChannelId::WifiScan,
            bytes: SCAN_RESULT.to_vec(),
        },
        &mut link,
        &mut relay,
    );
    assert!(controller.networks().iter().any(|n| n.is_saved));

    controller.forget_network(&mut link, "HomeNet");

    // Optimistic local flip, regardless of what the device does later.
    assert!(controller.networks().iter().all(|n| !n.is_saved));
    assert_eq!(
        link.writes_to(ChannelId::WifiCredentials),
        vec![b"FORGET:HomeNet".to_vec()]
    );
}

#[test]
fn write_failure_during_provisioning_resets_session() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);
    link.fail_write = true;

    controller.send_wifi_credentials(&mut link, "HomeNet", "hunter2");

    assert_eq!(controller.phase(), Phase::Disconnected);
    let snap = controller.snapshot();
    assert_eq!(snap.log[0].message, "Disconnected");
    assert!(snap.log[1].message.contains("Write failed"));
    // No "Sent credentials" line after the failure.
    assert!(snap.log.iter().all(|e| !e.message.contains("Sent credentials")));
}

#[test]
fn write_failure_tears_the_physical_link_down() {
    let mut controller = new_controller();
    let mut link = MockLink::new();
    let mut relay = RecordingRelay::default();
    connect_session(&mut controller, &mut link, &mut relay);
    link.fail_write = true;

    controller.send_wifi_credentials(&mut link, "HomeNet", "hunter2");

    // The reset must be preceded by exactly one transport disconnect, or
    // the established link would outlive the session with no target left
    // to tear it down.
    assert_eq!(controller.phase(), Phase::Disconnected);
    assert_eq!(
        link.count(&LinkCall::Disconnect(EndpointId("dev-1".into()))),
        1
    );

    // The session is already torn down; a follow-up disconnect request
    // has nothing left to do.
    controller.disconnect(&mut link);
    assert_eq!(
        link.count(&LinkCall::Disconnect(EndpointId("dev-1".into()))),
        1
    );
}
