use rtcbridge_core::{IceCandidate, IceCandidateErrorEvent, IceGatheringState};

use crate::integration::{create_test_connection, init_tracing};
use crate::utils::Recorder;

fn host_candidate(port: u16) -> IceCandidate {
    IceCandidate::new(
        format!("candidate:1 1 udp 2122260223 10.0.0.2 {port} typ host"),
        Some("0".to_string()),
        Some(0),
    )
}

#[test]
fn test_events_replay_in_arrival_order() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let recorder = Recorder::new();
    connection.on_ice_candidate(recorder.listener("icecandidate"));
    connection.on_ice_gathering_state_change(recorder.listener("icegatheringstatechange"));

    let native = engine.connection(0);
    native.emit_candidate(host_candidate(50000));
    native.emit_candidate(host_candidate(50001));
    native.emit_ice_gathering(IceGatheringState::Complete);
    assert_eq!(recorder.len(), 0);

    assert_eq!(connection.dispatch_pending(), 3);
    assert_eq!(
        recorder.names(),
        ["icecandidate", "icecandidate", "icegatheringstatechange"]
    );

    let candidates = recorder.values("icecandidate");
    assert!(candidates[0]["candidate"].as_str().unwrap().contains("50000"));
    assert!(candidates[1]["candidate"].as_str().unwrap().contains("50001"));
    assert_eq!(candidates[0]["sdpMid"], "0");
    assert_eq!(recorder.values("icegatheringstatechange"), ["complete"]);
    assert_eq!(connection.ice_gathering_state(), IceGatheringState::Complete);
}

#[test]
fn test_events_without_listener_are_consumed() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    engine.connection(0).emit_candidate(host_candidate(50000));

    assert_eq!(connection.dispatch_pending(), 1);
    assert_eq!(connection.dispatch_pending(), 0);
}

#[test]
fn test_candidate_error_reaches_listener() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let recorder = Recorder::new();
    connection.on_ice_candidate_error(recorder.listener("icecandidateerror"));

    engine.connection(0).emit_candidate_error(IceCandidateErrorEvent {
        host_candidate: "10.0.0.2:50000".to_string(),
        url: "stun:stun.l.google.com:19302".to_string(),
        error_code: 701,
        error_text: "STUN host lookup received error.".to_string(),
    });
    connection.dispatch_pending();

    let errors = recorder.values("icecandidateerror");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["errorCode"], 701);
    assert_eq!(errors[0]["url"], "stun:stun.l.google.com:19302");
}

#[test]
fn test_listener_may_be_replaced_between_batches() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let first = Recorder::new();
    let second = Recorder::new();
    let native = engine.connection(0);

    connection.on_negotiation_needed(first.listener("negotiationneeded"));
    native.emit_negotiation_needed();
    connection.dispatch_pending();

    connection.on_negotiation_needed(second.listener("negotiationneeded"));
    native.emit_negotiation_needed();
    connection.dispatch_pending();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}
