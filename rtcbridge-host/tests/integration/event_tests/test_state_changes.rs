use rtcbridge_core::{IceConnectionState, PeerConnectionState, SignalingState};

use crate::integration::{create_test_connection, init_tracing};
use crate::utils::Recorder;

#[test]
fn test_state_getters_follow_dispatched_events() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let recorder = Recorder::new();
    connection.on_signaling_state_change(recorder.listener("signalingstatechange"));
    connection.on_ice_connection_state_change(recorder.listener("iceconnectionstatechange"));
    connection.on_connection_state_change(recorder.listener("connectionstatechange"));

    let native = engine.connection(0);
    native.emit_signaling(SignalingState::HaveLocalOffer);
    native.emit_ice_connection(IceConnectionState::Checking);
    native.emit_connection(PeerConnectionState::Connecting);

    // Getters reflect what the host has seen, not what the engine has sent.
    assert_eq!(connection.signaling_state(), SignalingState::Stable);
    connection.dispatch_pending();

    assert_eq!(connection.signaling_state(), SignalingState::HaveLocalOffer);
    assert_eq!(connection.ice_connection_state(), IceConnectionState::Checking);
    assert_eq!(connection.connection_state(), PeerConnectionState::Connecting);
    assert_eq!(recorder.values("signalingstatechange"), ["have-local-offer"]);
    assert_eq!(recorder.values("iceconnectionstatechange"), ["checking"]);
    assert_eq!(recorder.values("connectionstatechange"), ["connecting"]);
}

#[test]
fn test_engine_reported_close_finishes_batch_then_stops() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let recorder = Recorder::new();
    connection.on_signaling_state_change(recorder.listener("signalingstatechange"));
    connection.on_connection_state_change(recorder.listener("connectionstatechange"));

    let native = engine.connection(0);
    native.emit_signaling(SignalingState::Closed);
    native.emit_connection(PeerConnectionState::Closed);

    // Both events were in the batch, so both are handled.
    assert_eq!(connection.dispatch_pending(), 2);
    assert_eq!(recorder.names(), ["signalingstatechange", "connectionstatechange"]);
    assert_eq!(connection.signaling_state(), SignalingState::Closed);
}
