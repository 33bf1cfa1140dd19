use rtcbridge_core::{DataChannelState, IceCandidate, NativeSessionDescription, SignalingState};
use rtcbridge_host::{DataChannelHandle, NativeDataChannel, RtcDataChannel};
use std::sync::Arc;

use crate::integration::{create_test_connection, init_tracing};
use crate::utils::{MockDataChannel, Recorder};

#[test]
fn test_notifications_after_close_are_dropped_but_operations_settle() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let recorder = Recorder::new();
    connection.on_ice_candidate(recorder.listener("icecandidate"));
    connection.on_negotiation_needed(recorder.listener("negotiationneeded"));
    let announce = recorder.listener("datachannel");
    connection.on_data_channel(move |channel: &RtcDataChannel| {
        announce(&channel.label().into());
    });

    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    let native = engine.connection(0);

    connection.close();
    assert!(connection.is_closed());
    assert_eq!(connection.signaling_state(), SignalingState::Closed);

    let remote = Arc::new(MockDataChannel::new("late", Some(3)));
    native.emit_candidate(IceCandidate::new("", Some("0".to_string()), None));
    native.emit_negotiation_needed();
    native.emit_remote_channel(DataChannelHandle::new(remote.clone()));
    native.complete_create(NativeSessionDescription::new("offer", "v=0\r\n"));

    assert_eq!(connection.dispatch_pending(), 4);
    assert_eq!(recorder.len(), 0);
    assert!(connection.data_channels().is_empty());
    assert_eq!(remote.ready_state(), DataChannelState::Closing);

    assert!(matches!(offer.try_result(), Some(Ok(_))));
}
