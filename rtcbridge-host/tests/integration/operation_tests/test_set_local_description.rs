use rtcbridge_core::{ErrorName, RtcError, SdpType, SessionDescription};
use serde_json::json;

use crate::integration::{OFFER_SDP, create_test_connection, init_tracing, native_offer};
use crate::utils::EngineCall;

#[test]
fn test_missing_sdp_reuses_last_created_offer() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let native = engine.connection(0);

    let _offer = connection.create_offer(None).expect("createOffer failed synchronously");
    native.complete_create(native_offer());
    connection.dispatch_pending();

    let mut set = connection
        .set_local_description(&json!({ "type": "offer" }))
        .expect("setLocalDescription failed synchronously");

    let expected = SessionDescription::new(SdpType::Offer, OFFER_SDP);
    assert_eq!(
        native.calls().last(),
        Some(&EngineCall::SetLocalDescription(expected.clone()))
    );

    native.complete_set();
    connection.dispatch_pending();

    assert_eq!(set.try_result(), Some(Ok(())));
    assert_eq!(connection.local_description(), Some(expected));
}

#[test]
fn test_failed_set_leaves_description_untouched() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let native = engine.connection(0);

    let mut set = connection
        .set_local_description(&json!({ "type": "answer", "sdp": "v=0\r\n" }))
        .expect("setLocalDescription failed synchronously");
    native.fail_set(RtcError::invalid_state("Called in wrong state: stable"));
    connection.dispatch_pending();

    let error = set
        .try_result()
        .expect("set should be settled")
        .expect_err("set should reject");
    assert_eq!(error.name, ErrorName::InvalidStateError);
    assert_eq!(connection.local_description(), None);
}

#[test]
fn test_remote_description_is_recorded_on_success() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let mut set = connection
        .set_remote_description(&json!({ "type": "offer", "sdp": OFFER_SDP }))
        .expect("setRemoteDescription failed synchronously");

    engine.connection(0).complete_set();
    connection.dispatch_pending();

    assert_eq!(set.try_result(), Some(Ok(())));
    assert_eq!(
        connection.remote_description(),
        Some(SessionDescription::new(SdpType::Offer, OFFER_SDP))
    );
}
