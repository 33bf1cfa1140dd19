use rtcbridge_core::ErrorName;
use serde_json::json;

use crate::integration::{OFFER_SDP, create_test_connection, init_tracing, native_offer};

#[test]
fn test_dropped_observers_reject_their_operations() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    let mut remote = connection
        .set_remote_description(&json!({ "type": "offer", "sdp": OFFER_SDP }))
        .expect("setRemoteDescription failed synchronously");

    engine.connection(0).abandon_all();

    for error in [
        offer.try_result().and_then(Result::err),
        remote.try_result().and_then(Result::err),
    ] {
        let error = error.expect("operation should be rejected");
        assert_eq!(error.name, ErrorName::OperationError);
        assert_eq!(error.message, "operation abandoned before completion");
    }
}

#[test]
fn test_dropping_the_connection_rejects_queued_completions() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    let native = engine.connection(0);
    native.complete_create(native_offer());

    // The completion is queued but never dispatched.
    drop(connection);

    let error = offer
        .try_result()
        .expect("offer should be settled")
        .expect_err("offer should reject");
    assert_eq!(error.name, ErrorName::OperationError);
}

#[test]
fn test_operation_settles_exactly_once() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    engine.connection(0).complete_create(native_offer());
    connection.dispatch_pending();

    assert!(matches!(offer.try_result(), Some(Ok(_))));
    // Once taken, the outcome is not delivered a second time.
    assert!(matches!(offer.try_result(), Some(Err(_))));
    assert_eq!(connection.dispatch_pending(), 0);
}
