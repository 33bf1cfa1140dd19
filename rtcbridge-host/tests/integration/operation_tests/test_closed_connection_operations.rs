use rtcbridge_core::ErrorName;
use rtcbridge_host::BridgeError;
use serde_json::json;

use crate::integration::{OFFER_SDP, create_test_connection, init_tracing};
use crate::utils::EngineCall;

#[test]
fn test_operations_after_close_are_already_rejected() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    connection.close();

    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    let mut answer = connection.create_answer(None).expect("createAnswer failed synchronously");
    let mut remote = connection
        .set_remote_description(&json!({ "type": "offer", "sdp": OFFER_SDP }))
        .expect("setRemoteDescription failed synchronously");
    let mut candidate = connection
        .add_ice_candidate(&json!({ "candidate": "", "sdpMid": "0" }))
        .expect("addIceCandidate failed synchronously");

    let offer_error = offer.try_result().and_then(Result::err).expect("offer should reject");
    assert_eq!(offer_error.name, ErrorName::InvalidStateError);
    assert!(offer_error.message.contains("createOffer"), "{}", offer_error.message);

    let answer_error = answer.try_result().and_then(Result::err).expect("answer should reject");
    assert!(answer_error.message.contains("'closed'"), "{}", answer_error.message);

    let remote_error = remote.try_result().and_then(Result::err).expect("set should reject");
    assert_eq!(remote_error.name, ErrorName::InvalidStateError);

    let candidate_error = candidate
        .try_result()
        .and_then(Result::err)
        .expect("candidate should reject");
    assert_eq!(
        candidate_error.message,
        "Failed to set ICE candidate; RTCPeerConnection is closed."
    );

    // Nothing but the close itself reached the engine.
    assert_eq!(engine.connection(0).calls(), vec![EngineCall::Close]);
}

#[test]
fn test_argument_errors_still_win_over_closed_state() {
    init_tracing();

    let (_engine, _factory, connection) = create_test_connection();
    connection.close();

    let result = connection.set_remote_description(&json!({ "type": "offer" }));
    assert!(matches!(result, Err(BridgeError::InvalidArgument(_))));
}

#[test]
fn test_create_data_channel_after_close_fails() {
    init_tracing();

    let (_engine, _factory, connection) = create_test_connection();
    connection.close();

    let result = connection.create_data_channel("chat", None);
    assert!(matches!(result, Err(BridgeError::InvalidState(_))));
    assert!(matches!(
        connection.get_stats(|_| {}),
        Err(BridgeError::InvalidState(_))
    ));
}
