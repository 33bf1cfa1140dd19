use rtcbridge_core::IceCandidate;
use rtcbridge_host::BridgeError;
use serde_json::json;

use crate::integration::{create_test_connection, init_tracing};
use crate::utils::EngineCall;

const CANDIDATE: &str = "candidate:1 1 udp 2122260223 192.168.1.4 54321 typ host";

#[test]
fn test_candidate_is_forwarded_and_resolves() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let native = engine.connection(0);

    let mut added = connection
        .add_ice_candidate(&json!({ "candidate": CANDIDATE, "sdpMid": "0", "sdpMLineIndex": 0 }))
        .expect("addIceCandidate failed synchronously");

    assert_eq!(
        native.calls(),
        vec![EngineCall::AddIceCandidate(IceCandidate::new(
            CANDIDATE,
            Some("0".to_string()),
            Some(0)
        ))]
    );

    native.complete_add_candidate();
    assert!(added.try_result().is_none());
    connection.dispatch_pending();
    assert_eq!(added.try_result(), Some(Ok(())));
}

#[test]
fn test_candidate_without_media_section_is_invalid() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let result = connection.add_ice_candidate(&json!({ "candidate": CANDIDATE }));

    let Err(BridgeError::InvalidArgument(errors)) = result else {
        panic!("expected an invalid argument error");
    };
    assert!(errors.to_string().contains("sdpMid"), "{errors}");
    assert!(engine.connection(0).calls().is_empty());
}
