use rtcbridge_host::BridgeError;
use serde_json::json;

use crate::integration::{create_test_connection, init_tracing};

#[test]
fn test_missing_sdp_fails_before_reaching_engine() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let result = connection.set_remote_description(&json!({ "type": "offer" }));

    let Err(BridgeError::InvalidArgument(errors)) = result else {
        panic!("expected an invalid argument error");
    };
    assert!(errors.to_string().contains("sdp"), "{errors}");
    assert!(engine.connection(0).calls().is_empty());
    assert_eq!(connection.dispatch_pending(), 0);
    assert_eq!(connection.remote_description(), None);
}

#[test]
fn test_every_problem_is_reported_together() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let result = connection.set_remote_description(&json!({ "type": "bogus", "sdp": 3 }));

    let Err(BridgeError::InvalidArgument(errors)) = result else {
        panic!("expected an invalid argument error");
    };
    let message = errors.to_string();
    assert!(message.contains("RTCSdpType"), "{message}");
    assert!(message.contains("Expected a string"), "{message}");
    assert!(engine.connection(0).calls().is_empty());
}

#[test]
fn test_non_object_description_is_rejected() {
    init_tracing();

    let (_engine, _factory, connection) = create_test_connection();
    let result = connection.set_remote_description(&json!("v=0"));

    assert!(matches!(result, Err(BridgeError::InvalidArgument(_))));
}
