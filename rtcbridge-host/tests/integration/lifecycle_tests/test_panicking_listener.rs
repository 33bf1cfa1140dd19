use rtcbridge_core::SdpType;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::integration::{create_test_connection, init_tracing, native_offer};

#[test]
fn test_connection_keeps_dispatching_after_listener_panic() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    connection.on_negotiation_needed(|_| panic!("host listener failed"));

    let native = engine.connection(0);
    native.emit_negotiation_needed();
    let outcome = catch_unwind(AssertUnwindSafe(|| connection.dispatch_pending()));
    assert!(outcome.is_err());

    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    native.complete_create(native_offer());

    assert_eq!(connection.dispatch_pending(), 1);
    let description = offer
        .try_result()
        .expect("offer should be settled")
        .expect("offer should resolve");
    assert_eq!(description.sdp_type, SdpType::Offer);
}

#[test]
fn test_operations_behind_a_panicking_listener_are_rejected() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    connection.on_negotiation_needed(|_| panic!("host listener failed"));

    let mut offer = connection.create_offer(None).expect("createOffer failed synchronously");
    let native = engine.connection(0);
    native.emit_negotiation_needed();
    native.complete_create(native_offer());

    let outcome = catch_unwind(AssertUnwindSafe(|| connection.dispatch_pending()));
    assert!(outcome.is_err());

    let error = offer
        .try_result()
        .expect("offer should be settled")
        .expect_err("offer should be rejected");
    assert!(error.message.contains("abandoned"));
}
