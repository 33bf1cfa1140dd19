use rtcbridge_core::{IceCandidate, NativeSessionDescription, SdpType};
use std::time::Duration;
use tokio::task::LocalSet;

use crate::integration::{create_test_connection, init_tracing, native_offer};
use crate::utils::Recorder;

#[tokio::test]
async fn test_spawned_dispatch_settles_awaited_operations() {
    init_tracing();

    LocalSet::new()
        .run_until(async {
            let (engine, _factory, connection) = create_test_connection();
            let recorder = Recorder::new();
            connection.on_ice_candidate(recorder.listener("icecandidate"));
            let dispatch = connection.spawn_dispatch();

            let offer = connection.create_offer(None).expect("createOffer failed synchronously");
            let native = engine.connection(0);
            native.emit_candidate(IceCandidate::new("", Some("0".to_string()), None));
            native.complete_create(native_offer());

            let description = tokio::time::timeout(Duration::from_secs(5), offer)
                .await
                .expect("offer was never settled")
                .expect("offer should resolve");
            assert_eq!(description.sdp_type, SdpType::Offer);
            assert_eq!(recorder.len(), 1);

            connection.close();
            drop(connection);
            tokio::time::timeout(Duration::from_secs(5), dispatch)
                .await
                .expect("dispatch task did not finish once the connection was dropped")
                .expect("dispatch task panicked");
        })
        .await;
}

#[tokio::test]
async fn test_completion_after_close_settles_awaited_operation() {
    init_tracing();

    LocalSet::new()
        .run_until(async {
            let (engine, _factory, connection) = create_test_connection();
            let dispatch = connection.spawn_dispatch();
            let answer = connection.create_answer(None).expect("createAnswer failed synchronously");

            connection.close();
            tokio::task::yield_now().await;

            // The engine finishes the request after the connection closed.
            engine
                .connection(0)
                .complete_create(NativeSessionDescription::new("answer", "v=0\r\n"));

            let description = tokio::time::timeout(Duration::from_secs(5), answer)
                .await
                .expect("answer was never settled")
                .expect("answer should resolve");
            assert_eq!(description.sdp_type, SdpType::Answer);
            assert!(!dispatch.is_finished());
        })
        .await;
}

#[tokio::test]
async fn test_completion_after_close_settles_on_manual_dispatch() {
    init_tracing();

    LocalSet::new()
        .run_until(async {
            let (engine, _factory, connection) = create_test_connection();
            let mut answer = connection.create_answer(None).expect("createAnswer failed synchronously");

            connection.close();
            engine
                .connection(0)
                .complete_create(NativeSessionDescription::new("answer", "v=0\r\n"));
            assert!(answer.try_result().is_none());

            assert_eq!(connection.dispatch_pending(), 1);
            let description = answer
                .try_result()
                .expect("answer should be settled")
                .expect("answer should resolve");
            assert_eq!(description.sdp_type, SdpType::Answer);
        })
        .await;
}
