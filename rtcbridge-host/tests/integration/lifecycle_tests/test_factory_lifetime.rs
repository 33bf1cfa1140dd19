use rtcbridge_host::{BridgeError, PeerConnectionFactory, RtcPeerConnection};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::integration::init_tracing;
use crate::utils::{EngineCall, MockEngine};

#[test]
fn test_connections_keep_the_factory_alive_until_closed() {
    init_tracing();

    let teardowns = Arc::new(AtomicUsize::new(0));
    let counter = teardowns.clone();
    let engine = MockEngine::new();
    let factory = PeerConnectionFactory::with_teardown(engine.clone(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let first = RtcPeerConnection::new(&factory, None).expect("Failed to create peer connection");
    let second = RtcPeerConnection::new(&factory, None).expect("Failed to create peer connection");
    assert_eq!(factory.live_connections(), 2);

    drop(factory);
    first.close();
    assert_eq!(teardowns.load(Ordering::SeqCst), 0);

    second.close();
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);

    // Closing twice does nothing more.
    second.close();
    assert_eq!(engine.connection(1).calls(), vec![EngineCall::Close]);
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_an_open_connection_closes_the_native_side() {
    init_tracing();

    let engine = MockEngine::new();
    let factory = PeerConnectionFactory::new(engine.clone());
    let connection = RtcPeerConnection::new(&factory, None).expect("Failed to create peer connection");
    let native = engine.connection(0);

    drop(connection);
    assert!(native.is_closed());
    assert_eq!(factory.live_connections(), 0);
}

#[test]
fn test_configuration_is_validated_and_kept() {
    init_tracing();

    let engine = MockEngine::new();
    let factory = PeerConnectionFactory::new(engine.clone());
    let configuration = json!({
        "iceServers": [{ "urls": "stun:stun.example.org:3478" }],
        "portRange": { "min": 40000, "max": 40100 },
    });

    let connection = RtcPeerConnection::new(&factory, Some(&configuration))
        .expect("Failed to create peer connection");
    let kept = connection.get_configuration();
    assert_eq!(kept.ice_servers.len(), 1);
    assert_eq!(kept.ice_servers[0].urls, ["stun:stun.example.org:3478"]);
    assert_eq!(engine.connection(0).configuration, kept);

    let bad = json!({ "portRange": { "min": 41000, "max": 40000 } });
    let result = RtcPeerConnection::new(&factory, Some(&bad));
    assert!(matches!(result, Err(BridgeError::InvalidArgument(_))));
    assert_eq!(engine.connection_count(), 1);
}

#[test]
fn test_engine_refusal_is_reported() {
    init_tracing();

    let engine = MockEngine::new();
    engine.refuse_connections();
    let factory = PeerConnectionFactory::new(engine);

    let result = RtcPeerConnection::new(&factory, None);
    assert!(matches!(result, Err(BridgeError::Engine(_))));
    assert_eq!(factory.live_connections(), 0);
}
