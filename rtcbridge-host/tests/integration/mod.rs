pub mod lifecycle_tests;

use rtcbridge_core::NativeSessionDescription;
use rtcbridge_host::{PeerConnectionFactory, RtcPeerConnection};
use tracing::Level;

use crate::utils::MockEngine;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub const OFFER_SDP: &str = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";

pub fn native_offer() -> NativeSessionDescription {
    NativeSessionDescription::new("offer", OFFER_SDP)
}

/// A factory over a fresh mock engine plus one connection built from it.
pub fn create_test_connection() -> (MockEngine, PeerConnectionFactory, RtcPeerConnection) {
    let engine = MockEngine::new();
    let factory = PeerConnectionFactory::new(engine.clone());
    let connection =
        RtcPeerConnection::new(&factory, None).expect("Failed to create peer connection");
    (engine, factory, connection)
}
