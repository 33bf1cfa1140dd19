use rtcbridge_core::{DataChannelState, SdpType};
use rtcbridge_host::webrtc_rs::{EngineConfig, WebRtcEngine};
use rtcbridge_host::{PeerConnectionFactory, RtcPeerConnection};
use std::time::Duration;
use tokio::task::LocalSet;

use crate::integration::init_tracing;

#[tokio::test(flavor = "current_thread")]
async fn test_connection_is_usable_before_the_engine_finishes_building_it() {
    init_tracing();

    LocalSet::new()
        .run_until(async {
            let engine = WebRtcEngine::new(EngineConfig::default()).expect("engine failed to start");
            let factory = PeerConnectionFactory::new(engine);
            let connection =
                RtcPeerConnection::new(&factory, None).expect("Failed to create peer connection");
            let _dispatch = connection.spawn_dispatch();

            let channel = connection
                .create_data_channel("chat", None)
                .expect("createDataChannel failed synchronously");
            assert_eq!(channel.label(), "chat");
            assert_eq!(channel.ready_state(), DataChannelState::Connecting);

            let offer = connection.create_offer(None).expect("createOffer failed synchronously");
            let description = tokio::time::timeout(Duration::from_secs(10), offer)
                .await
                .expect("offer was never settled")
                .expect("offer should resolve");
            assert_eq!(description.sdp_type, SdpType::Offer);
            assert!(description.sdp.starts_with("v=0"));

            connection.close();
        })
        .await;
}
