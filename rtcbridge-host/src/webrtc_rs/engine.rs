use crate::engine::{NativeEngine, NativePeerConnection, PeerConnectionObserver};
use crate::webrtc_rs::EngineConfig;
use crate::webrtc_rs::peer_connection::WebRtcPeerConnection;
use anyhow::{Context, Result};
use rtcbridge_core::{BundlePolicy, IceTransportPolicy, PortRange, RtcConfiguration, RtcError};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::info;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice::udp_network::{EphemeralUDP, UDPNetwork};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::policy::ice_transport_policy::RTCIceTransportPolicy;

pub struct WebRtcEngine {
    runtime: Option<Runtime>,
}

impl WebRtcEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()
            .context("Failed to start engine runtime")?;
        info!(threads = config.worker_threads, "WebRTC engine started");

        Ok(Self {
            runtime: Some(runtime),
        })
    }
}

impl NativeEngine for WebRtcEngine {
    fn create_peer_connection(
        &self,
        configuration: &RtcConfiguration,
        observer: Arc<dyn PeerConnectionObserver>,
    ) -> Result<Arc<dyn NativePeerConnection>, RtcError> {
        let runtime = self
            .runtime
            .as_ref()
            .map(|runtime| runtime.handle().clone())
            .ok_or_else(|| RtcError::invalid_state("WebRTC engine is shut down"))?;

        let rtc_config = rtc_configuration(configuration);
        let port_range = configuration.port_range;
        let build = async move { new_peer_connection(rtc_config, port_range).await };
        Ok(Arc::new(WebRtcPeerConnection::spawn(build, runtime, observer)))
    }
}

impl Drop for WebRtcEngine {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            info!("WebRTC engine stopped");
        }
    }
}

async fn new_peer_connection(
    config: RTCConfiguration,
    port_range: PortRange,
) -> Result<RTCPeerConnection> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()?;
    let registry = register_default_interceptors(Registry::new(), &mut m)?;

    let mut settings = SettingEngine::default();
    if port_range.min.is_some() || port_range.max.is_some() {
        let ephemeral = EphemeralUDP::new(
            port_range.min.unwrap_or(0),
            port_range.max.unwrap_or(u16::MAX),
        )
        .context("Invalid port range")?;
        settings.set_udp_network(UDPNetwork::Ephemeral(ephemeral));
    }

    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .with_setting_engine(settings)
        .build();

    let peer_connection = api
        .new_peer_connection(config)
        .await
        .context("Failed to create peer connection")?;
    Ok(peer_connection)
}

fn rtc_configuration(configuration: &RtcConfiguration) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: configuration
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect(),
        ice_transport_policy: match configuration.ice_transport_policy {
            IceTransportPolicy::All => RTCIceTransportPolicy::All,
            IceTransportPolicy::Relay => RTCIceTransportPolicy::Relay,
        },
        bundle_policy: match configuration.bundle_policy {
            BundlePolicy::Balanced => RTCBundlePolicy::Balanced,
            BundlePolicy::MaxCompat => RTCBundlePolicy::MaxCompat,
            BundlePolicy::MaxBundle => RTCBundlePolicy::MaxBundle,
        },
        ..Default::default()
    }
}
