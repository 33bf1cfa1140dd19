use crate::engine::{
    AddIceCandidateObserver, CreateSessionDescriptionObserver, DataChannelHandle,
    NativePeerConnection, PeerConnectionObserver, SetSessionDescriptionObserver, StatsObserver,
};
use crate::webrtc_rs::data_channel::WebRtcDataChannel;
use crate::webrtc_rs::states;
use anyhow::Result;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use rtcbridge_core::{
    AnswerOptions, DataChannelInit, IceCandidate, NativeSessionDescription, OfferOptions,
    RtcError, SdpType, SessionDescription, StatsReport,
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tracing::{debug, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::offer_answer_options::{RTCAnswerOptions, RTCOfferOptions};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::stats::StatsReport as WebRtcStatsReport;

/// Native channels keyed by object address, so the same channel always
/// yields the same handle.
type ChannelRegistry = Arc<DashMap<usize, DataChannelHandle>>;

/// The peer connection as it comes out of construction on the engine runtime.
type PendingPeerConnection = Shared<BoxFuture<'static, Result<Arc<RTCPeerConnection>, RtcError>>>;

/// A webrtc-rs peer connection that may still be under construction.
///
/// Every operation runs on the engine runtime and first waits for
/// construction, so the host thread never blocks on webrtc-rs. If
/// construction fails, each operation reports that failure to its observer.
pub(crate) struct WebRtcPeerConnection {
    peer_connection: PendingPeerConnection,
    runtime: Handle,
    observer: Arc<dyn PeerConnectionObserver>,
    channels: ChannelRegistry,
    ice_restart: AtomicBool,
}

impl WebRtcPeerConnection {
    pub(crate) fn spawn<F>(build: F, runtime: Handle, observer: Arc<dyn PeerConnectionObserver>) -> Self
    where
        F: Future<Output = anyhow::Result<RTCPeerConnection>> + Send + 'static,
    {
        let channels: ChannelRegistry = Arc::new(DashMap::new());

        let construction = runtime.spawn({
            let observer = observer.clone();
            let channels = channels.clone();
            let runtime = runtime.clone();
            async move {
                let peer_connection = match build.await {
                    Ok(peer_connection) => Arc::new(peer_connection),
                    Err(e) => {
                        warn!("Failed to create peer connection: {:#}", e);
                        return Err(RtcError::operation(format!("{e:#}")));
                    }
                };
                register_handlers(&peer_connection, observer, channels, runtime);
                debug!("Native peer connection created");
                Ok(peer_connection)
            }
        });
        let peer_connection = async move {
            match construction.await {
                Ok(built) => built,
                Err(e) => Err(engine_error(e)),
            }
        }
        .boxed()
        .shared();

        Self {
            peer_connection,
            runtime,
            observer,
            channels,
            ice_restart: AtomicBool::new(false),
        }
    }
}

fn register_handlers(
    peer_connection: &RTCPeerConnection,
    observer: Arc<dyn PeerConnectionObserver>,
    channels: ChannelRegistry,
    runtime: Handle,
) {
    let obs = observer.clone();
    peer_connection.on_signaling_state_change(Box::new(move |s: RTCSignalingState| {
        let obs = obs.clone();
        Box::pin(async move {
            if let Some(state) = states::signaling(s) {
                obs.on_signaling_change(state);
            }
        })
    }));

    let obs = observer.clone();
    peer_connection.on_ice_connection_state_change(Box::new(
        move |s: RTCIceConnectionState| {
            let obs = obs.clone();
            Box::pin(async move {
                if let Some(state) = states::ice_connection(s) {
                    obs.on_ice_connection_change(state);
                }
            })
        },
    ));

    let obs = observer.clone();
    peer_connection.on_ice_gathering_state_change(Box::new(move |s: RTCIceGathererState| {
        let obs = obs.clone();
        Box::pin(async move {
            if let Some(state) = states::ice_gathering(s) {
                obs.on_ice_gathering_change(state);
            }
        })
    }));

    let obs = observer.clone();
    peer_connection.on_peer_connection_state_change(Box::new(
        move |s: RTCPeerConnectionState| {
            let obs = obs.clone();
            Box::pin(async move {
                if let Some(state) = states::connection(s) {
                    obs.on_connection_change(state);
                }
            })
        },
    ));

    let obs = observer.clone();
    peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
        let obs = obs.clone();
        Box::pin(async move {
            // `None` marks the end of gathering, reported through the gathering state.
            let Some(candidate) = c else { return };
            match candidate.to_json() {
                Ok(init) => obs.on_ice_candidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                }),
                Err(e) => warn!("Failed to serialize local ICE candidate: {:?}", e),
            }
        })
    }));

    let obs = observer.clone();
    peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
        let obs = obs.clone();
        let handle = channel_handle(&channels, dc, &runtime);
        Box::pin(async move {
            debug!("Remote data channel announced: {:?}", handle);
            obs.on_data_channel(handle);
        })
    }));

    let obs = observer;
    peer_connection.on_negotiation_needed(Box::new(move || {
        let obs = obs.clone();
        Box::pin(async move {
            obs.on_renegotiation_needed();
        })
    }));
}

fn channel_handle(
    channels: &ChannelRegistry,
    dc: Arc<RTCDataChannel>,
    runtime: &Handle,
) -> DataChannelHandle {
    let key = Arc::as_ptr(&dc) as usize;
    channels
        .entry(key)
        .or_insert_with(|| DataChannelHandle::new(Arc::new(WebRtcDataChannel::new(dc, runtime))))
        .clone()
}

fn rtc_description(description: &SessionDescription) -> Result<RTCSessionDescription> {
    let sdp = description.sdp.clone();
    let converted = match description.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(sdp)?,
        SdpType::Pranswer => RTCSessionDescription::pranswer(sdp)?,
        SdpType::Rollback => serde_json::from_value(json!({ "type": "rollback", "sdp": sdp }))?,
    };
    Ok(converted)
}

fn native_description(description: RTCSessionDescription) -> NativeSessionDescription {
    NativeSessionDescription::new(description.sdp_type.to_string(), description.sdp)
}

/// Flattens every report to string pairs, keeping its own timestamp.
fn flatten_stats(report: WebRtcStatsReport) -> Vec<(f64, StatsReport)> {
    let Ok(Value::Object(reports)) = serde_json::to_value(&report.reports) else {
        return Vec::new();
    };

    reports
        .into_iter()
        .filter_map(|(id, value)| {
            let Value::Object(fields) = value else {
                return None;
            };
            let timestamp = fields
                .get("timestamp")
                .and_then(Value::as_f64)
                .unwrap_or_default();
            let mut flat: StatsReport = fields
                .into_iter()
                .map(|(key, value)| match value {
                    Value::String(text) => (key, text),
                    other => (key, other.to_string()),
                })
                .collect();
            flat.entry("id".to_owned()).or_insert(id);
            flat.entry("type".to_owned())
                .or_insert_with(|| "unknown".to_owned());
            Some((timestamp, flat))
        })
        .collect()
}

fn engine_error(error: impl std::fmt::Display) -> RtcError {
    RtcError::operation(error.to_string())
}

impl NativePeerConnection for WebRtcPeerConnection {
    fn create_offer(&self, options: OfferOptions, observer: Box<dyn CreateSessionDescriptionObserver>) {
        let pc = self.peer_connection.clone();
        let ice_restart = options.ice_restart || self.ice_restart.swap(false, Ordering::AcqRel);
        self.runtime.spawn(async move {
            let pc = match pc.await {
                Ok(pc) => pc,
                Err(e) => return observer.on_failure(e),
            };
            let options = RTCOfferOptions {
                ice_restart,
                voice_activity_detection: options.voice_activity_detection,
            };
            match pc.create_offer(Some(options)).await {
                Ok(offer) => observer.on_success(native_description(offer)),
                Err(e) => observer.on_failure(engine_error(e)),
            }
        });
    }

    fn create_answer(
        &self,
        options: AnswerOptions,
        observer: Box<dyn CreateSessionDescriptionObserver>,
    ) {
        let pc = self.peer_connection.clone();
        self.runtime.spawn(async move {
            let pc = match pc.await {
                Ok(pc) => pc,
                Err(e) => return observer.on_failure(e),
            };
            let options = RTCAnswerOptions {
                voice_activity_detection: options.voice_activity_detection,
            };
            match pc.create_answer(Some(options)).await {
                Ok(answer) => observer.on_success(native_description(answer)),
                Err(e) => observer.on_failure(engine_error(e)),
            }
        });
    }

    fn set_local_description(
        &self,
        description: SessionDescription,
        observer: Box<dyn SetSessionDescriptionObserver>,
    ) {
        let pc = self.peer_connection.clone();
        self.runtime.spawn(async move {
            let pc = match pc.await {
                Ok(pc) => pc,
                Err(e) => return observer.on_failure(e),
            };
            let description = match rtc_description(&description) {
                Ok(description) => description,
                Err(e) => return observer.on_failure(engine_error(e)),
            };
            match pc.set_local_description(description).await {
                Ok(()) => observer.on_success(),
                Err(e) => observer.on_failure(engine_error(e)),
            }
        });
    }

    fn set_remote_description(
        &self,
        description: SessionDescription,
        observer: Box<dyn SetSessionDescriptionObserver>,
    ) {
        let pc = self.peer_connection.clone();
        self.runtime.spawn(async move {
            let pc = match pc.await {
                Ok(pc) => pc,
                Err(e) => return observer.on_failure(e),
            };
            let description = match rtc_description(&description) {
                Ok(description) => description,
                Err(e) => return observer.on_failure(engine_error(e)),
            };
            match pc.set_remote_description(description).await {
                Ok(()) => observer.on_success(),
                Err(e) => observer.on_failure(engine_error(e)),
            }
        });
    }

    fn add_ice_candidate(&self, candidate: IceCandidate, observer: Box<dyn AddIceCandidateObserver>) {
        let pc = self.peer_connection.clone();
        self.runtime.spawn(async move {
            let pc = match pc.await {
                Ok(pc) => pc,
                Err(e) => return observer.on_failure(e),
            };
            let init = RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            };
            match pc.add_ice_candidate(init).await {
                Ok(()) => observer.on_success(),
                Err(e) => observer.on_failure(engine_error(e)),
            }
        });
    }

    fn create_data_channel(
        &self,
        label: &str,
        init: &DataChannelInit,
    ) -> Result<DataChannelHandle, RtcError> {
        let pc = self.peer_connection.clone();
        let name = label.to_owned();
        let negotiated_id = if init.negotiated { init.id } else { None };
        let init = RTCDataChannelInit {
            ordered: Some(init.ordered),
            max_packet_life_time: init.max_packet_life_time,
            max_retransmits: init.max_retransmits,
            protocol: Some(init.protocol.clone()),
            negotiated: negotiated_id,
        };

        let create = async move {
            let pc = pc.await?;
            pc.create_data_channel(&name, Some(init))
                .await
                .map_err(engine_error)
        };
        let channel = WebRtcDataChannel::pending(label.to_owned(), negotiated_id, &self.runtime, create);
        Ok(DataChannelHandle::new(Arc::new(channel)))
    }

    fn get_stats(&self, observer: Box<dyn StatsObserver>) -> bool {
        let pc = self.peer_connection.clone();
        self.runtime.spawn(async move {
            // Dropping the observer unanswered abandons the request.
            let Ok(pc) = pc.await else { return };
            let report = pc.get_stats().await;
            observer.on_complete(flatten_stats(report));
        });
        true
    }

    /// webrtc-rs restarts ICE through the next offer; flag it and ask for negotiation.
    fn restart_ice(&self) {
        self.ice_restart.store(true, Ordering::Release);
        let observer = self.observer.clone();
        self.runtime.spawn(async move {
            observer.on_renegotiation_needed();
        });
    }

    fn close(&self) {
        let pc = self.peer_connection.clone();
        self.channels.clear();
        self.runtime.spawn(async move {
            let Ok(pc) = pc.await else { return };
            if let Err(e) = pc.close().await {
                warn!("Failed to close peer connection: {:?}", e);
            }
        });
    }
}
