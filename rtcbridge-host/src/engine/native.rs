//! The contract a native engine implements. Every method may be called from
//! the host thread; every observer method may be invoked from any engine
//! thread.

use bytes::Bytes;
use rtcbridge_core::{
    AnswerOptions, DataChannelInit, DataChannelState, IceCandidate, IceCandidateErrorEvent,
    IceConnectionState, IceGatheringState, NativeHandleId, NativeSessionDescription, OfferOptions,
    PeerConnectionState, RtcConfiguration, RtcError, SessionDescription, SignalingState,
    StatsReport,
};
use std::fmt;
use std::sync::Arc;

pub trait NativeEngine: Send + Sync {
    fn create_peer_connection(
        &self,
        configuration: &RtcConfiguration,
        observer: Arc<dyn PeerConnectionObserver>,
    ) -> Result<Arc<dyn NativePeerConnection>, RtcError>;
}

pub trait NativePeerConnection: Send + Sync {
    fn create_offer(&self, options: OfferOptions, observer: Box<dyn CreateSessionDescriptionObserver>);

    fn create_answer(
        &self,
        options: AnswerOptions,
        observer: Box<dyn CreateSessionDescriptionObserver>,
    );

    fn set_local_description(
        &self,
        description: SessionDescription,
        observer: Box<dyn SetSessionDescriptionObserver>,
    );

    fn set_remote_description(
        &self,
        description: SessionDescription,
        observer: Box<dyn SetSessionDescriptionObserver>,
    );

    fn add_ice_candidate(&self, candidate: IceCandidate, observer: Box<dyn AddIceCandidateObserver>);

    fn create_data_channel(
        &self,
        label: &str,
        init: &DataChannelInit,
    ) -> Result<DataChannelHandle, RtcError>;

    /// Returns `false` if the request could not be issued; the observer is then dropped unused.
    fn get_stats(&self, observer: Box<dyn StatsObserver>) -> bool;

    fn restart_ice(&self);

    fn close(&self);
}

/// Long-lived observer registered once per connection.
pub trait PeerConnectionObserver: Send + Sync {
    fn on_signaling_change(&self, state: SignalingState);

    fn on_ice_connection_change(&self, state: IceConnectionState);

    fn on_ice_gathering_change(&self, state: IceGatheringState);

    fn on_connection_change(&self, state: PeerConnectionState);

    fn on_ice_candidate(&self, candidate: IceCandidate);

    fn on_ice_candidate_error(&self, error: IceCandidateErrorEvent);

    fn on_data_channel(&self, channel: DataChannelHandle);

    fn on_renegotiation_needed(&self);
}

// One-shot observers: completing one consumes it.

pub trait CreateSessionDescriptionObserver: Send {
    fn on_success(self: Box<Self>, description: NativeSessionDescription);

    fn on_failure(self: Box<Self>, error: RtcError);
}

pub trait SetSessionDescriptionObserver: Send {
    fn on_success(self: Box<Self>);

    fn on_failure(self: Box<Self>, error: RtcError);
}

pub trait AddIceCandidateObserver: Send {
    fn on_success(self: Box<Self>);

    fn on_failure(self: Box<Self>, error: RtcError);
}

pub trait StatsObserver: Send {
    /// Each report comes with its own timestamp.
    fn on_complete(self: Box<Self>, reports: Vec<(f64, StatsReport)>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChannelMessage {
    Text(String),
    Binary(Bytes),
}

impl DataChannelMessage {
    pub fn is_binary(&self) -> bool {
        matches!(self, DataChannelMessage::Binary(_))
    }

    pub fn len(&self) -> usize {
        match self {
            DataChannelMessage::Text(text) => text.len(),
            DataChannelMessage::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait DataChannelObserver: Send + Sync {
    fn on_state_change(&self, state: DataChannelState);

    fn on_message(&self, message: DataChannelMessage);
}

pub trait NativeDataChannel: Send + Sync {
    fn label(&self) -> String;

    fn id(&self) -> Option<u16>;

    fn ready_state(&self) -> DataChannelState;

    fn register_observer(&self, observer: Arc<dyn DataChannelObserver>);

    fn unregister_observer(&self);

    fn send(&self, message: DataChannelMessage) -> Result<(), RtcError>;

    fn close(&self);
}

/// A native data channel as carried inside events. The channel object is
/// thread-safe; the id is what the host side keys its wrappers on.
#[derive(Clone)]
pub struct DataChannelHandle {
    pub id: NativeHandleId,
    pub channel: Arc<dyn NativeDataChannel>,
}

impl DataChannelHandle {
    pub fn new(channel: Arc<dyn NativeDataChannel>) -> Self {
        Self {
            id: NativeHandleId::next(),
            channel,
        }
    }
}

impl fmt::Debug for DataChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataChannelHandle")
            .field("id", &self.id)
            .field("label", &self.channel.label())
            .finish()
    }
}
