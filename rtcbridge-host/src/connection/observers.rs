use crate::connection::{DescriptionKind, DescriptionSide, PeerConnectionEvent, StatsRequest};
use crate::engine::{
    AddIceCandidateObserver, CreateSessionDescriptionObserver, DataChannelHandle,
    PeerConnectionObserver, SetSessionDescriptionObserver, StatsObserver,
};
use crate::event::EventSender;
use crate::promise::PendingOperation;
use rtcbridge_core::{
    IceCandidate, IceCandidateErrorEvent, IceConnectionState, IceGatheringState,
    NativeSessionDescription, PeerConnectionState, RtcError, SessionDescription, SignalingState,
    StatsReport, StatsResponse,
};

type Sender = EventSender<PeerConnectionEvent>;

pub(crate) struct ConnectionObserver {
    pub(crate) sender: Sender,
}

impl PeerConnectionObserver for ConnectionObserver {
    fn on_signaling_change(&self, state: SignalingState) {
        self.sender.send(PeerConnectionEvent::SignalingStateChanged(state));
    }

    fn on_ice_connection_change(&self, state: IceConnectionState) {
        self.sender.send(PeerConnectionEvent::IceConnectionStateChanged(state));
    }

    fn on_ice_gathering_change(&self, state: IceGatheringState) {
        self.sender.send(PeerConnectionEvent::IceGatheringStateChanged(state));
    }

    fn on_connection_change(&self, state: PeerConnectionState) {
        self.sender.send(PeerConnectionEvent::ConnectionStateChanged(state));
    }

    fn on_ice_candidate(&self, candidate: IceCandidate) {
        self.sender.send(PeerConnectionEvent::IceCandidate(candidate));
    }

    fn on_ice_candidate_error(&self, error: IceCandidateErrorEvent) {
        self.sender.send(PeerConnectionEvent::IceCandidateError(error));
    }

    fn on_data_channel(&self, channel: DataChannelHandle) {
        self.sender.send(PeerConnectionEvent::DataChannel(channel));
    }

    fn on_renegotiation_needed(&self) {
        self.sender.send(PeerConnectionEvent::NegotiationNeeded);
    }
}

pub(crate) struct CreateDescriptionObserver {
    pub(crate) kind: DescriptionKind,
    pub(crate) sender: Sender,
    pub(crate) operation: PendingOperation<SessionDescription>,
}

impl CreateSessionDescriptionObserver for CreateDescriptionObserver {
    fn on_success(self: Box<Self>, description: NativeSessionDescription) {
        let Self {
            kind,
            sender,
            operation,
        } = *self;
        sender.send(PeerConnectionEvent::DescriptionCreated {
            kind,
            description,
            operation,
        });
    }

    fn on_failure(self: Box<Self>, error: RtcError) {
        let Self {
            kind,
            sender,
            operation,
        } = *self;
        sender.send(PeerConnectionEvent::DescriptionCreateFailed {
            kind,
            error,
            operation,
        });
    }
}

pub(crate) struct SetDescriptionObserver {
    pub(crate) side: DescriptionSide,
    pub(crate) description: SessionDescription,
    pub(crate) sender: Sender,
    pub(crate) operation: PendingOperation<()>,
}

impl SetSessionDescriptionObserver for SetDescriptionObserver {
    fn on_success(self: Box<Self>) {
        let Self {
            side,
            description,
            sender,
            operation,
        } = *self;
        sender.send(PeerConnectionEvent::DescriptionSet {
            side,
            description,
            operation,
        });
    }

    fn on_failure(self: Box<Self>, error: RtcError) {
        let Self {
            side,
            sender,
            operation,
            ..
        } = *self;
        sender.send(PeerConnectionEvent::DescriptionSetFailed {
            side,
            error,
            operation,
        });
    }
}

pub(crate) struct AddCandidateObserver {
    pub(crate) sender: Sender,
    pub(crate) operation: PendingOperation<()>,
}

impl AddIceCandidateObserver for AddCandidateObserver {
    fn on_success(self: Box<Self>) {
        let Self { sender, operation } = *self;
        sender.send(PeerConnectionEvent::IceCandidateAdded { operation });
    }

    fn on_failure(self: Box<Self>, error: RtcError) {
        let Self { sender, operation } = *self;
        sender.send(PeerConnectionEvent::IceCandidateAddFailed { error, operation });
    }
}

/// Unlike the other adapters this one has a `Drop`, so the parked callback is
/// released even when the engine discards the observer.
pub(crate) struct LegacyStatsObserver {
    pub(crate) sender: Sender,
    pub(crate) request: Option<StatsRequest>,
}

impl StatsObserver for LegacyStatsObserver {
    fn on_complete(mut self: Box<Self>, reports: Vec<(f64, StatsReport)>) {
        if let Some(request) = self.request.take() {
            self.sender.send(PeerConnectionEvent::StatsReady {
                response: StatsResponse::from_timed_reports(reports),
                request,
            });
        }
    }
}

impl Drop for LegacyStatsObserver {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            self.sender.send(PeerConnectionEvent::StatsAbandoned(request));
        }
    }
}
