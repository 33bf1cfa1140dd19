use crate::engine::DataChannelHandle;
use crate::promise::PendingOperation;
use rtcbridge_core::{
    IceCandidate, IceCandidateErrorEvent, IceConnectionState, IceGatheringState,
    NativeSessionDescription, PeerConnectionState, RtcError, SessionDescription, SignalingState,
    StatsResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSide {
    Local,
    Remote,
}

/// Ticket for a legacy stats callback parked on the host side. Not `Clone`:
/// it is moved into the engine observer and then into exactly one event.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct StatsRequest(pub(crate) u64);

/// Everything the engine can report to a connection. Each variant owns its
/// payload and is safe to move off the thread that produced it.
#[derive(Debug)]
pub enum PeerConnectionEvent {
    DescriptionCreated {
        kind: DescriptionKind,
        description: NativeSessionDescription,
        operation: PendingOperation<SessionDescription>,
    },
    DescriptionCreateFailed {
        kind: DescriptionKind,
        error: RtcError,
        operation: PendingOperation<SessionDescription>,
    },
    DescriptionSet {
        side: DescriptionSide,
        description: SessionDescription,
        operation: PendingOperation<()>,
    },
    DescriptionSetFailed {
        side: DescriptionSide,
        error: RtcError,
        operation: PendingOperation<()>,
    },
    IceCandidateAdded {
        operation: PendingOperation<()>,
    },
    IceCandidateAddFailed {
        error: RtcError,
        operation: PendingOperation<()>,
    },
    IceCandidate(IceCandidate),
    IceCandidateError(IceCandidateErrorEvent),
    SignalingStateChanged(SignalingState),
    IceConnectionStateChanged(IceConnectionState),
    IceGatheringStateChanged(IceGatheringState),
    ConnectionStateChanged(PeerConnectionState),
    NegotiationNeeded,
    DataChannel(DataChannelHandle),
    /// Legacy completion path: settles a plain callback, not a `PendingOperation`.
    StatsReady {
        response: StatsResponse,
        request: StatsRequest,
    },
    StatsAbandoned(StatsRequest),
}

impl PeerConnectionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PeerConnectionEvent::DescriptionCreated { .. } => "description-created",
            PeerConnectionEvent::DescriptionCreateFailed { .. } => "description-create-failed",
            PeerConnectionEvent::DescriptionSet { .. } => "description-set",
            PeerConnectionEvent::DescriptionSetFailed { .. } => "description-set-failed",
            PeerConnectionEvent::IceCandidateAdded { .. } => "ice-candidate-added",
            PeerConnectionEvent::IceCandidateAddFailed { .. } => "ice-candidate-add-failed",
            PeerConnectionEvent::IceCandidate(_) => "ice-candidate",
            PeerConnectionEvent::IceCandidateError(_) => "ice-candidate-error",
            PeerConnectionEvent::SignalingStateChanged(_) => "signaling-state-changed",
            PeerConnectionEvent::IceConnectionStateChanged(_) => "ice-connection-state-changed",
            PeerConnectionEvent::IceGatheringStateChanged(_) => "ice-gathering-state-changed",
            PeerConnectionEvent::ConnectionStateChanged(_) => "connection-state-changed",
            PeerConnectionEvent::NegotiationNeeded => "negotiation-needed",
            PeerConnectionEvent::DataChannel(_) => "data-channel",
            PeerConnectionEvent::StatsReady { .. } => "stats-ready",
            PeerConnectionEvent::StatsAbandoned(_) => "stats-abandoned",
        }
    }
}
