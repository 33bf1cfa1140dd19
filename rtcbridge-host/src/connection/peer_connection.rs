use crate::connection::observers::{
    AddCandidateObserver, ConnectionObserver, CreateDescriptionObserver, LegacyStatsObserver,
    SetDescriptionObserver,
};
use crate::connection::{
    DataChannelListener, DescriptionKind, DescriptionSide, Listener, PeerConnectionEvent,
    PeerConnectionListeners, StatsRequest,
};
use crate::data_channel::RtcDataChannel;
use crate::engine::{DataChannelHandle, NativePeerConnection, PeerConnectionFactory};
use crate::error::{BridgeError, Result};
use crate::event::{EventLoop, EventTarget, spawn_dispatch};
use crate::promise::{OperationHandle, PendingOperation, pending_operation};
use rtcbridge_core::convert::{FromHost, HostValue, ToHost};
use rtcbridge_core::{
    AnswerOptions, BidiMap, ConnectionId, DataChannelInit, IceCandidate, IceConnectionState,
    IceGatheringState, NativeHandleId, NativeSessionDescription, OfferOptions,
    PeerConnectionState, RtcConfiguration, RtcError, SessionDescription, SessionDescriptionInit,
    SignalingState, StatsResponse,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type StatsCallback = Box<dyn FnOnce(&HostValue)>;

#[derive(Default)]
struct ConnectionState {
    signaling: SignalingState,
    ice_connection: IceConnectionState,
    ice_gathering: IceGatheringState,
    connection: PeerConnectionState,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    last_local_description: Option<SessionDescription>,
}

pub(crate) struct PeerConnectionInner {
    this: Weak<PeerConnectionInner>,
    id: ConnectionId,
    configuration: RtcConfiguration,
    event_loop: EventLoop<PeerConnectionEvent>,
    native: RefCell<Option<Arc<dyn NativePeerConnection>>>,
    factory: RefCell<Option<PeerConnectionFactory>>,
    state: RefCell<ConnectionState>,
    listeners: RefCell<PeerConnectionListeners>,
    channels: RefCell<BidiMap<NativeHandleId, RtcDataChannel>>,
    stats_callbacks: RefCell<HashMap<u64, StatsCallback>>,
    next_stats_request: Cell<u64>,
    auto_dispatch: Cell<bool>,
}

/// Host-side peer connection.
///
/// Lives on the host thread only. Engine callbacks never touch it directly:
/// they are queued as [`PeerConnectionEvent`]s and replayed here by
/// [`RtcPeerConnection::dispatch_pending`] or the task started with
/// [`RtcPeerConnection::spawn_dispatch`]. Cloning gives another handle to the
/// same connection.
#[derive(Clone)]
pub struct RtcPeerConnection {
    inner: Rc<PeerConnectionInner>,
}

fn closed_error(method: &str) -> RtcError {
    RtcError::invalid_state(format!(
        "Failed to execute '{method}' on 'RTCPeerConnection': The RTCPeerConnection's signalingState is 'closed'."
    ))
}

impl RtcPeerConnection {
    /// Builds a connection from the host's configuration argument.
    pub fn new(factory: &PeerConnectionFactory, configuration: Option<&HostValue>) -> Result<Self> {
        let configuration = RtcConfiguration::from_host_optional(configuration).into_result()?;
        Self::with_configuration(factory, configuration)
    }

    pub fn with_configuration(
        factory: &PeerConnectionFactory,
        configuration: RtcConfiguration,
    ) -> Result<Self> {
        let event_loop = EventLoop::new();
        let observer = Arc::new(ConnectionObserver {
            sender: event_loop.sender(),
        });
        let native = factory
            .engine()
            .create_peer_connection(&configuration, observer)?;

        let id = ConnectionId::new();
        info!(connection = %id, "Peer connection created");

        Ok(Self {
            inner: Rc::new_cyclic(|this| PeerConnectionInner {
                this: this.clone(),
                id,
                configuration,
                event_loop,
                native: RefCell::new(Some(native)),
                factory: RefCell::new(Some(factory.clone())),
                state: RefCell::new(ConnectionState::default()),
                listeners: RefCell::new(PeerConnectionListeners::default()),
                channels: RefCell::new(BidiMap::new()),
                stats_callbacks: RefCell::new(HashMap::new()),
                next_stats_request: Cell::new(0),
                auto_dispatch: Cell::new(false),
            }),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    pub fn create_offer(&self, options: Option<&HostValue>) -> Result<OperationHandle<SessionDescription>> {
        let options = OfferOptions::from_host_optional(options).into_result()?;
        let Some(native) = self.inner.native() else {
            return Ok(OperationHandle::rejected(closed_error("createOffer")));
        };

        let (operation, handle) = pending_operation("createOffer");
        native.create_offer(options, self.inner.create_observer(DescriptionKind::Offer, operation));
        Ok(handle)
    }

    pub fn create_answer(&self, options: Option<&HostValue>) -> Result<OperationHandle<SessionDescription>> {
        let options = AnswerOptions::from_host_optional(options).into_result()?;
        let Some(native) = self.inner.native() else {
            return Ok(OperationHandle::rejected(closed_error("createAnswer")));
        };

        let (operation, handle) = pending_operation("createAnswer");
        native.create_answer(options, self.inner.create_observer(DescriptionKind::Answer, operation));
        Ok(handle)
    }

    /// An absent or empty `sdp` reuses the last description this connection
    /// created of the same type.
    pub fn set_local_description(&self, description: &HostValue) -> Result<OperationHandle<()>> {
        let init = SessionDescriptionInit::from_host(description).into_result()?;
        let Some(native) = self.inner.native() else {
            return Ok(OperationHandle::rejected(closed_error("setLocalDescription")));
        };

        let description = init.or_fallback(self.inner.state.borrow().last_local_description.as_ref());
        let (operation, handle) = pending_operation("setLocalDescription");
        let observer = self
            .inner
            .set_observer(DescriptionSide::Local, description.clone(), operation);
        native.set_local_description(description, observer);
        Ok(handle)
    }

    /// Both `type` and `sdp` are required. A malformed description is
    /// reported here and never reaches the engine.
    pub fn set_remote_description(&self, description: &HostValue) -> Result<OperationHandle<()>> {
        let description = SessionDescription::from_host(description).into_result()?;
        let Some(native) = self.inner.native() else {
            return Ok(OperationHandle::rejected(closed_error("setRemoteDescription")));
        };

        let (operation, handle) = pending_operation("setRemoteDescription");
        let observer = self
            .inner
            .set_observer(DescriptionSide::Remote, description.clone(), operation);
        native.set_remote_description(description, observer);
        Ok(handle)
    }

    pub fn add_ice_candidate(&self, candidate: &HostValue) -> Result<OperationHandle<()>> {
        let candidate = IceCandidate::from_host(candidate).into_result()?;
        let Some(native) = self.inner.native() else {
            return Ok(OperationHandle::rejected(RtcError::invalid_state(
                "Failed to set ICE candidate; RTCPeerConnection is closed.",
            )));
        };

        let (operation, handle) = pending_operation("addIceCandidate");
        native.add_ice_candidate(
            candidate,
            Box::new(AddCandidateObserver {
                sender: self.inner.event_loop.sender(),
                operation,
            }),
        );
        Ok(handle)
    }

    /// Legacy stats: `callback` runs once on the dispatch thread with
    /// `{ timestamp, result: [report, ...] }`. It does not run if the engine
    /// abandons the request.
    pub fn get_stats(&self, callback: impl FnOnce(&HostValue) + 'static) -> Result<()> {
        let Some(native) = self.inner.native() else {
            return Err(BridgeError::InvalidState(
                "RTCPeerConnection is closed".to_string(),
            ));
        };

        let key = self.inner.next_stats_request.get();
        self.inner.next_stats_request.set(key + 1);
        self.inner
            .stats_callbacks
            .borrow_mut()
            .insert(key, Box::new(callback));

        let observer = LegacyStatsObserver {
            sender: self.inner.event_loop.sender(),
            request: Some(StatsRequest(key)),
        };
        if !native.get_stats(Box::new(observer)) {
            self.inner.stats_callbacks.borrow_mut().remove(&key);
            return Err(RtcError::error("Failed to execute 'getStats' on 'RTCPeerConnection'").into());
        }
        Ok(())
    }

    pub fn create_data_channel(&self, label: &str, init: Option<&HostValue>) -> Result<RtcDataChannel> {
        let init = DataChannelInit::from_host_optional(init).into_result()?;
        let Some(native) = self.inner.native() else {
            return Err(BridgeError::InvalidState(
                closed_error("createDataChannel").message,
            ));
        };

        let handle = native.create_data_channel(label, &init)?;
        debug!(connection = %self.inner.id, label, handle = %handle.id, "Data channel created");
        Ok(self.inner.wrap_channel(handle))
    }

    pub fn restart_ice(&self) {
        if let Some(native) = self.inner.native() {
            native.restart_ice();
        }
    }

    /// Closes the native connection and releases the factory. Idempotent.
    ///
    /// Completions the engine delivers afterwards are still replayed, by the
    /// dispatch task or `dispatch_pending`, so every outstanding operation
    /// settles.
    pub fn close(&self) {
        let inner = &self.inner;
        let Some(native) = inner.native.borrow_mut().take() else {
            return;
        };
        info!(connection = %inner.id, "Closing peer connection");

        native.close();
        {
            let mut state = inner.state.borrow_mut();
            state.signaling = SignalingState::Closed;
            state.ice_connection = IceConnectionState::Closed;
            state.connection = PeerConnectionState::Closed;
        }

        let channels: Vec<RtcDataChannel> = inner.channels.borrow().values().cloned().collect();
        for channel in channels {
            channel.on_peer_connection_closed();
        }

        inner.factory.borrow_mut().take();
        inner.event_loop.stop();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn signaling_state(&self) -> SignalingState {
        self.inner.state.borrow().signaling
    }

    pub fn ice_connection_state(&self) -> IceConnectionState {
        self.inner.state.borrow().ice_connection
    }

    pub fn ice_gathering_state(&self) -> IceGatheringState {
        self.inner.state.borrow().ice_gathering
    }

    pub fn connection_state(&self) -> PeerConnectionState {
        self.inner.state.borrow().connection
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.inner.state.borrow().local_description.clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.inner.state.borrow().remote_description.clone()
    }

    /// The most recent description produced by `create_offer`/`create_answer`.
    pub fn last_local_description(&self) -> Option<SessionDescription> {
        self.inner.state.borrow().last_local_description.clone()
    }

    pub fn get_configuration(&self) -> RtcConfiguration {
        self.inner.configuration.clone()
    }

    pub fn data_channels(&self) -> Vec<RtcDataChannel> {
        self.inner.channels.borrow().values().cloned().collect()
    }

    pub fn on_signaling_state_change(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().signaling_state_change = Some(Rc::new(listener));
    }

    pub fn on_ice_connection_state_change(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().ice_connection_state_change = Some(Rc::new(listener));
    }

    pub fn on_ice_gathering_state_change(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().ice_gathering_state_change = Some(Rc::new(listener));
    }

    pub fn on_connection_state_change(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().connection_state_change = Some(Rc::new(listener));
    }

    pub fn on_ice_candidate(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().ice_candidate = Some(Rc::new(listener));
    }

    pub fn on_ice_candidate_error(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().ice_candidate_error = Some(Rc::new(listener));
    }

    pub fn on_negotiation_needed(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().negotiation_needed = Some(Rc::new(listener));
    }

    pub fn on_data_channel(&self, listener: impl Fn(&RtcDataChannel) + 'static) {
        self.inner.listeners.borrow_mut().data_channel = Some(Rc::new(listener));
    }

    /// Replays everything queued for this connection and its data channels.
    pub fn dispatch_pending(&self) -> usize {
        let mut handled = self.inner.event_loop.dispatch_pending(&*self.inner);
        for channel in self.data_channels() {
            handled += channel.dispatch_pending();
        }
        handled
    }

    /// Starts dispatch tasks on the current `LocalSet` for this connection
    /// and every data channel it wraps, now or later.
    pub fn spawn_dispatch(&self) -> JoinHandle<()> {
        self.inner.auto_dispatch.set(true);
        for channel in self.data_channels() {
            channel.spawn_dispatch();
        }
        spawn_dispatch(&self.inner)
    }
}

impl PeerConnectionInner {
    fn native(&self) -> Option<Arc<dyn NativePeerConnection>> {
        self.native.borrow().clone()
    }

    fn is_closed(&self) -> bool {
        self.native.borrow().is_none()
    }

    fn create_observer(
        &self,
        kind: DescriptionKind,
        operation: PendingOperation<SessionDescription>,
    ) -> Box<CreateDescriptionObserver> {
        Box::new(CreateDescriptionObserver {
            kind,
            sender: self.event_loop.sender(),
            operation,
        })
    }

    fn set_observer(
        &self,
        side: DescriptionSide,
        description: SessionDescription,
        operation: PendingOperation<()>,
    ) -> Box<SetDescriptionObserver> {
        Box::new(SetDescriptionObserver {
            side,
            description,
            sender: self.event_loop.sender(),
            operation,
        })
    }

    fn wrap_channel(&self, handle: DataChannelHandle) -> RtcDataChannel {
        let channel = self.channels.borrow_mut().compute_if_absent(handle.id, || {
            let channel = RtcDataChannel::wrap(handle.clone());
            let owner = self.this.clone();
            channel.on_detach(move |id| {
                if let Some(owner) = owner.upgrade() {
                    owner.forget_channel(id);
                }
            });
            channel
        });
        if self.auto_dispatch.get() {
            channel.spawn_dispatch();
        }
        channel
    }

    fn forget_channel(&self, id: NativeHandleId) {
        if self.channels.borrow_mut().remove(&id).is_some() {
            debug!(connection = %self.id, handle = %id, "Closed data channel released");
        }
    }

    fn emit(&self, select: impl FnOnce(&PeerConnectionListeners) -> Option<Listener>, value: &HostValue) {
        let listener = select(&*self.listeners.borrow());
        if let Some(listener) = listener {
            listener(value);
        }
    }

    /// Non-essential notifications are dropped once the connection is closed.
    fn suppressed(&self, event: &'static str) -> bool {
        let closed = self.is_closed();
        if closed {
            debug!(connection = %self.id, event, "Suppressed notification on closed connection");
        }
        closed
    }

    fn on_description_created(
        &self,
        kind: DescriptionKind,
        description: NativeSessionDescription,
        operation: PendingOperation<SessionDescription>,
    ) {
        match SessionDescription::from_native(&description).into_result() {
            Ok(description) => {
                self.state.borrow_mut().last_local_description = Some(description.clone());
                operation.resolve(description);
            }
            Err(errors) => {
                warn!(connection = %self.id, ?kind, %errors, "Engine produced an unusable description");
                operation.reject(errors.into());
            }
        }
    }

    fn on_description_set(
        &self,
        side: DescriptionSide,
        description: SessionDescription,
        operation: PendingOperation<()>,
    ) {
        {
            let mut state = self.state.borrow_mut();
            match side {
                DescriptionSide::Local => state.local_description = Some(description),
                DescriptionSide::Remote => state.remote_description = Some(description),
            }
        }
        operation.resolve(());
    }

    fn on_data_channel(&self, handle: DataChannelHandle) {
        if self.suppressed("data-channel") {
            handle.channel.close();
            return;
        }

        let channel = self.wrap_channel(handle);
        let listener: Option<DataChannelListener> = self.listeners.borrow().data_channel.clone();
        if let Some(listener) = listener {
            listener(&channel);
        }
    }

    fn on_stats_ready(&self, response: StatsResponse, request: StatsRequest) {
        let callback = self.stats_callbacks.borrow_mut().remove(&request.0);
        match callback {
            Some(callback) => callback(&response.to_host()),
            None => debug!(connection = %self.id, "Stats callback already released"),
        }
    }
}

impl EventTarget for PeerConnectionInner {
    type Event = PeerConnectionEvent;

    fn event_loop(&self) -> &EventLoop<PeerConnectionEvent> {
        &self.event_loop
    }

    fn handle_event(&self, event: PeerConnectionEvent) {
        debug!(connection = %self.id, event = event.name(), "Handling event");

        match event {
            PeerConnectionEvent::DescriptionCreated {
                kind,
                description,
                operation,
            } => self.on_description_created(kind, description, operation),

            PeerConnectionEvent::DescriptionCreateFailed {
                kind,
                error,
                operation,
            } => {
                debug!(connection = %self.id, ?kind, %error, "Description creation failed");
                operation.reject(error);
            }

            PeerConnectionEvent::DescriptionSet {
                side,
                description,
                operation,
            } => self.on_description_set(side, description, operation),

            PeerConnectionEvent::DescriptionSetFailed {
                side,
                error,
                operation,
            } => {
                debug!(connection = %self.id, ?side, %error, "Setting description failed");
                operation.reject(error);
            }

            PeerConnectionEvent::IceCandidateAdded { operation } => operation.resolve(()),

            PeerConnectionEvent::IceCandidateAddFailed { error, operation } => {
                operation.reject(error)
            }

            PeerConnectionEvent::IceCandidate(candidate) => {
                if !self.suppressed("ice-candidate") {
                    self.emit(|l| l.ice_candidate.clone(), &candidate.to_host());
                }
            }

            PeerConnectionEvent::IceCandidateError(error) => {
                if !self.suppressed("ice-candidate-error") {
                    self.emit(|l| l.ice_candidate_error.clone(), &error.to_host());
                }
            }

            PeerConnectionEvent::SignalingStateChanged(state) => {
                self.state.borrow_mut().signaling = state;
                self.emit(|l| l.signaling_state_change.clone(), &state.to_host());
                if state == SignalingState::Closed {
                    self.event_loop.stop();
                }
            }

            PeerConnectionEvent::IceConnectionStateChanged(state) => {
                self.state.borrow_mut().ice_connection = state;
                self.emit(|l| l.ice_connection_state_change.clone(), &state.to_host());
            }

            PeerConnectionEvent::IceGatheringStateChanged(state) => {
                self.state.borrow_mut().ice_gathering = state;
                self.emit(|l| l.ice_gathering_state_change.clone(), &state.to_host());
            }

            PeerConnectionEvent::ConnectionStateChanged(state) => {
                self.state.borrow_mut().connection = state;
                self.emit(|l| l.connection_state_change.clone(), &state.to_host());
            }

            PeerConnectionEvent::NegotiationNeeded => {
                if !self.suppressed("negotiation-needed") {
                    self.emit(|l| l.negotiation_needed.clone(), &HostValue::Null);
                }
            }

            PeerConnectionEvent::DataChannel(handle) => self.on_data_channel(handle),

            PeerConnectionEvent::StatsReady { response, request } => {
                self.on_stats_ready(response, request)
            }

            PeerConnectionEvent::StatsAbandoned(request) => {
                if self.stats_callbacks.borrow_mut().remove(&request.0).is_some() {
                    warn!(connection = %self.id, "Engine abandoned a stats request");
                }
            }
        }
    }
}

impl Drop for PeerConnectionInner {
    fn drop(&mut self) {
        if let Some(native) = self.native.get_mut().take() {
            debug!(connection = %self.id, "Peer connection dropped while open, closing native side");
            native.close();
        }
    }
}
