use crate::connection::Listener;
use crate::data_channel::DataChannelEvent;
use crate::data_channel::observer::ChannelObserver;
use crate::engine::{DataChannelHandle, DataChannelMessage, NativeDataChannel};
use crate::error::{BridgeError, Result};
use crate::event::{EventLoop, EventTarget, spawn_dispatch};
use bytes::Bytes;
use rtcbridge_core::convert::{HostValue, ToHost};
use rtcbridge_core::{DataChannelState, NativeHandleId};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

type DetachHook = Box<dyn FnOnce(NativeHandleId)>;

#[derive(Default)]
struct DataChannelListeners {
    open: Option<Listener>,
    close: Option<Listener>,
    message: Option<Listener>,
    state_change: Option<Listener>,
}

pub(crate) struct DataChannelInner {
    handle_id: NativeHandleId,
    native: Arc<dyn NativeDataChannel>,
    label: String,
    id: Option<u16>,
    event_loop: EventLoop<DataChannelEvent>,
    state: Cell<DataChannelState>,
    listeners: RefCell<DataChannelListeners>,
    dispatch_spawned: Cell<bool>,
    detach: RefCell<Option<DetachHook>>,
}

/// Host-side wrapper of a native data channel.
///
/// Equality is identity: the same native channel always yields the same
/// wrapper from its connection.
#[derive(Clone)]
pub struct RtcDataChannel {
    inner: Rc<DataChannelInner>,
}

impl RtcDataChannel {
    pub(crate) fn wrap(handle: DataChannelHandle) -> Self {
        let DataChannelHandle { id, channel } = handle;
        let event_loop = EventLoop::new();
        channel.register_observer(Arc::new(ChannelObserver {
            sender: event_loop.sender(),
        }));

        Self {
            inner: Rc::new(DataChannelInner {
                handle_id: id,
                label: channel.label(),
                id: channel.id(),
                state: Cell::new(channel.ready_state()),
                native: channel,
                event_loop,
                listeners: RefCell::new(DataChannelListeners::default()),
                dispatch_spawned: Cell::new(false),
                detach: RefCell::new(None),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn id(&self) -> Option<u16> {
        self.inner.id
    }

    pub fn native_handle(&self) -> NativeHandleId {
        self.inner.handle_id
    }

    pub fn ready_state(&self) -> DataChannelState {
        self.inner.state.get()
    }

    pub fn send_text(&self, text: &str) -> Result<()> {
        self.send(DataChannelMessage::Text(text.to_owned()))
    }

    pub fn send_binary(&self, data: impl Into<Bytes>) -> Result<()> {
        self.send(DataChannelMessage::Binary(data.into()))
    }

    fn send(&self, message: DataChannelMessage) -> Result<()> {
        let state = self.ready_state();
        if state != DataChannelState::Open {
            return Err(BridgeError::InvalidState(format!(
                "RTCDataChannel.readyState is '{state}', not 'open'"
            )));
        }
        self.inner.native.send(message)?;
        Ok(())
    }

    pub fn close(&self) {
        match self.ready_state() {
            DataChannelState::Closing | DataChannelState::Closed => {}
            _ => {
                self.inner.state.set(DataChannelState::Closing);
                self.inner.native.close();
            }
        }
    }

    pub fn on_open(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().open = Some(Rc::new(listener));
    }

    pub fn on_close(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().close = Some(Rc::new(listener));
    }

    /// Receives `{ "data": <string | byte array>, "binary": bool }`.
    pub fn on_message(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().message = Some(Rc::new(listener));
    }

    pub fn on_state_change(&self, listener: impl Fn(&HostValue) + 'static) {
        self.inner.listeners.borrow_mut().state_change = Some(Rc::new(listener));
    }

    pub fn dispatch_pending(&self) -> usize {
        self.inner.event_loop.dispatch_pending(&*self.inner)
    }

    /// Starts a dispatch task on the current `LocalSet`. Only the first call spawns.
    pub fn spawn_dispatch(&self) {
        if !self.inner.dispatch_spawned.replace(true) {
            // Detached: the task ends with the wrapper, or once closed and released by the engine.
            drop(spawn_dispatch(&self.inner));
        }
    }

    /// Runs once, after the engine reports the channel closed.
    pub(crate) fn on_detach(&self, hook: impl FnOnce(NativeHandleId) + 'static) {
        *self.inner.detach.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn on_peer_connection_closed(&self) {
        debug!(label = %self.inner.label, "Owning peer connection closed");
        self.inner.state.set(DataChannelState::Closed);
        self.inner.native.unregister_observer();
        self.inner.event_loop.stop();
    }
}

impl DataChannelInner {
    fn emit(&self, select: impl FnOnce(&DataChannelListeners) -> Option<Listener>, value: &HostValue) {
        let listener = select(&*self.listeners.borrow());
        if let Some(listener) = listener {
            listener(value);
        }
    }
}

fn message_to_host(message: &DataChannelMessage) -> HostValue {
    match message {
        DataChannelMessage::Text(text) => json!({ "data": text, "binary": false }),
        DataChannelMessage::Binary(data) => json!({ "data": data.to_vec(), "binary": true }),
    }
}

impl EventTarget for DataChannelInner {
    type Event = DataChannelEvent;

    fn event_loop(&self) -> &EventLoop<DataChannelEvent> {
        &self.event_loop
    }

    fn handle_event(&self, event: DataChannelEvent) {
        match event {
            DataChannelEvent::StateChanged(state) => {
                if self.state.get() == DataChannelState::Closed {
                    debug!(label = %self.label, %state, "Ignoring state change for closed data channel");
                    return;
                }
                self.state.set(state);
                self.emit(|l| l.state_change.clone(), &state.to_host());
                match state {
                    DataChannelState::Open => self.emit(|l| l.open.clone(), &HostValue::Null),
                    DataChannelState::Closed => {
                        self.emit(|l| l.close.clone(), &HostValue::Null);
                        self.native.unregister_observer();
                        self.event_loop.stop();
                        let detach = self.detach.borrow_mut().take();
                        if let Some(detach) = detach {
                            detach(self.handle_id);
                        }
                    }
                    _ => {}
                }
            }

            DataChannelEvent::Message(message) => {
                if self.state.get() == DataChannelState::Closed {
                    debug!(label = %self.label, "Dropping message for closed data channel");
                    return;
                }
                self.emit(|l| l.message.clone(), &message_to_host(&message));
            }
        }
    }
}

impl PartialEq for RtcDataChannel {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for RtcDataChannel {}

impl Hash for RtcDataChannel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for RtcDataChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtcDataChannel")
            .field("label", &self.inner.label)
            .field("handle", &self.inner.handle_id)
            .field("state", &self.ready_state())
            .finish()
    }
}
