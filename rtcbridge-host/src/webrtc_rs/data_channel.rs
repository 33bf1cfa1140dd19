use crate::engine::{DataChannelMessage, DataChannelObserver, NativeDataChannel};
use crate::webrtc_rs::states;
use bytes::Bytes;
use rtcbridge_core::{DataChannelState, RtcError};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage as RtcMessage;

type ObserverSlot = Arc<Mutex<Option<Arc<dyn DataChannelObserver>>>>;

enum Outbound {
    Message(DataChannelMessage),
    Close,
}

/// A webrtc-rs channel, possibly still being created on the engine runtime.
///
/// Sends and closes issued before the channel exists are queued on the writer
/// task and applied, in order, once it does.
pub(crate) struct WebRtcDataChannel {
    label: String,
    negotiated_id: Option<u16>,
    channel: Arc<OnceLock<Arc<RTCDataChannel>>>,
    failed: Arc<AtomicBool>,
    observer: ObserverSlot,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

fn current(slot: &ObserverSlot) -> Option<Arc<dyn DataChannelObserver>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl WebRtcDataChannel {
    /// Wraps a channel webrtc-rs already handed out.
    pub(crate) fn new(channel: Arc<RTCDataChannel>, runtime: &Handle) -> Self {
        let label = channel.label().to_owned();
        let id = Some(channel.id());
        let announced = channel.clone();
        let wrapper = Self::pending(label, id, runtime, async move { Ok(announced) });
        // Remote traffic may already be flowing, so listen before returning.
        install_handlers(&channel, &wrapper.observer);
        let _ = wrapper.channel.set(channel);
        wrapper
    }

    /// Starts the writer task, which first waits for `create` to yield the channel.
    pub(crate) fn pending<F>(label: String, negotiated_id: Option<u16>, runtime: &Handle, create: F) -> Self
    where
        F: Future<Output = Result<Arc<RTCDataChannel>, RtcError>> + Send + 'static,
    {
        let observer: ObserverSlot = Arc::new(Mutex::new(None));
        let bound = Arc::new(OnceLock::new());
        let failed = Arc::new(AtomicBool::new(false));
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

        let slot = observer.clone();
        let binding = bound.clone();
        let failure = failed.clone();
        let name = label.clone();
        // One writer task per channel keeps sends in call order.
        runtime.spawn(async move {
            let writer = match create.await {
                Ok(channel) => channel,
                Err(e) => {
                    warn!("Failed to create data channel '{}': {}", name, e);
                    failure.store(true, Ordering::Release);
                    if let Some(obs) = current(&slot) {
                        obs.on_state_change(DataChannelState::Closed);
                    }
                    return;
                }
            };
            if binding.set(writer.clone()).is_ok() {
                install_handlers(&writer, &slot);
            }

            while let Some(outbound) = outbound_rx.recv().await {
                let result = match outbound {
                    Outbound::Message(DataChannelMessage::Text(text)) => {
                        writer.send_text(text).await.map(drop)
                    }
                    Outbound::Message(DataChannelMessage::Binary(data)) => {
                        writer.send(&data).await.map(drop)
                    }
                    Outbound::Close => {
                        let closed = writer.close().await;
                        if let Err(e) = &closed {
                            warn!("Failed to close data channel '{}': {:?}", name, e);
                        }
                        break;
                    }
                };
                if let Err(e) = result {
                    warn!("Failed to send on data channel '{}': {:?}", name, e);
                }
            }
            debug!("Data channel '{}' writer finished", name);
        });

        Self {
            label,
            negotiated_id,
            channel: bound,
            failed,
            observer,
            outbound_tx,
        }
    }
}

fn install_handlers(channel: &RTCDataChannel, observer: &ObserverSlot) {
    let slot = observer.clone();
    channel.on_open(Box::new(move || {
        Box::pin(async move {
            if let Some(obs) = current(&slot) {
                obs.on_state_change(DataChannelState::Open);
            }
        })
    }));

    let slot = observer.clone();
    channel.on_close(Box::new(move || {
        let slot = slot.clone();
        Box::pin(async move {
            if let Some(obs) = current(&slot) {
                obs.on_state_change(DataChannelState::Closed);
            }
        })
    }));

    let slot = observer.clone();
    channel.on_message(Box::new(move |msg: RtcMessage| {
        let slot = slot.clone();
        Box::pin(async move {
            let message = if msg.is_string {
                DataChannelMessage::Text(String::from_utf8_lossy(&msg.data).into_owned())
            } else {
                DataChannelMessage::Binary(Bytes::copy_from_slice(&msg.data))
            };
            if let Some(obs) = current(&slot) {
                obs.on_message(message);
            }
        })
    }));

    let label = channel.label().to_owned();
    channel.on_error(Box::new(move |err| {
        let label = label.clone();
        Box::pin(async move {
            warn!("Data channel '{}' error: {}", label, err);
        })
    }));
}

impl NativeDataChannel for WebRtcDataChannel {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn id(&self) -> Option<u16> {
        self.channel
            .get()
            .map(|channel| channel.id())
            .or(self.negotiated_id)
    }

    fn ready_state(&self) -> DataChannelState {
        match self.channel.get() {
            Some(channel) => states::data_channel(channel.ready_state()),
            None if self.failed.load(Ordering::Acquire) => DataChannelState::Closed,
            None => DataChannelState::Connecting,
        }
    }

    fn register_observer(&self, observer: Arc<dyn DataChannelObserver>) {
        *self.observer.lock().unwrap_or_else(PoisonError::into_inner) = Some(observer.clone());
        // Creation may have failed before anyone was listening.
        if self.failed.load(Ordering::Acquire) {
            observer.on_state_change(DataChannelState::Closed);
        }
    }

    fn unregister_observer(&self) {
        self.observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn send(&self, message: DataChannelMessage) -> Result<(), RtcError> {
        self.outbound_tx
            .send(Outbound::Message(message))
            .map_err(|_| RtcError::invalid_state("Data channel writer has stopped"))
    }

    fn close(&self) {
        let _ = self.outbound_tx.send(Outbound::Close);
    }
}
