//! Cross-thread event bridge between a free-threaded WebRTC engine and a
//! single-threaded host.
//!
//! Engine callbacks arrive on engine threads and are captured as events in a
//! queue owned by the host object. The host thread drains that queue in order
//! and replays each event against the owning [`RtcPeerConnection`] or
//! [`RtcDataChannel`]. Replaying an event may settle an [`OperationHandle`] or
//! invoke a host listener.

mod connection;
mod data_channel;
mod engine;
mod error;
mod event;
mod promise;

#[cfg(feature = "webrtc-engine")]
pub mod webrtc_rs;

pub use connection::*;
pub use data_channel::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use promise::*;
