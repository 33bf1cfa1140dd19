//! `NativeEngine` backed by the `webrtc` crate.
//!
//! The engine owns a multi-threaded tokio runtime standing in for the native
//! signaling and worker threads. Every webrtc-rs callback runs there and is
//! forwarded to the bridge observers, which only queue events.

mod data_channel;
mod engine;
mod engine_config;
mod peer_connection;
mod states;

pub use engine::*;
pub use engine_config::*;
