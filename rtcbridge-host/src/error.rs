use rtcbridge_core::{RtcError, ValidationErrors};
use thiserror::Error;

/// Failures reported synchronously, before any operation is in flight.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationErrors),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Engine(#[from] RtcError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
