use crate::convert::{HostValue, ToHost};
use crate::functional::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// DOM-style error names carried by rejected operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorName {
    Error,
    InvalidStateError,
    InvalidModificationError,
    InvalidAccessError,
    OperationError,
    TypeError,
}

impl ErrorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorName::Error => "Error",
            ErrorName::InvalidStateError => "InvalidStateError",
            ErrorName::InvalidModificationError => "InvalidModificationError",
            ErrorName::InvalidAccessError => "InvalidAccessError",
            ErrorName::OperationError => "OperationError",
            ErrorName::TypeError => "TypeError",
        }
    }
}

impl fmt::Display for ErrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error a rejected operation settles with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct RtcError {
    pub name: ErrorName,
    pub message: String,
}

impl RtcError {
    pub fn new(name: ErrorName, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorName::Error, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorName::InvalidStateError, message)
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::new(ErrorName::OperationError, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorName::TypeError, message)
    }

    pub fn invalid_access(message: impl Into<String>) -> Self {
        Self::new(ErrorName::InvalidAccessError, message)
    }
}

impl From<ValidationErrors> for RtcError {
    fn from(errors: ValidationErrors) -> Self {
        RtcError::type_error(errors.to_string())
    }
}

impl ToHost for RtcError {
    fn to_host(&self) -> HostValue {
        json!({ "name": self.name.as_str(), "message": self.message })
    }
}
