use rtcbridge_core::RtcError;
use std::fmt;
use tokio::sync::oneshot;
use tracing::warn;

pub(crate) const ABANDONED_MESSAGE: &str = "operation abandoned before completion";

/// The settle-once capability of an in-flight request.
///
/// Settling consumes the value, so a second resolve or reject cannot be
/// written. If it is dropped unsettled, for example because the engine
/// discarded its observer, it rejects with an `OperationError`.
pub struct PendingOperation<T> {
    name: &'static str,
    sender: Option<oneshot::Sender<Result<T, RtcError>>>,
}

impl<T> PendingOperation<T> {
    pub(crate) fn new(name: &'static str, sender: oneshot::Sender<Result<T, RtcError>>) -> Self {
        Self {
            name,
            sender: Some(sender),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: RtcError) {
        self.settle(Err(error));
    }

    pub fn settle(mut self, result: Result<T, RtcError>) {
        debug_assert!(self.sender.is_some(), "pending operation settled twice");
        if let Some(sender) = self.sender.take() {
            // The caller may have stopped waiting; that is not an error here.
            let _ = sender.send(result);
        }
    }
}

impl<T> Drop for PendingOperation<T> {
    fn drop(&mut self) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        warn!(operation = self.name, "Pending operation dropped without settling");
        let _ = sender.send(Err(RtcError::operation(ABANDONED_MESSAGE)));
    }
}

impl<T> fmt::Debug for PendingOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("name", &self.name)
            .field("settled", &self.sender.is_none())
            .finish()
    }
}
