use crate::promise::pending_operation::ABANDONED_MESSAGE;
use rtcbridge_core::RtcError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// The host-visible side of a request: resolves once with its outcome.
#[derive(Debug)]
pub struct OperationHandle<T> {
    receiver: oneshot::Receiver<Result<T, RtcError>>,
}

impl<T> OperationHandle<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<T, RtcError>>) -> Self {
        Self { receiver }
    }

    /// A handle that is already rejected; no request was issued.
    pub fn rejected(error: RtcError) -> Self {
        Self::settled(Err(error))
    }

    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    fn settled(result: Result<T, RtcError>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self::new(rx)
    }

    /// Non-blocking check for hosts that poll instead of awaiting.
    /// Returns the outcome once; afterwards the handle is spent.
    pub fn try_result(&mut self) -> Option<Result<T, RtcError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(RtcError::operation(ABANDONED_MESSAGE))),
        }
    }
}

impl<T> Future for OperationHandle<T> {
    type Output = Result<T, RtcError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RtcError::operation(ABANDONED_MESSAGE))),
            Poll::Pending => Poll::Pending,
        }
    }
}
