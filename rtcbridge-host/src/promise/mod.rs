mod operation_handle;
mod pending_operation;

pub use operation_handle::*;
pub use pending_operation::*;

/// Creates the two halves of one asynchronous request.
pub fn pending_operation<T>(name: &'static str) -> (PendingOperation<T>, OperationHandle<T>) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    (PendingOperation::new(name, tx), OperationHandle::new(rx))
}
