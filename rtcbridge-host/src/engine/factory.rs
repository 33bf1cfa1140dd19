use crate::engine::NativeEngine;
use std::sync::{Arc, Mutex};
use tracing::info;

type Teardown = Box<dyn FnOnce() + Send>;

struct FactoryInner {
    engine: Box<dyn NativeEngine>,
    teardown: Mutex<Option<Teardown>>,
}

impl Drop for FactoryInner {
    fn drop(&mut self) {
        let teardown = self
            .teardown
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(teardown) = teardown {
            teardown();
        }
        info!("Peer connection factory released");
    }
}

/// Application-owned handle to a native engine.
///
/// Every connection keeps a clone until it is closed. The engine, and the
/// optional teardown hook, go away when the last clone is dropped.
#[derive(Clone)]
pub struct PeerConnectionFactory {
    inner: Arc<FactoryInner>,
}

impl PeerConnectionFactory {
    pub fn new(engine: impl NativeEngine + 'static) -> Self {
        Self::with_teardown(engine, || {})
    }

    pub fn with_teardown(
        engine: impl NativeEngine + 'static,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                engine: Box::new(engine),
                teardown: Mutex::new(Some(Box::new(teardown))),
            }),
        }
    }

    pub fn engine(&self) -> &dyn NativeEngine {
        self.inner.engine.as_ref()
    }

    /// Handles alive besides this one; normally one per open connection.
    pub fn live_connections(&self) -> usize {
        Arc::strong_count(&self.inner) - 1
    }
}
