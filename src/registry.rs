use std::sync::Arc;

use parking_lot::RwLock;

use crate::adapter::QueueHandle;

/// Registry of queue handles consumed by the rendering layer.
///
/// The handle list is replaced wholesale on each successful discovery
/// cycle; readers snapshot an `Arc` and never observe a partially
/// updated list.
pub struct HandleRegistry {
    queues: RwLock<Arc<Vec<QueueHandle>>>,
}

impl HandleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Replace the registered handle list in a single swap.
    pub fn set_queues(&self, handles: Vec<QueueHandle>) {
        *self.queues.write() = Arc::new(handles);
    }

    /// Snapshot the current handle list. Cheap to call from readers.
    pub fn snapshot(&self) -> Arc<Vec<QueueHandle>> {
        self.queues.read().clone()
    }

    /// Number of currently registered queues.
    pub fn len(&self) -> usize {
        self.queues.read().len()
    }

    /// Check whether no queues are registered.
    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
