use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use historian_backend::Backend;
use historian_base::{DataValue, NodeId, Result};

/// How a historized node's store gets populated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HistorizingUpdateStrategy {
    /// The application inserts directly into the backend; `set_value` is a no-op.
    User,
    /// Every value-set is forwarded to `backend.insert` (write-through).
    ValueSet,
    /// A poll task is the sole writer; `set_value` is ignored.
    Poll,
}

/// Per-node settings held by the gatherer's registry. Cheap to clone: the
/// backend handle and user context are both `Arc`.
#[derive(Clone)]
pub struct HistorizingNodeSettings {
    pub backend: Arc<dyn Backend>,
    pub strategy: HistorizingUpdateStrategy,
    pub max_response_size: usize,
    pub polling_interval: Duration,
    pub user_context: Option<Arc<dyn Any + Send + Sync>>,
}

impl HistorizingNodeSettings {
    pub fn new(backend: Arc<dyn Backend>, strategy: HistorizingUpdateStrategy) -> Self {
        HistorizingNodeSettings {
            backend,
            strategy,
            max_response_size: 0,
            polling_interval: Duration::ZERO,
            user_context: None,
        }
    }

    pub fn with_max_response_size(mut self, max: usize) -> Self {
        self.max_response_size = max;
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }
}

/// Host callback the polling scheduler uses to sample a node's current
/// value. Kept separate from `Backend` because reading "the current value"
/// is an address-space concern, not a storage concern.
#[async_trait::async_trait]
pub trait ValueReader: Send + Sync {
    async fn read_current_value(&self, node_id: &NodeId) -> Result<DataValue>;
}
