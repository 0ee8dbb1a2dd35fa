//! Top-level capability object wiring together the gatherer, the in-memory
//! backend, and the read/service pipeline. A host constructs one
//! [`HistorianServer`] and hands it both directions of history traffic:
//! `setValue` notifications from the address space, and `historyRead`
//! requests from the session/dispatch layer.

use std::sync::Arc;

use historian_backend::{Backend, InMemoryBackend, InMemoryBackendConfig};
use historian_base::{DataValue, NodeId, Result};
use historian_gather::{Gatherer, HistorizingNodeSettings, HistorizingUpdateStrategy, ValueReader};
use historian_service::{ContinuationTableConfig, HistoryDataService};
use historian_read::ReadEngineConfig;

pub use historian_backend::InMemoryBackendConfig as BackendConfig;
pub use historian_gather::HistorizingNodeSettings as NodeSettings;
pub use historian_read::ReadEngineConfig as ReadConfig;
pub use historian_service::{
    ContinuationTableConfig as SessionTableConfig, HistoryReadRequest, HistoryReadResponse,
    HistoryReadResult, HistoryReadValueId, SessionId,
};

/// A server collects together the gatherer's node registry and the service
/// facade that answers `historyRead`. It owns neither the address space nor
/// the network transport; those are a host's responsibility.
pub struct HistorianServer {
    gatherer: Arc<Gatherer>,
    service: HistoryDataService,
}

impl HistorianServer {
    pub fn new(
        value_reader: Arc<dyn ValueReader>,
        read_config: ReadEngineConfig,
        session_table_config: ContinuationTableConfig,
    ) -> Self {
        let gatherer = Arc::new(Gatherer::new(value_reader));
        let service = HistoryDataService::new(gatherer.clone(), read_config, session_table_config);
        HistorianServer { gatherer, service }
    }

    /// Registers a node for historizing with a fresh in-memory backend,
    /// sized per `backend_config`. Returns the backend handle in case the
    /// host wants to seed it directly (e.g. importing a prior session's
    /// data).
    pub fn historize_node(
        &self,
        node_id: NodeId,
        strategy: HistorizingUpdateStrategy,
        backend_config: InMemoryBackendConfig,
        clock: Arc<dyn historian_base::Clock>,
    ) -> Result<Arc<dyn Backend>> {
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new(backend_config, clock));
        let settings = HistorizingNodeSettings::new(backend.clone(), strategy);
        self.gatherer.register(node_id, settings)?;
        Ok(backend)
    }

    pub fn deregister_node(&self, node_id: &NodeId) -> Result<()> {
        self.gatherer.deregister(node_id)
    }

    pub fn set_value(&self, node_id: &NodeId, value: DataValue) -> Result<()> {
        self.service.set_value(node_id, value)
    }

    pub fn history_read(&self, request: &HistoryReadRequest) -> Result<HistoryReadResponse> {
        self.service.history_read(request)
    }

    pub fn start_poll(&self, node_id: &NodeId, runtime: &tokio::runtime::Handle) -> Result<()> {
        self.gatherer.start_poll(node_id, runtime)
    }

    pub fn stop_poll(&self, node_id: &NodeId) -> Result<()> {
        self.gatherer.stop_poll(node_id)
    }
}
