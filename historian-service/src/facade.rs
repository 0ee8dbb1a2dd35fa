use std::sync::Arc;

use historian_base::{DataValue, NodeId, Result, StatusCode};
use historian_gather::Gatherer;
use historian_read::{ReadEngine, ReadEngineConfig, ReadRequest};
use tracing::{debug, warn};

use crate::config::ContinuationTableConfig;
use crate::continuation_table::ContinuationTable;
use crate::types::{HistoryReadRequest, HistoryReadResponse, HistoryReadResult, HistoryReadValueId, SessionId};

/// The single object a host constructs and hands both directions of history
/// traffic to: `historyRead` for the read path, `set_value` for the
/// address-space write path that feeds the gatherer.
pub struct HistoryDataService {
    gatherer: Arc<Gatherer>,
    read_engine: ReadEngine,
    continuation_table: ContinuationTable,
}

impl HistoryDataService {
    pub fn new(
        gatherer: Arc<Gatherer>,
        read_engine_config: ReadEngineConfig,
        continuation_table_config: ContinuationTableConfig,
    ) -> Self {
        HistoryDataService {
            gatherer,
            read_engine: ReadEngine::new(read_engine_config),
            continuation_table: ContinuationTable::new(continuation_table_config),
        }
    }

    /// Routes a `setValue` notification from the address-space layer to the
    /// gatherer's update pipeline.
    pub fn set_value(&self, node_id: &NodeId, value: DataValue) -> Result<()> {
        self.gatherer.set_value(node_id, value)
    }

    pub fn history_read(&self, request: &HistoryReadRequest) -> Result<HistoryReadResponse> {
        debug!(
            target: "historian", session = request.session_id.0, nodes = request.nodes_to_read.len(),
            "historyRead request"
        );
        let mut results = Vec::with_capacity(request.nodes_to_read.len());
        for value_id in &request.nodes_to_read {
            let result = match self.history_read_one(request, value_id) {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        target: "historian", ?e, node_id = ?value_id.node_id,
                        "internal error servicing historyRead for one node"
                    );
                    no_data(StatusCode::BadInternalError)
                }
            };
            results.push(result);
        }
        Ok(HistoryReadResponse { results })
    }

    fn history_read_one(
        &self,
        request: &HistoryReadRequest,
        value_id: &HistoryReadValueId,
    ) -> Result<HistoryReadResult> {
        let node_id = &value_id.node_id;

        let Some(settings) = self.gatherer.get_setting(node_id) else {
            warn!(target: "historian", ?node_id, "historyRead for unregistered node");
            return Ok(no_data(StatusCode::BadNodeIdUnknown));
        };

        if request.release_continuation_points {
            self.continuation_table.release(request.session_id, node_id)?;
            return Ok(no_data(StatusCode::Good));
        }

        let continuation_point = match &value_id.continuation_point {
            Some(token) if !token.is_empty() => {
                if self.continuation_table.validate(request.session_id, node_id, token)? {
                    Some(token.clone())
                } else {
                    return Ok(no_data(StatusCode::BadContinuationPointInvalid));
                }
            }
            _ => None,
        };

        let read_request = ReadRequest {
            node_id: node_id.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            num_values_per_node: request.num_values_per_node,
            return_bounds: request.return_bounds,
            is_read_modified: request.is_read_modified,
            timestamps_to_return: request.timestamps_to_return,
            range: value_id.range,
            release_continuation_points: false,
            continuation_point,
            max_response_size: settings.max_response_size,
        };

        let result = self.read_engine.read(settings.backend.as_ref(), &read_request)?;

        // A new read on this (session, node) pair implicitly releases the
        // prior continuation point, whether or not this fragment issues a
        // new one.
        match &result.continuation_point {
            Some(token) => self.continuation_table.allocate(request.session_id, node_id, token.clone())?,
            None => self.continuation_table.release(request.session_id, node_id)?,
        }

        Ok(HistoryReadResult {
            status: result.status,
            values: result.values,
            continuation_point: result.continuation_point,
        })
    }
}

fn no_data(status: StatusCode) -> HistoryReadResult {
    HistoryReadResult { status, values: Vec::new(), continuation_point: None }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use historian_backend::{InMemoryBackend, InMemoryBackendConfig};
    use historian_base::{SystemClock, Timestamp, TimestampsToReturn, Variant};
    use historian_gather::{HistorizingNodeSettings, HistorizingUpdateStrategy, ValueReader};
    use test_log::test;

    use super::*;

    struct NoopReader;
    #[async_trait::async_trait]
    impl ValueReader for NoopReader {
        async fn read_current_value(&self, _node_id: &NodeId) -> Result<DataValue> {
            unreachable!("no polling in these tests")
        }
    }

    fn service_with_seeded_node() -> (HistoryDataService, NodeId) {
        let gatherer = Arc::new(Gatherer::new(Arc::new(NoopReader)));
        let node = NodeId::numeric(1, 1);
        let backend: Arc<dyn historian_backend::Backend> =
            Arc::new(InMemoryBackend::new(InMemoryBackendConfig::default(), Arc::new(SystemClock)));
        for ts in [100, 200, 300] {
            backend
                .insert(&node, DataValue::new(Variant::from_bytes((ts as i64).to_le_bytes().to_vec()), Timestamp(ts)))
                .unwrap();
        }
        gatherer
            .register(node.clone(), HistorizingNodeSettings::new(backend, HistorizingUpdateStrategy::ValueSet))
            .unwrap();
        let service = HistoryDataService::new(
            gatherer,
            ReadEngineConfig::default(),
            ContinuationTableConfig { max_entries: 8, idle_timeout: Duration::from_secs(60) },
        );
        (service, node)
    }

    fn base_request(session: SessionId, node_id: NodeId) -> HistoryReadRequest {
        HistoryReadRequest {
            session_id: session,
            start_time: Timestamp(100),
            end_time: Timestamp(300),
            num_values_per_node: 0,
            return_bounds: false,
            is_read_modified: false,
            timestamps_to_return: TimestampsToReturn::Both,
            release_continuation_points: false,
            nodes_to_read: vec![HistoryReadValueId { node_id, range: None, continuation_point: None }],
        }
    }

    #[test]
    fn history_read_unknown_node_reports_status() {
        let (service, _node) = service_with_seeded_node();
        let request = base_request(SessionId(1), NodeId::numeric(1, 999));
        let response = service.history_read(&request).unwrap();
        assert_eq!(response.results[0].status, StatusCode::BadNodeIdUnknown);
    }

    #[test]
    fn history_read_returns_seeded_values() {
        let (service, node) = service_with_seeded_node();
        let request = base_request(SessionId(1), node);
        let response = service.history_read(&request).unwrap();
        assert_eq!(response.results[0].status, StatusCode::Good);
        assert_eq!(response.results[0].values.len(), 3);
        assert!(response.results[0].continuation_point.is_none());
    }

    #[test]
    fn continuation_point_flows_through_table() {
        let (service, node) = service_with_seeded_node();
        let mut request = base_request(SessionId(1), node.clone());
        request.num_values_per_node = 0;
        // Force pagination by wiring max_response_size=1 on the node.
        let settings = service.gatherer.get_setting(&node).unwrap();
        service.gatherer.update_setting(&node, settings.with_max_response_size(1)).unwrap();

        let first = service.history_read(&request).unwrap();
        assert_eq!(first.results[0].values.len(), 1);
        let cp = first.results[0].continuation_point.clone();
        assert!(cp.is_some());

        request.nodes_to_read[0].continuation_point = cp;
        let second = service.history_read(&request).unwrap();
        assert_eq!(second.results[0].values.len(), 1);
    }

    #[test]
    fn stale_continuation_point_is_rejected() {
        let (service, node) = service_with_seeded_node();
        let mut request = base_request(SessionId(1), node.clone());
        request.nodes_to_read[0].continuation_point = Some(vec![0xFF; 24]);
        let response = service.history_read(&request).unwrap();
        assert_eq!(response.results[0].status, StatusCode::BadContinuationPointInvalid);
    }

    #[test]
    fn set_value_routes_to_gatherer() {
        let (service, node) = service_with_seeded_node();
        service.set_value(&node, DataValue::new(Variant::from_bytes(vec![9]), Timestamp(400))).unwrap();
        let request = base_request(SessionId(1), node);
        let mut request = request;
        request.end_time = Timestamp(400);
        let response = service.history_read(&request).unwrap();
        assert_eq!(response.results[0].values.len(), 4);
    }
}
