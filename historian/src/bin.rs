//! A minimal host harness: registers one polled node, lets it tick a few
//! times against a fake current-value source, then issues a paginated
//! `historyRead` and prints what comes back. Not a real OPC UA server —
//! just enough wiring to exercise the whole pipeline end to end.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use historian::{
    BackendConfig, HistoryReadRequest, HistoryReadValueId, HistorianServer, ReadConfig, SessionId,
    SessionTableConfig,
};
use historian_base::{Clock, DataValue, NodeId, Result, SystemClock, Timestamp, TimestampsToReturn, Variant};
use historian_gather::{HistorizingUpdateStrategy, ValueReader};

struct Counter {
    clock: SystemClock,
    next: AtomicI64,
}

#[async_trait::async_trait]
impl ValueReader for Counter {
    async fn read_current_value(&self, _node_id: &NodeId) -> Result<DataValue> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(DataValue::new(Variant::from_bytes(n.to_le_bytes().to_vec()), self.clock.now()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber_init();

    let server = HistorianServer::new(
        Arc::new(Counter { clock: SystemClock, next: AtomicI64::new(0) }),
        ReadConfig::default(),
        SessionTableConfig::default(),
    );

    let node = NodeId::numeric(1, 1000);
    server.historize_node(
        node.clone(),
        HistorizingUpdateStrategy::Poll,
        BackendConfig::default(),
        Arc::new(SystemClock),
    )?;

    server.start_poll(&node, &tokio::runtime::Handle::current())?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.stop_poll(&node)?;

    let request = HistoryReadRequest {
        session_id: SessionId(1),
        start_time: Timestamp::UNSPECIFIED,
        end_time: SystemClock.now(),
        num_values_per_node: 0,
        return_bounds: false,
        is_read_modified: false,
        timestamps_to_return: TimestampsToReturn::Both,
        release_continuation_points: false,
        nodes_to_read: vec![HistoryReadValueId { node_id: node, range: None, continuation_point: None }],
    };

    let response = server.history_read(&request)?;
    for result in &response.results {
        println!("status={:?} values={}", result.status, result.values.len());
    }

    Ok(())
}

/// Hooking up an actual `tracing_subscriber` is a host concern; this demo
/// just keeps `tracing`'s default no-op dispatcher so the binary runs
/// standalone without pulling in a subscriber crate.
fn tracing_subscriber_init() {}
