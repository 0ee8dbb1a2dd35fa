use historian_base::{DataValue, NodeId, NumericRange, StatusCode, Timestamp, TimestampsToReturn};

/// Opaque session handle the facade scopes continuation points by. The
/// historian core never interprets it beyond equality/hash.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub u64);

/// One entry of a `historyRead` request's `nodesToRead`.
#[derive(Clone, Debug)]
pub struct HistoryReadValueId {
    pub node_id: NodeId,
    pub range: Option<NumericRange>,
    pub continuation_point: Option<Vec<u8>>,
}

/// A full `historyRead` call: the `ReadRawModifiedDetails` fields shared
/// across every node in the batch, plus the per-node value ids.
pub struct HistoryReadRequest {
    pub session_id: SessionId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub num_values_per_node: u32,
    pub return_bounds: bool,
    pub is_read_modified: bool,
    pub timestamps_to_return: TimestampsToReturn,
    pub release_continuation_points: bool,
    pub nodes_to_read: Vec<HistoryReadValueId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryReadResult {
    pub status: StatusCode,
    pub values: Vec<DataValue>,
    pub continuation_point: Option<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryReadResponse {
    pub results: Vec<HistoryReadResult>,
}
