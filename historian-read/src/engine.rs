use historian_backend::Backend;
use historian_base::{
    DataValue, Direction, MatchStrategy, NodeId, NumericRange, Result, StatusCode, Timestamp,
    TimestampsToReturn, ONE_SECOND,
};
use tracing::{debug, trace, warn};

use crate::config::ReadEngineConfig;
use crate::continuation::ContinuationPoint;

/// One `nodesToRead` entry plus the per-node settings the read needs.
/// `max_response_size` comes from the node's `HistorizingNodeSettings`; it is
/// passed in rather than looked up so this crate stays independent of the
/// gatherer's registry.
pub struct ReadRequest {
    pub node_id: NodeId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// `0` means unlimited.
    pub num_values_per_node: u32,
    pub return_bounds: bool,
    pub is_read_modified: bool,
    pub timestamps_to_return: TimestampsToReturn,
    pub range: Option<NumericRange>,
    pub release_continuation_points: bool,
    pub continuation_point: Option<Vec<u8>>,
    /// `0` means unlimited.
    pub max_response_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub status: StatusCode,
    pub values: Vec<DataValue>,
    pub continuation_point: Option<Vec<u8>>,
}

impl ReadResult {
    fn done(status: StatusCode) -> Self {
        ReadResult { status, values: Vec::new(), continuation_point: None }
    }
}

/// Stateless: all per-read state lives either in the request or in the
/// continuation point. A single instance is shared across all nodes and
/// sessions of a server.
pub struct ReadEngine {
    config: ReadEngineConfig,
}

struct FragmentState {
    direction: Direction,
    /// Index to resume copying from (inclusive), in traversal order.
    next_index: usize,
    /// The fixed far end of the range, captured once at issue time.
    target_idx: usize,
    /// Remaining `numValuesPerNode` budget; `None` means unlimited.
    remaining: Option<u32>,
    timestamps_to_return: TimestampsToReturn,
    return_bounds: bool,
    /// Whether the early bound (if any) has already been emitted in a prior
    /// fragment of this same logical read.
    early_bound_done: bool,
}

impl ReadEngine {
    pub fn new(config: ReadEngineConfig) -> Self {
        ReadEngine { config }
    }

    pub fn read(&self, backend: &dyn Backend, request: &ReadRequest) -> Result<ReadResult> {
        let node_id = &request.node_id;

        if request.release_continuation_points {
            debug!(target: "historian", ?node_id, "releasing continuation point, no data read");
            return Ok(ReadResult::done(StatusCode::Good));
        }
        if request.is_read_modified {
            return Ok(ReadResult::done(StatusCode::BadHistoryOperationUnsupported));
        }
        if request.return_bounds && !backend.bound_supported() {
            return Ok(ReadResult::done(StatusCode::BadBoundNotSupported));
        }
        if !backend.timestamps_to_return_supported(request.timestamps_to_return) {
            return Ok(ReadResult::done(StatusCode::BadTimestampNotSupported));
        }

        let resumed = matches!(&request.continuation_point, Some(bytes) if !bytes.is_empty());
        let state = if resumed {
            let bytes = request.continuation_point.as_ref().unwrap();
            match ContinuationPoint::decode(bytes) {
                Ok(cp) => FragmentState {
                    direction: cp.direction,
                    next_index: cp.next_index as usize,
                    target_idx: cp.end_idx as usize,
                    remaining: (cp.remaining != u32::MAX).then_some(cp.remaining),
                    timestamps_to_return: cp.timestamps_to_return,
                    return_bounds: cp.return_bounds,
                    early_bound_done: true,
                },
                Err(status) => {
                    warn!(target: "historian", ?node_id, "rejected malformed continuation point");
                    return Ok(ReadResult::done(status));
                }
            }
        } else {
            let Some(direction) = direction_of(request.start_time, request.end_time) else {
                return Ok(ReadResult::done(StatusCode::BadHistoryOperationInvalid));
            };
            let (lo, hi) = main_range(backend, node_id, direction, request.start_time, request.end_time);

            let (early_value, late_value) =
                self.compute_bounds(backend, node_id, request, direction, lo, hi);

            let Some((lo, hi)) = lo.zip(hi).filter(|(l, h)| l <= h) else {
                // Nothing in the main range: a single, final, bounds-only fragment.
                let mut values = Vec::new();
                if let Some(v) = early_value {
                    values.push(project(v, request.timestamps_to_return));
                }
                if let Some(v) = late_value {
                    values.push(project(v, request.timestamps_to_return));
                }
                return Ok(ReadResult { status: StatusCode::Good, values, continuation_point: None });
            };

            FragmentState {
                direction,
                next_index: if direction == Direction::Forward { lo } else { hi },
                target_idx: if direction == Direction::Forward { hi } else { lo },
                remaining: (request.num_values_per_node != 0).then_some(request.num_values_per_node),
                timestamps_to_return: request.timestamps_to_return,
                return_bounds: request.return_bounds,
                early_bound_done: false,
            }
        };

        self.read_fragment(backend, request, state)
    }

    fn compute_bounds(
        &self,
        backend: &dyn Backend,
        node_id: &NodeId,
        request: &ReadRequest,
        direction: Direction,
        lo: Option<usize>,
        hi: Option<usize>,
    ) -> (Option<DataValue>, Option<DataValue>) {
        if !request.return_bounds {
            return (None, None);
        }
        let (early_time, late_time) = match direction {
            Direction::Forward => (request.start_time, request.end_time),
            Direction::Reverse => (request.end_time, request.start_time),
        };
        let early = bound_value(backend, node_id, early_time, MatchStrategy::Before, lo, -ONE_SECOND);
        let late = bound_value(backend, node_id, late_time, MatchStrategy::After, hi, ONE_SECOND);
        (early, late)
    }

    fn read_fragment(
        &self,
        backend: &dyn Backend,
        request: &ReadRequest,
        state: FragmentState,
    ) -> Result<ReadResult> {
        let node_id = &request.node_id;
        let reverse = state.direction == Direction::Reverse;

        let per_fragment_cap = match (state.remaining, request.max_response_size) {
            (None, 0) => usize::MAX,
            (None, m) => m,
            (Some(r), 0) => r as usize,
            (Some(r), m) => (r as usize).min(m),
        };

        let (copied, _skipped) = backend.copy_values(
            node_id,
            state.next_index,
            state.target_idx,
            reverse,
            0,
            per_fragment_cap,
            request.range,
        )?;

        let consumed = copied.len() as i64;
        let new_next_index_signed = if reverse {
            state.next_index as i64 - consumed
        } else {
            state.next_index as i64 + consumed
        };
        let range_exhausted = if reverse {
            new_next_index_signed < state.target_idx as i64
        } else {
            new_next_index_signed > state.target_idx as i64
        };

        let new_remaining = state.remaining.map(|r| r.saturating_sub(consumed as u32));

        let mut values = Vec::with_capacity(copied.len() + 2);
        if request.return_bounds && !state.early_bound_done {
            if let Some(early) = self.recompute_early_bound(backend, request, state.direction) {
                values.push(project(early, state.timestamps_to_return));
            }
        }
        for v in copied {
            values.push(project(v, state.timestamps_to_return));
        }
        let emit_late_bound = request.return_bounds && range_exhausted;
        if emit_late_bound {
            if let Some(late) = self.recompute_late_bound(backend, request, state.direction) {
                values.push(project(late, state.timestamps_to_return));
            }
        }

        let has_more_in_range = !range_exhausted;
        let has_more_budget = new_remaining.map_or(true, |r| r > 0);

        let continuation_point = if has_more_in_range && has_more_budget {
            Some(
                ContinuationPoint {
                    direction: state.direction,
                    return_bounds: request.return_bounds,
                    timestamps_to_return: state.timestamps_to_return,
                    next_index: new_next_index_signed.max(0) as u64,
                    remaining: new_remaining.unwrap_or(u32::MAX),
                    end_idx: state.target_idx as u64,
                }
                .encode(),
            )
        } else if !has_more_in_range && !has_more_budget && self.config.emit_on_exact_exhaustion {
            Some(
                ContinuationPoint {
                    direction: state.direction,
                    return_bounds: request.return_bounds,
                    timestamps_to_return: state.timestamps_to_return,
                    next_index: new_next_index_signed.max(0) as u64,
                    remaining: 0,
                    end_idx: state.target_idx as u64,
                }
                .encode(),
            )
        } else {
            None
        };

        trace!(
            target: "historian", ?node_id, values = values.len(),
            continuation = continuation_point.is_some(), "read fragment produced"
        );

        Ok(ReadResult { status: StatusCode::Good, values, continuation_point })
    }

    /// Recomputes the early bound for the final output position. Cheap: a
    /// single `match_timestamp`/`get_value` pair, and only called on
    /// fragments that actually need it (the first fragment of a read).
    fn recompute_early_bound(
        &self,
        backend: &dyn Backend,
        request: &ReadRequest,
        direction: Direction,
    ) -> Option<DataValue> {
        let (lo, _hi) = main_range(backend, &request.node_id, direction, request.start_time, request.end_time);
        let early_time = match direction {
            Direction::Forward => request.start_time,
            Direction::Reverse => request.end_time,
        };
        bound_value(backend, &request.node_id, early_time, MatchStrategy::Before, lo, -ONE_SECOND)
    }

    fn recompute_late_bound(
        &self,
        backend: &dyn Backend,
        request: &ReadRequest,
        direction: Direction,
    ) -> Option<DataValue> {
        let (_lo, hi) = main_range(backend, &request.node_id, direction, request.start_time, request.end_time);
        let late_time = match direction {
            Direction::Forward => request.end_time,
            Direction::Reverse => request.start_time,
        };
        bound_value(backend, &request.node_id, late_time, MatchStrategy::After, hi, ONE_SECOND)
    }
}

/// Forward if `startTime <= endTime`, treating `UNSPECIFIED` as unbounded on
/// its side. `UNSPECIFIED` on both sides is invalid.
fn direction_of(start: Timestamp, end: Timestamp) -> Option<Direction> {
    if start.is_unspecified() && end.is_unspecified() {
        return None;
    }
    if start.is_unspecified() || end.is_unspecified() {
        return Some(Direction::Forward);
    }
    Some(if start.0 <= end.0 { Direction::Forward } else { Direction::Reverse })
}

/// The inclusive `[lo, hi]` index range a request covers, independent of
/// traversal direction. Either side may be `None` if the store has no entry
/// satisfying that bound (empty or unknown node, or range outside stored
/// data).
fn main_range(
    backend: &dyn Backend,
    node_id: &NodeId,
    direction: Direction,
    start_time: Timestamp,
    end_time: Timestamp,
) -> (Option<usize>, Option<usize>) {
    match direction {
        Direction::Forward => {
            let lo = if start_time.is_unspecified() {
                backend.first_index(node_id)
            } else {
                backend.match_timestamp(node_id, start_time, MatchStrategy::EqualOrAfter)
            };
            let hi = if end_time.is_unspecified() {
                backend.last_index(node_id)
            } else {
                backend.match_timestamp(node_id, end_time, MatchStrategy::EqualOrBefore)
            };
            (lo, hi)
        }
        Direction::Reverse => {
            let hi = backend.match_timestamp(node_id, start_time, MatchStrategy::EqualOrBefore);
            let lo = backend.match_timestamp(node_id, end_time, MatchStrategy::EqualOrAfter);
            (lo, hi)
        }
    }
}

/// A bound entry keyed on `bound_time` using `strategy`. If `bound_time` is
/// unspecified, synthesizes a timestamp `offset` ticks from `neighbor_idx`'s
/// value (Part 11 Table 1 marks (a)/(b)); otherwise a real match returns the
/// stored value and an absent match synthesizes `BadBoundNotFound` at
/// exactly the requested time.
fn bound_value(
    backend: &dyn Backend,
    node_id: &NodeId,
    bound_time: Timestamp,
    strategy: MatchStrategy,
    neighbor_idx: Option<usize>,
    offset: i64,
) -> Option<DataValue> {
    if bound_time.is_unspecified() {
        let idx = neighbor_idx?;
        let neighbor = backend.get_value(node_id, idx)?;
        let ts = neighbor
            .source_timestamp
            .or(neighbor.server_timestamp)
            .unwrap_or(Timestamp::UNSPECIFIED);
        let synthetic_ts = ts.checked_add_ticks(offset).unwrap_or(ts);
        return Some(DataValue::synthetic_bound(StatusCode::BadBoundNotFound, synthetic_ts));
    }
    match backend.match_timestamp(node_id, bound_time, strategy) {
        Some(idx) => backend.get_value(node_id, idx),
        None => Some(DataValue::synthetic_bound(StatusCode::BadBoundNotFound, bound_time)),
    }
}

fn project(mut value: DataValue, which: TimestampsToReturn) -> DataValue {
    value.project_timestamps(which);
    value
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use historian_backend::{InMemoryBackend, InMemoryBackendConfig};
    use historian_base::{SystemClock, Variant};
    use test_log::test;

    use super::*;

    const T: i64 = ONE_SECOND;

    fn seeded_backend() -> (InMemoryBackend, NodeId) {
        let backend = InMemoryBackend::new(InMemoryBackendConfig::default(), Arc::new(SystemClock));
        let node = NodeId::numeric(1, 1);
        for ts in [100, 200, 300, 400, 500] {
            backend
                .insert(&node, DataValue::new(Variant::from_bytes((ts as i64).to_le_bytes().to_vec()), Timestamp(ts * T)))
                .unwrap();
        }
        (backend, node)
    }

    fn stamps(values: &[DataValue]) -> Vec<i64> {
        values.iter().map(|v| v.source_timestamp.unwrap().0 / T).collect()
    }

    fn base_request(node_id: NodeId, start: i64, end: i64) -> ReadRequest {
        ReadRequest {
            node_id,
            start_time: Timestamp(start * T),
            end_time: Timestamp(end * T),
            num_values_per_node: 0,
            return_bounds: false,
            is_read_modified: false,
            timestamps_to_return: TimestampsToReturn::Both,
            range: None,
            release_continuation_points: false,
            continuation_point: None,
            max_response_size: 0,
        }
    }

    // Scenario 1: exact range, no bounds.
    #[test]
    fn scenario_exact_range_no_bounds() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let req = base_request(node, 150, 450);
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::Good);
        assert_eq!(stamps(&result.values), vec![200, 300, 400]);
        assert!(result.continuation_point.is_none());
    }

    // Scenario 2: bounds requested, both present.
    #[test]
    fn scenario_bounds_both_present() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 150, 450);
        req.return_bounds = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&result.values), vec![100, 200, 300, 400, 500]);
        assert!(result.values.iter().all(|v| v.status == StatusCode::Good));
    }

    // Scenario 3: bounds requested, upper absent.
    #[test]
    fn scenario_upper_bound_absent() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 150, 600);
        req.return_bounds = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&result.values), vec![100, 200, 300, 400, 500, 600]);
        assert_eq!(result.values.last().unwrap().status, StatusCode::BadBoundNotFound);
        assert!(result.values[..5].iter().all(|v| v.status == StatusCode::Good));
    }

    // Scenario 4: pagination cap=2.
    #[test]
    fn scenario_pagination() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.max_response_size = 2;

        let frag1 = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&frag1.values), vec![100, 200]);
        assert!(frag1.continuation_point.is_some());

        req.continuation_point = frag1.continuation_point;
        let frag2 = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&frag2.values), vec![300, 400]);
        assert!(frag2.continuation_point.is_some());

        req.continuation_point = frag2.continuation_point;
        let frag3 = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&frag3.values), vec![500]);
        assert!(frag3.continuation_point.is_none());
    }

    // Scenario 5: reverse.
    #[test]
    fn scenario_reverse() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let req = base_request(node, 500, 100);
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&result.values), vec![500, 400, 300, 200, 100]);
    }

    // Scenario 6: unspecified start, bound synthesized one second early. The
    // far end (250T) lies strictly inside stored data (between 200T and
    // 300T), so the fragment also reaches its target and surfaces the real
    // entry just after it as the late bound.
    #[test]
    fn scenario_unspecified_start_with_bounds() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 0, 250);
        req.start_time = Timestamp::UNSPECIFIED;
        req.return_bounds = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.values[0].status, StatusCode::BadBoundNotFound);
        assert_eq!(result.values[0].source_timestamp.unwrap().0, 100 * T - ONE_SECOND);
        assert_eq!(stamps(&result.values[1..3]), vec![100, 200]);
        assert_eq!(result.values[3].status, StatusCode::Good);
        assert_eq!(result.values[3].source_timestamp.unwrap().0, 300 * T);
    }

    #[test]
    fn both_unspecified_is_invalid() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 0, 0);
        req.start_time = Timestamp::UNSPECIFIED;
        req.end_time = Timestamp::UNSPECIFIED;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::BadHistoryOperationInvalid);
    }

    #[test]
    fn read_modified_is_unsupported() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.is_read_modified = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::BadHistoryOperationUnsupported);
    }

    #[test]
    fn release_continuation_points_reads_nothing() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.release_continuation_points = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::Good);
        assert!(result.values.is_empty());
    }

    // P4: pagination round-trip equals a single unlimited-size read.
    #[test]
    fn property_pagination_round_trip_equals_single_shot() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());

        let single = engine.read(&backend, &base_request(node.clone(), 100, 500)).unwrap();

        let mut req = base_request(node, 100, 500);
        req.max_response_size = 1;
        let mut all_values = Vec::new();
        loop {
            let frag = engine.read(&backend, &req).unwrap();
            all_values.extend(frag.values);
            if frag.continuation_point.is_none() {
                break;
            }
            req.continuation_point = frag.continuation_point;
        }
        assert_eq!(all_values, single.values);
    }

    // numValuesPerNode cap reached with the range not exhausted: no continuation.
    #[test]
    fn num_values_cap_stops_without_continuation() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.num_values_per_node = 2;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(stamps(&result.values), vec![100, 200]);
        assert!(result.continuation_point.is_none());
    }

    #[test]
    fn emit_on_exact_exhaustion_policy_toggle() {
        let (backend, node) = seeded_backend();
        let mut req = base_request(node, 100, 500);
        req.num_values_per_node = 5;
        req.max_response_size = 5;

        let default_engine = ReadEngine::new(ReadEngineConfig::default());
        let result = default_engine.read(&backend, &req).unwrap();
        assert!(result.continuation_point.is_none());

        let permissive_engine = ReadEngine::new(ReadEngineConfig { emit_on_exact_exhaustion: true });
        let result = permissive_engine.read(&backend, &req).unwrap();
        assert!(result.continuation_point.is_some());
    }

    #[test]
    fn malformed_continuation_point_is_rejected() {
        let (backend, node) = seeded_backend();
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.continuation_point = Some(vec![1, 2, 3]);
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::BadContinuationPointInvalid);
    }

    #[test]
    fn bound_not_supported_is_rejected() {
        struct NoBounds(InMemoryBackend);
        impl Backend for NoBounds {
            fn insert(&self, n: &NodeId, v: DataValue) -> Result<StatusCode> {
                self.0.insert(n, v)
            }
            fn first_index(&self, n: &NodeId) -> Option<usize> {
                self.0.first_index(n)
            }
            fn last_index(&self, n: &NodeId) -> Option<usize> {
                self.0.last_index(n)
            }
            fn end(&self, n: &NodeId) -> usize {
                self.0.end(n)
            }
            fn match_timestamp(&self, n: &NodeId, t: Timestamp, s: MatchStrategy) -> Option<usize> {
                self.0.match_timestamp(n, t, s)
            }
            fn result_size(&self, n: &NodeId, s: Option<usize>, e: Option<usize>) -> usize {
                self.0.result_size(n, s, e)
            }
            fn copy_values(
                &self,
                n: &NodeId,
                s: usize,
                e: usize,
                r: bool,
                sk: usize,
                m: usize,
                rg: Option<NumericRange>,
            ) -> Result<(Vec<DataValue>, usize)> {
                self.0.copy_values(n, s, e, r, sk, m, rg)
            }
            fn get_value(&self, n: &NodeId, i: usize) -> Option<DataValue> {
                self.0.get_value(n, i)
            }
            fn bound_supported(&self) -> bool {
                false
            }
            fn timestamps_to_return_supported(&self, which: TimestampsToReturn) -> bool {
                self.0.timestamps_to_return_supported(which)
            }
        }
        let (inner, node) = seeded_backend();
        let backend = NoBounds(inner);
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let mut req = base_request(node, 100, 500);
        req.return_bounds = true;
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::BadBoundNotSupported);
    }

    #[test]
    fn timestamps_to_return_unsupported_is_rejected() {
        struct ServerOnly(InMemoryBackend);
        impl Backend for ServerOnly {
            fn insert(&self, n: &NodeId, v: DataValue) -> Result<StatusCode> {
                self.0.insert(n, v)
            }
            fn first_index(&self, n: &NodeId) -> Option<usize> {
                self.0.first_index(n)
            }
            fn last_index(&self, n: &NodeId) -> Option<usize> {
                self.0.last_index(n)
            }
            fn end(&self, n: &NodeId) -> usize {
                self.0.end(n)
            }
            fn match_timestamp(&self, n: &NodeId, t: Timestamp, s: MatchStrategy) -> Option<usize> {
                self.0.match_timestamp(n, t, s)
            }
            fn result_size(&self, n: &NodeId, s: Option<usize>, e: Option<usize>) -> usize {
                self.0.result_size(n, s, e)
            }
            fn copy_values(
                &self,
                n: &NodeId,
                s: usize,
                e: usize,
                r: bool,
                sk: usize,
                m: usize,
                rg: Option<NumericRange>,
            ) -> Result<(Vec<DataValue>, usize)> {
                self.0.copy_values(n, s, e, r, sk, m, rg)
            }
            fn get_value(&self, n: &NodeId, i: usize) -> Option<DataValue> {
                self.0.get_value(n, i)
            }
            fn bound_supported(&self) -> bool {
                self.0.bound_supported()
            }
            fn timestamps_to_return_supported(&self, which: TimestampsToReturn) -> bool {
                matches!(which, TimestampsToReturn::Server)
            }
        }
        let (inner, node) = seeded_backend();
        let backend = ServerOnly(inner);
        let engine = ReadEngine::new(ReadEngineConfig::default());
        let req = base_request(node, 100, 500);
        let result = engine.read(&backend, &req).unwrap();
        assert_eq!(result.status, StatusCode::BadTimestampNotSupported);
    }
}
