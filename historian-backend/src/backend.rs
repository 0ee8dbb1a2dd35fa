use historian_base::{DataValue, MatchStrategy, NodeId, NumericRange, Result, StatusCode, TimestampsToReturn};

/// A per-node, timestamp-ordered store, exposed as a capability object so
/// the read engine and gatherer can be written against the trait rather
/// than any one storage implementation. All operations are keyed by
/// [`NodeId`] and are expected to be cheap enough to call inside a single
/// request; none of them are async — a backend that needs to go to disk or
/// over the network should do its own internal buffering/caching to keep
/// this contract honest.
///
/// A query against a node the backend has never seen returns empty results
/// (`None`/`0`/an empty vec), not an error, so the read engine can report a
/// plain "no data" status rather than threading a node-existence check
/// through every call site.
pub trait Backend: Send + Sync {
    /// Insert `value` into `node_id`'s store at the position that keeps the
    /// store sorted ascending by effective timestamp. Ties (equal
    /// timestamps) are broken by insertion order: a new entry with a
    /// timestamp equal to existing entries is placed after all of them.
    ///
    /// Returns `Ok(StatusCode::Good)` on success. An allocation failure is a
    /// local, per-call condition, not a fatal one: it comes back as
    /// `Ok(StatusCode::BadOutOfMemory)` rather than `Err`. `Err` is reserved
    /// for conditions the caller has no narrower way to attribute, such as a
    /// poisoned lock.
    fn insert(&self, node_id: &NodeId, value: DataValue) -> Result<StatusCode>;

    /// `Some(0)` if the node's store is non-empty, `None` if it is empty or
    /// unknown.
    fn first_index(&self, node_id: &NodeId) -> Option<usize>;

    /// `Some(end - 1)` if the node's store is non-empty, `None` otherwise.
    fn last_index(&self, node_id: &NodeId) -> Option<usize>;

    /// One past the last valid index (`0` for an empty or unknown node).
    fn end(&self, node_id: &NodeId) -> usize;

    /// Binary search on ascending timestamps per `strategy`. Returns `None`
    /// when no index satisfies the strategy (including when the node is
    /// unknown or empty).
    fn match_timestamp(
        &self,
        node_id: &NodeId,
        timestamp: historian_base::Timestamp,
        strategy: MatchStrategy,
    ) -> Option<usize>;

    /// `end - start + 1` for a non-empty, in-range `[start, end]`; `0` if
    /// either bound is `None` or the range is empty.
    fn result_size(&self, node_id: &NodeId, start: Option<usize>, end: Option<usize>) -> usize;

    /// Copies up to `max` values from `[start, end]` (inclusive), walking
    /// backwards if `reverse`, after first skipping `skip` matching entries.
    /// Returns the copied values together with how many entries were
    /// actually skipped (less than `skip` only if the range was exhausted
    /// first). `range`, when present, sub-selects an indexed slice of each
    /// array-valued sample rather than changing which samples are chosen.
    fn copy_values(
        &self,
        node_id: &NodeId,
        start: usize,
        end: usize,
        reverse: bool,
        skip: usize,
        max: usize,
        range: Option<NumericRange>,
    ) -> Result<(Vec<DataValue>, usize)>;

    /// A read-only copy of the value at `index`, or `None` if out of range.
    fn get_value(&self, node_id: &NodeId, index: usize) -> Option<DataValue>;

    /// Whether this backend can compute bounding values (`BEFORE`/`AFTER`
    /// neighbors). The in-memory backend always can.
    fn bound_supported(&self) -> bool;

    /// Whether this backend can serve the requested timestamp projection
    /// (source, server, or both). A backend that only ever stamps values
    /// with one clock should report `false` for the combination it can't
    /// honor rather than silently substituting a different one.
    fn timestamps_to_return_supported(&self, which: TimestampsToReturn) -> bool;
}
