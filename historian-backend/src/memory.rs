use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, RwLock};

use historian_base::{
    err, DataValue, MatchStrategy, NodeId, NumericRange, Result, StatusCode, Timestamp,
    TimestampsToReturn, Variant,
};
use rapidhash::RapidHasher;
use tracing::{debug, warn};

/// Hasher for the node-id -> store map. `NodeId` keys are short-lived
/// lookups on a hot path, so a fast non-cryptographic hasher is worth the
/// dependency over the default SipHash.
type NodeHasher = BuildHasherDefault<RapidHasher>;

use crate::backend::Backend;
use crate::config::InMemoryBackendConfig;

/// One node's ordered sample history: an append-sorted vector plus a
/// doubling-growth capacity.
struct NodeStore {
    entries: Vec<(Timestamp, DataValue)>,
}

impl NodeStore {
    fn with_capacity(capacity: usize) -> Self {
        NodeStore { entries: Vec::with_capacity(capacity) }
    }

    /// Lowest index with `timestamp >= ts` (EQUAL_OR_AFTER) and lowest index
    /// with `timestamp > ts` (AFTER). Every `MatchStrategy` is expressible in
    /// terms of these two binary searches.
    fn partitions(&self, ts: Timestamp) -> (usize, usize) {
        let equal_or_after = self.entries.partition_point(|(t, _)| *t < ts);
        let after = self.entries.partition_point(|(t, _)| *t <= ts);
        (equal_or_after, after)
    }

    fn match_timestamp(&self, ts: Timestamp, strategy: MatchStrategy) -> Option<usize> {
        let len = self.entries.len();
        let (equal_or_after, after) = self.partitions(ts);
        match strategy {
            MatchStrategy::Equal => {
                if equal_or_after < len && self.entries[equal_or_after].0 == ts {
                    Some(equal_or_after)
                } else {
                    None
                }
            }
            MatchStrategy::After => (after < len).then_some(after),
            MatchStrategy::EqualOrAfter => (equal_or_after < len).then_some(equal_or_after),
            MatchStrategy::Before => equal_or_after.checked_sub(1),
            MatchStrategy::EqualOrBefore => after.checked_sub(1),
        }
    }

    /// Insertion point that keeps ties in insertion order: a new entry with
    /// a timestamp equal to existing entries lands after all of them.
    fn insert_position(&self, ts: Timestamp) -> usize {
        self.entries.partition_point(|(t, _)| *t <= ts)
    }
}

/// The reference in-memory `Backend`: a flat map from [`NodeId`] to
/// [`NodeStore`], each independently lockable so concurrent inserts on
/// different nodes don't contend. Inserts and reads on the *same* node are
/// serialized through that node's `RwLock`.
pub struct InMemoryBackend {
    config: InMemoryBackendConfig,
    clock: Arc<dyn historian_base::Clock>,
    stores: RwLock<HashMap<NodeId, RwLock<NodeStore>, NodeHasher>>,
}

impl InMemoryBackend {
    pub fn new(config: InMemoryBackendConfig, clock: Arc<dyn historian_base::Clock>) -> Self {
        InMemoryBackend {
            stores: RwLock::new(HashMap::with_capacity_and_hasher(
                config.initial_node_capacity,
                NodeHasher::default(),
            )),
            config,
            clock,
        }
    }

    fn existing_store<'a>(
        &self,
        stores: &'a HashMap<NodeId, RwLock<NodeStore>, NodeHasher>,
        node_id: &NodeId,
    ) -> Option<&'a RwLock<NodeStore>> {
        stores.get(node_id)
    }

    fn get_or_create_store(&self, node_id: &NodeId) -> Result<()> {
        {
            let stores = self.stores.read().map_err(|_| err("backend node map lock poisoned"))?;
            if stores.contains_key(node_id) {
                return Ok(());
            }
        }
        let mut stores = self.stores.write().map_err(|_| err("backend node map lock poisoned"))?;
        stores
            .entry(node_id.clone())
            .or_insert_with(|| RwLock::new(NodeStore::with_capacity(self.config.initial_store_capacity)));
        Ok(())
    }
}

impl Backend for InMemoryBackend {
    fn insert(&self, node_id: &NodeId, value: DataValue) -> Result<StatusCode> {
        self.get_or_create_store(node_id)?;
        let stores = self.stores.read().map_err(|_| err("backend node map lock poisoned"))?;
        let store_lock = self
            .existing_store(&stores, node_id)
            .expect("store created above");
        let mut store = store_lock.write().map_err(|_| err("backend node store lock poisoned"))?;

        if store.entries.try_reserve(1).is_err() {
            warn!(target: "historian", ?node_id, len = store.entries.len(), "allocation failed inserting history sample");
            return Ok(StatusCode::BadOutOfMemory);
        }
        let ts = value.effective_timestamp(self.clock.as_ref());
        let idx = store.insert_position(ts);
        store.entries.insert(idx, (ts, value));
        debug!(target: "historian", ?node_id, ticks = ts.0, len = store.entries.len(), "inserted history sample");
        Ok(StatusCode::Good)
    }

    fn first_index(&self, node_id: &NodeId) -> Option<usize> {
        let stores = self.stores.read().ok()?;
        let store = self.existing_store(&stores, node_id)?.read().ok()?;
        (!store.entries.is_empty()).then_some(0)
    }

    fn last_index(&self, node_id: &NodeId) -> Option<usize> {
        let stores = self.stores.read().ok()?;
        let store = self.existing_store(&stores, node_id)?.read().ok()?;
        store.entries.len().checked_sub(1)
    }

    fn end(&self, node_id: &NodeId) -> usize {
        let Ok(stores) = self.stores.read() else { return 0 };
        let Some(lock) = self.existing_store(&stores, node_id) else { return 0 };
        let Ok(store) = lock.read() else { return 0 };
        store.entries.len()
    }

    fn match_timestamp(
        &self,
        node_id: &NodeId,
        timestamp: Timestamp,
        strategy: MatchStrategy,
    ) -> Option<usize> {
        let stores = self.stores.read().ok()?;
        let store = self.existing_store(&stores, node_id)?.read().ok()?;
        store.match_timestamp(timestamp, strategy)
    }

    fn result_size(&self, node_id: &NodeId, start: Option<usize>, end: Option<usize>) -> usize {
        let (Some(start), Some(end)) = (start, end) else { return 0 };
        if start > end {
            return 0;
        }
        let store_end = self.end(node_id);
        if start >= store_end || end >= store_end {
            return 0;
        }
        end - start + 1
    }

    fn copy_values(
        &self,
        node_id: &NodeId,
        start: usize,
        end: usize,
        reverse: bool,
        skip: usize,
        max: usize,
        range: Option<NumericRange>,
    ) -> Result<(Vec<DataValue>, usize)> {
        let stores = self.stores.read().map_err(|_| err("backend node map lock poisoned"))?;
        let Some(lock) = self.existing_store(&stores, node_id) else {
            return Ok((Vec::new(), 0));
        };
        let store = lock.read().map_err(|_| err("backend node store lock poisoned"))?;
        let len = store.entries.len();

        let mut out = Vec::new();
        let mut skipped = 0usize;
        if reverse {
            let mut idx = start as i64;
            let end = end as i64;
            while idx >= end && idx >= 0 && (idx as usize) < len && out.len() < max {
                if skipped < skip {
                    skipped += 1;
                } else {
                    out.push(apply_range(&store.entries[idx as usize].1, range));
                }
                idx -= 1;
            }
        } else {
            let mut idx = start;
            while idx <= end && idx < len && out.len() < max {
                if skipped < skip {
                    skipped += 1;
                } else {
                    out.push(apply_range(&store.entries[idx].1, range));
                }
                idx += 1;
            }
        }
        Ok((out, skipped))
    }

    fn get_value(&self, node_id: &NodeId, index: usize) -> Option<DataValue> {
        let stores = self.stores.read().ok()?;
        let store = self.existing_store(&stores, node_id)?.read().ok()?;
        store.entries.get(index).map(|(_, v)| v.clone())
    }

    fn bound_supported(&self) -> bool {
        true
    }

    /// Every sample carries both a source and a server timestamp, so every
    /// projection is servable.
    fn timestamps_to_return_supported(&self, _which: TimestampsToReturn) -> bool {
        true
    }
}

/// Applies an indexed sub-selection to a single sample's value bytes.
/// Mirrors `UA_DataValue_copyRange`: out-of-range slicing yields
/// `BadDataUnavailable` rather than panicking.
fn apply_range(value: &DataValue, range: Option<NumericRange>) -> DataValue {
    let Some(range) = range else { return value.clone() };
    let mut out = value.clone();
    let Some(Variant(bytes)) = &value.value else {
        out.status = StatusCode::BadDataUnavailable;
        return out;
    };
    let start = range.start as usize;
    let end = range.end.map(|e| e as usize).unwrap_or(bytes.len());
    if start >= bytes.len() || start > end {
        warn!(target: "historian", start, end, len = bytes.len(), "numeric range out of bounds");
        out.value = None;
        out.status = StatusCode::BadDataUnavailable;
        return out;
    }
    let end = end.min(bytes.len());
    out.value = Some(Variant::from_bytes(bytes[start..end].to_vec()));
    out
}
