use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use historian_base::{err, NodeId, Result};
use tracing::{debug, trace, warn};

use crate::config::ContinuationTableConfig;
use crate::types::SessionId;

type Key = (SessionId, NodeId);

struct Entry {
    token: Vec<u8>,
    last_active: Instant,
}

struct TableState {
    entries: HashMap<Key, Entry>,
    /// Insertion order, oldest first, for overflow eviction. The table is
    /// small and short-lived enough that a linear scan to remove a released
    /// key is cheaper to reason about than a second index.
    order: VecDeque<Key>,
}

/// Per-session store of live continuation points, keyed by `(session,
/// nodeId)`. At most one point is ever alive per key: a new allocation for
/// an existing key replaces it in place rather than growing the table.
pub struct ContinuationTable {
    config: ContinuationTableConfig,
    state: Mutex<TableState>,
}

impl ContinuationTable {
    pub fn new(config: ContinuationTableConfig) -> Self {
        ContinuationTable {
            config,
            state: Mutex::new(TableState { entries: HashMap::new(), order: VecDeque::new() }),
        }
    }

    /// Records `token` as the live continuation point for `(session,
    /// node_id)`, replacing any prior one. Evicts the oldest entry first if
    /// the table is at capacity and this is a new key.
    pub fn allocate(&self, session: SessionId, node_id: &NodeId, token: Vec<u8>) -> Result<()> {
        let key = (session, node_id.clone());
        let mut state = self.state.lock().map_err(|_| err("continuation table lock poisoned"))?;
        if state.entries.contains_key(&key) {
            state.order.retain(|k| k != &key);
        } else if state.entries.len() >= self.config.max_entries {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
                warn!(target: "historian", "continuation table full, evicted oldest entry");
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, Entry { token, last_active: Instant::now() });
        trace!(target: "historian", ?node_id, "continuation point allocated");
        Ok(())
    }

    /// Releases the continuation point for `(session, node_id)`, if any.
    pub fn release(&self, session: SessionId, node_id: &NodeId) -> Result<()> {
        let key = (session, node_id.clone());
        let mut state = self.state.lock().map_err(|_| err("continuation table lock poisoned"))?;
        if state.entries.remove(&key).is_some() {
            state.order.retain(|k| k != &key);
            debug!(target: "historian", ?node_id, "continuation point released");
        }
        Ok(())
    }

    /// Returns `true` iff `token` is the live, unexpired continuation point
    /// for `(session, node_id)`. An expired entry is evicted as a side
    /// effect of the check.
    pub fn validate(&self, session: SessionId, node_id: &NodeId, token: &[u8]) -> Result<bool> {
        let key = (session, node_id.clone());
        let mut state = self.state.lock().map_err(|_| err("continuation table lock poisoned"))?;
        let Some(entry) = state.entries.get(&key) else { return Ok(false) };
        if entry.last_active.elapsed() > self.config.idle_timeout {
            state.entries.remove(&key);
            state.order.retain(|k| k != &key);
            return Ok(false);
        }
        Ok(entry.token == token)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }
}
