use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use historian_base::{err, DataValue, NodeId, Result, StatusCode};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::settings::{HistorizingNodeSettings, HistorizingUpdateStrategy, ValueReader};

/// A running poll task's handles: a way to tell it to stop, a way to push a
/// new interval to it (taking effect at the next tick), and the task handle
/// itself so it can be aborted on deregister.
struct PollTask {
    stop_tx: watch::Sender<bool>,
    interval_tx: watch::Sender<Duration>,
    handle: JoinHandle<()>,
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct RegisteredNode {
    settings: HistorizingNodeSettings,
    poll: Mutex<Option<PollTask>>,
}

/// Owns the node registry, the per-strategy update pipeline, and the
/// polling scheduler. One `Gatherer` per server; nodes are registered and
/// deregistered independently of any in-flight reads.
pub struct Gatherer {
    registry: RwLock<HashMap<NodeId, RegisteredNode>>,
    value_reader: Arc<dyn ValueReader>,
}

impl Gatherer {
    pub fn new(value_reader: Arc<dyn ValueReader>) -> Self {
        Gatherer { registry: RwLock::new(HashMap::new()), value_reader }
    }

    /// Idempotent: re-registration atomically replaces the prior settings.
    /// If `strategy == Poll` and `polling_interval > 0`, a poll task is
    /// created but left `Idle` until `start_poll` is called.
    pub fn register(&self, node_id: NodeId, settings: HistorizingNodeSettings) -> Result<()> {
        let mut registry = self.registry.write().map_err(|_| err("gatherer registry lock poisoned"))?;
        debug!(target: "historian", ?node_id, strategy = ?settings.strategy, "registering historized node");
        registry.insert(node_id, RegisteredNode { settings, poll: Mutex::new(None) });
        Ok(())
    }

    /// Stops any poll task and drops the node's settings. The backend handle
    /// was never owned by the gatherer, so nothing storage-side is touched
    /// here; disposal of the backend is the caller's responsibility.
    pub fn deregister(&self, node_id: &NodeId) -> Result<()> {
        let mut registry = self.registry.write().map_err(|_| err("gatherer registry lock poisoned"))?;
        if registry.remove(node_id).is_some() {
            debug!(target: "historian", ?node_id, "deregistered historized node");
        }
        Ok(())
    }

    /// Atomic replace. A running poll transitions to the new interval at its
    /// next tick; the task itself is not restarted.
    pub fn update_setting(&self, node_id: &NodeId, settings: HistorizingNodeSettings) -> Result<bool> {
        let new_interval = settings.polling_interval;
        let mut registry = self.registry.write().map_err(|_| err("gatherer registry lock poisoned"))?;
        let Some(node) = registry.get_mut(node_id) else { return Ok(false) };
        node.settings = settings;
        if let Ok(poll) = node.poll.lock() {
            if let Some(task) = poll.as_ref() {
                let _ = task.interval_tx.send(new_interval);
            }
        }
        trace!(target: "historian", ?node_id, "updated historizing settings");
        Ok(true)
    }

    /// A cheap clone of the node's current settings, or `None` if unknown.
    pub fn get_setting(&self, node_id: &NodeId) -> Option<HistorizingNodeSettings> {
        let registry = self.registry.read().ok()?;
        registry.get(node_id).map(|n| n.settings.clone())
    }

    /// Called by the address-space layer whenever a historized variable is
    /// written. Behavior depends on the node's strategy: `User` is a no-op,
    /// `ValueSet` forwards to `backend.insert`, `Poll` ignores it (the poll
    /// task is the sole writer).
    pub fn set_value(&self, node_id: &NodeId, value: DataValue) -> Result<()> {
        let registry = self.registry.read().map_err(|_| err("gatherer registry lock poisoned"))?;
        let Some(node) = registry.get(node_id) else {
            warn!(target: "historian", ?node_id, "set_value for unregistered node");
            return Ok(());
        };
        match node.settings.strategy {
            HistorizingUpdateStrategy::User => {}
            HistorizingUpdateStrategy::ValueSet => {
                let status = node.settings.backend.insert(node_id, value)?;
                if status != StatusCode::Good {
                    warn!(target: "historian", ?node_id, ?status, "backend insert did not succeed");
                }
            }
            HistorizingUpdateStrategy::Poll => {}
        }
        Ok(())
    }

    /// Starts the poll task for `node_id` if it isn't already running.
    /// Idempotent. No-op if the node isn't registered or isn't `Poll`
    /// strategy.
    pub fn start_poll(&self, node_id: &NodeId, spawner: &tokio::runtime::Handle) -> Result<()> {
        let registry = self.registry.read().map_err(|_| err("gatherer registry lock poisoned"))?;
        let Some(node) = registry.get(node_id) else { return Ok(()) };
        if node.settings.strategy != HistorizingUpdateStrategy::Poll {
            return Ok(());
        }
        let mut poll = node.poll.lock().map_err(|_| err("poll task lock poisoned"))?;
        if poll.is_some() {
            return Ok(()); // already running
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let (interval_tx, interval_rx) = watch::channel(node.settings.polling_interval);
        let backend = node.settings.backend.clone();
        let value_reader = self.value_reader.clone();
        let nid = node_id.clone();

        let handle = spawner.spawn(poll_loop(nid, backend, value_reader, stop_rx, interval_rx));
        *poll = Some(PollTask { stop_tx, interval_tx, handle });
        debug!(target: "historian", ?node_id, "poll task started");
        Ok(())
    }

    /// Stops the poll task for `node_id`. Idempotent.
    pub fn stop_poll(&self, node_id: &NodeId) -> Result<()> {
        let registry = self.registry.read().map_err(|_| err("gatherer registry lock poisoned"))?;
        let Some(node) = registry.get(node_id) else { return Ok(()) };
        let mut poll = node.poll.lock().map_err(|_| err("poll task lock poisoned"))?;
        if let Some(task) = poll.take() {
            let _ = task.stop_tx.send(true);
            debug!(target: "historian", ?node_id, "poll task stop requested");
            // Dropping `task` aborts the handle if the stop signal hasn't
            // been observed by the next select point yet.
        }
        Ok(())
    }

    pub fn is_registered(&self, node_id: &NodeId) -> bool {
        self.registry.read().map(|r| r.contains_key(node_id)).unwrap_or(false)
    }
}

/// The `RUNNING` state's body: tick immediately, then sleep for the current
/// interval (re-read every loop so `update_setting` takes effect at the next
/// tick), tick again, and so on, until `stop_tx` fires. Using sleep rather
/// than `tokio::time::interval` means a long pause never produces a burst of
/// catch-up ticks: the next tick after a pause fires immediately and the
/// cadence resumes from there.
async fn poll_loop(
    node_id: NodeId,
    backend: Arc<dyn historian_backend::Backend>,
    value_reader: Arc<dyn ValueReader>,
    mut stop_rx: watch::Receiver<bool>,
    mut interval_rx: watch::Receiver<Duration>,
) {
    loop {
        if *stop_rx.borrow() {
            return;
        }
        match value_reader.read_current_value(&node_id).await {
            Ok(value) => match backend.insert(&node_id, value) {
                Ok(status) if status != StatusCode::Good => {
                    warn!(target: "historian", ?node_id, ?status, "poll tick insert did not succeed");
                }
                Ok(_) => {}
                Err(e) => warn!(target: "historian", ?node_id, ?e, "poll tick insert failed"),
            },
            Err(e) => warn!(target: "historian", ?node_id, ?e, "poll tick value read failed"),
        }
        let dur = *interval_rx.borrow();
        tokio::select! {
            _ = tokio::time::sleep(dur) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    return;
                }
            }
        }
    }
}
