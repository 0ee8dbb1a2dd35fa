use std::time::Duration;

/// Bounds on the per-session continuation-point table.
#[derive(Clone, Copy, Debug)]
pub struct ContinuationTableConfig {
    pub max_entries: usize,
    pub idle_timeout: Duration,
}

impl Default for ContinuationTableConfig {
    fn default() -> Self {
        ContinuationTableConfig { max_entries: 256, idle_timeout: Duration::from_secs(600) }
    }
}
