/// Capacities the in-memory backend is seeded with at construction. Read
/// once at startup; there is no hot-reload path.
#[derive(Clone, Copy, Debug)]
pub struct InMemoryBackendConfig {
    /// Initial capacity of the node-id -> store map.
    pub initial_node_capacity: usize,
    /// Initial capacity of each per-node entry vector.
    pub initial_store_capacity: usize,
}

impl Default for InMemoryBackendConfig {
    fn default() -> Self {
        InMemoryBackendConfig {
            initial_node_capacity: 16,
            initial_store_capacity: 64,
        }
    }
}
