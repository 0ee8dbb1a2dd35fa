/// Tunables for [`crate::ReadEngine`]. Constructed once by the host and
/// passed into the engine's constructor; nothing here is process-global.
#[derive(Clone, Copy, Debug)]
pub struct ReadEngineConfig {
    /// Whether to still emit a (now-empty) continuation point when a
    /// fragment exhausts the requested range at the exact moment
    /// `numValuesPerNode` is also exactly satisfied. OPC UA versions
    /// disagree; default matches the common case of not issuing a
    /// continuation a client would immediately find empty.
    pub emit_on_exact_exhaustion: bool,
}

impl Default for ReadEngineConfig {
    fn default() -> Self {
        ReadEngineConfig { emit_on_exact_exhaustion: false }
    }
}
