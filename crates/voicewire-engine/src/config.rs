/// Sizing for one codec engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of live sessions, encoders and decoders combined.
    /// When a create would exceed it, the least recently used session is
    /// evicted first.
    pub pool_capacity: usize,
    /// Event hub buffer; lagging subscribers lose the oldest events.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 10,
            event_capacity: 256,
        }
    }
}
