//! Lifecycle tuning knobs.

/// Settings the application needs from the node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Blocks the engine must keep; 0 keeps everything.
    pub retain_blocks: i64,
    /// Backlog entries older than this many blocks are pruned at commit; 0 disables pruning.
    pub backlog_retention_blocks: i64,
    /// Power given to newly registered clients and miners.
    pub default_power: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retain_blocks: 0,
            backlog_retention_blocks: 0,
            default_power: 10,
        }
    }
}
