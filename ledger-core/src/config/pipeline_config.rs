use serde::{Deserialize, Serialize};

/// Write-pipeline and event-bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of the post-commit event broadcast channel. Subscribers
    /// that fall this far behind are dropped (lagged), satisfying the
    /// back-pressure requirement without blocking the publisher.
    pub event_channel_capacity: usize,
    /// Default stringified `changed_by` when the caller doesn't supply one.
    pub default_changed_by: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 1024,
            default_changed_by: "system".to_string(),
        }
    }
}
