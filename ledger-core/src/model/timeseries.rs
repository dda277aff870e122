use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value-run anchor: the recorded value held constant from `start_time`
/// until the next base for the same (table, entity, property) begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesBase {
    pub id: String,
    pub table_name: String,
    pub entity_id: String,
    pub property_name: String,
    pub value: String,
    pub start_time: DateTime<Utc>,
}

/// The delta chain attached to exactly one `TimeseriesBase`.
///
/// `compressed_deltas` is the varint encoding of successive time gaps in
/// milliseconds, first element always `0`. `last_timestamp` is the prefix
/// sum of the decoded deltas, or `-1` when the chain is empty (never the
/// case once a base exists — the first append always writes `[0]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesDelta {
    pub id: String,
    pub base_id: String,
    pub compressed_deltas: Vec<u8>,
    pub last_timestamp: i64,
    pub version: i64,
}

/// Interpolation strategy for `get_interpolated` range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Return the sample with `timestamp == t`, else omit the tick.
    None,
    /// The largest-timestamp sample with `timestamp <= t`.
    Previous,
    /// The smallest-timestamp sample with `timestamp >= t`.
    Next,
    /// Whichever of Previous/Next minimises `|delta t|`; ties favour Previous.
    Nearest,
    /// Linear interpolation between numeric neighbours; falls back to
    /// Previous when a neighbour is missing or values aren't numeric.
    Linear,
}

/// One flattened (timestamp, value) sample reconstructed from a base + its
/// decoded delta chain.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesSample {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}
