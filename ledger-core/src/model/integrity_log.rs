use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only row in `sysIntegrityLog`. `previous_hash` equals the
/// `hash` of the most recent record for the same (table, entity, property),
/// or the empty string for the first record in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityLogRecord {
    pub id: String,
    pub table_name: String,
    pub entity_id: String,
    pub property_name: String,
    pub hash: String,
    pub previous_hash: String,
    pub timestamp: DateTime<Utc>,
}
