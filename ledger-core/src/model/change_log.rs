use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::change_op::ChangeOp;

/// One append-only row in `sysChangeLog`, recording the before/after of a
/// single tracked field on a single write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogRecord {
    pub id: String,
    pub table_name: String,
    pub entity_id: String,
    pub property_name: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub op: ChangeOp,
}
