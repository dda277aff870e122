use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::change_op::ChangeOp;

/// Published to the event bus exactly once per successful write, after
/// commit. `changed_properties` covers every field whose stringified value
/// changed, keyed by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityChangeEvent {
    pub id: String,
    pub table_name: String,
    pub entity_id: String,
    pub op: ChangeOp,
    pub changed_properties: HashMap<String, PropertyChange>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}
