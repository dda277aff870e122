//! Change capture (C6).
//!
//! Derives per-field `ChangeLogRecord`s from an entity transition
//! `{old, new, op}`. Tracked fields are visited in declaration order — by
//! convention the key field is declared first on every `TableDescriptor`,
//! which gives "primary key first, then declared field order" for free.

use chrono::{DateTime, Utc};
use ledger_core::model::{ChangeLogRecord, ChangeOp, TableDescriptor};

/// Capture the change-log records for one write. `old` is `None` for
/// `Insert`; `new` is `None` for `Delete`.
pub fn capture<T>(
    table: &TableDescriptor<T>,
    entity_id: &str,
    old: Option<&T>,
    new: Option<&T>,
    op: ChangeOp,
    changed_by: &str,
    changed_at: DateTime<Utc>,
) -> Vec<ChangeLogRecord> {
    match op {
        ChangeOp::Insert => {
            let new = new.expect("Insert requires the new entity");
            table
                .tracked_fields()
                .filter_map(|field| {
                    let new_value = (field.stringify)(new)?;
                    Some(record(
                        table.table_name,
                        entity_id,
                        field.name,
                        changed_by,
                        changed_at,
                        None,
                        Some(new_value),
                        op,
                    ))
                })
                .collect()
        }
        ChangeOp::Update => {
            let old = old.expect("Update requires the prior entity");
            let new = new.expect("Update requires the new entity");
            table
                .tracked_fields()
                .filter_map(|field| {
                    let old_value = (field.stringify)(old);
                    let new_value = (field.stringify)(new);
                    if old_value == new_value {
                        return None;
                    }
                    Some(record(
                        table.table_name,
                        entity_id,
                        field.name,
                        changed_by,
                        changed_at,
                        old_value,
                        new_value,
                        op,
                    ))
                })
                .collect()
        }
        ChangeOp::Delete => {
            let old = old.expect("Delete requires the prior entity");
            table
                .tracked_fields()
                .map(|field| {
                    record(
                        table.table_name,
                        entity_id,
                        field.name,
                        changed_by,
                        changed_at,
                        (field.stringify)(old),
                        None,
                        op,
                    )
                })
                .collect()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    table_name: &str,
    entity_id: &str,
    property_name: &str,
    changed_by: &str,
    changed_at: DateTime<Utc>,
    old_value: Option<String>,
    new_value: Option<String>,
    op: ChangeOp,
) -> ChangeLogRecord {
    ChangeLogRecord {
        id: uuid::Uuid::new_v4().to_string(),
        table_name: table_name.to_string(),
        entity_id: entity_id.to_string(),
        property_name: property_name.to_string(),
        changed_by: changed_by.to_string(),
        changed_at,
        old_value,
        new_value,
        op,
    }
}
