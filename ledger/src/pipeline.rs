//! Write pipeline (C8): the synchronous core run inside a single writer
//! transaction. Steps follow spec.md §4.8 exactly — change capture,
//! integrity, timeseries all commit or roll back together; embedding and
//! vector-index updates happen only after that transaction commits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::Transaction;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ledger_core::errors::{LedgerResult, ValidationError};
use ledger_core::model::{ChangeOp, EntityChangeEvent, PropertyChange, TableDescriptor};
use ledger_storage::Repository;
use tracing::{debug, warn};

/// Steps 2–7: read prior, validate, apply the mutation, and append every
/// bookkeeping record for one write, all inside the caller's transaction.
/// Returns the `EntityChangeEvent` to publish once the transaction commits.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_write<T>(
    tx: &Transaction<'_>,
    table: &TableDescriptor<T>,
    repo: &Repository<T>,
    entity_id: &str,
    new: Option<T>,
    op: ChangeOp,
    changed_by: &str,
    now: DateTime<Utc>,
) -> LedgerResult<EntityChangeEvent>
where
    T: Serialize + DeserializeOwned,
{
    debug!(table = table.table_name, entity_id, ?op, "applying write");

    if entity_id.trim().is_empty() {
        warn!(table = table.table_name, ?op, "rejecting write with empty entity id");
        return Err(ValidationError::MissingKey.into());
    }

    let old = repo.get(tx, entity_id)?;
    if matches!(op, ChangeOp::Update | ChangeOp::Delete) && old.is_none() {
        warn!(table = table.table_name, entity_id, ?op, "row not found for update/delete");
        return Err(ledger_core::errors::StorageError::NotFound {
            table_name: table.table_name.to_string(),
            entity_id: entity_id.to_string(),
        }
        .into());
    }

    match op {
        ChangeOp::Delete => repo.delete(tx, entity_id)?,
        ChangeOp::Insert | ChangeOp::Update => {
            let entity = new.as_ref().expect("insert/update requires the new entity");
            repo.put(tx, entity_id, entity)?;
        }
    }

    let changes = ledger_changelog::capture(table, entity_id, old.as_ref(), new.as_ref(), op, changed_by, now);
    debug!(table = table.table_name, entity_id, changed = changes.len(), "change log captured");
    for record in &changes {
        ledger_storage::queries::change_log::insert(tx, record)?;
    }

    record_integrity(tx, table, entity_id, old.as_ref(), new.as_ref(), op, now)?;

    if matches!(op, ChangeOp::Insert | ChangeOp::Update) {
        let entity = new.as_ref().expect("insert/update requires the new entity");
        record_timeseries(tx, table, entity_id, entity, now)?;
    }

    let mut changed_properties = HashMap::with_capacity(changes.len());
    for change in changes {
        changed_properties.insert(
            change.property_name,
            PropertyChange { old_value: change.old_value, new_value: change.new_value },
        );
    }

    debug!(table = table.table_name, entity_id, "write applied");
    Ok(EntityChangeEvent {
        id: uuid::Uuid::new_v4().to_string(),
        table_name: table.table_name.to_string(),
        entity_id: entity_id.to_string(),
        op,
        changed_properties,
        timestamp: now,
    })
}

/// Step 6: for each integrity-protected field, append a chained record
/// when the field changed (Update) or unconditionally (Insert/Delete).
fn record_integrity<T>(
    tx: &Transaction<'_>,
    table: &TableDescriptor<T>,
    entity_id: &str,
    old: Option<&T>,
    new: Option<&T>,
    op: ChangeOp,
    now: DateTime<Utc>,
) -> LedgerResult<()> {
    for field in table.integrity_fields() {
        let old_value = old.and_then(|o| (field.stringify)(o));
        let new_value = new.and_then(|n| (field.stringify)(n));

        let should_write = match op {
            ChangeOp::Insert | ChangeOp::Delete => true,
            ChangeOp::Update => old_value != new_value,
        };
        if !should_write {
            continue;
        }

        let value_for_hash = new_value.or(old_value).unwrap_or_default();
        let previous_hash = ledger_storage::queries::integrity_log::latest_hash(
            tx,
            table.table_name,
            entity_id,
            field.name,
        )?
        .unwrap_or_default();

        let record = ledger_integrity::append(
            table.table_name,
            entity_id,
            field.name,
            &value_for_hash,
            &previous_hash,
            now,
        );
        debug!(table = table.table_name, entity_id, field = field.name, "integrity record appended");
        ledger_storage::queries::integrity_log::insert(tx, &record)?;
    }
    Ok(())
}

/// Step 7: for each timeseries field, record the observation at `now`.
/// `record_change` itself decides whether this extends the current run or
/// starts a new one — the same value written repeatedly still appends a
/// delta, which is how spec.md's repeated-write compression scenario works.
fn record_timeseries<T>(
    tx: &Transaction<'_>,
    table: &TableDescriptor<T>,
    entity_id: &str,
    entity: &T,
    now: DateTime<Utc>,
) -> LedgerResult<()> {
    for field in table.timeseries_fields() {
        let Some(new_value) = (field.stringify)(entity) else { continue };

        let existing = ledger_storage::queries::timeseries::latest_base_and_delta(
            tx,
            table.table_name,
            entity_id,
            field.name,
        )?;

        let outcome = ledger_timeseries::record_change(
            existing.as_ref().map(|(b, d)| (b, d)),
            table.table_name,
            entity_id,
            field.name,
            &new_value,
            now,
        )?;

        match outcome {
            ledger_timeseries::AppendOutcome::NewBase(base, delta) => {
                debug!(table = table.table_name, entity_id, field = field.name, "timeseries: new base");
                ledger_storage::queries::timeseries::insert_base(tx, &base)?;
                ledger_storage::queries::timeseries::insert_delta(tx, &delta)?;
            }
            ledger_timeseries::AppendOutcome::AppendDelta(delta) => {
                debug!(table = table.table_name, entity_id, field = field.name, "timeseries: delta appended");
                ledger_storage::queries::timeseries::replace_delta(tx, &delta)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::model::FieldDescriptor;
    use ledger_storage::{Repository, StorageEngine};
    use proptest::prelude::*;

    #[derive(Clone, serde::Serialize, serde::Deserialize)]
    struct Entity {
        id: String,
        a: i64,
        b: i64,
    }

    fn entity_table() -> TableDescriptor<Entity> {
        TableDescriptor::new("entities", |e| e.id.clone())
            .field(FieldDescriptor::new("A", |e| Some(e.a.to_string())).tracked())
            .field(FieldDescriptor::new("B", |e| Some(e.b.to_string())).tracked())
    }

    proptest! {
        /// For any Insert-then-Update pair, the published event's
        /// `changed_properties` names exactly the fields whose stringified
        /// value differs between the two writes — no more, no less.
        #[test]
        fn changed_properties_exactly_covers_changed_fields(
            a0 in -100i64..100, b0 in -100i64..100,
            a1 in -100i64..100, b1 in -100i64..100,
        ) {
            let engine = StorageEngine::open_in_memory().unwrap();
            let repo: Repository<Entity> = Repository::new("entities");
            let table = entity_table();
            let now = chrono::Utc::now();

            engine.with_write_tx(|tx| {
                apply_write(
                    tx, &table, &repo, "e1",
                    Some(Entity { id: "e1".to_string(), a: a0, b: b0 }),
                    ChangeOp::Insert, "system", now,
                )
            }).unwrap();

            let event = engine.with_write_tx(|tx| {
                apply_write(
                    tx, &table, &repo, "e1",
                    Some(Entity { id: "e1".to_string(), a: a1, b: b1 }),
                    ChangeOp::Update, "system", now,
                )
            }).unwrap();

            let mut expected = std::collections::HashSet::new();
            if a0 != a1 { expected.insert("A"); }
            if b0 != b1 { expected.insert("B"); }

            let actual: std::collections::HashSet<&str> =
                event.changed_properties.keys().map(|s| s.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
