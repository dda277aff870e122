//! Hash chain (C5).
//!
//! Each integrity-protected field change appends a record whose hash
//! commits to the new value and the previous record's hash. The plaintext
//! `new_value` is never persisted in the log itself — the chain is
//! verified against the *live* row value, which is how a direct,
//! out-of-band edit to the row is detected (the recomputed hash no longer
//! matches the chain's last link).

use chrono::{DateTime, Utc};
use ledger_core::errors::IntegrityError;
use ledger_core::model::IntegrityLogRecord;
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: u8 = 0x1F;

/// `sha256(tableName \x1F entityId \x1F propertyName \x1F newValue \x1F previousHash)`,
/// lowercase hex.
pub fn compute_hash(
    table_name: &str,
    entity_id: &str,
    property_name: &str,
    new_value: &str,
    previous_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(table_name.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(entity_id.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(property_name.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(new_value.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(previous_hash.as_bytes());
    encode_hex(hasher.finalize())
}

fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.as_ref().len() * 2);
    for byte in bytes.as_ref() {
        write!(out, "{byte:02x}").expect("writing to a String never fails");
    }
    out
}

/// Build the next `IntegrityLogRecord` in the chain. The caller is
/// responsible for looking up `previous_hash` (the `hash` of the most
/// recent record for the same triple, or `""` for the first).
pub fn append(
    table_name: &str,
    entity_id: &str,
    property_name: &str,
    new_value: &str,
    previous_hash: &str,
    timestamp: DateTime<Utc>,
) -> IntegrityLogRecord {
    let hash = compute_hash(table_name, entity_id, property_name, new_value, previous_hash);
    IntegrityLogRecord {
        id: uuid::Uuid::new_v4().to_string(),
        table_name: table_name.to_string(),
        entity_id: entity_id.to_string(),
        property_name: property_name.to_string(),
        hash,
        previous_hash: previous_hash.to_string(),
        timestamp,
    }
}

/// Verify that `records` (any (table, entity, property) chain, in
/// insertion order) forms an unbroken structural chain: each record's
/// `previous_hash` equals its predecessor's `hash`, and the first record's
/// `previous_hash` is empty. Records are scanned in ascending `timestamp`,
/// ties broken by their position in `records`.
pub fn verify_chain(records: &[IntegrityLogRecord]) -> Result<(), IntegrityError> {
    let mut ordered: Vec<&IntegrityLogRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let mut expected_previous = String::new();
    for record in ordered {
        if record.previous_hash != expected_previous {
            return Err(IntegrityError {
                table_name: record.table_name.clone(),
                entity_id: record.entity_id.clone(),
                property_name: record.property_name.clone(),
                expected: expected_previous,
                actual: record.previous_hash.clone(),
            });
        }
        expected_previous = record.hash.clone();
    }
    Ok(())
}

/// Verify that the live value of an integrity-protected field still
/// matches what the chain's last record committed to. A direct,
/// out-of-pipeline edit to the row changes the live value without
/// appending a new record, so the recomputed hash no longer matches.
pub fn verify_live_value(
    records: &[IntegrityLogRecord],
    live_value: &str,
) -> Result<(), IntegrityError> {
    let Some(last) = records.iter().max_by_key(|r| r.timestamp) else {
        return Ok(());
    };
    let recomputed = compute_hash(
        &last.table_name,
        &last.entity_id,
        &last.property_name,
        live_value,
        &last.previous_hash,
    );
    if recomputed != last.hash {
        return Err(IntegrityError {
            table_name: last.table_name.clone(),
            entity_id: last.entity_id.clone(),
            property_name: last.property_name.clone(),
            expected: last.hash.clone(),
            actual: recomputed,
        });
    }
    Ok(())
}
