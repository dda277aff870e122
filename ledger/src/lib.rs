//! # ledger
//!
//! A data-management engine layered over a relational store: every tracked
//! write appends to a change log, a tamper-evident integrity chain and a
//! timeseries history, and every embeddable field is kept searchable in an
//! in-memory vector index. [`Ledger`] owns the process-wide resources
//! (storage, embeddings, vector index); [`LedgerTable`] is the per-table
//! handle applications write through.

pub mod ledger;
pub mod pipeline;
pub mod table;

pub use ledger::Ledger;
pub use table::LedgerTable;

pub use ledger_core::config::LedgerConfig;
pub use ledger_core::errors::{LedgerError, LedgerResult};
pub use ledger_core::model::{
    ChangeOp, EmbeddableSpec, EntityChangeEvent, FieldDescriptor, InterpolationMethod,
    PropertyChange, TableDescriptor,
};
