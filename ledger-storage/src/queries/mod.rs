//! Hand-written queries against the bookkeeping schema. No query builder:
//! every statement here is fixed at compile time, parameterised only by
//! bind values.

pub mod change_log;
pub mod embedding;
pub mod integrity_log;
pub mod timeseries;
