//! Culture-invariant canonical stringification, used wherever a field value
//! is recorded for the change log, integrity hash, or timeseries value.
//! Integers render as plain decimal, floats as their shortest round-trip
//! form, booleans as `true`/`false`, timestamps as ISO-8601 UTC.

use chrono::{DateTime, Utc};

pub fn int(v: i64) -> String {
    v.to_string()
}

pub fn float(v: f64) -> String {
    // `{}` on f64 already produces the shortest round-trip representation
    // in Rust's formatter.
    format!("{v}")
}

pub fn boolean(v: bool) -> String {
    if v {
        "true".to_string()
    } else {
        "false".to_string()
    }
}

pub fn timestamp(v: DateTime<Utc>) -> String {
    v.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Attempt to parse a canonical stringified value back to `f64`, used by
/// the timeseries recorder's Linear interpolation.
pub fn parse_numeric(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}
