//! Timeseries recorder (C7).
//!
//! Pure append/query logic over base + delta-chain records. Persistence
//! (locating the latest base, storing the outcome) is the caller's job —
//! this crate decides *what* to write and *how* to answer a range query.

use chrono::{DateTime, Duration, Utc};
use ledger_core::errors::CodecError;
use ledger_core::model::{InterpolationMethod, TimeseriesBase, TimeseriesDelta, TimeseriesSample};

/// What `record_change` decided to do with a new observation.
pub enum AppendOutcome {
    /// The value matches the current base's run; only the delta chain grows.
    AppendDelta(TimeseriesDelta),
    /// The value changed; a new base/delta pair starts a fresh run.
    NewBase(TimeseriesBase, TimeseriesDelta),
}

/// Decide how to record `new_value` observed at `at_time`, given the
/// latest existing base/delta for this (table, entity, property), if any.
pub fn record_change(
    existing: Option<(&TimeseriesBase, &TimeseriesDelta)>,
    table_name: &str,
    entity_id: &str,
    property_name: &str,
    new_value: &str,
    at_time: DateTime<Utc>,
) -> Result<AppendOutcome, CodecError> {
    if let Some((base, delta)) = existing {
        if base.value == new_value {
            let at_ms = (at_time - base.start_time).num_milliseconds();
            let mut gaps = ledger_codec::decode(&delta.compressed_deltas)?;
            let gap = at_ms - delta.last_timestamp;
            gaps.push(gap);
            return Ok(AppendOutcome::AppendDelta(TimeseriesDelta {
                id: delta.id.clone(),
                base_id: delta.base_id.clone(),
                compressed_deltas: ledger_codec::encode(&gaps),
                last_timestamp: at_ms,
                version: delta.version + 1,
            }));
        }
    }
    Ok(new_base(table_name, entity_id, property_name, new_value, at_time))
}

fn new_base(
    table_name: &str,
    entity_id: &str,
    property_name: &str,
    value: &str,
    start_time: DateTime<Utc>,
) -> AppendOutcome {
    let base_id = uuid::Uuid::new_v4().to_string();
    let base = TimeseriesBase {
        id: base_id.clone(),
        table_name: table_name.to_string(),
        entity_id: entity_id.to_string(),
        property_name: property_name.to_string(),
        value: value.to_string(),
        start_time,
    };
    let delta = TimeseriesDelta {
        id: uuid::Uuid::new_v4().to_string(),
        base_id,
        compressed_deltas: ledger_codec::encode(&[0]),
        last_timestamp: 0,
        version: 1,
    };
    AppendOutcome::NewBase(base, delta)
}

/// Decode every (base, delta) pair into flat `(timestamp, value)` samples,
/// sorted ascending by timestamp. The base's value is repeated for every
/// sample in its run.
pub fn flatten_samples(
    pairs: &[(TimeseriesBase, TimeseriesDelta)],
) -> Result<Vec<TimeseriesSample>, CodecError> {
    let mut samples = Vec::new();
    for (base, delta) in pairs {
        let gaps = ledger_codec::decode(&delta.compressed_deltas)?;
        let mut cumulative = 0i64;
        for gap in gaps {
            cumulative += gap;
            samples.push(TimeseriesSample {
                timestamp: base.start_time + Duration::milliseconds(cumulative),
                value: base.value.clone(),
            });
        }
    }
    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Answer a `get_interpolated` range query over already-flattened samples.
pub fn interpolate_range(
    samples: &[TimeseriesSample],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    step: Duration,
    method: InterpolationMethod,
) -> Vec<(DateTime<Utc>, String)> {
    assert!(step > Duration::zero(), "step must be positive");

    let mut ticks = Vec::new();
    let mut t = from;
    while t <= to {
        ticks.push(t);
        t += step;
    }

    ticks
        .into_iter()
        .filter_map(|t| interpolate_at(samples, t, method).map(|v| (t, v)))
        .collect()
}

fn prev_sample(samples: &[TimeseriesSample], t: DateTime<Utc>) -> Option<&TimeseriesSample> {
    samples.iter().filter(|s| s.timestamp <= t).max_by_key(|s| s.timestamp)
}

fn next_sample(samples: &[TimeseriesSample], t: DateTime<Utc>) -> Option<&TimeseriesSample> {
    samples.iter().filter(|s| s.timestamp >= t).min_by_key(|s| s.timestamp)
}

fn interpolate_at(
    samples: &[TimeseriesSample],
    t: DateTime<Utc>,
    method: InterpolationMethod,
) -> Option<String> {
    match method {
        InterpolationMethod::None => {
            samples.iter().find(|s| s.timestamp == t).map(|s| s.value.clone())
        }
        InterpolationMethod::Previous => prev_sample(samples, t)
            .or_else(|| next_sample(samples, t))
            .map(|s| s.value.clone()),
        InterpolationMethod::Next => next_sample(samples, t)
            .or_else(|| prev_sample(samples, t))
            .map(|s| s.value.clone()),
        InterpolationMethod::Nearest => {
            match (prev_sample(samples, t), next_sample(samples, t)) {
                (Some(p), Some(n)) => {
                    let dp = t - p.timestamp;
                    let dn = n.timestamp - t;
                    if dp <= dn {
                        Some(p.value.clone())
                    } else {
                        Some(n.value.clone())
                    }
                }
                (Some(p), None) => Some(p.value.clone()),
                (None, Some(n)) => Some(n.value.clone()),
                (None, None) => None,
            }
        }
        InterpolationMethod::Linear => match (prev_sample(samples, t), next_sample(samples, t)) {
            (Some(p), Some(n)) if p.timestamp == n.timestamp => Some(p.value.clone()),
            (Some(p), Some(n)) => {
                match (
                    ledger_core::stringify::parse_numeric(&p.value),
                    ledger_core::stringify::parse_numeric(&n.value),
                ) {
                    (Some(pv), Some(nv)) => {
                        let span = (n.timestamp - p.timestamp).num_milliseconds() as f64;
                        let elapsed = (t - p.timestamp).num_milliseconds() as f64;
                        let ratio = elapsed / span;
                        let value = pv + ratio * (nv - pv);
                        Some(ledger_core::stringify::float(value))
                    }
                    _ => Some(p.value.clone()),
                }
            }
            (Some(p), None) => Some(p.value.clone()),
            (None, Some(n)) => Some(n.value.clone()),
            (None, None) => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(secs: i64) -> DateTime<Utc> {
        chrono::DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn first_observation_creates_a_base() {
        let outcome = record_change(None, "sensors", "s1", "Temperature", "70", t(0)).unwrap();
        match outcome {
            AppendOutcome::NewBase(base, delta) => {
                assert_eq!(base.value, "70");
                assert_eq!(delta.last_timestamp, 0);
                assert_eq!(ledger_codec::decode(&delta.compressed_deltas).unwrap(), vec![0]);
            }
            _ => panic!("expected a new base"),
        }
    }

    #[test]
    fn repeated_same_value_appends_deltas() {
        let (base, mut delta) = match record_change(None, "sensors", "s1", "Temperature", "70", t(0)).unwrap() {
            AppendOutcome::NewBase(b, d) => (b, d),
            _ => unreachable!(),
        };

        for offset in [1, 2, 4] {
            match record_change(Some((&base, &delta)), "sensors", "s1", "Temperature", "70", t(offset))
                .unwrap()
            {
                AppendOutcome::AppendDelta(d) => delta = d,
                _ => panic!("expected delta append"),
            }
        }

        let decoded = ledger_codec::decode(&delta.compressed_deltas).unwrap();
        assert_eq!(decoded, vec![0, 1000, 1000, 2000]);
        assert_eq!(delta.last_timestamp, 4000);
        assert_eq!(delta.version, 4);
    }

    #[test]
    fn changed_value_starts_a_new_base() {
        let (base, delta) = match record_change(None, "sensors", "s1", "Temperature", "70", t(0)).unwrap() {
            AppendOutcome::NewBase(b, d) => (b, d),
            _ => unreachable!(),
        };
        match record_change(Some((&base, &delta)), "sensors", "s1", "Temperature", "75", t(1)).unwrap() {
            AppendOutcome::NewBase(new_base, _) => assert_eq!(new_base.value, "75"),
            _ => panic!("expected a new base on value change"),
        }
    }

    fn sample(secs: i64, value: &str) -> TimeseriesSample {
        TimeseriesSample { timestamp: t(secs), value: value.to_string() }
    }

    #[test]
    fn linear_interpolation_midpoint() {
        let samples = vec![sample(0, "70"), sample(10, "80")];
        let result = interpolate_range(
            &samples,
            t(0),
            t(10),
            Duration::seconds(5),
            InterpolationMethod::Linear,
        );
        assert_eq!(
            result,
            vec![(t(0), "70".to_string()), (t(5), "75".to_string()), (t(10), "80".to_string())]
        );
    }

    #[test]
    fn none_method_omits_non_matching_ticks() {
        let samples = vec![sample(0, "70"), sample(10, "80")];
        let result = interpolate_range(
            &samples,
            t(0),
            t(10),
            Duration::seconds(5),
            InterpolationMethod::None,
        );
        assert_eq!(result, vec![(t(0), "70".to_string()), (t(10), "80".to_string())]);
    }

    #[test]
    fn previous_falls_back_to_next_before_first_sample() {
        let samples = vec![sample(10, "80")];
        let result = interpolate_range(
            &samples,
            t(0),
            t(10),
            Duration::seconds(10),
            InterpolationMethod::Previous,
        );
        assert_eq!(result, vec![(t(0), "80".to_string()), (t(10), "80".to_string())]);
    }

    #[test]
    fn nearest_ties_favour_previous() {
        let samples = vec![sample(0, "70"), sample(10, "80")];
        let result = interpolate_at(&samples, t(5), InterpolationMethod::Nearest);
        assert_eq!(result, Some("70".to_string()));
    }

    #[test]
    fn linear_falls_back_to_previous_for_non_numeric_values() {
        let samples = vec![sample(0, "on"), sample(10, "off")];
        let result = interpolate_at(&samples, t(5), InterpolationMethod::Linear);
        assert_eq!(result, Some("on".to_string()));
    }

    #[test]
    fn flatten_samples_decodes_and_sorts() {
        let (base, delta) = match record_change(None, "sensors", "s1", "Temperature", "70", t(0)).unwrap() {
            AppendOutcome::NewBase(b, d) => (b, d),
            _ => unreachable!(),
        };
        let samples = flatten_samples(&[(base, delta)]).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, "70");
    }

    proptest! {
        #[test]
        fn repeated_same_value_writes_produce_one_delta_per_write(
            gaps in proptest::collection::vec(1i64..=5_000, 0..30)
        ) {
            let t0 = t(0);
            let (base, mut delta) = match record_change(None, "sensors", "s1", "Temperature", "70", t0).unwrap() {
                AppendOutcome::NewBase(b, d) => (b, d),
                AppendOutcome::AppendDelta(_) => unreachable!("first write always creates a base"),
            };

            let mut cumulative = 0i64;
            for &gap in &gaps {
                cumulative += gap;
                let at = t0 + Duration::milliseconds(cumulative);
                delta = match record_change(Some((&base, &delta)), "sensors", "s1", "Temperature", "70", at).unwrap() {
                    AppendOutcome::AppendDelta(d) => d,
                    AppendOutcome::NewBase(_, _) => unreachable!("an unchanged value must append, not rebase"),
                };
            }

            let decoded = ledger_codec::decode(&delta.compressed_deltas).unwrap();
            prop_assert_eq!(decoded.len(), gaps.len() + 1);
            prop_assert_eq!(decoded.iter().sum::<i64>(), cumulative);
            prop_assert_eq!(delta.last_timestamp, cumulative);
            prop_assert_eq!(base.value, "70");
        }
    }
}
