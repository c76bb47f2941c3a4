//! Validation and normalisation of single raw station records.

use crate::cleaning::date_parsing::parse_day_first;
use crate::cleaning::error::MalformedRecord;
use crate::types::measurement::{CleanMeasurement, MAX_PRECIPITATION, MIN_PRECIPITATION};
use crate::types::raw_measurement::{RawMeasurement, RawValue};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Sentinel the station exports use for "no reading".
pub const MISSING_SENTINEL: &str = "NULO";

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.+\-]").expect("static regex is valid"));

/// Validates and normalises one raw record.
///
/// The date must parse day-first; the value is stripped of anything that is not a
/// digit, sign or decimal point, parsed, rejected if negative, and clamped into
/// `[0, 1000]` mm. Records that fail any step are discarded, returned as `Err`
/// with the reason.
///
/// # Examples
///
/// ```
/// use precip_trend::{clean, MalformedRecord, RawMeasurement};
///
/// let kept = clean(RawMeasurement::new("15/07/2021", "85.3mm")).unwrap();
/// assert_eq!(kept.year, 2021);
/// assert_eq!(kept.value, 85.3);
///
/// let dropped = clean(RawMeasurement::new("15/07/2021", "NULO"));
/// assert_eq!(dropped, Err(MalformedRecord::MissingValue));
/// ```
pub fn clean(raw: RawMeasurement) -> Result<CleanMeasurement, MalformedRecord> {
    let date = parse_day_first(&raw.timestamp)
        .ok_or_else(|| MalformedRecord::UnparsableTimestamp(raw.timestamp.clone()))?;
    let value = parse_value(raw.value)?;
    Ok(CleanMeasurement {
        year: date.year(),
        value: value.clamp(MIN_PRECIPITATION, MAX_PRECIPITATION),
    })
}

fn parse_value(value: Option<RawValue>) -> Result<f64, MalformedRecord> {
    let parsed = match value {
        None => return Err(MalformedRecord::MissingValue),
        Some(RawValue::Number(n)) => n,
        Some(RawValue::Text(text)) => {
            if text.trim() == MISSING_SENTINEL {
                return Err(MalformedRecord::MissingValue);
            }
            let stripped = NON_NUMERIC.replace_all(&text, "");
            if stripped.is_empty() {
                return Err(MalformedRecord::MissingValue);
            }
            stripped
                .parse::<f64>()
                .map_err(|_| MalformedRecord::UnparsableValue(text.clone()))?
        }
    };

    if parsed.is_nan() {
        return Err(MalformedRecord::UnparsableValue(parsed.to_string()));
    }
    if parsed < 0.0 {
        return Err(MalformedRecord::NegativeValue(parsed));
    }
    Ok(parsed)
}

/// Tally of what [`clean`] did with a batch of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub accepted: usize,
    pub unparsable_timestamp: usize,
    pub missing_value: usize,
    pub unparsable_value: usize,
    pub negative_value: usize,
}

impl CleaningStats {
    pub fn discarded(&self) -> usize {
        self.unparsable_timestamp + self.missing_value + self.unparsable_value + self.negative_value
    }

    pub fn total(&self) -> usize {
        self.accepted + self.discarded()
    }

    fn record(&mut self, outcome: &Result<CleanMeasurement, MalformedRecord>) {
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(MalformedRecord::UnparsableTimestamp(_)) => self.unparsable_timestamp += 1,
            Err(MalformedRecord::MissingValue) => self.missing_value += 1,
            Err(MalformedRecord::UnparsableValue(_)) => self.unparsable_value += 1,
            Err(MalformedRecord::NegativeValue(_)) => self.negative_value += 1,
        }
    }
}

/// Cleans a batch, keeping the valid measurements and counting the rest.
pub fn clean_all(
    records: impl IntoIterator<Item = RawMeasurement>,
) -> (Vec<CleanMeasurement>, CleaningStats) {
    let mut stats = CleaningStats::default();
    let measurements = records
        .into_iter()
        .filter_map(|raw| {
            let outcome = clean(raw);
            stats.record(&outcome);
            outcome.ok()
        })
        .collect();
    (measurements, stats)
}
