//! Defines the raw, unvalidated record shape handed over by a [`crate::StationStore`].
//!
//! Records arrive exactly as the station exports were imported: the date is free
//! text and the precipitation column may hold numbers, text with units attached,
//! the `NULO` sentinel, or nothing at all. Nothing here is validated; that is the
//! job of [`crate::clean`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A precipitation value as stored, before any parsing.
///
/// Store documents created from the CSV exports carry either a number or a piece
/// of text, so both are accepted when deserializing.
///
/// # Examples
///
/// ```
/// use precip_trend::RawValue;
///
/// let from_text = RawValue::from("85.3mm");
/// let from_number = RawValue::from(12.5);
/// assert_eq!(from_text, RawValue::Text("85.3mm".to_string()));
/// assert_eq!(from_number, RawValue::Number(12.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A numeric value stored as-is.
    Number(f64),
    /// A textual value, possibly containing units, stray characters or a sentinel.
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// A single station record as fetched from storage.
///
/// Field names follow the station exports (`FECHA`, `PRECIP`) so documents can be
/// deserialized directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// The record date as text, expected day-first (e.g. `"15/07/2021"`).
    #[serde(rename = "FECHA", default)]
    pub timestamp: String,
    /// The precipitation value, if the field was present at all.
    #[serde(rename = "PRECIP", default)]
    pub value: Option<RawValue>,
}

impl RawMeasurement {
    /// Creates a record with a present precipitation value.
    pub fn new(timestamp: impl Into<String>, value: impl Into<RawValue>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a record whose precipitation field is absent.
    pub fn without_value(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: None,
        }
    }
}
