//! Translation events as read from the input log
//!
//! Only `timestamp` and `duration` take part in aggregation. The remaining
//! fields are carried so that real event logs decode without complaint.

use crate::error::{Error, Result, TimestampError};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Input timestamp layout, e.g. `2018-12-26 18:11:08.509654`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%6f";

/// Byte shape every timestamp must have; `d` is any ASCII digit
const TIMESTAMP_SHAPE: &[u8] = b"dddd-dd-dd dd:dd:dd.dddddd";

/// A single translation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the translation was delivered (see [`TIMESTAMP_FORMAT`])
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translation_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_name: String,
    /// Delivery time of the translation
    pub duration: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nr_words: i64,
}

impl Event {
    /// Create an event carrying only the fields used by aggregation
    pub fn new(timestamp: impl Into<String>, duration: i64) -> Self {
        Self {
            timestamp: timestamp.into(),
            translation_id: String::new(),
            source_language: String::new(),
            target_language: String::new(),
            client_name: String::new(),
            event_name: String::new(),
            duration,
            nr_words: 0,
        }
    }
}

/// Parsed instant and duration of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimePoint {
    pub time: NaiveDateTime,
    pub duration: i64,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse an event timestamp under [`TIMESTAMP_FORMAT`]
///
/// The layout is strict: four-digit year, two-digit fields, a dot and exactly
/// six fractional digits. Leap seconds are rejected.
pub fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, TimestampError> {
    let shape_ok = value.len() == TIMESTAMP_SHAPE.len()
        && value
            .bytes()
            .zip(TIMESTAMP_SHAPE)
            .all(|(b, &s)| if s == b'd' { b.is_ascii_digit() } else { b == s });
    if !shape_ok {
        return Err(TimestampError::Layout);
    }

    let time = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)?;
    if time.nanosecond() >= 1_000_000_000 {
        return Err(TimestampError::LeapSecond);
    }
    Ok(time)
}

/// Convert events into time points, failing on the first bad timestamp
pub(crate) fn to_time_points(events: &[Event]) -> Result<Vec<TimePoint>> {
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let time = parse_timestamp(&event.timestamp).map_err(|source| Error::Timestamp {
                value: event.timestamp.clone(),
                index,
                source,
            })?;
            Ok(TimePoint {
                time,
                duration: event.duration,
            })
        })
        .collect()
}
