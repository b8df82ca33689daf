//! Per-minute moving average of event durations
//!
//! For every minute `M` between the first event's minute and one minute past
//! the last event's minute, the average covers the events strictly inside
//! `(M - window, M)`. Events exactly at either bound are excluded. A minute
//! whose window is empty reports `0.0`.
//!
//! Two formulations are provided:
//! - [`moving_averages`]: two-pointer sliding window, O(n + m)
//! - [`moving_averages_brute_force`]: full rescan per minute, O(n * m)
//!
//! Both require events sorted ascending by timestamp and produce identical
//! output for such input.

use crate::error::{Error, Result};
use crate::event::{to_time_points, Event, TimePoint};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use std::ops::Range;

/// Output date layout, e.g. `2018-12-26 18:11:00`
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One aggregated minute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPoint {
    /// Minute-aligned instant this point describes
    #[serde(rename = "date", serialize_with = "serialize_minute")]
    pub minute: NaiveDateTime,
    /// Mean duration of the events in the active window (0.0 if none)
    #[serde(serialize_with = "serialize_average")]
    pub average_delivery_time: f64,
}

impl OutputPoint {
    /// The minute formatted as it appears in the output
    pub fn date(&self) -> String {
        self.minute.format(OUTPUT_DATE_FORMAT).to_string()
    }
}

fn serialize_minute<S: Serializer>(
    minute: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&minute.format(OUTPUT_DATE_FORMAT))
}

/// Whole averages at or beyond this magnitude are written as floats
const MAX_INTEGRAL_AVERAGE: f64 = 1e15;

/// Whole averages are written without a fractional part (`20`, not `20.0`)
fn serialize_average<S: Serializer>(
    average: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if average.fract() == 0.0 && average.abs() < MAX_INTEGRAL_AVERAGE {
        serializer.serialize_i64(*average as i64)
    } else {
        serializer.serialize_f64(*average)
    }
}

/// Which formulation computes the averages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Two-pointer sliding window, O(n + m) (default)
    #[default]
    SlidingWindow,
    /// Rescan every event for every minute, O(n * m)
    BruteForce,
}

impl Strategy {
    /// Compute the moving averages with this formulation
    pub fn compute(self, events: &[Event], window_size: u32) -> Result<Vec<OutputPoint>> {
        match self {
            Strategy::SlidingWindow => moving_averages(events, window_size),
            Strategy::BruteForce => moving_averages_brute_force(events, window_size),
        }
    }
}

/// Compute per-minute moving averages with a sliding window
///
/// `window_size` is in minutes and must be at least 1.
pub fn moving_averages(events: &[Event], window_size: u32) -> Result<Vec<OutputPoint>> {
    let window = window_length(window_size)?;
    let points = to_time_points(events)?;
    let Some((start, end)) = minute_span(&points)? else {
        return Ok(Vec::new());
    };

    let mut active = SlidingWindow::new(&points);
    let outputs: Vec<OutputPoint> = minutes(start, end)
        .map(|minute| {
            active.admit_before(minute);
            if let Some(lower) = minute.checked_sub_signed(window) {
                active.evict_through(lower);
            }
            OutputPoint {
                minute,
                average_delivery_time: active.mean(),
            }
        })
        .collect();

    tracing::debug!(
        "Computed {} minute(s) from {} event(s) with a {} minute window",
        outputs.len(),
        points.len(),
        window_size
    );
    Ok(outputs)
}

/// Compute per-minute moving averages by rescanning all events each minute
///
/// Kept as the executable definition of the window semantics; the sliding
/// window must always agree with it.
pub fn moving_averages_brute_force(events: &[Event], window_size: u32) -> Result<Vec<OutputPoint>> {
    let window = window_length(window_size)?;
    let points = to_time_points(events)?;
    let Some((start, end)) = minute_span(&points)? else {
        return Ok(Vec::new());
    };

    Ok(minutes(start, end)
        .map(|minute| {
            let lower = minute.checked_sub_signed(window);
            let (sum, count) = points
                .iter()
                .filter(|p| p.time < minute && lower.map_or(true, |l| p.time > l))
                .fold((0i128, 0usize), |(sum, count), p| {
                    (sum + i128::from(p.duration), count + 1)
                });
            OutputPoint {
                minute,
                average_delivery_time: mean(sum, count),
            }
        })
        .collect())
}

/// Contiguous run of time points currently inside the window
///
/// The backing slice is never modified; only the index range moves.
struct SlidingWindow<'a> {
    points: &'a [TimePoint],
    range: Range<usize>,
    sum: i128,
}

impl<'a> SlidingWindow<'a> {
    fn new(points: &'a [TimePoint]) -> Self {
        Self {
            points,
            range: 0..0,
            sum: 0,
        }
    }

    /// Extend the head over every point strictly before `bound`
    fn admit_before(&mut self, bound: NaiveDateTime) {
        while let Some(point) = self.points.get(self.range.end) {
            if point.time >= bound {
                break;
            }
            self.sum += i128::from(point.duration);
            self.range.end += 1;
        }
    }

    /// Drop points at or before `bound` from the tail
    fn evict_through(&mut self, bound: NaiveDateTime) {
        while self.range.start < self.range.end {
            let point = &self.points[self.range.start];
            if point.time > bound {
                break;
            }
            self.sum -= i128::from(point.duration);
            self.range.start += 1;
        }
    }

    fn mean(&self) -> f64 {
        mean(self.sum, self.range.len())
    }
}

fn mean(sum: i128, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn window_length(window_size: u32) -> Result<TimeDelta> {
    if window_size == 0 {
        return Err(Error::InvalidWindow(window_size));
    }
    TimeDelta::try_minutes(i64::from(window_size)).ok_or(Error::InvalidWindow(window_size))
}

fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// First and last minute to report, or `None` for no events
fn minute_span(points: &[TimePoint]) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(None);
    };
    let start = truncate_to_minute(first.time);
    let last_minute = truncate_to_minute(last.time);
    let end = last_minute
        .checked_add_signed(TimeDelta::minutes(1))
        .ok_or_else(|| Error::TimeOutOfRange(last_minute.format(OUTPUT_DATE_FORMAT).to_string()))?;
    Ok(Some((start, end)))
}

/// Every minute from `start` to `end` inclusive
fn minutes(start: NaiveDateTime, end: NaiveDateTime) -> impl Iterator<Item = NaiveDateTime> {
    std::iter::successors(Some(start), |m| m.checked_add_signed(TimeDelta::minutes(1)))
        .take_while(move |m| *m <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_events() -> Vec<Event> {
        vec![
            Event::new("2018-12-26 18:11:08.509654", 20),
            Event::new("2018-12-26 18:15:19.903159", 31),
            Event::new("2018-12-26 18:23:19.903159", 54),
        ]
    }

    fn as_pairs(points: &[OutputPoint]) -> Vec<(String, f64)> {
        points
            .iter()
            .map(|p| (p.date(), p.average_delivery_time))
            .collect()
    }

    #[test]
    fn test_scenario_matches_expected_series() {
        let outputs = moving_averages(&scenario_events(), 10).unwrap();

        let expected: Vec<(String, f64)> = [
            ("18:11", 0.0),
            ("18:12", 20.0),
            ("18:13", 20.0),
            ("18:14", 20.0),
            ("18:15", 20.0),
            ("18:16", 25.5),
            ("18:17", 25.5),
            ("18:18", 25.5),
            ("18:19", 25.5),
            ("18:20", 25.5),
            ("18:21", 25.5),
            ("18:22", 31.0),
            ("18:23", 31.0),
            ("18:24", 42.5),
        ]
        .iter()
        .map(|(hm, avg)| (format!("2018-12-26 {}:00", hm), *avg))
        .collect();

        assert_eq!(as_pairs(&outputs), expected);
    }

    #[test]
    fn test_scenario_brute_force_agrees() {
        let events = scenario_events();
        assert_eq!(
            moving_averages(&events, 10).unwrap(),
            moving_averages_brute_force(&events, 10).unwrap()
        );
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(moving_averages(&[], 10).unwrap().is_empty());
        assert!(moving_averages_brute_force(&[], 10).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = moving_averages(&scenario_events(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(0)));
        let err = moving_averages_brute_force(&scenario_events(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(0)));
    }

    #[test]
    fn test_window_bounds_are_exclusive() {
        // Events sit exactly on minute boundaries
        let events = vec![
            Event::new("2020-01-01 10:00:00.000000", 10),
            Event::new("2020-01-01 10:05:00.000000", 20),
        ];
        let outputs = moving_averages(&events, 5).unwrap();
        let values: Vec<f64> = outputs.iter().map(|p| p.average_delivery_time).collect();

        // 10:00 excludes the event at 10:00 (upper bound)
        // 10:05 excludes 10:00 (lower bound) and 10:05 (upper bound)
        assert_eq!(values, vec![0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 20.0]);
        assert_eq!(outputs.first().unwrap().date(), "2020-01-01 10:00:00");
        assert_eq!(outputs.last().unwrap().date(), "2020-01-01 10:06:00");
    }

    #[test]
    fn test_single_event_spans_two_minutes() {
        let events = vec![Event::new("2020-01-01 23:59:30.250000", 8)];
        let outputs = moving_averages(&events, 1).unwrap();
        assert_eq!(
            as_pairs(&outputs),
            vec![
                ("2020-01-01 23:59:00".to_string(), 0.0),
                ("2020-01-02 00:00:00".to_string(), 8.0),
            ]
        );
    }

    #[test]
    fn test_duplicate_timestamps_counted_individually() {
        let events = vec![
            Event::new("2020-01-01 10:00:30.000000", 1),
            Event::new("2020-01-01 10:00:30.000000", 2),
            Event::new("2020-01-01 10:00:30.000000", 6),
        ];
        let outputs = moving_averages(&events, 10).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[1].average_delivery_time, 3.0);
        assert_eq!(outputs, moving_averages_brute_force(&events, 10).unwrap());
    }

    #[test]
    fn test_point_count_covers_span() {
        let events = vec![
            Event::new("2020-01-01 10:00:59.999999", 1),
            Event::new("2020-01-01 12:30:00.000001", 1),
        ];
        // 10:00 through 12:31 inclusive
        let outputs = moving_averages(&events, 3).unwrap();
        assert_eq!(outputs.len(), 152);
        assert!(outputs
            .windows(2)
            .all(|w| w[1].minute - w[0].minute == TimeDelta::minutes(1)));
    }

    #[test]
    fn test_gap_minutes_report_zero() {
        let events = vec![
            Event::new("2020-01-01 10:00:10.000000", 4),
            Event::new("2020-01-01 11:00:10.000000", 6),
        ];
        let outputs = moving_averages(&events, 2).unwrap();
        // 10:03 onward the first event has left the window until 11:01
        let idle = &outputs[3..61];
        assert!(idle.iter().all(|p| p.average_delivery_time == 0.0));
        assert_eq!(outputs[61].average_delivery_time, 6.0);
    }

    #[test]
    fn test_bad_timestamp_aborts() {
        let events = vec![
            Event::new("2018-12-26 18:11:08.509654", 20),
            Event::new("2018-12-26 18:15", 31),
        ];
        let err = moving_averages(&events, 10).unwrap_err();
        assert!(matches!(err, Error::Timestamp { index: 1, .. }));
    }

    #[test]
    fn test_unsorted_input_does_not_panic() {
        let events = vec![
            Event::new("2020-01-01 10:05:00.000000", 1),
            Event::new("2020-01-01 10:00:00.000000", 2),
        ];
        // Last event precedes the first by more than a minute: empty span
        assert!(moving_averages(&events, 10).unwrap().is_empty());
        assert!(moving_averages_brute_force(&events, 10).unwrap().is_empty());
    }

    #[test]
    fn test_strategy_dispatch() {
        let events = scenario_events();
        assert_eq!(Strategy::default(), Strategy::SlidingWindow);
        assert_eq!(
            Strategy::SlidingWindow.compute(&events, 10).unwrap(),
            Strategy::BruteForce.compute(&events, 10).unwrap()
        );
    }

    #[test]
    fn test_output_point_serializes_date() {
        let point = OutputPoint {
            minute: crate::event::parse_timestamp("2018-12-26 18:24:00.000000").unwrap(),
            average_delivery_time: 42.5,
        };
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"date":"2018-12-26 18:24:00","average_delivery_time":42.5}"#
        );
    }

    #[test]
    fn test_whole_averages_serialize_without_fraction() {
        let minute = crate::event::parse_timestamp("2018-12-26 18:11:00.000000").unwrap();
        let encode = |average_delivery_time: f64| {
            serde_json::to_string(&OutputPoint {
                minute,
                average_delivery_time,
            })
            .unwrap()
        };
        assert_eq!(
            encode(0.0),
            r#"{"date":"2018-12-26 18:11:00","average_delivery_time":0}"#
        );
        assert_eq!(
            encode(20.0),
            r#"{"date":"2018-12-26 18:11:00","average_delivery_time":20}"#
        );
        assert_eq!(
            encode(-3.0),
            r#"{"date":"2018-12-26 18:11:00","average_delivery_time":-3}"#
        );
        assert_eq!(
            encode(1.0 / 3.0),
            r#"{"date":"2018-12-26 18:11:00","average_delivery_time":0.3333333333333333}"#
        );
    }

    #[test]
    fn test_sliding_window_range_moves_monotonically() {
        let points = to_time_points(&scenario_events()).unwrap();
        let mut window = SlidingWindow::new(&points);

        window.admit_before(points[2].time);
        assert_eq!(window.range, 0..2);
        assert_eq!(window.mean(), 25.5);

        window.evict_through(points[0].time);
        assert_eq!(window.range, 1..2);
        assert_eq!(window.mean(), 31.0);

        window.evict_through(points[2].time);
        assert_eq!(window.range, 2..2);
        assert_eq!(window.mean(), 0.0);
    }
}
