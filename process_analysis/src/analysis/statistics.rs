//! Case Statistics
//!
//! Case and activity counts plus the distribution of case durations.
//!
//! Percentiles use linear interpolation between the closest ranks: for `n`
//! sorted values and a fraction `p`, the rank is `p * (n - 1)` and the result
//! interpolates between the values at `floor(rank)` and `ceil(rank)`.

use ordered_float::OrderedFloat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::event_data::EventLog;

/// Summary of the case duration distribution, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DurationSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// 95th percentile
    pub p95: f64,
}

/// The statistics fragment of an analysis result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseStatistics {
    /// Number of distinct cases
    pub cases: usize,
    /// Number of distinct activities in the whole log
    pub activities: usize,
    /// Case durations (latest minus earliest event), in seconds
    pub duration_seconds: DurationSummary,
}

/// Linearly interpolated percentile of already sorted `values` (`fraction` in `[0, 1]`).
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let Some(&first) = sorted.first() else {
        return 0.0;
    };
    let rank = fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted.get(lower).copied().unwrap_or(first);
    }
    let (low, high) = (sorted[lower], sorted[upper]);
    low + (high - low) * (rank - lower as f64)
}

/// Summarize a set of durations (in any order).
pub fn summarize_durations(mut durations: Vec<f64>) -> DurationSummary {
    if durations.is_empty() {
        return DurationSummary::default();
    }
    durations.sort_unstable_by_key(|d| OrderedFloat(*d));
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    DurationSummary {
        mean,
        median: percentile(&durations, 0.5),
        p95: percentile(&durations, 0.95),
    }
}

/// Per-case durations in seconds, in canonical case order.
pub fn case_durations(event_log: &EventLog) -> Vec<f64> {
    event_log.cases().map(|c| c.duration_seconds()).collect()
}

/// Compute [`CaseStatistics`] for an event log.
pub fn compute_case_statistics(event_log: &EventLog) -> CaseStatistics {
    let durations = case_durations(event_log);
    CaseStatistics {
        cases: durations.len(),
        activities: event_log.num_activities(),
        duration_seconds: summarize_durations(durations),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    use super::*;
    use crate::core::event_data::Event;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap().into()
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.5), 2.5);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 4.0);
        assert!((percentile(&values, 0.95) - 3.85).abs() < 1e-9);
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn test_two_cases() {
        let log = EventLog::from_events(vec![
            Event::new("1", "A", at(10, 0)),
            Event::new("1", "B", at(10, 5)),
            Event::new("2", "A", at(11, 0)),
            Event::new("2", "B", at(11, 2)),
            Event::new("2", "C", at(11, 10)),
        ])
        .unwrap();
        let stats = compute_case_statistics(&log);
        assert_eq!(stats.cases, 2);
        assert_eq!(stats.activities, 3);
        assert_eq!(stats.duration_seconds.mean, 450.0);
        assert_eq!(stats.duration_seconds.median, 450.0);
        assert!((stats.duration_seconds.p95 - 585.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_event_case() {
        let log = EventLog::from_events(vec![Event::new("only", "A", at(9, 0))]).unwrap();
        let stats = compute_case_statistics(&log);
        assert_eq!(stats.cases, 1);
        assert_eq!(stats.duration_seconds, DurationSummary::default());
    }

    #[test]
    fn test_single_case_reports_its_duration_everywhere() {
        let summary = summarize_durations(vec![120.0]);
        assert_eq!(
            summary,
            DurationSummary {
                mean: 120.0,
                median: 120.0,
                p95: 120.0
            }
        );
    }
}
