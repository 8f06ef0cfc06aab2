use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A single normalized event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    /// Case the event belongs to
    pub case: String,
    /// Activity name
    pub activity: String,
    /// Point in time the event happened
    pub timestamp: DateTime<FixedOffset>,
    /// Resource that executed the event, if mapped and present
    pub resource: Option<String>,
}

impl Event {
    /// Create an event without resource.
    pub fn new<S: Into<String>>(case: S, activity: S, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            case: case.into(),
            activity: activity.into(),
            timestamp,
            resource: None,
        }
    }
}

///
/// Canonical event log: a non-empty sequence of [`Event`]s sorted by case,
/// then timestamp. Events with equal case and timestamp keep their original
/// relative order.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct EventLog {
    events: Vec<Event>,
}

/// All events of one case, in timestamp order
#[derive(Debug, Clone, Copy)]
pub struct Case<'a> {
    /// Case identifier
    pub id: &'a str,
    /// Events of the case (never empty)
    pub events: &'a [Event],
}

impl EventLog {
    /// Build an event log, sorting the events into canonical order.
    ///
    /// Fails with [`AnalysisError::EmptyLogAfterNormalization`] if `events` is empty.
    pub fn from_events(mut events: Vec<Event>) -> Result<Self> {
        if events.is_empty() {
            return Err(AnalysisError::EmptyLogAfterNormalization);
        }
        events.sort_by(|a, b| {
            a.case
                .cmp(&b.case)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        Ok(Self { events })
    }

    /// Events in canonical order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always `false`: empty logs cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over cases in canonical (case id) order.
    pub fn cases(&self) -> impl Iterator<Item = Case<'_>> + '_ {
        self.events
            .chunk_by(|a, b| a.case == b.case)
            .map(|events| Case {
                id: &events[0].case,
                events,
            })
    }

    /// Number of distinct cases.
    pub fn num_cases(&self) -> usize {
        self.cases().count()
    }

    /// Number of distinct activity names across the whole log.
    pub fn num_activities(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.activity.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl<'a> Case<'a> {
    /// The case's trace: activity names in order.
    pub fn trace(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.events.iter().map(|e| e.activity.as_str())
    }

    /// Seconds between the earliest and the latest event (0 for single-event cases).
    pub fn duration_seconds(&self) -> f64 {
        let (Some(first), Some(last)) = (self.events.first(), self.events.last()) else {
            return 0.0;
        };
        let delta = last.timestamp - first.timestamp;
        match delta.num_microseconds() {
            Some(micros) => micros as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1_000.0,
        }
    }
}
