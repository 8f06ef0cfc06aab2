//! Turning raw dataset rows into a canonical [`EventLog`]

use super::event_log_struct::{Event, EventLog};
use super::mapping::ColumnMapping;
use super::timestamp_utils::parse_timestamp;
use crate::core::dataset::Dataset;
use crate::error::Result;

/// Normalize the rows of `dataset` into an [`EventLog`].
///
/// The mapping is validated against `dataset` first, so a mapping naming
/// absent columns fails with [`crate::error::AnalysisError::MissingColumns`]
/// before any row is read. Rows lacking a case id or activity, or whose
/// timestamp cannot be parsed, are dropped. If no row survives, this fails with
/// [`crate::error::AnalysisError::EmptyLogAfterNormalization`].
pub fn normalize_event_log(
    dataset: &Dataset,
    mapping: &ColumnMapping,
    date_format: Option<&str>,
) -> Result<EventLog> {
    let columns = mapping.validate_for(dataset)?;
    let mut missing_keys = 0usize;
    let mut invalid_timestamps = 0usize;
    let mut events = Vec::with_capacity(dataset.len());

    for row in dataset.rows() {
        let (Some(case), Some(activity)) = (cell(row, columns.case_id), cell(row, columns.activity))
        else {
            missing_keys += 1;
            continue;
        };
        let Some(timestamp) =
            cell(row, columns.timestamp).and_then(|t| parse_timestamp(t, date_format))
        else {
            invalid_timestamps += 1;
            continue;
        };
        events.push(Event {
            case: case.clone(),
            activity: activity.clone(),
            timestamp,
            resource: columns.resource.and_then(|i| cell(row, i)).cloned(),
        });
    }

    if invalid_timestamps > 0 {
        tracing::warn!(
            rows = invalid_timestamps,
            "Dropped rows with missing or unparseable timestamps"
        );
    }
    tracing::debug!(
        kept = events.len(),
        missing_keys,
        invalid_timestamps,
        "Normalized event rows"
    );

    EventLog::from_events(events)
}

fn cell(row: &[Option<String>], index: usize) -> Option<&String> {
    row.get(index).and_then(Option::as_ref)
}
