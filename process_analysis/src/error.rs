//! Error types for event log analysis.
//!
//! Every variant is a user-input condition: it is reported with the offending
//! columns or names and is never retried.

use thiserror::Error;

use crate::store::DatasetId;

/// Result alias used throughout the analysis pipeline.
pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// Errors that can occur while validating, normalizing or analyzing an event log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The column mapping itself is malformed (e.g., an empty required field).
    #[error("invalid column mapping: {0}")]
    InvalidMapping(String),

    /// The mapping references columns that are not part of the dataset.
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The dataset could not be read as tabular data.
    #[error("could not read dataset: {0}")]
    UnparseableDataset(String),

    /// The dataset is in a container format this crate does not decode.
    #[error("unsupported dataset format: '{0}'")]
    UnsupportedFormat(String),

    /// No row had a case id, an activity and a parseable timestamp.
    #[error("no valid events remain after normalizing the case id, activity and timestamp columns")]
    EmptyLogAfterNormalization,

    /// Unknown analysis names were requested.
    #[error("unsupported analyses: {}", .0.join(", "))]
    UnsupportedAnalysis(Vec<String>),

    /// The request did not select any analysis.
    #[error("at least one analysis must be selected")]
    EmptyAnalysisRequest,
}

/// Errors raised by a [`crate::store::DatasetStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An entry with this identifier was already inserted.
    #[error("dataset {0} already exists")]
    DuplicateId(DatasetId),

    /// The given string is not a valid dataset identifier.
    #[error("invalid dataset id '{0}'")]
    InvalidDatasetId(String),

    /// Reading or writing the backing storage failed.
    #[error("dataset storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`crate::service::AnalysisService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation, parsing or analysis failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The dataset store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No dataset is registered under this identifier (or it expired).
    #[error("dataset {0} not found")]
    DatasetNotFound(DatasetId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_columns() {
        let err = AnalysisError::MissingColumns(vec!["id".into(), "ts".into()]);
        assert_eq!(err.to_string(), "missing columns: id, ts");

        let err = AnalysisError::UnsupportedAnalysis(vec!["bogus".into()]);
        assert_eq!(err.to_string(), "unsupported analyses: bogus");
    }
}
