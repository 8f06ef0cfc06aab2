//! Column mapping from dataset columns to event attributes

use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::dataset::Dataset;
use crate::error::{AnalysisError, Result};

/// Names of the dataset columns that hold the case id, activity, timestamp
/// and (optionally) resource of each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMapping {
    /// Column mapped to the case identifier
    pub case_id: String,
    /// Column mapped to the activity
    pub activity: String,
    /// Column mapped to the timestamp
    pub timestamp: String,
    /// Optional resource column
    #[serde(default)]
    pub resource: Option<String>,
}

/// Positions of the mapped columns within a concrete dataset.
///
/// Only obtainable through [`ColumnMapping::validate`], so holders can index
/// rows without re-checking that the columns exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedColumns {
    pub(crate) case_id: usize,
    pub(crate) activity: usize,
    pub(crate) timestamp: usize,
    pub(crate) resource: Option<usize>,
}

impl ColumnMapping {
    /// Create a mapping without resource column.
    pub fn new<S: Into<String>>(case_id: S, activity: S, timestamp: S) -> Self {
        Self {
            case_id: case_id.into(),
            activity: activity.into(),
            timestamp: timestamp.into(),
            resource: None,
        }
    }

    /// Set the resource column.
    pub fn with_resource<S: Into<String>>(mut self, resource: S) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// The resource column, if one is mapped. An empty name counts as none.
    pub fn resource_column(&self) -> Option<&str> {
        self.resource.as_deref().filter(|r| !r.is_empty())
    }

    /// Check that all required fields are named.
    pub fn check_shape(&self) -> Result<()> {
        for (field, value) in [
            ("case_id", &self.case_id),
            ("activity", &self.activity),
            ("timestamp", &self.timestamp),
        ] {
            if value.trim().is_empty() {
                return Err(AnalysisError::InvalidMapping(format!(
                    "the '{field}' column must be specified"
                )));
            }
        }
        Ok(())
    }

    /// Columns needed for the analysis: case id, activity, timestamp and the
    /// resource (if mapped), with duplicates removed in first-seen order.
    pub fn required_columns(&self) -> Vec<&str> {
        [
            Some(self.case_id.as_str()),
            Some(self.activity.as_str()),
            Some(self.timestamp.as_str()),
            self.resource_column(),
        ]
        .into_iter()
        .flatten()
        .unique()
        .collect()
    }

    /// Validate the mapping against the dataset's column names.
    ///
    /// Fails with [`AnalysisError::InvalidMapping`] for an incomplete mapping and
    /// with [`AnalysisError::MissingColumns`] (in required-column order) when
    /// the dataset lacks mapped columns.
    pub fn validate<S: AsRef<str>>(&self, dataset_columns: &[S]) -> Result<MappedColumns> {
        self.check_shape()?;
        let index_of = |name: &str| dataset_columns.iter().position(|c| c.as_ref() == name);
        let missing: Vec<String> = self
            .required_columns()
            .into_iter()
            .filter(|&c| index_of(c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingColumns(missing));
        }
        let resolve = |name: &str| {
            index_of(name).ok_or_else(|| AnalysisError::MissingColumns(vec![name.to_string()]))
        };
        Ok(MappedColumns {
            case_id: resolve(self.case_id.as_str())?,
            activity: resolve(self.activity.as_str())?,
            timestamp: resolve(self.timestamp.as_str())?,
            resource: self.resource_column().map(resolve).transpose()?,
        })
    }

    /// Validate the mapping against a dataset.
    pub fn validate_for(&self, dataset: &Dataset) -> Result<MappedColumns> {
        self.validate(dataset.columns())
    }
}
