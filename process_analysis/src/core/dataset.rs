//! Tabular datasets (ordered rows, named columns)

use std::collections::BTreeMap;
use std::io::Read;

use crate::error::{AnalysisError, Result};

/// Cell values read as absent, mirroring the default missing-value markers of
/// common dataframe libraries.
pub const MISSING_VALUE_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Number of rows returned by [`Dataset::preview`] unless configured otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// A single preview row, mapping column names to (possibly empty) cell text.
pub type PreviewRecord = BTreeMap<String, String>;

/// An in-memory table: named columns and ordered rows of optional cells.
///
/// Every row has exactly one cell per column; absent cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Create a dataset, padding short rows with absent cells and cutting off
    /// cells beyond the last column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience constructor from string slices; empty strings and
    /// [`MISSING_VALUE_MARKERS`] become absent cells.
    pub fn from_records<S: AsRef<str>>(columns: &[S], records: &[Vec<S>]) -> Self {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            records
                .iter()
                .map(|r| r.iter().map(|v| cell_value(v.as_ref())).collect())
                .collect(),
        )
    }

    /// Read a CSV table whose first record is the header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(AnalysisError::UnparseableDataset(
                "the header row is missing".to_string(),
            ));
        }
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|record| -> Result<Vec<Option<String>>> {
                let record = record?;
                Ok((0..columns.len())
                    .map(|i| record.get(i).and_then(cell_value))
                    .collect())
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(columns = columns.len(), rows = rows.len(), "Read CSV dataset");
        Ok(Self { columns, rows })
    }

    /// Column names in dataset order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in dataset order.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with the given name, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The first `n` rows as column-to-text records; absent cells render as `""`.
    pub fn preview(&self, n: usize) -> Vec<PreviewRecord> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.clone().unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

pub(crate) fn cell_value(raw: &str) -> Option<String> {
    if MISSING_VALUE_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(e: csv::Error) -> Self {
        Self::UnparseableDataset(e.to_string())
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(e: std::io::Error) -> Self {
        Self::UnparseableDataset(e.to_string())
    }
}
