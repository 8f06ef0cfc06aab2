use std::fmt::Display;
use std::io::Read;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::workbook::{read_xls, read_xlsx};
use crate::error::AnalysisError;

/// Container formats a dataset may be uploaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Office Open XML workbook (first worksheet)
    Xlsx,
    /// Legacy Excel workbook (first worksheet)
    Xls,
}

impl DatasetFormat {
    /// Resolve a format from a file extension (without the leading dot, case-insensitive).
    pub fn from_extension(extension: &str) -> Result<Self, AnalysisError> {
        match extension.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            other => Err(AnalysisError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Infer the format from a file name or path.
    pub fn infer_from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

impl Display for DatasetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extension = match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        };
        f.write_str(extension)
    }
}

/// Trait for importing types from a file path, reader or byte slice
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Import from a reader, specifying the format.
    fn import_from_reader<R: Read>(reader: R, format: DatasetFormat) -> Result<Self, Self::Error>;

    /// Import from a file path, inferring the format from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>;

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: DatasetFormat) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }
}

impl Importable for Dataset {
    type Error = AnalysisError;

    fn import_from_reader<R: Read>(reader: R, format: DatasetFormat) -> Result<Self, Self::Error> {
        match format {
            DatasetFormat::Csv => Dataset::from_csv_reader(reader),
            DatasetFormat::Xlsx => read_xlsx(reader),
            DatasetFormat::Xls => read_xls(reader),
        }
    }

    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = DatasetFormat::infer_from_path(path)?;
        let file = std::fs::File::open(path)?;
        Self::import_from_reader(std::io::BufReader::new(file), format)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_format_inference() {
        assert_eq!(
            DatasetFormat::infer_from_path("upload.CSV").unwrap(),
            DatasetFormat::Csv
        );
        assert_eq!(
            DatasetFormat::infer_from_path("book.XLSX").unwrap(),
            DatasetFormat::Xlsx
        );
        assert_eq!(
            DatasetFormat::infer_from_path("legacy.xls").unwrap(),
            DatasetFormat::Xls
        );
        assert_eq!(
            DatasetFormat::infer_from_path("notes.txt").unwrap_err(),
            AnalysisError::UnsupportedFormat("txt".into())
        );
        assert_eq!(
            DatasetFormat::infer_from_path("no_extension").unwrap_err(),
            AnalysisError::UnsupportedFormat(String::new())
        );
    }

    #[test]
    fn test_import_from_path() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "case,activity,time").unwrap();
        writeln!(file, "1,A,2024-01-01T10:00:00").unwrap();
        file.flush().unwrap();

        let dataset = Dataset::import_from_path(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.columns().len(), 3);
    }
}
