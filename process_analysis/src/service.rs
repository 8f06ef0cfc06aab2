//! Upload and analysis facade over a [`DatasetStore`]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analyze::{analyze, AnalysisOptions, AnalysisRequest, AnalysisResult};
use crate::core::dataset::{Dataset, PreviewRecord};
use crate::core::io::{DatasetFormat, Importable};
use crate::error::ServiceError;
use crate::store::{DatasetId, DatasetStore, StoredDataset};

/// Response to an upload: where to find the dataset and what it looks like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadSummary {
    /// Identifier to pass to [`AnalysisService::analyze`]
    pub dataset_id: DatasetId,
    /// Column names of the dataset
    pub columns: Vec<String>,
    /// The first rows of the dataset
    pub preview: Vec<PreviewRecord>,
}

/// Ingests uploaded files and analyzes them on request
#[derive(Debug)]
pub struct AnalysisService<S: DatasetStore> {
    store: S,
    options: AnalysisOptions,
}

impl<S: DatasetStore> AnalysisService<S> {
    /// Create a service on top of `store`.
    pub fn new(store: S, options: AnalysisOptions) -> Self {
        Self { store, options }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The options applied to every analysis.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Validate and store an uploaded file.
    ///
    /// The format is inferred from `file_name`. The file is parsed once up front
    /// and is not stored if that fails.
    pub fn ingest(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadSummary, ServiceError> {
        let format = DatasetFormat::infer_from_path(file_name)?;
        let dataset = Dataset::import_from_bytes(&bytes, format)?;
        let dataset_id = self.store.put(StoredDataset::new(format, bytes))?;
        tracing::info!(
            %dataset_id,
            file_name,
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "Stored upload"
        );
        Ok(UploadSummary {
            dataset_id,
            columns: dataset.columns().to_vec(),
            preview: dataset.preview(self.options.preview_rows),
        })
    }

    /// Load a stored dataset.
    pub fn load(&self, dataset_id: &DatasetId) -> Result<Dataset, ServiceError> {
        let stored = self
            .store
            .get(dataset_id)?
            .ok_or(ServiceError::DatasetNotFound(*dataset_id))?;
        Ok(Dataset::import_from_bytes(&stored.bytes, stored.format)?)
    }

    /// Analyze a previously ingested dataset.
    pub fn analyze(
        &self,
        dataset_id: &DatasetId,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ServiceError> {
        let dataset = self.load(dataset_id)?;
        Ok(analyze(
            &dataset,
            &request.mapping,
            request.analyses.as_slice(),
            &self.options,
        )?)
    }

    /// Drop a stored dataset, returning whether it existed.
    pub fn forget(&self, dataset_id: &DatasetId) -> bool {
        self.store.remove(dataset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_data::ColumnMapping;
    use crate::error::AnalysisError;
    use crate::store::InMemoryDatasetStore;

    const UPLOAD: &str = "id,step,at,who
A1,register,2024-02-01 09:00,ann
A1,approve,2024-02-01 09:30,bob
A2,register,2024-02-01 10:00,ann
";

    fn service() -> AnalysisService<InMemoryDatasetStore> {
        AnalysisService::new(InMemoryDatasetStore::default(), AnalysisOptions::default())
    }

    #[test]
    fn test_ingest_then_analyze() {
        let service = service();
        let upload = service
            .ingest("log.csv", UPLOAD.as_bytes().to_vec())
            .unwrap();
        assert_eq!(upload.columns, vec!["id", "step", "at", "who"]);
        assert_eq!(upload.preview.len(), 3);
        assert_eq!(upload.preview[2]["step"], "register");

        let request =
            AnalysisRequest::new(ColumnMapping::new("id", "step", "at").with_resource("who"));
        let result = service.analyze(&upload.dataset_id, &request).unwrap();
        assert_eq!(result.events, 3);
        assert_eq!(result.statistics.unwrap().cases, 2);
        assert_eq!(result.variants.unwrap().len(), 2);
    }

    #[test]
    fn test_rejected_uploads_are_not_stored() {
        let service = service();
        let err = service
            .ingest("log.txt", UPLOAD.as_bytes().to_vec())
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Analysis(AnalysisError::UnsupportedFormat(_))
        ));

        let err = service
            .ingest("log.xlsx", UPLOAD.as_bytes().to_vec())
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Analysis(AnalysisError::UnparseableDataset(_))
        ));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_ingest_workbook_then_analyze() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            for (col, name) in ["id", "step", "at"].into_iter().enumerate() {
                sheet.write_string(0, col as u16, name).unwrap();
            }
            let rows = [
                (1, "register", "2024-02-01 09:00"),
                (1, "approve", "2024-02-01 09:30"),
                (2, "register", "2024-02-01 10:00"),
            ];
            for (row, (case, step, at)) in rows.into_iter().enumerate() {
                let row = row as u32 + 1;
                sheet.write_number(row, 0, case).unwrap();
                sheet.write_string(row, 1, step).unwrap();
                sheet.write_string(row, 2, at).unwrap();
            }
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let service = service();
        let upload = service.ingest("log.xlsx", bytes).unwrap();
        assert_eq!(upload.columns, vec!["id", "step", "at"]);
        assert_eq!(upload.preview[0]["id"], "1");

        let request = AnalysisRequest::new(ColumnMapping::new("id", "step", "at"));
        let result = service.analyze(&upload.dataset_id, &request).unwrap();
        assert_eq!(result.events, 3);
        assert_eq!(result.statistics.unwrap().duration_seconds.median, 900.0);
        let variants = result.variants.unwrap();
        assert_eq!(variants[0].variant, "register > approve");
        assert_eq!(variants[1].variant, "register");
    }

    #[test]
    fn test_unknown_dataset() {
        let service = service();
        let id = DatasetId::new_random();
        let request = AnalysisRequest::new(ColumnMapping::new("id", "step", "at"));
        assert!(matches!(
            service.analyze(&id, &request),
            Err(ServiceError::DatasetNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn test_forget() {
        let service = service();
        let upload = service
            .ingest("log.csv", UPLOAD.as_bytes().to_vec())
            .unwrap();
        assert!(service.forget(&upload.dataset_id));
        assert!(matches!(
            service.load(&upload.dataset_id),
            Err(ServiceError::DatasetNotFound(_))
        ));
    }
}
