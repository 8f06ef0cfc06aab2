#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]
#![doc = include_str!("../README.md")]

pub mod core;

/// Process discovery (directly-follows graphs)
pub mod discovery;

/// Case statistics and variants
pub mod analysis;

/// Running requested analyses over a dataset
pub mod analyze;

/// Error types
pub mod error;

/// Concurrency-safe storage of uploaded datasets
pub mod store;

/// Upload/analyze facade
pub mod service;

#[doc(inline)]
pub use crate::core::{Dataset, DirectlyFollowsGraph, EventLog};

#[doc(inline)]
pub use crate::core::event_data::{ColumnMapping, Event};

#[doc(inline)]
pub use crate::core::io::{DatasetFormat, Importable};

#[doc(inline)]
pub use analyze::{
    analyze, analyze_event_log, AnalysisKind, AnalysisOptions, AnalysisRequest, AnalysisResult,
};

#[doc(inline)]
pub use discovery::dfg::discover_dfg;

#[doc(inline)]
pub use error::{AnalysisError, ServiceError, StoreError};

#[doc(inline)]
pub use service::{AnalysisService, UploadSummary};

#[doc(inline)]
pub use store::{DatasetId, DatasetStore, InMemoryDatasetStore, StorePolicy, TempFileDatasetStore};

///
/// Serialize an [`AnalysisResult`] as a JSON [`String`]
///
pub fn result_to_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

///
/// Deserialize an [`AnalysisRequest`] from a JSON [`String`]
///
/// Omitted `analyses` default to all supported analyses.
///
pub fn json_to_request(request_json: &str) -> serde_json::Result<AnalysisRequest> {
    serde_json::from_str(request_json)
}
