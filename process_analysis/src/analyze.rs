//! Analysis orchestration
//!
//! Validates the mapping and normalizes the dataset once, then runs each
//! requested [`AnalysisKind`] over the same read-only [`EventLog`] and merges
//! the fragments into one [`AnalysisResult`].

use std::fmt::Display;

use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::statistics::{compute_case_statistics, CaseStatistics};
use crate::analysis::variants::{
    summarize_variants, VariantSummary, DEFAULT_MAX_VARIANTS, DEFAULT_VARIANT_SEPARATOR,
};
use crate::core::dataset::{Dataset, DEFAULT_PREVIEW_ROWS};
use crate::core::event_data::{normalize_event_log, ColumnMapping, EventLog};
use crate::discovery::dfg::{summarize_discovery, DiscoverySummary, DEFAULT_TOP_EDGES};
use crate::error::{AnalysisError, Result};

/// An analysis that can be requested by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Directly-follows graph with start and end activities
    Discovery,
    /// Case counts and case duration distribution
    Statistics,
    /// Ranked trace variants
    Variants,
}

impl AnalysisKind {
    /// All analyses, in their default order.
    pub const ALL: [AnalysisKind; 3] = [Self::Discovery, Self::Statistics, Self::Variants];

    /// The request name of this analysis.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Statistics => "statistics",
            Self::Variants => "variants",
        }
    }

    /// Look up an analysis by its (exact) request name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Run this analysis over an event log.
    pub fn run(self, event_log: &EventLog, options: &AnalysisOptions) -> AnalysisFragment {
        match self {
            Self::Discovery => AnalysisFragment::Discovery(summarize_discovery(
                event_log,
                options.max_top_edges,
            )),
            Self::Statistics => AnalysisFragment::Statistics(compute_case_statistics(event_log)),
            Self::Variants => AnalysisFragment::Variants(summarize_variants(
                event_log,
                options.max_variants,
                &options.variant_separator,
            )),
        }
    }
}

impl Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve requested analysis names.
///
/// Duplicates collapse onto their first occurrence. Fails with
/// [`AnalysisError::EmptyAnalysisRequest`] for an empty request and with
/// [`AnalysisError::UnsupportedAnalysis`] (sorted, de-duplicated) for unknown names.
pub fn parse_analyses<S: AsRef<str>>(names: &[S]) -> Result<Vec<AnalysisKind>> {
    if names.is_empty() {
        return Err(AnalysisError::EmptyAnalysisRequest);
    }
    let mut kinds = Vec::with_capacity(AnalysisKind::ALL.len());
    let mut unknown = Vec::new();
    for name in names {
        match AnalysisKind::from_name(name.as_ref()) {
            Some(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Some(_) => {}
            None => unknown.push(name.as_ref().to_string()),
        }
    }
    if !unknown.is_empty() {
        unknown.sort();
        unknown.dedup();
        return Err(AnalysisError::UnsupportedAnalysis(unknown));
    }
    Ok(kinds)
}

/// Options for [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Maximum number of directly-follows relations reported by the discovery analysis
    pub max_top_edges: usize,
    /// Maximum number of variants reported by the variants analysis
    pub max_variants: usize,
    /// Separator placed between activities when rendering a variant
    pub variant_separator: String,
    /// Date format tried before the built-in timestamp formats
    pub date_format: Option<String>,
    /// Number of rows returned in an upload preview
    pub preview_rows: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_top_edges: DEFAULT_TOP_EDGES,
            max_variants: DEFAULT_MAX_VARIANTS,
            variant_separator: DEFAULT_VARIANT_SEPARATOR.to_string(),
            date_format: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

fn default_analyses() -> Vec<String> {
    AnalysisKind::ALL
        .iter()
        .map(|k| k.name().to_string())
        .collect()
}

/// A request to analyze one dataset.
///
/// `analyses` defaults to all analyses when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRequest {
    /// Column mapping for the dataset
    pub mapping: ColumnMapping,
    /// Names of the analyses to run
    #[serde(default = "default_analyses")]
    pub analyses: Vec<String>,
}

impl AnalysisRequest {
    /// Request all analyses for the given mapping.
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            analyses: default_analyses(),
        }
    }
}

/// Output of a single analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisFragment {
    /// See [`AnalysisKind::Discovery`]
    Discovery(DiscoverySummary),
    /// See [`AnalysisKind::Statistics`]
    Statistics(CaseStatistics),
    /// See [`AnalysisKind::Variants`]
    Variants(Vec<VariantSummary>),
}

/// Combined result of all requested analyses.
///
/// A fragment is present if and only if the corresponding analysis was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Number of events after normalization
    pub events: usize,
    /// Directly-follows discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoverySummary>,
    /// Case statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<CaseStatistics>,
    /// Ranked variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<VariantSummary>>,
}

impl AnalysisResult {
    fn merge(&mut self, fragment: AnalysisFragment) {
        match fragment {
            AnalysisFragment::Discovery(d) => self.discovery = Some(d),
            AnalysisFragment::Statistics(s) => self.statistics = Some(s),
            AnalysisFragment::Variants(v) => self.variants = Some(v),
        }
    }
}

/// Run the given analyses over an already normalized event log.
///
/// The analyses only read the log and run concurrently; fragments are merged in
/// the order of `kinds`.
pub fn analyze_event_log(
    event_log: &EventLog,
    kinds: &[AnalysisKind],
    options: &AnalysisOptions,
) -> AnalysisResult {
    let fragments: Vec<AnalysisFragment> = kinds
        .par_iter()
        .map(|kind| kind.run(event_log, options))
        .collect();
    let mut result = AnalysisResult {
        events: event_log.len(),
        discovery: None,
        statistics: None,
        variants: None,
    };
    for fragment in fragments {
        result.merge(fragment);
    }
    result
}

/// Analyze a dataset: validate the mapping, normalize the rows once and run
/// the requested analyses.
///
/// Any failure aborts the whole request; no partial result is returned.
pub fn analyze<S: AsRef<str>>(
    dataset: &Dataset,
    mapping: &ColumnMapping,
    analyses: &[S],
    options: &AnalysisOptions,
) -> Result<AnalysisResult> {
    let kinds = parse_analyses(analyses)?;
    tracing::debug!(rows = dataset.len(), ?kinds, "Normalizing dataset");
    let event_log = normalize_event_log(dataset, mapping, options.date_format.as_deref())?;
    let result = analyze_event_log(&event_log, &kinds, options);
    tracing::info!(
        events = result.events,
        analyses = %kinds.iter().map(AnalysisKind::name).collect::<Vec<_>>().join(","),
        "Analysis finished"
    );
    Ok(result)
}
