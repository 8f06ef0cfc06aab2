//! Trace Variants
//!
//! Groups cases by their exact activity sequence and ranks the resulting
//! variants by the number of cases sharing them.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::event_data::EventLog;

/// Default number of variants reported by [`summarize_variants`].
pub const DEFAULT_MAX_VARIANTS: usize = 20;
/// Default separator used when rendering a variant as a string.
pub const DEFAULT_VARIANT_SEPARATOR: &str = " > ";

/// A distinct activity sequence and the number of cases following it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Variant {
    /// Activities in order (repetitions included)
    pub activities: Vec<String>,
    /// Number of cases whose trace equals `activities`
    pub cases: u64,
}

impl Variant {
    /// Render the activity sequence joined by `separator`.
    pub fn render(&self, separator: &str) -> String {
        self.activities.join(separator)
    }
}

/// The variants fragment of an analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VariantSummary {
    /// Activities joined by the configured separator
    pub variant: String,
    /// Number of cases following this variant
    pub cases: u64,
}

/// All variants of the log, most frequent first.
///
/// Variants with the same support keep the order in which their first case
/// appears in the (canonically ordered) log.
pub fn extract_variants(event_log: &EventLog) -> Vec<Variant> {
    let mut index: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut variants: Vec<(Vec<&str>, u64)> = Vec::new();
    for case in event_log.cases() {
        let trace: Vec<&str> = case.trace().collect();
        let known = index.get(&trace).copied();
        match known {
            Some(i) => variants[i].1 += 1,
            None => {
                index.insert(trace.clone(), variants.len());
                variants.push((trace, 1));
            }
        }
    }
    variants.sort_by(|(_, a), (_, b)| b.cmp(a));
    variants
        .into_iter()
        .map(|(trace, cases)| Variant {
            activities: trace.into_iter().map(str::to_string).collect(),
            cases,
        })
        .collect()
}

/// The `max_variants` most frequent variants, rendered with `separator`.
pub fn summarize_variants(
    event_log: &EventLog,
    max_variants: usize,
    separator: &str,
) -> Vec<VariantSummary> {
    extract_variants(event_log)
        .into_iter()
        .take(max_variants)
        .map(|v| VariantSummary {
            variant: v.render(separator),
            cases: v.cases,
        })
        .collect()
}
