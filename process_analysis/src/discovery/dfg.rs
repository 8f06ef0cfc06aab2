//! Discover [`DirectlyFollowsGraph`]s from an [`EventLog`]

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{
    event_data::EventLog,
    process_models::dfg::{DirectlyFollowsGraph, DirectlyFollowsRelation},
};

/// Default number of relations reported by [`DiscoverySummary`].
pub const DEFAULT_TOP_EDGES: usize = 15;

/// Discover a [`DirectlyFollowsGraph`] from an [`EventLog`].
///
/// Each case contributes one relation per pair of consecutive events, its first
/// activity as start activity and its last activity as end activity (for a
/// single-event case both are the same activity).
pub fn discover_dfg(event_log: &EventLog) -> DirectlyFollowsGraph {
    let mut result = DirectlyFollowsGraph::new();
    for case in event_log.cases() {
        let mut last_activity: Option<&str> = None;
        for activity in case.trace() {
            match last_activity {
                Some(last) => result.add_df_relation(last, activity, 1),
                None => result.add_start_activity(activity, 1),
            }
            last_activity = Some(activity);
        }
        if let Some(last) = last_activity {
            result.add_end_activity(last, 1);
        }
    }
    result
}

/// The discovery fragment of an analysis result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverySummary {
    /// Number of cases starting with each activity
    pub start_activities: BTreeMap<String, u64>,
    /// Number of cases ending with each activity
    pub end_activities: BTreeMap<String, u64>,
    /// Most frequent directly-follows relations, most frequent first
    pub top_edges: Vec<DirectlyFollowsRelation>,
}

impl DiscoverySummary {
    /// Summarize a graph, keeping at most `max_top_edges` relations.
    pub fn from_dfg(dfg: DirectlyFollowsGraph, max_top_edges: usize) -> Self {
        let top_edges = dfg.top_relations(max_top_edges);
        Self {
            start_activities: dfg.start_activities,
            end_activities: dfg.end_activities,
            top_edges,
        }
    }
}

/// Discover the directly-follows graph and summarize it.
pub fn summarize_discovery(event_log: &EventLog, max_top_edges: usize) -> DiscoverySummary {
    DiscoverySummary::from_dfg(discover_dfg(event_log), max_top_edges)
}
