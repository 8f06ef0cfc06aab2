use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Activity in a directly-follows graph.
type Activity = String;

/// A directly-follows relation between two activities, annotated with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DirectlyFollowsRelation {
    /// Source activity
    pub from: Activity,
    /// Target activity
    pub to: Activity,
    /// How often `to` directly followed `from` within one case
    pub count: u64,
}

/// A directly-follows graph of [`Activity`]s.
///
/// Graph containing the directly-follows relations and the start and end
/// activities (each annotated with the number of cases that start or end with it).
///
/// Relations are kept in the order in which they were first added, which is the
/// tie-breaker for [`DirectlyFollowsGraph::top_relations`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DirectlyFollowsGraph {
    /// Directly-follows relations, in discovery order
    relations: Vec<DirectlyFollowsRelation>,
    #[serde(skip)]
    relation_index: HashMap<(Activity, Activity), usize>,
    /// Start activities
    pub start_activities: BTreeMap<Activity, u64>,
    /// End activities
    pub end_activities: BTreeMap<Activity, u64>,
}

impl DirectlyFollowsGraph {
    /// Create new [`DirectlyFollowsGraph`] with no directly-follows relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `frequency` cases starting with `activity`.
    pub fn add_start_activity(&mut self, activity: &str, frequency: u64) {
        *self
            .start_activities
            .entry(activity.to_string())
            .or_default() += frequency;
    }

    /// Count `frequency` cases ending with `activity`.
    pub fn add_end_activity(&mut self, activity: &str, frequency: u64) {
        *self.end_activities.entry(activity.to_string()).or_default() += frequency;
    }

    /// Add a directly-follows relation with a frequency.
    ///
    /// If the directly-follows relation already exists, the frequency count is added to the
    /// existing directly-follows relation; otherwise it is appended after all known relations.
    pub fn add_df_relation(&mut self, from: &str, to: &str, frequency: u64) {
        let key = (from.to_string(), to.to_string());
        match self.relation_index.get(&key) {
            Some(&i) => self.relations[i].count += frequency,
            None => {
                self.relation_index.insert(key, self.relations.len());
                self.relations.push(DirectlyFollowsRelation {
                    from: from.to_string(),
                    to: to.to_string(),
                    count: frequency,
                });
            }
        }
    }

    /// Frequency of the relation `from -> to` (0 if absent).
    pub fn df_count(&self, from: &str, to: &str) -> u64 {
        self.relation_index
            .get(&(from.to_string(), to.to_string()))
            .map_or(0, |&i| self.relations[i].count)
    }

    /// All relations in the order they were first discovered.
    pub fn relations(&self) -> &[DirectlyFollowsRelation] {
        &self.relations
    }

    /// The `limit` most frequent relations, most frequent first.
    ///
    /// Relations with equal frequency keep their discovery order.
    pub fn top_relations(&self, limit: usize) -> Vec<DirectlyFollowsRelation> {
        let mut sorted: Vec<_> = self.relations.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.into_iter().take(limit).cloned().collect()
    }
}
