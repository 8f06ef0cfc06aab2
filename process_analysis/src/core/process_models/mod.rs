//! Process Models
//!
//! Model representations derived from event data

/// [`DirectlyFollowsGraph`](dfg::DirectlyFollowsGraph) struct
pub mod dfg;
