//! Core modules for event log analysis

pub use chrono;
pub mod dataset;
pub mod event_data;

/// IO Traits
pub mod io;

pub mod process_models;
pub mod workbook;

pub use dataset::Dataset;
pub use event_data::EventLog;
pub use process_models::dfg::DirectlyFollowsGraph;
