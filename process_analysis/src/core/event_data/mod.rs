//! Event Data
//!
//! Normalized event logs and the steps that produce them from a tabular dataset
pub mod mapping;
pub mod normalize;
pub mod timestamp_utils;
#[doc(hidden)]
pub(crate) mod event_log_struct;

#[doc(inline)]
pub use event_log_struct::*;
#[doc(inline)]
pub use mapping::{ColumnMapping, MappedColumns};
#[doc(inline)]
pub use normalize::normalize_event_log;
