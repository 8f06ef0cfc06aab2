//! Process Analysis
//!
//! Descriptive analyses over a normalized [`crate::EventLog`]: case duration
//! statistics and trace variants.

pub mod statistics;
pub mod variants;
