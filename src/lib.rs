//! Consolidates overlapping ACLED conflict-event extracts into one
//! deduplicated dataset.
//!
//! Source files are discovered and read into [`model::Batch`]es, checked for
//! date coverage gaps by [`consolidate::CoverageValidator`], folded into one
//! record per event by [`consolidate::Merger`], and written back as CSV.

pub mod cli;
pub mod config;
pub mod consolidate;
pub mod model;
pub mod output;
pub mod source;
