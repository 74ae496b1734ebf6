//! Output module for run results
//!
//! This module aggregates per-image results into a [`HarvestSummary`] and
//! renders it for the console.

mod summary;

pub use summary::{print_summary, HarvestSummary};
