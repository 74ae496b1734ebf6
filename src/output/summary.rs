//! Per-run aggregate of download results
//!
//! Nothing here is persisted; the summary lives as long as the outcome that
//! carries it.

use crate::harvester::DownloadResult;
use std::path::{Path, PathBuf};

/// Counts and paths collected over one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// References discovered on the page (tags plus CSS)
    pub discovered: usize,

    /// Files written, in index order
    pub saved: Vec<PathBuf>,

    /// References that consumed an index but produced no file
    pub failed: usize,

    /// `<img>` elements without a `src`
    pub skipped: usize,
}

impl HarvestSummary {
    pub fn new(discovered: usize) -> Self {
        Self {
            discovered,
            ..Self::default()
        }
    }

    /// Folds one per-image result into the totals
    pub fn record(&mut self, result: &DownloadResult) {
        match result {
            DownloadResult::Saved(path) => self.saved.push(path.clone()),
            DownloadResult::Failed(_) => self.failed += 1,
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &HarvestSummary, directory: &Path) {
    println!("=== Harvest Summary ===\n");
    println!("Directory: {}", directory.display());
    println!("  References found: {}", summary.discovered);
    println!("  Images saved: {}", summary.saved_count());
    println!("  Failed: {}", summary.failed);
    if summary.skipped > 0 {
        println!("  Skipped (no src): {}", summary.skipped);
    }

    let success_rate = if summary.discovered > 0 {
        (summary.saved_count() as f64 / summary.discovered as f64) * 100.0
    } else {
        0.0
    };
    println!("Success Rate: {:.1}%", success_rate);
}
