//! Progress reporting port
//!
//! The orchestrator reports an integer percentage after each processed
//! reference. Any `FnMut(u8)` closure is a reporter, so a progress bar, a log
//! stream or a channel sender can be plugged in without touching the core.

/// Receives completion percentages (0-100, non-decreasing within a run)
pub trait ProgressReporter {
    fn report(&mut self, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: FnMut(u8),
{
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Reporter that writes each percentage to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&mut self, percent: u8) {
        tracing::info!("Progress: {}%", percent);
    }
}

/// Integer percentage of `processed` out of `total`, rounded down
///
/// Returns `None` for an empty run so callers never divide by zero.
pub fn percent_complete(processed: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }

    let percent = processed.min(total) * 100 / total;
    // Bounded by 100 above
    Some(percent as u8)
}
