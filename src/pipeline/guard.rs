use std::sync::atomic::{AtomicBool, Ordering};

use super::error::PipelineError;

/// Caller-side reentrancy guard: at most one run at a time.
///
/// This plays the role of a disabled "Start" button. Hold the returned
/// [`RunPermit`] for the duration of the run; dropping it re-enables.
#[derive(Debug, Default)]
pub struct RunGuard {
    running: AtomicBool,
}

impl RunGuard {
    /// Creates an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the guard.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyRunning`] while another permit is alive.
    pub fn try_acquire(&self) -> Result<RunPermit<'_>, PipelineError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::AlreadyRunning)?;
        Ok(RunPermit { guard: self })
    }

    /// Whether a run currently holds the guard.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the current run.
#[derive(Debug)]
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}
