//! Exit code logic for the downloader process.
//!
//! Single responsibility: map how a run ended to the process exit outcome.

use std::process::ExitCode;

use studon_core::RunOutcome;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Run completed, or there was nothing to download.
    Success,
    /// The page could not be loaded or the run aborted.
    Failure,
    /// Missing or invalid input; nothing was attempted.
    Usage,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Usage => ExitCode::from(2),
        }
    }
}

/// Determines the process exit outcome from a run outcome.
///
/// Individual document failures do not fail the process: the run itself
/// completed and the log names every failed URL.
pub(crate) fn determine_exit_outcome(outcome: &RunOutcome) -> ProcessExit {
    if outcome.is_success() {
        ProcessExit::Success
    } else {
        ProcessExit::Failure
    }
}
