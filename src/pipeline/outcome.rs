use std::fmt;
use std::path::PathBuf;

/// Where a run is, or where it ended.
///
/// `Idle → FetchingPage → {Failed | NoLinksFound | Downloading} → Completed`.
/// Individual document failures inside `Downloading` do not change the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Idle,
    /// Fetching the course page.
    FetchingPage,
    /// Saving documents one by one.
    Downloading,
    /// Page fetch failed or an unexpected error ended the run.
    Failed,
    /// The page had no candidate links.
    NoLinksFound,
    /// Every candidate was attempted.
    Completed,
}

impl RunState {
    /// Whether the run has ended.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::NoLinksFound | Self::Completed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::FetchingPage => "fetching_page",
            Self::Downloading => "downloading",
            Self::Failed => "failed",
            Self::NoLinksFound => "no_links_found",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Source URL.
    pub url: String,
    /// Final path, after any `Content-Disposition` override.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// A document that could not be fetched or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    /// Source URL.
    pub url: String,
    /// Description of the cause.
    pub error: String,
}

/// Per-document results of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Directory documents were saved into.
    pub output_dir: PathBuf,
    /// Saved documents, in link order.
    pub saved: Vec<SavedFile>,
    /// Failed documents, in link order.
    pub failed: Vec<FailedDownload>,
}

impl RunSummary {
    /// Number of links attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.saved.len() + self.failed.len()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The course page could not be loaded; nothing was downloaded.
    PageFetchFailed {
        /// Description of the cause.
        error: String,
    },
    /// The page had no candidate links; nothing was written.
    NoLinksFound,
    /// Every candidate was attempted, successfully or not.
    Completed(RunSummary),
    /// An unexpected error ended the run.
    Aborted {
        /// Description of the cause.
        error: String,
    },
}

impl RunOutcome {
    /// Terminal state for this outcome.
    #[must_use]
    pub fn state(&self) -> RunState {
        match self {
            Self::PageFetchFailed { .. } | Self::Aborted { .. } => RunState::Failed,
            Self::NoLinksFound => RunState::NoLinksFound,
            Self::Completed(_) => RunState::Completed,
        }
    }

    /// `true` for [`RunOutcome::Completed`] and [`RunOutcome::NoLinksFound`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::NoLinksFound)
    }

    /// The summary of a completed run.
    #[must_use]
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}
