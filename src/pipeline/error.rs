//! Error types for a pipeline run.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;
use crate::extract::ExtractError;

/// Faults that end a run early.
///
/// Per-document failures are not represented here: they are recorded in
/// the run summary and never escape the download loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The course page could not be fetched.
    #[error(transparent)]
    PageFetch(DownloadError),

    /// The page URL could not serve as a base for link resolution.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The HTTP client could not be set up for the session cookie.
    #[error(transparent)]
    Client(DownloadError),

    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    CreateOutputDir {
        /// The directory that was requested.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A run is already in progress.
    #[error("a download run is already in progress")]
    AlreadyRunning,
}

/// Missing input detected before a run starts.
///
/// Messages match the warnings the front end shows next to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No page URL given.
    #[error("Please enter a StudOn URL.")]
    MissingUrl,
    /// No output directory given.
    #[error("Please choose a target folder.")]
    MissingOutputDir,
    /// Cookie name or value missing.
    #[error("Please enter cookie name and value.")]
    MissingCookie,
}
