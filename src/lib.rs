//! StudOn Downloader Core Library
//!
//! Fetches a single course page with a pasted session cookie, picks out the
//! links that look like documents, and saves each one into a local folder.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - Session cookie credentials
//! - [`extract`] - Candidate link extraction from page HTML
//! - [`download`] - Cookie-authenticated HTTP client and filename derivation
//! - [`pipeline`] - The fetch-extract-download run and its outcomes
//! - [`report`] - Log and notification sinks supplied by the caller

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod download;
pub mod extract;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use auth::SessionCredentials;
pub use download::{ClientOptions, CookieClient, DownloadError, HttpGet, HttpResponse};
pub use extract::{ExtractError, LinkExtraction, candidate_links, extract_links};
pub use pipeline::{
    FailedDownload, Pipeline, PipelineError, RunGuard, RunOutcome, RunRequest, RunState,
    RunSummary, SavedFile, ValidationError, download_documents,
};
pub use report::{LogSink, MemoryLog, MemoryNotifier, Notification, NotificationLevel, Notifier};
