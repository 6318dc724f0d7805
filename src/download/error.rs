//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so that a single log
//! line is enough to tell which document failed and why.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a page or saving a document.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion (only when a timeout is configured).
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The portal rejected the session cookie.
    #[error(
        "[AUTH] HTTP {status} requesting {url}\n  Suggestion: log in again and paste a fresh session cookie"
    )]
    AuthRequired {
        /// The URL that requires authentication.
        url: String,
        /// The HTTP status code (401 or 403).
        status: u16,
    },

    /// File system error while writing a document.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The cookie cannot be sent as an HTTP header.
    #[error("cookie '{name}' contains characters that are not allowed in an HTTP header")]
    InvalidCookie {
        /// Name of the offending cookie (the value is never echoed).
        name: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error, promoting 401/403 to [`DownloadError::AuthRequired`].
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        if matches!(status, 401 | 403) {
            Self::AuthRequired {
                url: url.into(),
                status,
            }
        } else {
            Self::HttpStatus {
                url: url.into(),
                status,
            }
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid cookie error.
    pub fn invalid_cookie(name: impl Into<String>) -> Self {
        Self::InvalidCookie { name: name.into() }
    }

    /// Maps a reqwest error to `Timeout` or `Network`.
    pub(crate) fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// URL or path for context, which the source errors do not carry.
