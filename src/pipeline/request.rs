use std::path::{Path, PathBuf};

use super::error::ValidationError;
use crate::auth::SessionCredentials;

/// Everything a run needs from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    page_url: String,
    output_dir: PathBuf,
    credentials: SessionCredentials,
}

impl RunRequest {
    /// Creates a request. The page URL is trimmed; nothing else is checked
    /// until [`RunRequest::validate`].
    pub fn new(
        page_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        credentials: SessionCredentials,
    ) -> Self {
        Self {
            page_url: page_url.into().trim().to_string(),
            output_dir: output_dir.into(),
            credentials,
        }
    }

    /// The course page to scan.
    #[must_use]
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Where documents are saved.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The session cookie.
    #[must_use]
    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    /// Checks that every input is present, in form order.
    ///
    /// # Errors
    ///
    /// Returns the first missing input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingOutputDir);
        }
        if !self.credentials.is_complete() {
            return Err(ValidationError::MissingCookie);
        }
        Ok(())
    }
}
