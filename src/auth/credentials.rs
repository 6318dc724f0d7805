use std::fmt;

use reqwest::header::HeaderValue;

use crate::download::DownloadError;

/// Cookie name ILIAS installations (and therefore StudOn) use for the session.
pub const DEFAULT_COOKIE_NAME: &str = "PHPSESSID";

/// A pasted session cookie, valid for one run.
///
/// The value is never validated for charset or expiry; a stale cookie shows
/// up as an authentication error on the page fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    name: String,
    value: String,
}

impl SessionCredentials {
    /// Creates credentials from a cookie name and value.
    ///
    /// Surrounding whitespace is trimmed from both parts, since values pasted
    /// out of browser developer tools often carry a trailing newline.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            value: value.into().trim().to_string(),
        }
    }

    /// Cookie name, e.g. `PHPSESSID`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Both name and value are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }

    /// The `Cookie` header value, `name=value`.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Builds the header value, marked sensitive so it stays out of debug output.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidCookie`] when the name or value contains
    /// bytes that are not allowed in an HTTP header (e.g. a newline).
    pub fn header_value(&self) -> Result<HeaderValue, DownloadError> {
        let mut value = HeaderValue::from_str(&self.cookie_header())
            .map_err(|_| DownloadError::invalid_cookie(self.name.clone()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}
