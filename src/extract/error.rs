//! Error types for link extraction.

use thiserror::Error;

/// Errors raised while extracting candidate links.
///
/// A page without matching links is not an error; see
/// [`LinkExtraction::Empty`](super::LinkExtraction::Empty).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page URL used as the resolution base is not an absolute URL.
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// The URL as given.
        url: String,
        /// Why it failed to parse.
        #[source]
        source: url::ParseError,
    },
}
