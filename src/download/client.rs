//! HTTP capability used by the pipeline, and its reqwest implementation.
//!
//! The pipeline only ever issues plain GETs, so the seam is a single-method
//! trait. [`CookieClient`] is the production implementation: one reqwest
//! client that attaches the session cookie as a static default header.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, COOKIE, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;
use crate::auth::SessionCredentials;

/// Response body as a stream of byte chunks.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>, DownloadError>>;

/// Something that can issue an HTTP GET.
///
/// Implementations may return any status; callers check it with
/// [`HttpResponse::error_for_status`].
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// Issues a GET for `url`. The body is not read until the caller consumes it.
    async fn get(&self, url: &str) -> Result<HttpResponse, DownloadError>;
}

/// Status, filename hint and streamed body of a GET.
pub struct HttpResponse {
    status: u16,
    content_disposition: Option<String>,
    body: BodyStream,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: u16, content_disposition: Option<String>, body: BodyStream) -> Self {
        Self {
            status,
            content_disposition,
            body,
        }
    }

    /// Creates a response whose body is already in memory, delivered as one chunk.
    #[must_use]
    pub fn from_bytes(status: u16, content_disposition: Option<String>, body: Vec<u8>) -> Self {
        Self::new(
            status,
            content_disposition,
            stream::iter(std::iter::once(Ok(body))).boxed(),
        )
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw `Content-Disposition` header, if present and valid UTF-8.
    #[must_use]
    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    /// Turns a non-2xx status into an error for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::HttpStatus`] or [`DownloadError::AuthRequired`].
    pub fn error_for_status(self, url: &str) -> Result<Self, DownloadError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DownloadError::http_status(url, self.status))
        }
    }

    /// Consumes the response, yielding the body stream.
    #[must_use]
    pub fn into_body(self) -> BodyStream {
        self.body
    }

    /// Reads the whole body and decodes it as UTF-8, replacing invalid sequences.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the body stream.
    pub async fn text(self) -> Result<String, DownloadError> {
        let mut body = self.body;
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
    }
}

/// Optional request timeouts. None are set by default: a stalled server
/// blocks the run until the user interrupts it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Total per-request timeout, including reading the body.
    pub read_timeout: Option<Duration>,
}

/// HTTP client that sends `Cookie: <name>=<value>` on every request.
///
/// Created once per run and reused for the page fetch and every document,
/// taking advantage of connection pooling. `Set-Cookie` responses are
/// ignored.
#[derive(Debug, Clone)]
pub struct CookieClient {
    client: Client,
}

impl CookieClient {
    /// Creates a client for the given session cookie with no timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidCookie`] when the cookie cannot be sent
    /// as a header, or [`DownloadError::ClientBuild`] when reqwest fails to
    /// initialize (e.g. TLS backend errors).
    pub fn new(credentials: &SessionCredentials) -> Result<Self, DownloadError> {
        Self::with_options(credentials, ClientOptions::default())
    }

    /// Creates a client with explicit timeout options.
    ///
    /// # Errors
    ///
    /// Same as [`CookieClient::new`].
    #[instrument(level = "debug", skip(credentials), fields(cookie = %credentials.name()))]
    pub fn with_options(
        credentials: &SessionCredentials,
        options: ClientOptions,
    ) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, credentials.header_value()?);

        let mut builder = Client::builder().default_headers(headers).gzip(true);
        if let Some(connect_timeout) = options.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(read_timeout) = options.read_timeout {
            builder = builder.timeout(read_timeout);
        }
        let client = builder
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        debug!("built cookie client");
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpGet for CookieClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &str) -> Result<HttpResponse, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(status, "server returned error status");
            return Err(DownloadError::http_status(url, status));
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|v| header_text(v.as_bytes()));
        debug!(status, ?content_disposition, "response headers received");

        let owned_url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| DownloadError::from_reqwest(owned_url.clone(), e))
            })
            .boxed();

        Ok(HttpResponse::new(status, content_disposition, body))
    }
}

/// Decodes a header value as UTF-8, falling back to Latin-1 byte-for-char
/// so non-ASCII filename hints survive either way.
fn header_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}
