//! Cookie-authenticated HTTP access and document filename handling.
//!
//! # Features
//!
//! - A single [`HttpGet`] seam, so the pipeline can run against a fake
//! - Static `Cookie` header on every request, no cookie jar
//! - Streaming bodies (memory use bounded regardless of document size)
//! - Filenames from the URL path or the `Content-Disposition` header
//!
//! # Example
//!
//! ```no_run
//! use studon_core::SessionCredentials;
//! use studon_core::download::{CookieClient, HttpGet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = SessionCredentials::new("PHPSESSID", "0123abcd");
//! let client = CookieClient::new(&creds)?;
//! let page = client.get("https://www.studon.fau.de/crs123.html").await?;
//! println!("{} bytes of HTML", page.text().await?.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod filename;

pub use client::{BodyStream, ClientOptions, CookieClient, HttpGet, HttpResponse};
pub use constants::{DOWNLOAD_CHUNK_SIZE, FALLBACK_FILENAME};
pub use error::DownloadError;
pub use filename::{filename_from_content_disposition, filename_from_url, sanitize_filename};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
