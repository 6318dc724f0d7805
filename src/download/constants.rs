//! Constants for the download module.

/// Write buffer size used when streaming a document to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Filename used when neither the URL nor the server yields a usable name.
pub const FALLBACK_FILENAME: &str = "download.pdf";
