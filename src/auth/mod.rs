//! Session cookie credentials.
//!
//! StudOn authenticates through a single session cookie that the user copies
//! out of a logged-in browser. The cookie is sent verbatim as a static
//! `Cookie` header; no jar, no domain matching.

mod credentials;

pub use credentials::{DEFAULT_COOKIE_NAME, SessionCredentials};
