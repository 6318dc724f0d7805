//! The fetch-extract-download run.
//!
//! A run fetches the course page once, extracts candidate links, and saves
//! each document in link order. Progress goes to a [`LogSink`], decisions
//! are surfaced through a [`Notifier`]:
//!
//! - page fetch fails: error notification, nothing downloaded
//! - no candidate links: info notification, output directory untouched
//! - otherwise every link is attempted; one document failing never stops the
//!   others, and the run still ends with a success notification
//!
//! Anything else that goes wrong (including a panic inside the run) is caught
//! once at the top, reported as an unexpected error, and the caller keeps
//! running.
//!
//! Requests are issued strictly one after another.

mod error;
mod guard;
mod outcome;
mod request;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use futures_util::{FutureExt, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, instrument, warn};

use crate::download::{
    BodyStream, ClientOptions, CookieClient, DOWNLOAD_CHUNK_SIZE, DownloadError, HttpGet,
    filename_from_content_disposition, filename_from_url,
};
use crate::extract::{LinkExtraction, extract_links};
use crate::report::{LogSink, Notification, Notifier};

pub use error::{PipelineError, ValidationError};
pub use guard::{RunGuard, RunPermit};
pub use outcome::{FailedDownload, RunOutcome, RunState, RunSummary, SavedFile};
pub use request::RunRequest;

/// Builds a [`CookieClient`] for the request's session cookie and runs the
/// pipeline with it.
///
/// Call [`RunRequest::validate`] first; this function does not re-check
/// inputs. A client that cannot be built (e.g. a cookie containing a
/// newline) ends the run as [`RunOutcome::Aborted`].
pub async fn download_documents(
    request: &RunRequest,
    options: ClientOptions,
    log: &dyn LogSink,
    notifier: &dyn Notifier,
) -> RunOutcome {
    let client = match CookieClient::with_options(request.credentials(), options) {
        Ok(client) => client,
        Err(error) => {
            return report_unexpected(log, notifier, &PipelineError::Client(error).to_string());
        }
    };
    Pipeline::new(&client, log, notifier)
        .run(request.page_url(), request.output_dir())
        .await
}

/// Fetches the course page and extracts its candidate links.
///
/// # Errors
///
/// Returns [`PipelineError::PageFetch`] for network failures and non-2xx
/// statuses, [`PipelineError::Extract`] if `page_url` is not absolute.
pub async fn fetch_candidate_links(
    client: &dyn HttpGet,
    page_url: &str,
) -> Result<LinkExtraction, PipelineError> {
    let html = fetch_page(client, page_url)
        .await
        .map_err(PipelineError::PageFetch)?;
    debug!(bytes = html.len(), "page fetched");
    Ok(extract_links(page_url, &html)?)
}

async fn fetch_page(client: &dyn HttpGet, page_url: &str) -> Result<String, DownloadError> {
    client
        .get(page_url)
        .await?
        .error_for_status(page_url)?
        .text()
        .await
}

/// One run over one course page, bound to a client and two sinks.
pub struct Pipeline<'a> {
    client: &'a dyn HttpGet,
    log: &'a dyn LogSink,
    notifier: &'a dyn Notifier,
    state: Mutex<RunState>,
}

impl<'a> Pipeline<'a> {
    /// Creates an idle pipeline.
    #[must_use]
    pub fn new(client: &'a dyn HttpGet, log: &'a dyn LogSink, notifier: &'a dyn Notifier) -> Self {
        Self {
            client,
            log,
            notifier,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs to completion. Never returns an error and never panics outward;
    /// the outcome says how the run ended.
    #[instrument(skip(self, output_dir), fields(output_dir = %output_dir.display()))]
    pub async fn run(&self, page_url: &str, output_dir: &Path) -> RunOutcome {
        let attempt = AssertUnwindSafe(self.try_run(page_url, output_dir))
            .catch_unwind()
            .await;
        let outcome = match attempt {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => report_unexpected(self.log, self.notifier, &error.to_string()),
            Err(panic) => report_unexpected(self.log, self.notifier, &panic_message(&*panic)),
        };
        self.set_state(outcome.state());
        outcome
    }

    async fn try_run(&self, page_url: &str, output_dir: &Path) -> Result<RunOutcome, PipelineError> {
        self.set_state(RunState::FetchingPage);
        self.log.append("Fetching StudOn page…");

        let links = match fetch_candidate_links(self.client, page_url).await {
            Ok(LinkExtraction::Found(links)) => links,
            Ok(LinkExtraction::Empty) => return Ok(self.no_links_found()),
            Err(PipelineError::PageFetch(error)) => return Ok(self.page_fetch_failed(&error)),
            Err(other) => return Err(other),
        };

        self.log.append(&format!("Found links: {}", links.len()));
        info!(links = links.len(), "candidate links found");
        self.set_state(RunState::Downloading);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| PipelineError::CreateOutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let mut summary = RunSummary {
            output_dir: output_dir.to_path_buf(),
            saved: Vec::new(),
            failed: Vec::new(),
        };

        for url in &links {
            match self.download_one(url, output_dir).await {
                Ok(saved) => summary.saved.push(saved),
                Err(error) => {
                    self.log
                        .append(&format!("  -> Error downloading {url}: {error}"));
                    warn!(url = %url, error = %error, "document download failed");
                    summary.failed.push(FailedDownload {
                        url: url.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        self.log
            .append("Done! All files should now be in the target folder.");
        self.notifier.notify(&Notification::success(
            "Done",
            format!("Downloads finished.\nFolder: {}", output_dir.display()),
        ));
        info!(
            saved = summary.saved.len(),
            failed = summary.failed.len(),
            "run complete"
        );
        Ok(RunOutcome::Completed(summary))
    }

    async fn download_one(&self, url: &str, output_dir: &Path) -> Result<SavedFile, DownloadError> {
        let mut filename = filename_from_url(url);
        self.log.append(&format!("Downloading: {filename} …"));

        let response = self.client.get(url).await?.error_for_status(url)?;

        if let Some(hinted) = response
            .content_disposition()
            .and_then(filename_from_content_disposition)
        {
            debug!(from_url = %filename, from_header = %hinted, "using Content-Disposition filename");
            filename = hinted;
        }

        let path = output_dir.join(&filename);
        let bytes = save_body(response.into_body(), &path).await?;
        debug!(url, path = %path.display(), bytes, "document saved");

        Ok(SavedFile {
            url: url.to_string(),
            path,
            bytes,
        })
    }

    fn page_fetch_failed(&self, error: &DownloadError) -> RunOutcome {
        self.log.append(&format!("Error loading page: {error}"));
        warn!(error = %error, "page fetch failed");
        self.notifier.notify(&Notification::error(
            "Error",
            format!("Could not load the page:\n{error}"),
        ));
        RunOutcome::PageFetchFailed {
            error: error.to_string(),
        }
    }

    fn no_links_found(&self) -> RunOutcome {
        self.log
            .append("No matching links found (.pdf / sendfile / download).");
        info!("no candidate links on page");
        self.notifier.notify(&Notification::info(
            "No downloads",
            "No PDF/download links were found on this page.\n\
             Try enabling 'show all objects on one page' in StudOn.",
        ));
        RunOutcome::NoLinksFound
    }

    fn set_state(&self, next: RunState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!(from = %*state, to = %next, "run state changed");
            *state = next;
        }
    }
}

fn report_unexpected(log: &dyn LogSink, notifier: &dyn Notifier, message: &str) -> RunOutcome {
    log.append(&format!("Unexpected error: {message}"));
    error!(error = %message, "run aborted by unexpected error");
    notifier.notify(&Notification::error(
        "Unexpected error",
        format!("An unexpected error occurred:\n{message}"),
    ));
    RunOutcome::Aborted {
        error: message.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Streams a body to `path`, removing the partial file if the stream or a
/// write fails.
async fn save_body(body: BodyStream, path: &Path) -> Result<u64, DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    let result = stream_to_file(file, body, path).await;
    if result.is_err() {
        debug!(path = %path.display(), "cleaning up partial file after error");
        remove_partial_file(path).await;
    }
    result
}

/// Removes a partially written file. Returns `false` (and warns) when the
/// file could not be removed.
async fn remove_partial_file(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(error) => {
            warn!(path = %path.display(), %error, "partial file left behind");
            false
        }
    }
}

async fn stream_to_file(file: File, mut body: BodyStream, path: &Path) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures_util::stream;
    use tempfile::TempDir;

    use super::*;
    use crate::download::HttpResponse;
    use crate::report::{MemoryLog, MemoryNotifier, NotificationLevel};

    const PAGE: &str = "https://x.test/course/view";

    enum FakeReply {
        Ok {
            body: Vec<u8>,
            content_disposition: Option<String>,
        },
        Status(u16),
        Timeout,
        BrokenBody,
    }

    /// In-memory stand-in for the portal, recording every requested URL.
    #[derive(Default)]
    struct FakePortal {
        replies: HashMap<String, FakeReply>,
        requested: Mutex<Vec<String>>,
    }

    impl FakePortal {
        fn with(mut self, url: &str, reply: FakeReply) -> Self {
            self.replies.insert(url.to_string(), reply);
            self
        }

        fn page(self, html: &str) -> Self {
            self.with(
                PAGE,
                FakeReply::Ok {
                    body: html.as_bytes().to_vec(),
                    content_disposition: None,
                },
            )
        }

        fn file(self, url: &str, body: &[u8]) -> Self {
            self.with(
                url,
                FakeReply::Ok {
                    body: body.to_vec(),
                    content_disposition: None,
                },
            )
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpGet for FakePortal {
        async fn get(&self, url: &str) -> Result<HttpResponse, DownloadError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.replies.get(url) {
                Some(FakeReply::Ok {
                    body,
                    content_disposition,
                }) => Ok(HttpResponse::from_bytes(
                    200,
                    content_disposition.clone(),
                    body.clone(),
                )),
                Some(FakeReply::Status(status)) => {
                    Ok(HttpResponse::from_bytes(*status, None, Vec::new()))
                }
                Some(FakeReply::Timeout) => Err(DownloadError::timeout(url)),
                Some(FakeReply::BrokenBody) => {
                    let body = stream::iter(vec![
                        Ok(b"partial".to_vec()),
                        Err(DownloadError::timeout(url)),
                    ])
                    .boxed();
                    Ok(HttpResponse::new(200, None, body))
                }
                None => Ok(HttpResponse::from_bytes(404, None, Vec::new())),
            }
        }
    }

    fn anchors(hrefs: &[&str]) -> String {
        let links: String = hrefs
            .iter()
            .map(|href| format!(r#"<a href="{href}">link</a>"#))
            .collect();
        format!("<html><body>{links}</body></html>")
    }

    #[tokio::test]
    async fn test_end_to_end_saves_matching_links_in_order() {
        let portal = FakePortal::default()
            .page(&anchors(&["/a.pdf", "/b.pdf?x=1", "/other"]))
            .file("https://x.test/a.pdf", b"AAA")
            .file("https://x.test/b.pdf?x=1", b"BB");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("docs");

        let pipeline = Pipeline::new(&portal, &log, &notifier);
        let outcome = pipeline.run(PAGE, &out).await;

        assert_eq!(pipeline.state(), RunState::Completed);
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.saved.len(), 2);
        assert!(summary.failed.is_empty());
        assert_eq!(std::fs::read(out.join("a.pdf")).unwrap(), b"AAA");
        assert_eq!(std::fs::read(out.join("b.pdf")).unwrap(), b"BB");
        assert_eq!(
            portal.requested(),
            vec![PAGE, "https://x.test/a.pdf", "https://x.test/b.pdf?x=1"]
        );
        assert_eq!(
            log.lines(),
            vec![
                "Fetching StudOn page…",
                "Found links: 2",
                "Downloading: a.pdf …",
                "Downloading: b.pdf …",
                "Done! All files should now be in the target folder.",
            ]
        );
        let notes = notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
        assert_eq!(notes[0].title, "Done");
        assert!(notes[0].message.contains(&out.display().to_string()));
    }

    #[tokio::test]
    async fn test_one_failing_document_does_not_stop_the_others() {
        let portal = FakePortal::default()
            .page(&anchors(&["/1.pdf", "/2.pdf", "/3.pdf"]))
            .file("https://x.test/1.pdf", b"one")
            .with("https://x.test/2.pdf", FakeReply::Timeout)
            .file("https://x.test/3.pdf", b"three");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        let summary = outcome.summary().unwrap();
        assert_eq!(summary.saved.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].url, "https://x.test/2.pdf");
        assert!(dir.path().join("1.pdf").exists());
        assert!(!dir.path().join("2.pdf").exists());
        assert!(dir.path().join("3.pdf").exists());

        let errors = log.lines_containing("Error downloading");
        assert_eq!(errors.len(), 1, "log: {:?}", log.lines());
        assert!(errors[0].contains("https://x.test/2.pdf"));
        assert_eq!(
            notifier.notifications()[0].level,
            NotificationLevel::Success
        );
    }

    #[tokio::test]
    async fn test_error_status_for_document_is_logged_and_skipped() {
        let portal = FakePortal::default()
            .page(&anchors(&["/gone.pdf", "/ok.pdf"]))
            .with("https://x.test/gone.pdf", FakeReply::Status(410))
            .file("https://x.test/ok.pdf", b"ok");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        let summary = outcome.summary().unwrap();
        assert!(summary.failed[0].error.contains("410"));
        assert!(dir.path().join("ok.pdf").exists());
    }

    #[tokio::test]
    async fn test_broken_body_removes_partial_file() {
        let portal = FakePortal::default()
            .page(&anchors(&["/broken.pdf"]))
            .with("https://x.test/broken.pdf", FakeReply::BrokenBody);
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        assert_eq!(outcome.summary().unwrap().failed.len(), 1);
        assert!(!dir.path().join("broken.pdf").exists());
    }

    #[tokio::test]
    async fn test_remove_partial_file_reports_failure() {
        let dir = TempDir::new().unwrap();
        let partial = dir.path().join("partial.pdf");
        std::fs::write(&partial, b"%PDF-").unwrap();

        assert!(remove_partial_file(&partial).await);
        assert!(!partial.exists());
        assert!(!remove_partial_file(&partial).await);
    }

    #[tokio::test]
    async fn test_content_disposition_overrides_url_name() {
        let portal = FakePortal::default()
            .page(&anchors(&["/ilias.php?cmd=sendfile&ref_id=9"]))
            .with(
                "https://x.test/ilias.php?cmd=sendfile&ref_id=9",
                FakeReply::Ok {
                    body: b"%PDF-1.7".to_vec(),
                    content_disposition: Some(
                        r#"attachment; filename="Lecture 01.pdf""#.to_string(),
                    ),
                },
            );
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        let saved = &outcome.summary().unwrap().saved[0];
        assert_eq!(saved.path, dir.path().join("Lecture_01.pdf"));
        assert_eq!(saved.bytes, 8);
        assert!(!dir.path().join("ilias.php").exists());
        // The announcement uses the URL-derived name; the override comes later.
        assert_eq!(log.lines_containing("Downloading:"), vec!["Downloading: ilias.php …"]);
    }

    #[tokio::test]
    async fn test_colliding_names_overwrite() {
        let portal = FakePortal::default()
            .page(&anchors(&["/a/notes.pdf", "/b/notes.pdf"]))
            .file("https://x.test/a/notes.pdf", b"first")
            .file("https://x.test/b/notes.pdf", b"second");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        assert_eq!(std::fs::read(dir.path().join("notes.pdf")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_no_links_found_touches_nothing() {
        let portal = FakePortal::default().page(&anchors(&["/forum", "/members"]));
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("never-created");

        let pipeline = Pipeline::new(&portal, &log, &notifier);
        let outcome = pipeline.run(PAGE, &out).await;

        assert_eq!(outcome, RunOutcome::NoLinksFound);
        assert_eq!(pipeline.state(), RunState::NoLinksFound);
        assert!(!out.exists());
        assert_eq!(portal.requested(), vec![PAGE]);
        assert_eq!(
            log.lines().last().unwrap(),
            "No matching links found (.pdf / sendfile / download)."
        );
        let notes = notifier.notifications();
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert_eq!(notes[0].title, "No downloads");
        assert!(notes[0].message.contains("show all objects on one page"));
    }

    #[tokio::test]
    async fn test_page_fetch_failure_attempts_no_downloads() {
        let portal = FakePortal::default().with(PAGE, FakeReply::Status(500));
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");

        let pipeline = Pipeline::new(&portal, &log, &notifier);
        let outcome = pipeline.run(PAGE, &out).await;

        assert!(matches!(outcome, RunOutcome::PageFetchFailed { ref error } if error.contains("500")));
        assert_eq!(pipeline.state(), RunState::Failed);
        assert_eq!(portal.requested(), vec![PAGE]);
        assert!(!out.exists());
        assert!(log.lines()[1].starts_with("Error loading page:"));
        let notes = notifier.notifications();
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].title, "Error");
        assert!(notes[0].message.starts_with("Could not load the page:\n"));
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_unexpected_error() {
        let portal = FakePortal::default()
            .page(&anchors(&["/a.pdf"]))
            .file("https://x.test/a.pdf", b"a");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file-not-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, &blocker.join("out"))
            .await;

        assert!(matches!(outcome, RunOutcome::Aborted { .. }));
        assert!(log.lines().last().unwrap().starts_with("Unexpected error:"));
        let notes = notifier.notifications();
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].title, "Unexpected error");
        assert_eq!(portal.requested(), vec![PAGE]);
    }

    #[tokio::test]
    async fn test_existing_output_dir_is_reused() {
        let portal = FakePortal::default()
            .page(&anchors(&["/a.pdf"]))
            .file("https://x.test/a.pdf", b"a");
        let log = MemoryLog::new();
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"keep").unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        assert!(outcome.is_success());
        assert!(dir.path().join("keep.txt").exists());
        assert!(dir.path().join("a.pdf").exists());
    }

    #[tokio::test]
    async fn test_panicking_sink_is_contained() {
        struct PanicOnFoundLinks(MemoryLog);
        impl LogSink for PanicOnFoundLinks {
            fn append(&self, line: &str) {
                assert!(!line.starts_with("Found links"), "sink exploded");
                self.0.append(line);
            }
        }

        let portal = FakePortal::default().page(&anchors(&["/a.pdf"]));
        let log = PanicOnFoundLinks(MemoryLog::new());
        let notifier = MemoryNotifier::new();
        let dir = TempDir::new().unwrap();

        let outcome = Pipeline::new(&portal, &log, &notifier)
            .run(PAGE, dir.path())
            .await;

        assert!(matches!(outcome, RunOutcome::Aborted { ref error } if error.contains("sink exploded")));
        assert_eq!(notifier.notifications()[0].title, "Unexpected error");
    }

    #[tokio::test]
    async fn test_empty_chunks_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunks.pdf");
        let body = stream::iter(vec![
            Ok(b"ab".to_vec()),
            Ok(Vec::new()),
            Ok(b"cd".to_vec()),
        ])
        .boxed();

        let written = save_body(body, &path).await.unwrap();

        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
    }

    #[tokio::test]
    async fn test_fetch_candidate_links_reports_page_errors() {
        let portal = FakePortal::default().with(PAGE, FakeReply::Status(403));
        let result = fetch_candidate_links(&portal, PAGE).await;
        assert!(matches!(
            result,
            Err(PipelineError::PageFetch(DownloadError::AuthRequired { status: 403, .. }))
        ));
    }
}
