//! Progress UI (spinner) and console sinks for download runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use studon_core::{LogSink, Notification, NotificationLevel, Notifier};

/// Creates the steady-ticking spinner shown while a run is in progress.
pub(crate) fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prints run log lines to stdout, keeping the spinner below them.
pub(crate) struct ConsoleLog {
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleLog {
    pub(crate) fn new(spinner: Option<ProgressBar>, quiet: bool) -> Self {
        Self { spinner, quiet }
    }
}

impl LogSink for ConsoleLog {
    fn append(&self, line: &str) {
        if self.quiet {
            return;
        }
        match &self.spinner {
            Some(spinner) => {
                spinner.suspend(|| println!("{line}"));
                spinner.set_message(line.trim().to_string());
            }
            None => println!("{line}"),
        }
    }
}

/// Prints notifications: errors to stderr (always), the rest to stdout.
pub(crate) struct ConsoleNotifier {
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleNotifier {
    pub(crate) fn new(spinner: Option<ProgressBar>, quiet: bool) -> Self {
        Self { spinner, quiet }
    }

    fn emit(&self, notification: &Notification) {
        let text = format_notification(notification);
        if notification.level == NotificationLevel::Error {
            eprintln!("{text}");
        } else if !self.quiet {
            println!("{text}");
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| self.emit(notification)),
            None => self.emit(notification),
        }
    }
}

/// Renders a notification as a headline plus indented body lines.
pub(crate) fn format_notification(notification: &Notification) -> String {
    let mut out = format!(
        "[{}] {}",
        notification.level.as_str().to_uppercase(),
        notification.title
    );
    for line in notification.message.lines() {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}
