//! Default command: fetch the page and save every candidate document.

use std::io::{self, IsTerminal};

use anyhow::Result;
use studon_core::{LogSink, download_documents};
use tracing::info;

use crate::app::config_runtime::Settings;
use crate::app::exit_handler::{ProcessExit, determine_exit_outcome};
use crate::app::progress_manager::{ConsoleLog, ConsoleNotifier, new_spinner};
use crate::app::terminal::{is_dumb_terminal, should_use_spinner};
use crate::app::validation::format_missing_input;

pub(crate) async fn run_download_command(settings: &Settings) -> Result<ProcessExit> {
    let request = settings.run_request();
    if let Err(warning) = request.validate() {
        eprintln!("{}", format_missing_input(warning));
        return Ok(ProcessExit::Usage);
    }

    let use_spinner =
        should_use_spinner(io::stderr().is_terminal(), settings.quiet(), is_dumb_terminal());
    let spinner = use_spinner.then(new_spinner);
    let log = ConsoleLog::new(spinner.clone(), settings.quiet());
    let notifier = ConsoleNotifier::new(spinner.clone(), settings.quiet());

    log.append("Starting download…");
    let outcome = download_documents(&request, settings.client_options, &log, &notifier).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Some(summary) = outcome.summary() {
        info!(
            attempted = summary.attempted(),
            saved = summary.saved.len(),
            failed = summary.failed.len(),
            output_dir = %summary.output_dir.display(),
            "Run complete"
        );
    }
    info!(state = %outcome.state(), "Run finished");

    Ok(determine_exit_outcome(&outcome))
}
