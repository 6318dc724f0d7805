//! `--list-only`: print the candidate links without downloading anything.

use anyhow::Result;
use studon_core::download::filename_from_url;
use studon_core::pipeline::fetch_candidate_links;
use studon_core::{CookieClient, LinkExtraction};
use tracing::info;

use crate::app::config_runtime::Settings;
use crate::app::exit_handler::ProcessExit;
use crate::app::validation::{format_missing_input, validate_list_request};

pub(crate) async fn run_list_command(settings: &Settings) -> Result<ProcessExit> {
    let request = settings.run_request();
    if let Err(warning) = validate_list_request(&request) {
        eprintln!("{}", format_missing_input(warning));
        return Ok(ProcessExit::Usage);
    }

    let client = CookieClient::with_options(request.credentials(), settings.client_options)?;
    match fetch_candidate_links(&client, request.page_url()).await {
        Ok(LinkExtraction::Found(links)) => {
            info!(links = links.len(), "Listing candidate links");
            for line in render_link_lines(&links) {
                println!("{line}");
            }
            Ok(ProcessExit::Success)
        }
        Ok(LinkExtraction::Empty) => {
            eprintln!("No matching links found (.pdf / sendfile / download).");
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            eprintln!("Error loading page: {error}");
            Ok(ProcessExit::Failure)
        }
    }
}

/// One `url<TAB>filename` line per link, in page order.
fn render_link_lines(links: &[String]) -> Vec<String> {
    links
        .iter()
        .map(|link| format!("{link}\t{}", filename_from_url(link)))
        .collect()
}
