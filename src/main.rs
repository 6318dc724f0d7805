//! CLI entry point for the StudOn downloader.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod app;
mod app_config;
mod cli;
mod commands;

use app::config_runtime::resolve_settings;
use app::exit_handler::ProcessExit;
use app::terminal::{init_tracing, no_color_env_requested};
use app_config::load_default_file_config;
use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded_config = match load_default_file_config() {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("Error: {error:#}");
            return ProcessExit::Usage.into();
        }
    };

    let settings = resolve_settings(&cli.download, loaded_config.config.as_ref());
    init_tracing(settings.tracing_level(), no_color_env_requested());
    debug!(
        config_loaded = loaded_config.loaded_from_file(),
        output_dir = %settings.output_dir.display(),
        cookie_name = %settings.cookie_name,
        "Settings resolved"
    );

    let result = match cli.command {
        Some(Command::Config {
            command: ConfigCommand::Show,
        }) => commands::run_config_show_command(&settings, &loaded_config),
        None if settings.list_only => commands::run_list_command(&settings).await,
        None => commands::run_download_command(&settings).await,
    };

    match result {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}
