//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const COOKIE_HELP: &str = "\
How to find cookie name & value:
  - Log in to StudOn in your browser.
  - Press F12 to open Developer Tools.
  - Chrome/Edge: tab 'Application' -> 'Cookies' -> your StudOn URL.
  - Firefox: tab 'Storage' -> 'Cookies'.
  - Look for a session cookie (e.g. 'PHPSESSID', 'ILIAS_LOGIN').
  - Pass its name with --cookie-name and its value with --cookie-value
    (or set STUDON_COOKIE so the value stays out of your shell history).

If no links are found, enable 'show all objects on one page' in StudOn.";

/// Download every PDF and file link from a StudOn course page.
#[derive(Parser, Debug)]
#[command(name = "studon-downloader")]
#[command(author, version, about, after_long_help = COOKIE_HELP)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Optional subcommand
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub download: DownloadArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration and where it came from
    Show,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// StudOn page to scan (course, folder or session page)
    pub url: Option<String>,

    /// Target folder for downloaded files (created if missing) [default: .]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Session cookie name [default: PHPSESSID]
    #[arg(long)]
    pub cookie_name: Option<String>,

    /// Session cookie value
    #[arg(long, env = "STUDON_COOKIE", hide_env_values = true)]
    pub cookie_value: Option<String>,

    /// Print the matching links without downloading them
    #[arg(long)]
    pub list_only: bool,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output; errors are still shown
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
