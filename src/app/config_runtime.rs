//! Merges CLI arguments over file configuration over built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use studon_core::auth::DEFAULT_COOKIE_NAME;
use studon_core::{ClientOptions, RunRequest, SessionCredentials};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::DownloadArgs;

/// Effective settings for one invocation.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) url: Option<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) cookie_name: String,
    pub(crate) cookie_value: Option<String>,
    pub(crate) client_options: ClientOptions,
    pub(crate) verbosity: VerbositySetting,
    /// Extra `-v` occurrences beyond the first (for `-vvv` → trace).
    pub(crate) extra_verbose: u8,
    pub(crate) list_only: bool,
}

impl Settings {
    /// Builds the library request from the effective settings.
    pub(crate) fn run_request(&self) -> RunRequest {
        RunRequest::new(
            self.url.clone().unwrap_or_default(),
            self.output_dir.clone(),
            SessionCredentials::new(
                self.cookie_name.clone(),
                self.cookie_value.clone().unwrap_or_default(),
            ),
        )
    }

    /// Whether progress output should be suppressed.
    pub(crate) fn quiet(&self) -> bool {
        self.verbosity == VerbositySetting::Quiet
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub(crate) fn tracing_level(&self) -> &'static str {
        match self.verbosity {
            VerbositySetting::Quiet => "error",
            VerbositySetting::Default => "warn",
            VerbositySetting::Verbose => "info",
            VerbositySetting::Debug if self.extra_verbose > 1 => "trace",
            VerbositySetting::Debug => "debug",
        }
    }
}

/// Resolves effective settings. CLI values win over the config file, which
/// wins over built-in defaults.
pub(crate) fn resolve_settings(args: &DownloadArgs, file_config: Option<&FileConfig>) -> Settings {
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file_config.and_then(|cfg| cfg.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));

    let cookie_name = args
        .cookie_name
        .clone()
        .or_else(|| file_config.and_then(|cfg| cfg.cookie_name.clone()))
        .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

    let client_options = ClientOptions {
        connect_timeout: file_config
            .and_then(|cfg| cfg.connect_timeout_secs)
            .map(Duration::from_secs),
        read_timeout: file_config
            .and_then(|cfg| cfg.read_timeout_secs)
            .map(Duration::from_secs),
    };

    let verbosity = cli_verbosity(args)
        .or_else(|| file_config.and_then(|cfg| cfg.verbosity))
        .unwrap_or(VerbositySetting::Default);

    Settings {
        url: args.url.clone(),
        output_dir,
        cookie_name,
        cookie_value: args.cookie_value.clone(),
        client_options,
        verbosity,
        extra_verbose: args.verbose.saturating_sub(1),
        list_only: args.list_only,
    }
}

fn cli_verbosity(args: &DownloadArgs) -> Option<VerbositySetting> {
    if args.quiet {
        return Some(VerbositySetting::Quiet);
    }
    match args.verbose {
        0 => None,
        1 => Some(VerbositySetting::Verbose),
        _ => Some(VerbositySetting::Debug),
    }
}
