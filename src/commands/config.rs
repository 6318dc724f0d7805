//! Config command handlers: show effective configuration.

use anyhow::Result;

use crate::app::config_runtime::Settings;
use crate::app::exit_handler::ProcessExit;
use crate::app_config::LoadedConfig;

pub(crate) fn run_config_show_command(
    settings: &Settings,
    loaded_config: &LoadedConfig,
) -> Result<ProcessExit> {
    for line in render_config_lines(settings, loaded_config) {
        println!("{line}");
    }
    Ok(ProcessExit::Success)
}

fn render_config_lines(settings: &Settings, loaded_config: &LoadedConfig) -> Vec<String> {
    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    let timeout_label = |value: Option<std::time::Duration>| {
        value.map_or_else(|| "none".to_string(), |d| format!("{}s", d.as_secs()))
    };
    vec![
        format!("config_path = {resolved_path}"),
        format!(
            "config_file = {}",
            if loaded_config.loaded_from_file() {
                "loaded"
            } else {
                "not found (using defaults)"
            }
        ),
        format!("output_dir = {}", settings.output_dir.display()),
        format!("cookie_name = {}", settings.cookie_name),
        format!(
            "cookie_value = {}",
            if settings.cookie_value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
                "<set>"
            } else {
                "<unset>"
            }
        ),
        format!(
            "connect_timeout = {}",
            timeout_label(settings.client_options.connect_timeout)
        ),
        format!(
            "read_timeout = {}",
            timeout_label(settings.client_options.read_timeout)
        ),
        format!("verbosity = {}", settings.verbosity.as_str()),
    ]
}
