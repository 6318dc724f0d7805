//! CLI command handlers.

mod config;
mod download;
mod list;

pub(crate) use config::run_config_show_command;
pub(crate) use download::run_download_command;
pub(crate) use list::run_list_command;
