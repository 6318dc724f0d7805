//! Runtime plumbing for the binary: settings resolution, terminal output and
//! exit codes.

pub(crate) mod config_runtime;
pub(crate) mod exit_handler;
pub(crate) mod progress_manager;
pub(crate) mod terminal;
pub(crate) mod validation;
