pub mod config;
pub mod prompt;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;

/// Resolve the config file from the CLI flag or the default location.
pub fn resolve_config_path(cli: &Cli) -> Result<PathBuf> {
	match &cli.config {
		Some(path) => Ok(path.clone()),
		None => Config::path(),
	}
}
