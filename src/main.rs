use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trezor_provider::cli::{Cli, Command};
use trezor_provider::commands;

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging();

	match &cli.command {
		Command::Prompt { command } => commands::prompt::run(command),
		Command::Config { command } => {
			let path = commands::resolve_config_path(&cli)?;
			commands::config::run(&path, command)
		}
	}
}

/// Log to stderr; stdout is reserved for prompt answers.
fn init_logging() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
