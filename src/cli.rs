use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
	name = "trezor-provider",
	about = "Credential helper and configuration for the Trezor wallet provider.",
	version
)]
pub struct Cli {
	/// Use this config file instead of ~/.trezor-provider/config.toml.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Ask for a credential on the terminal and print it to stdout.
	Prompt {
		#[command(subcommand)]
		command: PromptCommand,
	},

	/// Show or change the provider configuration.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

// -- Prompt subcommands --

#[derive(Subcommand)]
pub enum PromptCommand {
	/// Read the PIN as positions on the device's scrambled matrix.
	Pin,

	/// Read the wallet passphrase. The input is echoed to the terminal.
	Passphrase,
}


// -- Config subcommands --

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Show the current configuration.
	Show,

	/// Set the derivation path of the exposed account.
	SetPath {
		/// BIP-32 path, e.g. m/44'/60'/0'/0/0.
		path: String,
	},

	/// Set the commands used to ask for credentials.
	SetPrompt {
		/// Command that prints the PIN on stdout.
		#[arg(long)]
		pin_command: Option<String>,

		/// Command that prints the passphrase on stdout.
		#[arg(long)]
		passphrase_command: Option<String>,
	},
}
