use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::path::DerivationPath;

pub fn run(config_path: &Path, cmd: &ConfigCommand) -> Result<()> {
	match cmd {
		ConfigCommand::Show => show(config_path),
		ConfigCommand::SetPath { path } => set_path(config_path, path),
		ConfigCommand::SetPrompt {
			pin_command,
			passphrase_command,
		} => set_prompt(config_path, pin_command.as_deref(), passphrase_command.as_deref()),
	}
}

fn show(config_path: &Path) -> Result<()> {
	let config = Config::load_from(config_path)?;

	println!("Provider");
	println!("  Config:     {}", config_path.display());
	println!("  Path:       {}", config.derivation_path);
	println!("  PIN:        {}", config.prompt.pin_command);
	println!("  Passphrase: {}", config.prompt.passphrase_command);
	Ok(())
}

fn set_path(config_path: &Path, path: &str) -> Result<()> {
	let parsed = DerivationPath::parse(path)?;

	let mut config = Config::load_from(config_path)?;
	config.derivation_path = parsed.to_string();
	config.save_to(config_path)?;
	println!("Derivation path set to: {parsed}");
	Ok(())
}

fn set_prompt(
	config_path: &Path,
	pin_command: Option<&str>,
	passphrase_command: Option<&str>,
) -> Result<()> {
	if pin_command.is_none() && passphrase_command.is_none() {
		anyhow::bail!("nothing to change: pass --pin-command and/or --passphrase-command");
	}

	let mut config = Config::load_from(config_path)?;
	if let Some(cmd) = pin_command {
		config.prompt.pin_command = cmd.to_owned();
	}
	if let Some(cmd) = passphrase_command {
		config.prompt.passphrase_command = cmd.to_owned();
	}
	config.save_to(config_path)?;
	println!("Prompt commands updated.");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_path_stores_canonical_form() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("config.toml");

		set_path(&file, " m/44'/60'/0'/0/2 ").unwrap();
		let config = Config::load_from(&file).unwrap();
		assert_eq!(config.derivation_path, "m/44'/60'/0'/0/2");
	}

	#[test]
	fn set_path_rejects_invalid_path() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("config.toml");

		assert!(set_path(&file, "m/forty-four").is_err());
		assert!(!file.exists());
	}

	#[test]
	fn set_prompt_changes_only_given_command() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("config.toml");

		set_prompt(&file, Some("zenity --password"), None).unwrap();
		let config = Config::load_from(&file).unwrap();
		assert_eq!(config.prompt.pin_command, "zenity --password");
		assert_eq!(config.prompt.passphrase_command, "trezor-provider prompt passphrase");
		assert!(set_prompt(&file, None, None).is_err());
	}
}
