use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::path::DEFAULT_PATH;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
	/// BIP-32 path of the account the provider exposes.
	#[serde(default = "default_path")]
	pub derivation_path: String,
	#[serde(default)]
	pub prompt: PromptConfig,
}

/// Shell commands used to ask the user for credentials. Each prints the
/// answer on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
	pub pin_command: String,
	pub passphrase_command: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			derivation_path: default_path(),
			prompt: PromptConfig::default(),
		}
	}
}

impl Default for PromptConfig {
	fn default() -> Self {
		Self {
			pin_command: "trezor-provider prompt pin".into(),
			passphrase_command: "trezor-provider prompt passphrase".into(),
		}
	}
}

fn default_path() -> String {
	DEFAULT_PATH.into()
}

impl Config {
	/// Directory where provider state is stored (~/.trezor-provider/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		let home = dirs::home_dir()
			.ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
		Ok(home.join(".trezor-provider"))
	}

	/// Path to the config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from the default location, falling back to defaults if
	/// no file exists.
	pub fn load() -> anyhow::Result<Self> {
		Self::load_from(&Self::path()?)
	}

	pub fn load_from(path: &Path) -> anyhow::Result<Self> {
		if path.exists() {
			let content = std::fs::read_to_string(path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist to the default location, creating the directory if needed.
	pub fn save(&self) -> anyhow::Result<()> {
		self.save_to(&Self::path()?)
	}

	pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, toml::to_string_pretty(self)?)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sensible() {
		let c = Config::default();
		assert_eq!(c.derivation_path, "m/44'/60'/0'/0/0");
		assert_eq!(c.prompt.pin_command, "trezor-provider prompt pin");
		assert_eq!(c.prompt.passphrase_command, "trezor-provider prompt passphrase");
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let parsed: Config = toml::from_str("derivation_path = \"m/44'/60'/0'/0/3\"\n").unwrap();
		assert_eq!(parsed.derivation_path, "m/44'/60'/0'/0/3");
		assert_eq!(parsed.prompt, PromptConfig::default());
	}

	#[test]
	fn save_and_load_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("config.toml");

		let mut c = Config::default();
		c.prompt.pin_command = "my-pin-dialog".into();
		c.save_to(&path).unwrap();

		let loaded = Config::load_from(&path).unwrap();
		assert_eq!(loaded, c);
	}

	#[test]
	fn missing_file_gives_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
		assert_eq!(loaded, Config::default());
	}
}
