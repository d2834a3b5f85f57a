use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::CredentialPrompt;
use crate::config::PromptConfig;
use crate::device::PinKind;
use crate::error::PromptError;

/// Asks for credentials by running an external helper command.
///
/// The helper talks to the user on the terminal (stdin and stderr are
/// inherited) and prints the answer on stdout, which is captured and
/// trimmed.
#[derive(Debug, Clone)]
pub struct CommandPrompt {
	pin_command: String,
	passphrase_command: String,
}

impl CommandPrompt {
	pub fn new(pin_command: impl Into<String>, passphrase_command: impl Into<String>) -> Self {
		Self {
			pin_command: pin_command.into(),
			passphrase_command: passphrase_command.into(),
		}
	}

	pub fn from_config(config: &PromptConfig) -> Self {
		Self::new(&config.pin_command, &config.passphrase_command)
	}
}

#[async_trait::async_trait]
impl CredentialPrompt for CommandPrompt {
	async fn pin(&self, _kind: PinKind) -> Result<String, PromptError> {
		run(&self.pin_command).await
	}

	async fn passphrase(&self) -> Result<String, PromptError> {
		run(&self.passphrase_command).await
	}
}

/// Run `command` through the platform shell and return its trimmed stdout.
pub async fn run(command: &str) -> Result<String, PromptError> {
	debug!(%command, "running credential prompt");

	let output = shell(command)
		.stdin(Stdio::inherit())
		.stderr(Stdio::inherit())
		.stdout(Stdio::piped())
		.output()
		.await
		.map_err(|source| PromptError::Spawn {
			command: command.to_owned(),
			source,
		})?;

	if !output.status.success() {
		return Err(PromptError::Failed {
			command: command.to_owned(),
			status: output.status,
		});
	}

	let stdout = String::from_utf8(output.stdout).map_err(|_| PromptError::InvalidOutput)?;
	Ok(stdout.trim().to_owned())
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
	let mut cmd = Command::new("cmd");
	cmd.arg("/C").arg(command);
	cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
	let mut cmd = Command::new("sh");
	cmd.arg("-c").arg(command);
	cmd
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;

	#[tokio::test]
	async fn captures_trimmed_stdout() {
		let prompt = CommandPrompt::new("echo '  1357 '", "printf 'correct horse\\n'");
		assert_eq!(prompt.pin(PinKind::Current).await.unwrap(), "1357");
		assert_eq!(prompt.passphrase().await.unwrap(), "correct horse");
	}

	#[tokio::test]
	async fn non_zero_exit_is_an_error() {
		let prompt = CommandPrompt::new("exit 3", "false");
		assert!(matches!(
			prompt.pin(PinKind::Current).await,
			Err(PromptError::Failed { .. })
		));
		assert!(matches!(
			prompt.passphrase().await,
			Err(PromptError::Failed { .. })
		));
	}
}
