use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use crate::cli::PromptCommand;

/// Layout of the scrambled matrix shown on the device. The user types the
/// positions, not the digits displayed.
const PIN_MATRIX: &str = "  7 8 9\n  4 5 6\n  1 2 3";

/// The helper reads plain lines, so the passphrase shows as it is typed.
const PASSPHRASE_NOTICE: &str = "Note: the passphrase is echoed as you type it.";

pub fn run(cmd: &PromptCommand) -> Result<()> {
	let answer = match cmd {
		PromptCommand::Pin => {
			eprintln!("Enter your PIN using the positions shown on the device:");
			eprintln!("{PIN_MATRIX}");
			validate_pin(&read_line("PIN: ")?)?
		}
		PromptCommand::Passphrase => {
			eprintln!("{PASSPHRASE_NOTICE}");
			read_line("Passphrase: ")?
		}
	};

	// stdout carries only the answer; the caller captures it.
	println!("{answer}");
	Ok(())
}

/// Accept a PIN made of matrix positions 1-9.
pub fn validate_pin(input: &str) -> Result<String> {
	let pin = input.trim();
	if pin.is_empty() {
		bail!("PIN must not be empty");
	}
	if let Some(bad) = pin.chars().find(|c| !('1'..='9').contains(c)) {
		bail!("invalid PIN character {bad:?}: use matrix positions 1-9");
	}
	Ok(pin.to_owned())
}

fn read_line(label: &str) -> Result<String> {
	let mut stderr = io::stderr();
	write!(stderr, "{label}")?;
	stderr.flush()?;

	let mut line = String::new();
	if io::stdin().lock().read_line(&mut line)? == 0 {
		bail!("no input");
	}
	Ok(line.trim_end_matches(&['\r', '\n'][..]).to_owned())
}
