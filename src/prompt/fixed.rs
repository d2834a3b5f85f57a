use parking_lot::Mutex;

use super::CredentialPrompt;
use crate::device::PinKind;
use crate::error::PromptError;

/// Answers every challenge with preset values. `None` cancels.
#[derive(Debug, Default)]
pub struct FixedPrompt {
	pin: Option<String>,
	passphrase: Option<String>,
	asked: Mutex<Vec<&'static str>>,
}

impl FixedPrompt {
	pub fn new(pin: Option<&str>, passphrase: Option<&str>) -> Self {
		Self {
			pin: pin.map(str::to_owned),
			passphrase: passphrase.map(str::to_owned),
			asked: Mutex::new(Vec::new()),
		}
	}

	/// Which challenges were answered, in order (`"pin"` or `"passphrase"`).
	pub fn asked(&self) -> Vec<&'static str> {
		self.asked.lock().clone()
	}
}

#[async_trait::async_trait]
impl CredentialPrompt for FixedPrompt {
	async fn pin(&self, _kind: PinKind) -> Result<String, PromptError> {
		self.asked.lock().push("pin");
		self.pin.clone().ok_or(PromptError::Cancelled)
	}

	async fn passphrase(&self) -> Result<String, PromptError> {
		self.asked.lock().push("passphrase");
		self.passphrase.clone().ok_or(PromptError::Cancelled)
	}
}
