pub mod command;
pub mod fixed;

use crate::device::PinKind;
use crate::error::PromptError;

pub use command::CommandPrompt;
pub use fixed::FixedPrompt;

/// Answers the device's PIN and passphrase challenges.
///
/// The session manager asks whenever the device raises a credential
/// event; how the user is asked (terminal helper, GUI dialog, script) is
/// up to the implementation.
#[async_trait::async_trait]
pub trait CredentialPrompt: Send + Sync {
	/// The PIN as matrix positions (digits 1-9).
	async fn pin(&self, kind: PinKind) -> Result<String, PromptError>;

	async fn passphrase(&self) -> Result<String, PromptError>;
}
