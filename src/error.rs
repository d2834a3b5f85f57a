use thiserror::Error;

/// Failures reported by the hardware wallet or its transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
	#[error("no Trezor device found")]
	NotFound,

	#[error("transport error: {0}")]
	Transport(String),

	#[error("action cancelled on device")]
	Cancelled,

	#[error("device failure: {0}")]
	Failure(String),

	#[error("device disconnected")]
	Disconnected,
}

/// Failures while asking the user for a PIN or passphrase.
#[derive(Debug, Error)]
pub enum PromptError {
	#[error("failed to run prompt command `{command}`: {source}")]
	Spawn {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("prompt command `{command}` exited with {status}")]
	Failed { command: String, status: std::process::ExitStatus },

	#[error("prompt output is not valid UTF-8")]
	InvalidOutput,

	#[error("prompt cancelled")]
	Cancelled,
}

#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("invalid derivation path `{path}`: {reason}")]
	InvalidPath { path: String, reason: String },

	#[error("invalid `{field}` field: {reason}")]
	InvalidField { field: &'static str, reason: String },

	#[error(transparent)]
	Device(#[from] DeviceError),

	#[error(transparent)]
	Prompt(#[from] PromptError),

	/// Initialization failed; the message is the original cause.
	#[error("device session failed to initialize: {0}")]
	InitFailed(String),

	#[error("device session is disconnected")]
	Disconnected,

	#[error("no Tokio runtime is running")]
	NoRuntime,
}

impl ProviderError {
	pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidField { field, reason: reason.into() }
	}
}

pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
