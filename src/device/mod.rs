pub mod scripted;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::error::{DeviceError, PromptError};

/// Transaction fields as sent to the device: even-length lowercase hex,
/// no `0x` prefix, empty for absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthTxRequest {
	pub nonce: String,
	pub gas_price: String,
	pub gas_limit: String,
	pub to: String,
	pub value: String,
	pub data: String,
}

/// Signature components returned by the device. `r` and `s` are hex,
/// with or without `0x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSignature {
	pub v: u64,
	pub r: String,
	pub s: String,
}

/// Which PIN the device is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
	Current,
	NewFirst,
	NewSecond,
}

/// Where the answer to a credential request goes.
pub type CredentialReply = oneshot::Sender<Result<String, PromptError>>;

/// Events a connected device raises while a session is open.
#[derive(Debug)]
pub enum DeviceEvent {
	Passphrase { reply: CredentialReply },
	Pin { kind: PinKind, reply: CredentialReply },
	Disconnect,
}

/// An open channel to one device.
#[async_trait::async_trait]
pub trait DeviceSession: Send + Sync {
	/// Derive the Ethereum address at `path`. Returns hex, the `0x`
	/// prefix being optional.
	async fn ethereum_get_address(&self, path: &[u32], display: bool) -> Result<String, DeviceError>;

	/// Ask the device to sign a legacy transaction at `path`.
	async fn sign_eth_tx(&self, path: &[u32], tx: &EthTxRequest) -> Result<DeviceSignature, DeviceError>;
}

/// A device picked by [`DeviceList::acquire_first_device`], with the
/// stream of events it raises.
pub struct AcquiredDevice {
	pub session: Arc<dyn DeviceSession>,
	pub events: mpsc::UnboundedReceiver<DeviceEvent>,
}

/// Device enumeration, implemented by the USB/bridge transport.
#[async_trait::async_trait]
pub trait DeviceList: Send + Sync {
	async fn acquire_first_device(&self) -> Result<AcquiredDevice, DeviceError>;
}
