use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};

use super::{
	AcquiredDevice, CredentialReply, DeviceEvent, DeviceList, DeviceSession, DeviceSignature,
	EthTxRequest, PinKind,
};
use crate::error::DeviceError;

/// An in-memory device that answers from preset values.
///
/// Useful for tests and for wiring a provider without hardware. It can
/// require a PIN and passphrase (raised as events, like a real device),
/// hold the address query until released, fail any step, and simulate a
/// disconnect.
#[derive(Clone)]
pub struct ScriptedDevice {
	script: Arc<Script>,
}

struct Script {
	address: Mutex<Result<String, DeviceError>>,
	signature: Mutex<Result<DeviceSignature, DeviceError>>,
	acquire_error: Mutex<Option<DeviceError>>,
	require_pin: AtomicBool,
	require_passphrase: AtomicBool,
	address_gate: watch::Sender<bool>,
	connected: AtomicBool,
	acquisitions: AtomicUsize,
	events: Mutex<Option<mpsc::UnboundedSender<DeviceEvent>>>,
	address_requests: Mutex<Vec<Vec<u32>>>,
	sign_requests: Mutex<Vec<(Vec<u32>, EthTxRequest)>>,
	credentials: Mutex<Vec<String>>,
}

impl ScriptedDevice {
	/// A device that reports `address` and signs with a fixed dummy
	/// signature.
	pub fn new(address: impl Into<String>) -> Self {
		let (address_gate, _) = watch::channel(true);
		Self {
			script: Arc::new(Script {
				address: Mutex::new(Ok(address.into())),
				signature: Mutex::new(Ok(DeviceSignature {
					v: 27,
					r: "11".repeat(32),
					s: "22".repeat(32),
				})),
				acquire_error: Mutex::new(None),
				require_pin: AtomicBool::new(false),
				require_passphrase: AtomicBool::new(false),
				address_gate,
				connected: AtomicBool::new(false),
				acquisitions: AtomicUsize::new(0),
				events: Mutex::new(None),
				address_requests: Mutex::new(Vec::new()),
				sign_requests: Mutex::new(Vec::new()),
				credentials: Mutex::new(Vec::new()),
			}),
		}
	}

	pub fn with_signature(self, signature: DeviceSignature) -> Self {
		*self.script.signature.lock() = Ok(signature);
		self
	}

	/// Ask for a PIN before answering the address query.
	pub fn with_pin(self) -> Self {
		self.script.require_pin.store(true, Ordering::SeqCst);
		self
	}

	/// Ask for a passphrase before answering the address query.
	pub fn with_passphrase(self) -> Self {
		self.script.require_passphrase.store(true, Ordering::SeqCst);
		self
	}

	pub fn failing_acquire(self, err: DeviceError) -> Self {
		*self.script.acquire_error.lock() = Some(err);
		self
	}

	pub fn failing_address(self, err: DeviceError) -> Self {
		*self.script.address.lock() = Err(err);
		self
	}

	pub fn failing_sign(self, err: DeviceError) -> Self {
		*self.script.signature.lock() = Err(err);
		self
	}

	/// Keep the address query pending until [`release_address`] is called.
	///
	/// [`release_address`]: Self::release_address
	pub fn holding_address(self) -> Self {
		self.script.address_gate.send_replace(false);
		self
	}

	pub fn release_address(&self) {
		self.script.address_gate.send_replace(true);
	}

	/// Change the address reported from now on.
	pub fn set_address(&self, address: impl Into<String>) {
		*self.script.address.lock() = Ok(address.into());
	}

	/// Unplug the device: raise `Disconnect` and fail further calls.
	pub fn disconnect(&self) {
		self.script.connected.store(false, Ordering::SeqCst);
		if let Some(events) = self.script.events.lock().take() {
			let _ = events.send(DeviceEvent::Disconnect);
		}
	}

	pub fn acquisitions(&self) -> usize {
		self.script.acquisitions.load(Ordering::SeqCst)
	}

	pub fn address_requests(&self) -> Vec<Vec<u32>> {
		self.script.address_requests.lock().clone()
	}

	pub fn sign_requests(&self) -> Vec<(Vec<u32>, EthTxRequest)> {
		self.script.sign_requests.lock().clone()
	}

	/// PINs and passphrases the device received, in order.
	pub fn credentials(&self) -> Vec<String> {
		self.script.credentials.lock().clone()
	}
}

#[async_trait::async_trait]
impl DeviceList for ScriptedDevice {
	async fn acquire_first_device(&self) -> Result<AcquiredDevice, DeviceError> {
		self.script.acquisitions.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.script.acquire_error.lock().clone() {
			return Err(err);
		}

		let (tx, rx) = mpsc::unbounded_channel();
		*self.script.events.lock() = Some(tx);
		self.script.connected.store(true, Ordering::SeqCst);

		Ok(AcquiredDevice {
			session: Arc::new(ScriptedSession { script: self.script.clone() }),
			events: rx,
		})
	}
}

struct ScriptedSession {
	script: Arc<Script>,
}

impl ScriptedSession {
	fn ensure_connected(&self) -> Result<(), DeviceError> {
		if self.script.connected.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(DeviceError::Disconnected)
		}
	}

	/// Raise a credential event and wait for the host's answer.
	async fn request_credential(
		&self,
		make: impl FnOnce(CredentialReply) -> DeviceEvent,
	) -> Result<(), DeviceError> {
		let (reply, answer) = oneshot::channel();
		{
			let events = self.script.events.lock();
			let events = events.as_ref().ok_or(DeviceError::Disconnected)?;
			events
				.send(make(reply))
				.map_err(|_| DeviceError::Transport("host stopped listening".into()))?;
		}

		match answer.await {
			Ok(Ok(value)) => {
				self.script.credentials.lock().push(value);
				Ok(())
			}
			Ok(Err(e)) => Err(DeviceError::Failure(e.to_string())),
			Err(_) => Err(DeviceError::Cancelled),
		}
	}
}

#[async_trait::async_trait]
impl DeviceSession for ScriptedSession {
	async fn ethereum_get_address(&self, path: &[u32], _display: bool) -> Result<String, DeviceError> {
		self.ensure_connected()?;
		self.script.address_requests.lock().push(path.to_vec());

		if self.script.require_pin.load(Ordering::SeqCst) {
			self.request_credential(|reply| DeviceEvent::Pin { kind: PinKind::Current, reply })
				.await?;
		}
		if self.script.require_passphrase.load(Ordering::SeqCst) {
			self.request_credential(|reply| DeviceEvent::Passphrase { reply })
				.await?;
		}

		let mut gate = self.script.address_gate.subscribe();
		let released = gate.wait_for(|open| *open).await.is_ok();
		if !released {
			return Err(DeviceError::Transport("device dropped".into()));
		}

		self.ensure_connected()?;
		self.script.address.lock().clone()
	}

	async fn sign_eth_tx(&self, path: &[u32], tx: &EthTxRequest) -> Result<DeviceSignature, DeviceError> {
		self.ensure_connected()?;
		self.script
			.sign_requests
			.lock()
			.push((path.to_vec(), tx.clone()));
		self.script.signature.lock().clone()
	}
}
