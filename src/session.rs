use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::device::{AcquiredDevice, DeviceEvent, DeviceList, DeviceSession};
use crate::error::{ProviderError, Result};
use crate::nonce::{self, NonceTracker};
use crate::path::DerivationPath;
use crate::prompt::CredentialPrompt;
use crate::tx_builder::{self, TxParams};

/// Observable lifecycle of a device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Uninitialized,
	Connecting,
	Ready,
	Disconnected,
	Failed,
}

#[derive(Clone)]
enum Link {
	Uninitialized,
	Connecting,
	Ready(Arc<dyn DeviceSession>),
	Disconnected,
	Failed(String),
}

impl Link {
	fn state(&self) -> SessionState {
		match self {
			Self::Uninitialized => SessionState::Uninitialized,
			Self::Connecting => SessionState::Connecting,
			Self::Ready(_) => SessionState::Ready,
			Self::Disconnected => SessionState::Disconnected,
			Self::Failed(_) => SessionState::Failed,
		}
	}

	/// Initialization has an outcome.
	fn is_settled(&self) -> bool {
		!matches!(self, Self::Uninitialized | Self::Connecting)
	}
}

pub type SessionHandle = Arc<SessionManager>;

/// One shared connection to one Trezor.
///
/// Initialization runs once in the background. Every operation waits for
/// its outcome, so a failure reaches all callers instead of leaving them
/// pending. The address found at initialization stays cached for the
/// lifetime of the manager, across disconnects and path changes.
pub struct SessionManager {
	devices: Arc<dyn DeviceList>,
	prompt: Arc<dyn CredentialPrompt>,
	path: RwLock<DerivationPath>,
	address: RwLock<Option<String>>,
	nonce: Mutex<NonceTracker>,
	link: watch::Sender<Link>,
	// The device accepts one outstanding request per session.
	device_lock: tokio::sync::Mutex<()>,
}

impl SessionManager {
	/// Create a manager and start acquiring the device in the background.
	/// Fails with [`ProviderError::NoRuntime`] outside a Tokio runtime.
	pub fn connect(
		devices: Arc<dyn DeviceList>,
		prompt: Arc<dyn CredentialPrompt>,
		path: DerivationPath,
	) -> Result<SessionHandle> {
		let runtime = Handle::try_current().map_err(|_| ProviderError::NoRuntime)?;
		let (link, _) = watch::channel(Link::Uninitialized);
		let manager = Arc::new(Self {
			devices,
			prompt,
			path: RwLock::new(path),
			address: RwLock::new(None),
			nonce: Mutex::new(NonceTracker::default()),
			link,
			device_lock: tokio::sync::Mutex::new(()),
		});

		let task = manager.clone();
		runtime.spawn(async move { task.initialize().await });
		Ok(manager)
	}

	pub fn state(&self) -> SessionState {
		self.link.borrow().state()
	}

	/// The cached address, once initialization has found it.
	pub fn address(&self) -> Option<String> {
		self.address.read().clone()
	}

	pub fn path(&self) -> DerivationPath {
		self.path.read().clone()
	}

	/// Point later requests at another path. This neither reconnects nor
	/// re-derives the cached address; see [`refresh_address`].
	///
	/// [`refresh_address`]: Self::refresh_address
	pub fn set_path(&self, path: DerivationPath) {
		debug!(%path, "retargeting session");
		*self.path.write() = path;
	}

	/// The cached nonce, `None` until a transaction has been signed.
	pub fn nonce(&self) -> Option<u64> {
		self.nonce.lock().cached()
	}

	pub async fn get_accounts(&self) -> Result<Vec<String>> {
		if let Link::Failed(reason) = self.settled().await {
			return Err(ProviderError::InitFailed(reason));
		}
		self.address()
			.map(|address| vec![address])
			.ok_or(ProviderError::Disconnected)
	}

	/// Sign `params` on the device and return the `0x`-prefixed RLP of the
	/// signed transaction.
	pub async fn sign_transaction(&self, mut params: TxParams) -> Result<String> {
		self.reconcile_nonce(&mut params)?;
		let unsigned = tx_builder::unsigned_transaction(&params)?;
		let request = tx_builder::device_request(&params);

		let session = self.live_session().await?;
		let path = self.path();
		let signature = {
			let _device = self.device_lock.lock().await;
			session.sign_eth_tx(path.indices(), &request).await?
		};

		tx_builder::encode_signed(&unsigned, &signature)
	}

	/// Query the address for the current path again and replace the cache.
	pub async fn refresh_address(&self) -> Result<String> {
		let session = self.live_session().await?;
		let path = self.path();
		let address = {
			let _device = self.device_lock.lock().await;
			fetch_address(session.as_ref(), &path).await?
		};
		info!("Current address: {address}");
		*self.address.write() = Some(address.clone());
		Ok(address)
	}

	fn reconcile_nonce(&self, params: &mut TxParams) -> Result<()> {
		let raw = params
			.nonce
			.as_deref()
			.ok_or_else(|| ProviderError::field("nonce", "missing"))?;
		let requested = nonce::parse_nonce(raw)?;

		if let Some(bumped) = self.nonce.lock().reconcile(requested)? {
			debug!(requested, nonce = %bumped, "replacing stale nonce");
			params.nonce = Some(bumped);
		}
		Ok(())
	}

	async fn settled(&self) -> Link {
		let mut rx = self.link.subscribe();
		let link = match rx.wait_for(Link::is_settled).await {
			Ok(link) => link.clone(),
			Err(_) => Link::Failed("session closed".into()),
		};
		link
	}

	async fn live_session(&self) -> Result<Arc<dyn DeviceSession>> {
		match self.settled().await {
			Link::Ready(session) => Ok(session),
			Link::Failed(reason) => Err(ProviderError::InitFailed(reason)),
			_ => Err(ProviderError::Disconnected),
		}
	}

	// -- Initialization --

	async fn initialize(self: Arc<Self>) {
		self.link.send_replace(Link::Connecting);

		match self.establish().await {
			Ok(session) => {
				self.link.send_if_modified(|link| {
					if matches!(link, Link::Connecting) {
						*link = Link::Ready(session);
						true
					} else {
						false
					}
				});
			}
			Err(e) => {
				error!(error = %e, "failed to initialize Trezor session");
				self.link.send_replace(Link::Failed(e.to_string()));
			}
		}
	}

	async fn establish(self: &Arc<Self>) -> Result<Arc<dyn DeviceSession>> {
		let AcquiredDevice { session, events } = self.devices.acquire_first_device().await?;
		tokio::spawn(watch_events(Arc::downgrade(self), events));

		let path = self.path();
		let address = {
			let _device = self.device_lock.lock().await;
			fetch_address(session.as_ref(), &path).await?
		};

		info!("Current address: {address}");
		*self.address.write() = Some(address);
		Ok(session)
	}

	async fn handle_event(&self, event: DeviceEvent) {
		match event {
			DeviceEvent::Passphrase { reply } => {
				let _ = reply.send(self.prompt.passphrase().await);
			}
			DeviceEvent::Pin { kind, reply } => {
				let _ = reply.send(self.prompt.pin(kind).await);
			}
			DeviceEvent::Disconnect => {
				warn!("Disconnected device");
				self.link.send_if_modified(|link| {
					if matches!(link, Link::Ready(_) | Link::Connecting) {
						*link = Link::Disconnected;
						true
					} else {
						false
					}
				});
			}
		}
	}
}

async fn watch_events(manager: Weak<SessionManager>, mut events: mpsc::UnboundedReceiver<DeviceEvent>) {
	while let Some(event) = events.recv().await {
		let Some(manager) = manager.upgrade() else {
			break;
		};
		manager.handle_event(event).await;
	}
}

async fn fetch_address(session: &dyn DeviceSession, path: &DerivationPath) -> Result<String> {
	let raw = session.ethereum_get_address(path.indices(), false).await?;
	let hex = raw.strip_prefix("0x").unwrap_or(&raw);
	Ok(format!("0x{}", hex.to_ascii_lowercase()))
}

// -- Registry --

/// Hands out the single session for a device backend.
///
/// The first [`init`](Self::init) creates the session and starts
/// connecting; later calls return the same session with its target path
/// replaced.
pub struct SessionRegistry {
	devices: Arc<dyn DeviceList>,
	prompt: Arc<dyn CredentialPrompt>,
	session: Mutex<Option<SessionHandle>>,
}

impl SessionRegistry {
	pub fn new(devices: Arc<dyn DeviceList>, prompt: Arc<dyn CredentialPrompt>) -> Self {
		Self {
			devices,
			prompt,
			session: Mutex::new(None),
		}
	}

	pub fn init(&self, path: DerivationPath) -> Result<SessionHandle> {
		let mut slot = self.session.lock();
		if let Some(existing) = slot.as_ref() {
			existing.set_path(path);
			return Ok(existing.clone());
		}

		let session = SessionManager::connect(self.devices.clone(), self.prompt.clone(), path)?;
		*slot = Some(session.clone());
		Ok(session)
	}

	pub fn current(&self) -> Option<SessionHandle> {
		self.session.lock().clone()
	}
}
