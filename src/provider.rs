use crate::config::Config;
use crate::error::Result;
use crate::path::DerivationPath;
use crate::session::{SessionHandle, SessionRegistry};
use crate::tx_builder::TxParams;

/// The two extension points a hooked-wallet provider chain calls for
/// account listing and transaction signing.
#[async_trait::async_trait]
pub trait WalletHooks: Send + Sync {
	async fn get_accounts(&self) -> Result<Vec<String>>;

	/// Returns the signed raw transaction as `0x`-prefixed hex.
	async fn sign_transaction(&self, params: TxParams) -> Result<String>;
}

/// Wallet hooks backed by the registry's Trezor session.
pub struct TrezorProvider {
	session: SessionHandle,
}

impl TrezorProvider {
	/// Parse `path` (e.g. `m/44'/60'/0'/0/0`) and bind to the registry's
	/// session for it.
	pub fn new(registry: &SessionRegistry, path: &str) -> Result<Self> {
		let path = DerivationPath::parse(path)?;
		Ok(Self {
			session: registry.init(path)?,
		})
	}

	/// Bind using the configured default derivation path.
	pub fn from_config(registry: &SessionRegistry, config: &Config) -> Result<Self> {
		Self::new(registry, &config.derivation_path)
	}

	pub fn session(&self) -> &SessionHandle {
		&self.session
	}
}

#[async_trait::async_trait]
impl WalletHooks for TrezorProvider {
	async fn get_accounts(&self) -> Result<Vec<String>> {
		self.session.get_accounts().await
	}

	async fn sign_transaction(&self, params: TxParams) -> Result<String> {
		self.session.sign_transaction(params).await
	}
}
