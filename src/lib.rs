pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod nonce;
pub mod path;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod tx_builder;

pub use error::{DeviceError, PromptError, ProviderError};
pub use provider::{TrezorProvider, WalletHooks};
pub use session::{SessionHandle, SessionManager, SessionRegistry, SessionState};
pub use tx_builder::TxParams;
