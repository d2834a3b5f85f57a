use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderError, Result};

/// Bit 31 marks a hardened BIP-32 index.
pub const HARDENED: u32 = 0x8000_0000;

/// The standard Ethereum account path, first address.
pub const DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

/// An ordered list of BIP-32 indices, hardened ones carrying [`HARDENED`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
	/// Parse `m/44'/60'/0'/0/0` style notation. Hardened segments may be
	/// marked with `'` or `h`.
	pub fn parse(path: &str) -> Result<Self> {
		let parsed = coins_bip32::path::DerivationPath::from_str(path.trim()).map_err(|e| {
			ProviderError::InvalidPath {
				path: path.to_owned(),
				reason: e.to_string(),
			}
		})?;
		let indices: Vec<u32> = parsed.iter().copied().collect();
		if indices.is_empty() {
			return Err(ProviderError::InvalidPath {
				path: path.to_owned(),
				reason: "path has no indices".into(),
			});
		}
		Ok(Self(indices))
	}

	pub fn indices(&self) -> &[u32] {
		&self.0
	}
}

impl Default for DerivationPath {
	fn default() -> Self {
		Self(vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0])
	}
}

impl From<Vec<u32>> for DerivationPath {
	fn from(indices: Vec<u32>) -> Self {
		Self(indices)
	}
}

impl FromStr for DerivationPath {
	type Err = ProviderError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl fmt::Display for DerivationPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("m")?;
		for index in &self.0 {
			if index & HARDENED != 0 {
				write!(f, "/{}'", index & !HARDENED)?;
			} else {
				write!(f, "/{index}")?;
			}
		}
		Ok(())
	}
}
