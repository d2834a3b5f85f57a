use crate::error::{ProviderError, Result};

/// Local view of the account nonce.
///
/// Remote nodes sometimes report a stale transaction count. As long as
/// nothing else sends from the same account, bumping our own counter keeps
/// consecutive transactions from colliding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceTracker {
	cached: Option<u64>,
}

impl NonceTracker {
	/// The cached nonce, `None` until a transaction has been signed.
	pub fn cached(&self) -> Option<u64> {
		self.cached
	}

	/// Reconcile the caller's nonce against the cache.
	///
	/// Returns `Some(hex)` when the caller's value must be replaced by
	/// the bumped counter, `None` when it was adopted as is. A cached zero
	/// counts as unset.
	pub fn reconcile(&mut self, requested: u64) -> Result<Option<String>> {
		match self.cached {
			Some(cached) if cached >= 1 && requested <= cached => {
				let bumped = cached
					.checked_add(1)
					.ok_or_else(|| ProviderError::field("nonce", "nonce overflow"))?;
				self.cached = Some(bumped);
				Ok(Some(format!("0x{bumped:x}")))
			}
			_ => {
				self.cached = Some(requested);
				Ok(None)
			}
		}
	}
}

/// Parse a nonce given as `0x` hex or plain decimal.
pub fn parse_nonce(raw: &str) -> Result<u64> {
	let raw = raw.trim();
	let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16),
		None => raw.parse(),
	};
	parsed.map_err(|e| ProviderError::field("nonce", format!("`{raw}`: {e}")))
}
