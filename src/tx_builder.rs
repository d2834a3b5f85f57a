use ethers_core::types::{Address, Bytes, Signature, TransactionRequest, U256};
use serde::{Deserialize, Serialize};

use crate::device::{DeviceSignature, EthTxRequest};
use crate::error::{ProviderError, Result};

/// Transaction fields as the provider chain hands them over: hex strings,
/// any of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nonce: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// Strip `0x`, left-pad odd lengths with a single zero, lowercase.
/// A missing value becomes the empty string.
pub fn normalize(hex: Option<&str>) -> String {
	let Some(hex) = hex else {
		return String::new();
	};
	let hex = hex
		.strip_prefix("0x")
		.or_else(|| hex.strip_prefix("0X"))
		.unwrap_or(hex);
	let mut out = String::with_capacity(hex.len() + 1);
	if hex.len() % 2 != 0 {
		out.push('0');
	}
	out.push_str(&hex.to_ascii_lowercase());
	out
}

/// The field set handed to the device, every value normalized.
pub fn device_request(params: &TxParams) -> EthTxRequest {
	EthTxRequest {
		nonce: normalize(params.nonce.as_deref()),
		gas_price: normalize(params.gas_price.as_deref()),
		gas_limit: normalize(params.gas.as_deref()),
		to: normalize(params.to.as_deref()),
		value: normalize(params.value.as_deref()),
		data: normalize(params.data.as_deref()),
	}
}

/// Decode the caller's field values into an unsigned legacy transaction.
pub fn unsigned_transaction(params: &TxParams) -> Result<TransactionRequest> {
	let mut tx = TransactionRequest::new()
		.nonce(uint("nonce", params.nonce.as_deref())?)
		.gas_price(uint("gasPrice", params.gas_price.as_deref())?)
		.gas(uint("gas", params.gas.as_deref())?)
		.value(uint("value", params.value.as_deref())?)
		.data(Bytes::from(bytes("data", params.data.as_deref())?));

	// No recipient means contract creation.
	if let Some(to) = address(params.to.as_deref())? {
		tx = tx.to(to);
	}
	Ok(tx)
}

/// RLP-encode `tx` with the device signature, as `0x`-prefixed hex.
pub fn encode_signed(tx: &TransactionRequest, sig: &DeviceSignature) -> Result<String> {
	let signature = Signature {
		r: uint("r", Some(sig.r.as_str()))?,
		s: uint("s", Some(sig.s.as_str()))?,
		v: sig.v,
	};
	let encoded = tx.rlp_signed(&signature);
	Ok(format!("0x{}", hex::encode(encoded.as_ref())))
}

// -- Field decoding --

fn bytes(field: &'static str, raw: Option<&str>) -> Result<Vec<u8>> {
	hex::decode(normalize(raw)).map_err(|e| ProviderError::field(field, e.to_string()))
}

fn uint(field: &'static str, raw: Option<&str>) -> Result<U256> {
	let be = bytes(field, raw)?;
	if be.len() > 32 {
		return Err(ProviderError::field(field, "value exceeds 256 bits"));
	}
	Ok(U256::from_big_endian(&be))
}

fn address(raw: Option<&str>) -> Result<Option<Address>> {
	let be = bytes("to", raw)?;
	match be.len() {
		0 => Ok(None),
		20 => Ok(Some(Address::from_slice(&be))),
		n => Err(ProviderError::field("to", format!("expected 20 bytes, got {n}"))),
	}
}
