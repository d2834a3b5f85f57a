//! End-to-end tests of the provider hooks against the scripted device.

use std::sync::Arc;
use std::time::Duration;

use ethers_core::types::U256;
use ethers_core::utils::rlp::Rlp;

use trezor_provider::config::Config;
use trezor_provider::device::scripted::ScriptedDevice;
use trezor_provider::device::DeviceSignature;
use trezor_provider::prompt::FixedPrompt;
use trezor_provider::{
	ProviderError, SessionRegistry, SessionState, TrezorProvider, TxParams, WalletHooks,
};

const ADDRESS: &str = "0x9858effd232b4033e47d90003d41ec34ecaeda94";

fn registry(device: &ScriptedDevice) -> SessionRegistry {
	SessionRegistry::new(Arc::new(device.clone()), Arc::new(FixedPrompt::new(Some("1234"), Some(""))))
}

fn signature() -> DeviceSignature {
	DeviceSignature {
		v: 27,
		r: format!("0x{}", "ab".repeat(32)),
		s: format!("0x{}", "cd".repeat(32)),
	}
}

#[tokio::test]
async fn accounts_come_from_the_device() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);
	let provider = TrezorProvider::new(&registry, "m/44'/60'/0'/0/0").unwrap();

	assert_eq!(provider.get_accounts().await.unwrap(), vec![ADDRESS.to_owned()]);
}

#[tokio::test]
async fn signed_envelope_decodes_to_request_fields() {
	let device = ScriptedDevice::new(ADDRESS).with_signature(signature());
	let registry = registry(&device);
	let provider = TrezorProvider::new(&registry, "m/44'/60'/0'/0/0").unwrap();

	let params: TxParams = serde_json::from_value(serde_json::json!({
		"nonce": "0x01",
		"gasPrice": "0x4a817c800",
		"gas": "0x5208",
		"to": format!("0x{}", "11".repeat(20)),
		"value": "0x0",
		"data": null,
	}))
	.unwrap();

	let raw = provider.sign_transaction(params).await.unwrap();
	assert!(raw.starts_with("0x"));

	let bytes = hex::decode(&raw[2..]).unwrap();
	let rlp = Rlp::new(&bytes);
	assert_eq!(rlp.item_count().unwrap(), 9);
	assert_eq!(rlp.val_at::<U256>(0).unwrap(), U256::from(1));
	assert_eq!(rlp.val_at::<U256>(1).unwrap(), U256::from(20_000_000_000u64));
	assert_eq!(rlp.val_at::<U256>(2).unwrap(), U256::from(21_000));
	assert_eq!(rlp.val_at::<Vec<u8>>(3).unwrap(), vec![0x11; 20]);
	assert_eq!(rlp.val_at::<U256>(4).unwrap(), U256::zero());
	assert!(rlp.val_at::<Vec<u8>>(5).unwrap().is_empty());
	assert_eq!(rlp.val_at::<u64>(6).unwrap(), 27);
	assert_eq!(rlp.val_at::<Vec<u8>>(7).unwrap(), vec![0xab; 32]);
	assert_eq!(rlp.val_at::<Vec<u8>>(8).unwrap(), vec![0xcd; 32]);

	let (path, request) = device.sign_requests().pop().unwrap();
	assert_eq!(path, vec![0x8000_002C, 0x8000_003C, 0x8000_0000, 0, 0]);
	assert_eq!(request.nonce, "01");
	assert_eq!(request.gas_price, "04a817c800");
	assert_eq!(request.value, "00");
	assert_eq!(request.data, "");
}

#[tokio::test]
async fn second_provider_reuses_the_session() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);

	let first = TrezorProvider::new(&registry, "m/44'/60'/0'/0/0").unwrap();
	assert_eq!(first.get_accounts().await.unwrap(), vec![ADDRESS.to_owned()]);

	let second = TrezorProvider::new(&registry, "m/44'/60'/0'/0/1").unwrap();
	assert!(Arc::ptr_eq(first.session(), second.session()));
	assert_eq!(first.session().path().to_string(), "m/44'/60'/0'/0/1");

	// The address derived for the first path is still what both report.
	assert_eq!(second.get_accounts().await.unwrap(), vec![ADDRESS.to_owned()]);
	assert_eq!(device.acquisitions(), 1);
	assert_eq!(
		device.address_requests(),
		vec![vec![0x8000_002C, 0x8000_003C, 0x8000_0000, 0, 0]]
	);

	second
		.sign_transaction(TxParams {
			nonce: Some("0x0".into()),
			..Default::default()
		})
		.await
		.unwrap();
	let (path, _) = device.sign_requests().pop().unwrap();
	assert_eq!(path.last(), Some(&1));
}

#[tokio::test]
async fn disconnect_keeps_address_but_blocks_signing() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);
	let provider = TrezorProvider::new(&registry, "m/44'/60'/0'/0/0").unwrap();
	provider.get_accounts().await.unwrap();

	device.disconnect();
	for _ in 0..200 {
		if provider.session().state() == SessionState::Disconnected {
			break;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	assert_eq!(provider.session().state(), SessionState::Disconnected);

	assert_eq!(provider.get_accounts().await.unwrap(), vec![ADDRESS.to_owned()]);
	let err = provider
		.sign_transaction(TxParams {
			nonce: Some("0x2".into()),
			..Default::default()
		})
		.await
		.unwrap_err();
	assert!(matches!(err, ProviderError::Disconnected));
}

#[test]
fn provider_outside_a_runtime_is_an_error() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);

	assert!(matches!(
		TrezorProvider::new(&registry, "m/44'/60'/0'/0/0"),
		Err(ProviderError::NoRuntime)
	));
	assert!(registry.current().is_none());

	// The same registry works once a runtime is available.
	let runtime = tokio::runtime::Runtime::new().unwrap();
	runtime.block_on(async {
		let provider = TrezorProvider::new(&registry, "m/44'/60'/0'/0/0").unwrap();
		assert_eq!(provider.get_accounts().await.unwrap(), vec![ADDRESS.to_owned()]);
	});
}

#[tokio::test]
async fn invalid_path_is_rejected() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);

	assert!(matches!(
		TrezorProvider::new(&registry, "m/44'/x/0"),
		Err(ProviderError::InvalidPath { .. })
	));
	assert!(registry.current().is_none());
}

#[tokio::test]
async fn provider_from_config_uses_configured_path() {
	let device = ScriptedDevice::new(ADDRESS);
	let registry = registry(&device);
	let config = Config {
		derivation_path: "m/44'/60'/2'/0/0".into(),
		..Default::default()
	};

	let provider = TrezorProvider::from_config(&registry, &config).unwrap();
	provider.get_accounts().await.unwrap();
	assert_eq!(
		device.address_requests(),
		vec![vec![0x8000_002C, 0x8000_003C, 0x8000_0002, 0, 0]]
	);
}
