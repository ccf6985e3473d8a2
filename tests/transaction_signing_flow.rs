//! 交易签名全流程测试
//!
//! 公钥派生地址 → build_for_sign → 外部签名 → build_for_send，
//! 并用签名结果反推公钥，确认签的是正确的数据

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::*;
use ed25519_dalek::Signer;
use ironcore_chains::domain::fee::{Fee, FeeParameters};
use ironcore_chains::domain::transaction::{
    EthereumTransactionParams, FilecoinTransactionParams, KoinosTransactionParams,
    TransactionParams, XrpTransactionParams,
};
use ironcore_chains::domain::{
    AddressKind, AddressServiceFactory, Blockchain, CurveType, Transaction,
};
use ironcore_chains::service::transaction_builder::{
    AlgorandBuildContext, AlgorandTransactionBuilder, EthereumTransactionBuilder,
    FilecoinTransactionBuilder, KaspaBuildContext, KaspaTransactionBuilder, KaspaUnspentOutput,
    KoinosNetworkContext, KoinosTransactionBuilder, TransactionBuilder, XrpTransactionBuilder,
};
use ironcore_chains::utils::encoding::BASE64_URL;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use num_bigint::BigUint;

fn secp_signer() -> SigningKey {
    SigningKey::from_slice(&[7u8; 32]).unwrap()
}

fn secp_public_key(key: &SigningKey) -> Vec<u8> {
    key.verifying_key().to_encoded_point(true).as_bytes().to_vec()
}

/// `r || s || recovery_id`
fn sign_recoverable(key: &SigningKey, digest: &[u8]) -> Vec<u8> {
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest).unwrap();
    let mut out = signature.to_bytes().to_vec();
    out.push(recovery_id.to_byte());
    out
}

fn recover(digest: &[u8], signature: &[u8]) -> VerifyingKey {
    VerifyingKey::recover_from_prehash(
        digest,
        &Signature::from_slice(&signature[..64]).unwrap(),
        RecoveryId::from_byte(signature[64]).unwrap(),
    )
    .unwrap()
}

fn address_for(chain: Blockchain, public_key: &[u8]) -> String {
    AddressServiceFactory::create(chain)
        .unwrap()
        .make_address(public_key, AddressKind::Default)
        .unwrap()
}

#[test]
fn test_filecoin_sign_and_send() {
    let key = secp_signer();
    let source = address_for(Blockchain::Filecoin, &secp_public_key(&key));
    assert!(source.starts_with("f1"));

    let tx = Transaction::new(
        coin(Blockchain::Filecoin, "0.25"),
        Fee::with_parameters(
            coin(Blockchain::Filecoin, "0.000000153870978912"),
            FeeParameters::Filecoin {
                gas_limit: 1_527_953,
                gas_fee_cap: BigUint::from(100_704u32),
                gas_premium: BigUint::from(99_503u32),
            },
        ),
        source.clone(),
        "f16q2tssufbtldeqdubaj6h2io7jtk7tjt2m557ja",
    )
    .with_params(TransactionParams::Filecoin(FilecoinTransactionParams {
        nonce: 42,
    }));

    let builder = FilecoinTransactionBuilder::new();
    let digest = builder.build_for_sign(&tx, &()).unwrap();
    assert_eq!(digest.len(), 32);

    let signature = sign_recoverable(&key, &digest);
    let signed = builder.build_for_send(&tx, &(), &signature).unwrap();
    assert_eq!(signed.message.from, source);
    assert_eq!(signed.message.nonce, 42);
    assert_eq!(signed.message.value, "250000000000000000");

    let data = STANDARD.decode(&signed.signature.data).unwrap();
    assert_eq!(data, signature);
    assert_eq!(recover(&digest, &data), *key.verifying_key());
}

#[test]
fn test_ethereum_sign_and_send() {
    let key = secp_signer();
    let chain = Blockchain::Ethereum { testnet: false };
    let source = address_for(chain, &secp_public_key(&key));

    let tx = Transaction::new(
        coin(chain, "0.1"),
        Fee::with_parameters(
            coin(chain, "0.00042"),
            FeeParameters::Ethereum {
                gas_limit: 21_000,
                gas_price: BigUint::from(20_000_000_000u64),
            },
        ),
        source,
        "0x3535353535353535353535353535353535353535",
    )
    .with_params(TransactionParams::Ethereum(EthereumTransactionParams {
        nonce: 3,
        data: None,
    }));

    let builder = EthereumTransactionBuilder::new(chain).unwrap();
    let digest = builder.build_for_sign(&tx, &()).unwrap();
    let signature = sign_recoverable(&key, &digest);
    assert_eq!(recover(&digest, &signature), *key.verifying_key());

    let raw = builder.build_for_send(&tx, &(), &signature).unwrap();
    // RLP 列表，s 位于末尾（整数编码会去掉前导零字节）
    assert!(raw[0] >= 0xc0);
    assert!(hex::encode(&raw).ends_with(&hex::encode(&signature[33..64])));
}

#[test]
fn test_kaspa_sign_and_send() {
    let key = secp_signer();
    let chain = Blockchain::Kaspa { testnet: false };
    let source = address_for(chain, &secp_public_key(&key));
    let destination = address_for(chain, &hex::decode(SECP256K1_DESTINATION_KEY).unwrap());

    let tx = Transaction::new(coin(chain, "1.5"), Fee::new(coin(chain, "0.0001")), source, destination);
    let context = KaspaBuildContext::new(vec![
        KaspaUnspentOutput::new(&"11".repeat(32), 0, 100_000_000).unwrap(),
        KaspaUnspentOutput::new(&"22".repeat(32), 3, 100_000_000).unwrap(),
    ]);

    let builder = KaspaTransactionBuilder::new(false);
    let hashes = builder.build_for_sign(&tx, &context).unwrap();
    assert_eq!(hashes.len(), 64);

    // 每个输入独立签名
    let mut signatures = Vec::new();
    for hash in hashes.chunks(32) {
        let signature = sign_recoverable(&key, hash);
        assert_eq!(recover(hash, &signature), *key.verifying_key());
        signatures.extend_from_slice(&signature[..64]);
    }

    let dto = builder.build_for_send(&tx, &context, &signatures).unwrap();
    assert_eq!(dto.inputs.len(), 2);
    assert_eq!(
        dto.inputs[1].signature_script,
        format!("41{}01", hex::encode(&signatures[64..]))
    );
    // 2 - 1.5 - 0.0001
    assert_eq!(dto.outputs[0].amount, 150_000_000);
    assert_eq!(dto.outputs[1].amount, 49_990_000);
    assert_eq!(
        dto.outputs[1].script_public_key.script_public_key,
        format!("21{}ab", hex::encode(secp_public_key(&key)))
    );
}

#[test]
fn test_koinos_sign_and_send() {
    let key = secp_signer();
    let chain = Blockchain::Koinos { testnet: false };
    let source = address_for(chain, &secp_public_key(&key));

    let tx = Transaction::new(
        coin(chain, "2.5"),
        Fee::new(coin(chain, "0.3")),
        source.clone(),
        "1546ZQTmc2wD32ZEKkS3PEu6Msojxkv3fn",
    )
    .with_params(TransactionParams::Koinos(KoinosTransactionParams { nonce: 4 }));

    let context = KoinosNetworkContext::for_network(false);
    let builder = KoinosTransactionBuilder::new(false);
    let digest = builder.build_for_sign(&tx, &context).unwrap();
    let signature = sign_recoverable(&key, &digest);

    let dto = builder.build_for_send(&tx, &context, &signature).unwrap();
    assert_eq!(dto.header.payer, source);
    assert_eq!(dto.id, format!("0x1220{}", hex::encode(&digest)));
    assert_eq!(dto.header.rc_limit, "30000000");

    // 紧凑签名：31 + recovery_id 在前
    let compact = BASE64_URL.decode(&dto.signatures[0]).unwrap();
    assert_eq!(compact[0], 31 + signature[64]);
    let mut rebuilt = compact[1..].to_vec();
    rebuilt.push(compact[0] - 31);
    assert_eq!(recover(&digest, &rebuilt), *key.verifying_key());
}

#[test]
fn test_xrp_secp256k1_sign_and_send() {
    let key = secp_signer();
    let chain = Blockchain::Xrp {
        curve: CurveType::Secp256k1,
    };
    let public_key = secp_public_key(&key);
    let source = address_for(chain, &public_key);

    let tx = Transaction::new(
        coin(chain, "15"),
        Fee::new(coin(chain, "0.000012")),
        source,
        "rrpCDJ3yxMGC1XPfg1iMRVwsg8a8rar4fa",
    )
    .with_params(TransactionParams::Xrp(XrpTransactionParams {
        sequence: 21,
        destination_tag: None,
        last_ledger_sequence: Some(90_000_000),
    }));

    let builder = XrpTransactionBuilder::new(&public_key, CurveType::Secp256k1).unwrap();
    let hash = builder.build_for_sign(&tx, &()).unwrap();
    assert_eq!(hash.len(), 32);

    let (signature, _) = key.sign_prehash_recoverable(&hash).unwrap();
    let blob = builder
        .build_for_send(&tx, &(), &signature.to_bytes())
        .unwrap();
    let der = hex::encode_upper(signature.to_der().as_bytes());
    assert!(blob.contains(&der));
    assert!(blob.contains(&hex::encode_upper(&public_key)));
}

#[test]
fn test_xrp_ed25519_sign_and_send() {
    let key = ed25519_dalek::SigningKey::from_bytes(&[3u8; 32]);
    let public_key = key.verifying_key().to_bytes();
    let chain = Blockchain::Xrp {
        curve: CurveType::Ed25519,
    };
    let source = address_for(chain, &public_key);

    let tx = Transaction::new(
        coin(chain, "1"),
        Fee::new(coin(chain, "0.00001")),
        source,
        "rrpCDJ3yxMGC1XPfg1iMRVwsg8a8rar4fa",
    )
    .with_params(TransactionParams::Xrp(XrpTransactionParams {
        sequence: 1,
        destination_tag: Some(7),
        last_ledger_sequence: None,
    }));

    let builder = XrpTransactionBuilder::new(&public_key, CurveType::Ed25519).unwrap();
    let payload = builder.build_for_sign(&tx, &()).unwrap();
    let signature = key.sign(&payload);
    assert!(key.verifying_key().verify_strict(&payload, &signature).is_ok());

    let blob = builder
        .build_for_send(&tx, &(), &signature.to_bytes())
        .unwrap();
    assert!(blob.contains(&format!("7440{}", hex::encode_upper(signature.to_bytes()))));
    // ed25519 签名公钥带 0xED 前缀
    assert!(blob.contains(&format!("7321ED{}", hex::encode_upper(public_key))));
}

#[test]
fn test_algorand_sign_and_send() {
    let key = ed25519_dalek::SigningKey::from_bytes(&[3u8; 32]);
    let public_key = key.verifying_key().to_bytes();
    let chain = Blockchain::Algorand { testnet: true };
    let source = address_for(chain, &public_key);

    let tx = Transaction::new(
        coin(chain, "1.25"),
        Fee::new(coin(chain, "0.001")),
        source,
        "QE4XODVIPULV6VVDKRTMGTD6ZTFY3CURWTXDPIS56YHVXD6JWOKORTLPBU",
    );
    let context = AlgorandBuildContext::new(
        "testnet-v1.0",
        "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
        1_000,
    )
    .unwrap();

    let builder = AlgorandTransactionBuilder::new(&public_key, true).unwrap();
    let for_sign = builder.build_for_sign(&tx, &context).unwrap();
    assert_eq!(&for_sign[..2], b"TX");

    let signature = key.sign(&for_sign);
    let signed = builder
        .build_for_send(&tx, &context, &signature.to_bytes())
        .unwrap();

    // {"sig": bin8(64), "txn": <for_sign 去掉 "TX" 前缀>}
    let mut expected = hex::decode("82a3736967c440").unwrap();
    expected.extend_from_slice(&signature.to_bytes());
    expected.extend_from_slice(b"\xa3txn");
    expected.extend_from_slice(&for_sign[2..]);
    assert_eq!(signed, expected);
}
