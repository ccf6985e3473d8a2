//! Filecoin 消息
//!
//! 消息 CBOR 数组：`[version, to, from, nonce, value, gas_limit, gas_fee_cap, gas_premium, method, params]`
//! 签名摘要 = blake2b-256(CIDv1(dag-cbor, blake2b-256(消息)))

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ciborium::value::{Integer, Value};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::{ensure_coin_transfer, split_recoverable_signature, TransactionBuilder};
use crate::domain::address::filecoin::{blake2b, FilecoinAddressService};
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

/// CIDv1 + dag-cbor + blake2b-256 multihash 前缀
const CID_PREFIX: [u8; 6] = [0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20];
/// secp256k1 签名类型
const SIGNATURE_TYPE_SECP256K1: u8 = 1;
const METHOD_SEND: u64 = 0;

/// Lotus JSON 消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilecoinMessage {
    pub version: u64,
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: String,
    pub gas_limit: u64,
    pub gas_fee_cap: String,
    pub gas_premium: String,
    pub method: u64,
    pub params: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilecoinSignature {
    #[serde(rename = "Type")]
    pub signature_type: u8,
    /// base64
    pub data: String,
}

/// `MpoolPush` 提交格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilecoinSignedMessage {
    pub message: FilecoinMessage,
    pub signature: FilecoinSignature,
}

pub struct FilecoinTransactionBuilder;

impl FilecoinTransactionBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 手续费估算用的消息，gas 字段为零，由 `GasEstimateMessageGas` 填充
    pub fn estimation_message(&self, transaction: &Transaction) -> CoreResult<FilecoinMessage> {
        ensure_coin_transfer(transaction, Blockchain::Filecoin)?;

        let nonce = transaction.filecoin_params()?.nonce;
        let value = transaction
            .amount
            .to_minimal_units(Blockchain::Filecoin.rounding_mode())?;

        Ok(FilecoinMessage {
            version: 0,
            to: transaction.destination_address.clone(),
            from: transaction.source_address.clone(),
            nonce,
            value: value.to_string(),
            gas_limit: 0,
            gas_fee_cap: "0".to_string(),
            gas_premium: "0".to_string(),
            method: METHOD_SEND,
            params: String::new(),
        })
    }

    fn message(&self, transaction: &Transaction) -> CoreResult<FilecoinMessage> {
        let unpriced = self.estimation_message(transaction)?;
        let fee = transaction.fee()?;
        fee.ensure_consistent()?;
        let (gas_limit, gas_fee_cap, gas_premium) = fee.filecoin_parameters()?;

        Ok(FilecoinMessage {
            gas_limit,
            gas_fee_cap: gas_fee_cap.to_string(),
            gas_premium: gas_premium.to_string(),
            ..unpriced
        })
    }

    /// 消息的 CBOR 编码
    pub fn serialize_message(message: &FilecoinMessage) -> CoreResult<Vec<u8>> {
        let value = Value::Array(vec![
            Value::Integer(Integer::from(message.version)),
            Value::Bytes(FilecoinAddressService::address_bytes(&message.to)?),
            Value::Bytes(FilecoinAddressService::address_bytes(&message.from)?),
            Value::Integer(Integer::from(message.nonce)),
            Value::Bytes(big_int_bytes(&parse_big_uint(&message.value)?)),
            Value::Integer(Integer::from(message.gas_limit)),
            Value::Bytes(big_int_bytes(&parse_big_uint(&message.gas_fee_cap)?)),
            Value::Bytes(big_int_bytes(&parse_big_uint(&message.gas_premium)?)),
            Value::Integer(Integer::from(message.method)),
            Value::Bytes(Vec::new()),
        ]);

        let mut out = Vec::with_capacity(128);
        ciborium::ser::into_writer(&value, &mut out)
            .map_err(|e| CoreError::EncodingOverflow(format!("cbor: {e}")))?;
        Ok(out)
    }

    /// 消息 CID 字节
    pub fn message_cid(message: &FilecoinMessage) -> CoreResult<Vec<u8>> {
        let encoded = Self::serialize_message(message)?;
        let mut cid = CID_PREFIX.to_vec();
        cid.extend_from_slice(&blake2b::<32>(&encoded)?);
        Ok(cid)
    }
}

impl Default for FilecoinTransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder for FilecoinTransactionBuilder {
    type Context = ();
    type Signed = FilecoinSignedMessage;

    fn build_for_sign(&self, transaction: &Transaction, _context: &()) -> CoreResult<Vec<u8>> {
        let message = self.message(transaction)?;
        let digest = blake2b::<32>(&Self::message_cid(&message)?)?;

        tracing::debug!(chain = "filecoin", nonce = message.nonce, "built filecoin signing digest");
        Ok(digest.to_vec())
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        _context: &(),
        signature: &[u8],
    ) -> CoreResult<FilecoinSignedMessage> {
        if signature.len() != 65 {
            return Err(CoreError::InvalidSignature(format!(
                "expected 65 bytes r || s || v, got {}",
                signature.len()
            )));
        }
        let (rs, recovery_id) = split_recoverable_signature(signature)?;
        let mut data = rs.to_vec();
        data.push(recovery_id);

        Ok(FilecoinSignedMessage {
            message: self.message(transaction)?,
            signature: FilecoinSignature {
                signature_type: SIGNATURE_TYPE_SECP256K1,
                data: STANDARD.encode(data),
            },
        })
    }
}

/// Filecoin BigInt：符号字节 + 大端数值，零为空
fn big_int_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    let mut out = vec![0x00];
    out.extend_from_slice(&value.to_bytes_be());
    out
}

fn parse_big_uint(value: &str) -> CoreResult<BigUint> {
    value
        .parse()
        .map_err(|_| CoreError::EncodingOverflow(format!("not an unsigned integer: {value}")))
}
