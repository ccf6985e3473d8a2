//! Algorand 支付交易
//!
//! 签名数据 = "TX" || msgpack(交易字段)，字段按键名字母序排列，零值和空字段省略

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{ensure_coin_transfer, TransactionBuilder};
use crate::domain::address::algorand::AlgorandAddressService;
use crate::domain::address::ed25519_public_key;
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

/// 签名前缀
const TX_TAG: &[u8] = b"TX";
/// 默认有效轮数
pub const VALIDITY_WINDOW: u64 = 1000;
const SIGNATURE_LENGTH: usize = 64;

/// 网络上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorandBuildContext {
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub first_valid: u64,
    pub last_valid: u64,
}

impl AlgorandBuildContext {
    /// `genesis_hash` 为标准 base64；有效期为 `first_valid` 起 1000 轮
    pub fn new(
        genesis_id: impl Into<String>,
        genesis_hash: &str,
        first_valid: u64,
    ) -> CoreResult<Self> {
        let decoded = STANDARD
            .decode(genesis_hash)
            .map_err(|e| CoreError::MissingRequiredParameter(format!("genesis hash: {e}")))?;
        let genesis_hash: [u8; 32] = decoded.try_into().map_err(|_| {
            CoreError::MissingRequiredParameter("genesis hash must be 32 bytes".to_string())
        })?;

        let last_valid = first_valid.checked_add(VALIDITY_WINDOW).ok_or_else(|| {
            CoreError::EncodingOverflow(format!("last valid round after {first_valid}"))
        })?;

        Ok(Self {
            genesis_id: genesis_id.into(),
            genesis_hash,
            first_valid,
            last_valid,
        })
    }
}

pub struct AlgorandTransactionBuilder {
    public_key: [u8; 32],
    chain: Blockchain,
}

impl AlgorandTransactionBuilder {
    pub fn new(public_key: &[u8], testnet: bool) -> CoreResult<Self> {
        Ok(Self {
            public_key: ed25519_public_key(public_key)?,
            chain: Blockchain::Algorand { testnet },
        })
    }

    /// 不带 "TX" 前缀的交易 msgpack
    fn encode_transaction(
        &self,
        transaction: &Transaction,
        context: &AlgorandBuildContext,
    ) -> CoreResult<Vec<u8>> {
        ensure_coin_transfer(transaction, self.chain)?;

        let rounding = self.chain.rounding_mode();
        let amount = transaction.amount.to_u64_units(rounding)?;
        let fee = transaction.fee()?.amount.to_u64_units(rounding)?;
        let receiver = AlgorandAddressService::decode_public_key(&transaction.destination_address)?;
        let note = transaction.algorand_note().filter(|note| !note.is_empty());

        let mut fields: Vec<(&str, MsgpackValue)> = Vec::with_capacity(10);
        if amount > 0 {
            fields.push(("amt", MsgpackValue::Uint(amount)));
        }
        if fee > 0 {
            fields.push(("fee", MsgpackValue::Uint(fee)));
        }
        fields.push(("fv", MsgpackValue::Uint(context.first_valid)));
        fields.push(("gen", MsgpackValue::Str(&context.genesis_id)));
        fields.push(("gh", MsgpackValue::Bin(&context.genesis_hash)));
        fields.push(("lv", MsgpackValue::Uint(context.last_valid)));
        if let Some(note) = note {
            fields.push(("note", MsgpackValue::Bin(note)));
        }
        fields.push(("rcv", MsgpackValue::Bin(&receiver)));
        fields.push(("snd", MsgpackValue::Bin(&self.public_key)));
        fields.push(("type", MsgpackValue::Str("pay")));

        let mut out = Vec::with_capacity(256);
        write_map(&mut out, &fields)?;
        Ok(out)
    }
}

impl TransactionBuilder for AlgorandTransactionBuilder {
    type Context = AlgorandBuildContext;
    type Signed = Vec<u8>;

    fn build_for_sign(
        &self,
        transaction: &Transaction,
        context: &AlgorandBuildContext,
    ) -> CoreResult<Vec<u8>> {
        let encoded = self.encode_transaction(transaction, context)?;

        let mut out = Vec::with_capacity(TX_TAG.len() + encoded.len());
        out.extend_from_slice(TX_TAG);
        out.extend_from_slice(&encoded);

        tracing::debug!(chain = %self.chain, first_valid = context.first_valid, len = out.len(), "built algorand signing payload");
        Ok(out)
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        context: &AlgorandBuildContext,
        signature: &[u8],
    ) -> CoreResult<Vec<u8>> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(CoreError::InvalidSignature(format!(
                "expected {SIGNATURE_LENGTH} bytes, got {}",
                signature.len()
            )));
        }
        let encoded = self.encode_transaction(transaction, context)?;

        // {"sig": <签名>, "txn": <交易 map>}
        let mut out = Vec::with_capacity(encoded.len() + 80);
        rmp::encode::write_map_len(&mut out, 2).map_err(msgpack_error)?;
        rmp::encode::write_str(&mut out, "sig").map_err(msgpack_error)?;
        rmp::encode::write_bin(&mut out, signature).map_err(msgpack_error)?;
        rmp::encode::write_str(&mut out, "txn").map_err(msgpack_error)?;
        out.extend_from_slice(&encoded);
        Ok(out)
    }
}

enum MsgpackValue<'a> {
    Uint(u64),
    Str(&'a str),
    Bin(&'a [u8]),
}

fn write_map(out: &mut Vec<u8>, fields: &[(&str, MsgpackValue<'_>)]) -> CoreResult<()> {
    rmp::encode::write_map_len(out, fields.len() as u32).map_err(msgpack_error)?;
    for (key, value) in fields {
        rmp::encode::write_str(out, key).map_err(msgpack_error)?;
        match value {
            MsgpackValue::Uint(v) => {
                rmp::encode::write_uint(out, *v).map_err(msgpack_error)?;
            }
            MsgpackValue::Str(v) => rmp::encode::write_str(out, v).map_err(msgpack_error)?,
            MsgpackValue::Bin(v) => rmp::encode::write_bin(out, v).map_err(msgpack_error)?,
        }
    }
    Ok(())
}

fn msgpack_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::EncodingOverflow(format!("msgpack: {e}"))
}
