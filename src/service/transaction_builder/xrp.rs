//! XRP Payment 交易
//!
//! 签名数据 = "STX\0" || blob；secp256k1 对其 SHA-512 前半签名，ed25519 直接签名原文

use sha2::{Digest, Sha512};

use super::xrp_codec::{self, XrpField};
use super::{ensure_coin_transfer, TransactionBuilder};
use crate::domain::address::xrp::XrpAddressService;
use crate::domain::chain_config::{Blockchain, CurveType};
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

const SIGNING_PREFIX: &[u8] = b"STX\0";
const TRANSACTION_TYPE_PAYMENT: u16 = 0;
/// tfFullyCanonicalSig
const FLAG_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

pub struct XrpTransactionBuilder {
    curve: CurveType,
    signing_public_key: Vec<u8>,
}

impl XrpTransactionBuilder {
    pub fn new(public_key: &[u8], curve: CurveType) -> CoreResult<Self> {
        let signing_public_key = XrpAddressService::new(curve).signing_public_key(public_key)?;
        Ok(Self {
            curve,
            signing_public_key,
        })
    }

    fn fields(&self, transaction: &Transaction) -> CoreResult<Vec<XrpField>> {
        let chain = Blockchain::Xrp { curve: self.curve };
        ensure_coin_transfer(transaction, chain)?;

        let params = transaction.xrp_params()?;
        let rounding = chain.rounding_mode();
        let amount = transaction.amount.to_u64_units(rounding)?;
        let fee = transaction.fee()?.amount.to_u64_units(rounding)?;

        let mut fields = vec![
            XrpField::TransactionType(TRANSACTION_TYPE_PAYMENT),
            XrpField::Flags(FLAG_FULLY_CANONICAL_SIG),
            XrpField::Sequence(params.sequence),
            XrpField::Amount(amount),
            XrpField::Fee(fee),
            XrpField::SigningPubKey(self.signing_public_key.clone()),
            XrpField::Account(XrpAddressService::decode_account_id(
                &transaction.source_address,
            )?),
            XrpField::Destination(XrpAddressService::decode_account_id(
                &transaction.destination_address,
            )?),
        ];
        if let Some(tag) = params.destination_tag {
            fields.push(XrpField::DestinationTag(tag));
        }
        if let Some(last_ledger) = params.last_ledger_sequence {
            fields.push(XrpField::LastLedgerSequence(last_ledger));
        }
        Ok(fields)
    }

    /// 不含前缀的签名 blob
    pub fn signing_blob(&self, transaction: &Transaction) -> CoreResult<Vec<u8>> {
        xrp_codec::serialize(&self.fields(transaction)?, true)
    }

    fn der_signature(signature: &[u8]) -> CoreResult<Vec<u8>> {
        let rs = signature.get(..64).ok_or_else(|| {
            CoreError::InvalidSignature(format!(
                "expected at least 64 bytes, got {}",
                signature.len()
            ))
        })?;
        let parsed = k256::ecdsa::Signature::from_slice(rs)
            .map_err(|e| CoreError::InvalidSignature(e.to_string()))?;
        let normalized = parsed.normalize_s().unwrap_or(parsed);
        Ok(normalized.to_der().as_bytes().to_vec())
    }
}

impl TransactionBuilder for XrpTransactionBuilder {
    type Context = ();
    /// 大写十六进制 `tx_blob`
    type Signed = String;

    fn build_for_sign(&self, transaction: &Transaction, _context: &()) -> CoreResult<Vec<u8>> {
        let blob = self.signing_blob(transaction)?;
        let mut data = Vec::with_capacity(SIGNING_PREFIX.len() + blob.len());
        data.extend_from_slice(SIGNING_PREFIX);
        data.extend_from_slice(&blob);

        tracing::debug!(curve = ?self.curve, len = data.len(), "built xrp signing payload");
        match self.curve {
            CurveType::Secp256k1 => Ok(Sha512::digest(&data)[..32].to_vec()),
            CurveType::Ed25519 => Ok(data),
        }
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        _context: &(),
        signature: &[u8],
    ) -> CoreResult<String> {
        let encoded_signature = match self.curve {
            CurveType::Secp256k1 => Self::der_signature(signature)?,
            CurveType::Ed25519 => {
                if signature.len() != 64 {
                    return Err(CoreError::InvalidSignature(format!(
                        "expected 64 bytes, got {}",
                        signature.len()
                    )));
                }
                signature.to_vec()
            }
        };

        let mut fields = self.fields(transaction)?;
        fields.push(XrpField::TxnSignature(encoded_signature));
        Ok(hex::encode_upper(xrp_codec::serialize(&fields, false)?))
    }
}
