//! Koinos KOIN 转账
//!
//! - 操作：对 KOIN 合约 `transfer` 入口的 call_contract，参数为 protobuf `{from, to, value}`
//! - 交易头：`{chain_id, rc_limit, nonce, operation_merkle_root, payer}`
//! - 签名摘要：sha256(交易头)，交易 ID 为其 sha2-256 multihash

use base64::Engine;
use prost::Message;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::koinos_proto::{
    encode_nonce, CallContractOperation, Operation, TransactionHeader, TransferArguments,
};
use super::{ensure_coin_transfer, split_recoverable_signature, TransactionBuilder};
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};
use crate::utils::encoding::BASE64_URL;

/// KOIN 合约 `transfer` 入口
pub const TRANSFER_ENTRY_POINT: u32 = 0x27f5_76ca;
/// KOIN 合约 `balance_of` 入口
pub const BALANCE_OF_ENTRY_POINT: u32 = 0x5c72_1497;

pub const MAINNET_CHAIN_ID: &str = "EiBZK_GGVP0H_fXVAM3j6EAuz3-B-l3ejxRSewi7qIBfSA==";
pub const MAINNET_KOIN_CONTRACT: &str = "15DJN4a8SgrbGhhGksSBASiSYjGnMU8dGL";
pub const TESTNET_CHAIN_ID: &str = "EiBncD4pKRIQWco_WRqo5Q-xnXR7JuO3PtZv983mKdKHSQ==";
pub const TESTNET_KOIN_CONTRACT: &str = "1FaSvLjQJsCJKq5ybmGsMMQs8RQYyVv8ju";

/// sha2-256 multihash 前缀
const SHA256_MULTIHASH: [u8; 2] = [0x12, 0x20];
const ADDRESS_LENGTH: usize = 25;
/// 压缩公钥的恢复 ID 偏移
const COMPACT_SIGNATURE_OFFSET: u8 = 31;

/// 网络上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinosNetworkContext {
    /// base64url multihash
    pub chain_id: String,
    /// base58
    pub koin_contract_id: String,
}

impl KoinosNetworkContext {
    pub fn new(chain_id: impl Into<String>, koin_contract_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            koin_contract_id: koin_contract_id.into(),
        }
    }

    pub fn for_network(testnet: bool) -> Self {
        if testnet {
            Self::new(TESTNET_CHAIN_ID, TESTNET_KOIN_CONTRACT)
        } else {
            Self::new(MAINNET_CHAIN_ID, MAINNET_KOIN_CONTRACT)
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON DTO（chain.submit_transaction）
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinosHeaderDto {
    pub chain_id: String,
    /// uint64 按字符串传输
    pub rc_limit: String,
    pub nonce: String,
    pub operation_merkle_root: String,
    pub payer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinosCallContractDto {
    pub contract_id: String,
    pub entry_point: u32,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinosOperationDto {
    pub call_contract: KoinosCallContractDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinosTransactionDto {
    pub header: KoinosHeaderDto,
    pub id: String,
    pub operations: Vec<KoinosOperationDto>,
    pub signatures: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct KoinosTransactionBuilder {
    chain: Blockchain,
}

struct PreparedTransaction {
    header: TransactionHeader,
    operation: Operation,
}

impl KoinosTransactionBuilder {
    pub fn new(testnet: bool) -> Self {
        Self {
            chain: Blockchain::Koinos { testnet },
        }
    }

    fn prepare(
        &self,
        transaction: &Transaction,
        context: &KoinosNetworkContext,
    ) -> CoreResult<PreparedTransaction> {
        ensure_coin_transfer(transaction, self.chain)?;

        let nonce = transaction.koinos_params()?.nonce;
        let rounding = self.chain.rounding_mode();
        let value = transaction.amount.to_u64_units(rounding)?;
        let rc_limit = transaction.fee()?.amount.to_u64_units(rounding)?;

        let from = decode_address(&transaction.source_address)?;
        let to = decode_address(&transaction.destination_address)?;
        let contract_id = decode_address(&context.koin_contract_id)?;
        let chain_id = BASE64_URL.decode(&context.chain_id).map_err(|e| {
            CoreError::MissingRequiredParameter(format!("valid koinos chain id: {e}"))
        })?;

        let args = TransferArguments {
            from: from.clone(),
            to,
            value,
        }
        .encode_to_vec();
        let operation = Operation {
            call_contract: Some(CallContractOperation {
                contract_id,
                entry_point: TRANSFER_ENTRY_POINT,
                args,
            }),
        };

        let header = TransactionHeader {
            chain_id,
            rc_limit,
            nonce: encode_nonce(nonce),
            operation_merkle_root: multihash(&operation.encode_to_vec()),
            payer: from,
            payee: Vec::new(),
        };

        Ok(PreparedTransaction { header, operation })
    }
}

impl TransactionBuilder for KoinosTransactionBuilder {
    type Context = KoinosNetworkContext;
    type Signed = KoinosTransactionDto;

    fn build_for_sign(
        &self,
        transaction: &Transaction,
        context: &KoinosNetworkContext,
    ) -> CoreResult<Vec<u8>> {
        let prepared = self.prepare(transaction, context)?;
        let digest = Sha256::digest(prepared.header.encode_to_vec());

        tracing::debug!(chain = %self.chain, rc_limit = prepared.header.rc_limit, "built koinos signing digest");
        Ok(digest.to_vec())
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        context: &KoinosNetworkContext,
        signature: &[u8],
    ) -> CoreResult<KoinosTransactionDto> {
        if signature.len() != 65 {
            return Err(CoreError::InvalidSignature(format!(
                "expected 65 bytes r || s || v, got {}",
                signature.len()
            )));
        }
        let (rs, recovery_id) = split_recoverable_signature(signature)?;
        let mut compact = Vec::with_capacity(65);
        compact.push(COMPACT_SIGNATURE_OFFSET + recovery_id);
        compact.extend_from_slice(&rs);

        let PreparedTransaction { header, operation } = self.prepare(transaction, context)?;
        let id = multihash(&header.encode_to_vec());
        let call = operation.call_contract.ok_or_else(|| {
            CoreError::UnsupportedOperation("koinos operation without contract call".to_string())
        })?;

        Ok(KoinosTransactionDto {
            header: KoinosHeaderDto {
                chain_id: BASE64_URL.encode(&header.chain_id),
                rc_limit: header.rc_limit.to_string(),
                nonce: BASE64_URL.encode(&header.nonce),
                operation_merkle_root: BASE64_URL.encode(&header.operation_merkle_root),
                payer: bs58::encode(&header.payer).into_string(),
            },
            id: format!("0x{}", hex::encode(id)),
            operations: vec![KoinosOperationDto {
                call_contract: KoinosCallContractDto {
                    contract_id: bs58::encode(&call.contract_id).into_string(),
                    entry_point: call.entry_point,
                    args: BASE64_URL.encode(&call.args),
                },
            }],
            signatures: vec![BASE64_URL.encode(compact)],
        })
    }
}

/// Koinos 地址的原始 25 字节（版本 + HASH160 + 校验和）
pub fn decode_address(address: &str) -> CoreResult<Vec<u8>> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;
    if bytes.len() != ADDRESS_LENGTH {
        return Err(CoreError::InvalidAddress(format!(
            "{address}: expected {ADDRESS_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn multihash(data: &[u8]) -> Vec<u8> {
    let mut out = SHA256_MULTIHASH.to_vec();
    out.extend_from_slice(&Sha256::digest(data));
    out
}
