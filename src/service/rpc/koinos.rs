//! Koinos JSON-RPC
//!
//! 计数器以十进制字符串传输，余额与 nonce 为 base64url 编码的 protobuf。
//! proto3 JSON 省略默认值，字段缺失即为零。

use base64::Engine;
use num_bigint::BigUint;
use prost::Message;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_protobuf_base64, decode_result, deserialize_big_uint, JsonRpcRequest};
use crate::service::transaction_builder::koinos::{decode_address, BALANCE_OF_ENTRY_POINT};
use crate::service::transaction_builder::koinos_proto::{
    BalanceOfArguments, BalanceOfResult, ValueType,
};
use crate::service::transaction_builder::{KoinosNetworkContext, KoinosTransactionDto};
use crate::error::CoreResult;
use crate::utils::encoding::BASE64_URL;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 请求
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn account_rc_request(id: u64, account: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "chain.get_account_rc", json!({ "account": account }))
}

pub fn account_nonce_request(id: u64, account: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "chain.get_account_nonce", json!({ "account": account }))
}

pub fn resource_limits_request(id: u64) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "chain.get_resource_limits", json!({}))
}

/// KOIN 合约 `balance_of` 只读调用
pub fn balance_request(
    id: u64,
    owner: &str,
    context: &KoinosNetworkContext,
) -> CoreResult<JsonRpcRequest<Value>> {
    let args = BalanceOfArguments {
        owner: decode_address(owner)?,
    }
    .encode_to_vec();
    Ok(JsonRpcRequest::new(
        id,
        "chain.read_contract",
        json!({
            "contract_id": context.koin_contract_id,
            "entry_point": BALANCE_OF_ENTRY_POINT,
            "args": BASE64_URL.encode(args),
        }),
    ))
}

pub fn submit_transaction_request(
    id: u64,
    transaction: &KoinosTransactionDto,
) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(
        id,
        "chain.submit_transaction",
        json!({ "transaction": transaction, "broadcast": true }),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 响应
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct KoinosResourceLimits {
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub disk_storage_limit: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub disk_storage_cost: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub network_bandwidth_limit: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub network_bandwidth_cost: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub compute_bandwidth_limit: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub compute_bandwidth_cost: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KoinosTransactionReceipt {
    pub id: String,
    #[serde(default)]
    pub payer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub max_payer_rc: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub rc_limit: BigUint,
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    pub rc_used: BigUint,
    #[serde(default)]
    pub reverted: bool,
}

#[derive(Deserialize)]
struct AccountRcResult {
    #[serde(default, deserialize_with = "deserialize_big_uint")]
    rc: BigUint,
}

#[derive(Deserialize)]
struct AccountNonceResult {
    #[serde(default)]
    nonce: Option<String>,
}

#[derive(Deserialize)]
struct ResourceLimitsResult {
    resource_limit_data: KoinosResourceLimits,
}

#[derive(Deserialize)]
struct ReadContractResult {
    #[serde(default)]
    result: Option<String>,
}

#[derive(Deserialize)]
struct SubmitTransactionResult {
    receipt: KoinosTransactionReceipt,
}

/// `chain.get_account_rc` → 可用 mana（最小单位）
pub fn decode_account_rc(body: &str) -> CoreResult<BigUint> {
    let result: AccountRcResult = decode_result(body)?;
    Ok(result.rc)
}

pub fn decode_resource_limits(body: &str) -> CoreResult<KoinosResourceLimits> {
    let result: ResourceLimitsResult = decode_result(body)?;
    Ok(result.resource_limit_data)
}

/// `chain.read_contract`（balance_of）→ KOIN 余额（最小单位）
pub fn decode_balance(body: &str) -> CoreResult<u64> {
    let result: ReadContractResult = decode_result(body)?;
    match result.result {
        Some(encoded) => Ok(decode_protobuf_base64::<BalanceOfResult>(&encoded)?.value),
        None => Ok(0),
    }
}

/// `chain.get_account_nonce` → 当前 nonce，下一笔交易使用 nonce + 1
pub fn decode_nonce(body: &str) -> CoreResult<u64> {
    let result: AccountNonceResult = decode_result(body)?;
    match result.nonce {
        Some(encoded) => Ok(decode_protobuf_base64::<ValueType>(&encoded)?.uint64_value),
        None => Ok(0),
    }
}

pub fn decode_submit_receipt(body: &str) -> CoreResult<KoinosTransactionReceipt> {
    let result: SubmitTransactionResult = decode_result(body)?;
    tracing::debug!(
        id = %result.receipt.id,
        rc_used = %result.receipt.rc_used,
        reverted = result.receipt.reverted,
        "koinos transaction submitted"
    );
    Ok(result.receipt)
}
