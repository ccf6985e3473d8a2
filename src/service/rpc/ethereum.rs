//! EVM JSON-RPC 数量（`0x` 十六进制）

use num_bigint::BigUint;
use serde_json::{json, Value};

use super::{decode_result, JsonRpcRequest};
use crate::error::{CoreError, CoreResult};

pub fn balance_request(id: u64, address: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "eth_getBalance", json!([address, "latest"]))
}

pub fn transaction_count_request(id: u64, address: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "eth_getTransactionCount", json!([address, "pending"]))
}

pub fn gas_price_request(id: u64) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "eth_gasPrice", json!([]))
}

/// `eth_sendRawTransaction` 的参数为 `0x` 前缀的 RLP
pub fn send_raw_transaction_request(id: u64, signed: &[u8]) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(
        id,
        "eth_sendRawTransaction",
        json!([format!("0x{}", hex::encode(signed))]),
    )
}

/// 解析单个 quantity，例如 `"0x1bc16d674ec80000"`
pub fn parse_quantity(quantity: &str) -> CoreResult<BigUint> {
    let digits = quantity
        .strip_prefix("0x")
        .filter(|d| !d.is_empty())
        .ok_or_else(|| CoreError::MalformedResponse(format!("not a hex quantity: {quantity:?}")))?;
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| CoreError::MalformedResponse(format!("not a hex quantity: {quantity:?}")))
}

/// `eth_getBalance` / `eth_gasPrice` / `eth_getTransactionCount`
pub fn decode_quantity(body: &str) -> CoreResult<BigUint> {
    let quantity: String = decode_result(body)?;
    parse_quantity(&quantity)
}

/// `eth_sendRawTransaction` → 交易哈希
pub fn decode_transaction_hash(body: &str) -> CoreResult<String> {
    let hash: String = decode_result(body)?;
    let valid = hash.len() == 66
        && hash.starts_with("0x")
        && hash[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::MalformedResponse(format!(
            "not a transaction hash: {hash:?}"
        )));
    }
    Ok(hash)
}
