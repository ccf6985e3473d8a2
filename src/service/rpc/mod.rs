//! RPC/DTO 映射
//!
//! 每个响应形状对应一个解码函数，返回强类型领域值或 `MalformedResponse`。
//! 以字符串传输的大整数一律解析为 `BigUint`，不经过浮点。

pub mod algorand;
pub mod ethereum;
pub mod filecoin;
pub mod kaspa;
pub mod koinos;
pub mod xrp;

use base64::Engine;
use num_bigint::BigUint;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::utils::encoding::BASE64_URL;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: P,
}

impl<P: Serialize> JsonRpcRequest<P> {
    pub fn new(id: u64, method: impl Into<String>, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 错误对象
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// 解码 JSON-RPC 响应的 `result`
///
/// - `error` 存在：`RpcError`
/// - JSON 非法、缺少 `result` 或形状不符：`MalformedResponse`
pub fn decode_result<T: DeserializeOwned>(body: &str) -> CoreResult<T> {
    let envelope: Value = serde_json::from_str(body).map_err(malformed)?;
    let object = envelope
        .as_object()
        .ok_or_else(|| CoreError::MalformedResponse("response is not an object".to_string()))?;

    if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
        let error: JsonRpcErrorObject =
            serde_json::from_value(error.clone()).map_err(malformed)?;
        tracing::warn!(code = error.code, message = %error.message, "rpc returned error");
        return Err(CoreError::RpcError {
            code: error.code,
            message: error.message,
        });
    }

    let result = object
        .get("result")
        .ok_or_else(|| CoreError::MalformedResponse("missing result".to_string()))?;
    serde_json::from_value(result.clone()).map_err(malformed)
}

/// 直接解码 REST JSON 响应体
pub fn decode_body<T: DeserializeOwned>(body: &str) -> CoreResult<T> {
    serde_json::from_str(body).map_err(malformed)
}

/// base64url → protobuf，两步失败都归为 `MalformedResponse`
pub fn decode_protobuf_base64<M: prost::Message + Default>(encoded: &str) -> CoreResult<M> {
    let bytes = BASE64_URL
        .decode(encoded)
        .map_err(|e| CoreError::MalformedResponse(format!("base64url: {e}")))?;
    M::decode(bytes.as_slice()).map_err(|e| CoreError::MalformedResponse(format!("protobuf: {e}")))
}

/// 十进制字符串 → `BigUint`
pub fn parse_big_uint(value: &str) -> CoreResult<BigUint> {
    value
        .parse()
        .map_err(|_| CoreError::MalformedResponse(format!("not an unsigned integer: {value:?}")))
}

pub(crate) fn malformed(e: impl std::fmt::Display) -> CoreError {
    CoreError::MalformedResponse(e.to_string())
}

/// serde：字符串或整数形式的大整数
pub(crate) fn deserialize_big_uint<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text
            .parse()
            .map_err(|_| de::Error::custom(format!("not an unsigned integer: {text:?}"))),
        Raw::Number(number) => Ok(BigUint::from(number)),
    }
}

/// serde：字符串或整数形式的 u64
pub(crate) fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text
            .parse()
            .map_err(|_| de::Error::custom(format!("not a u64: {text:?}"))),
        Raw::Number(number) => Ok(number),
    }
}
