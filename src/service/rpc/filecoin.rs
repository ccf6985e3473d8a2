//! Filecoin Lotus JSON-RPC

use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_result, deserialize_big_uint, deserialize_u64, JsonRpcRequest};
use crate::domain::fee::FeeParameters;
use crate::error::{CoreError, CoreResult};
use crate::service::transaction_builder::filecoin::FilecoinMessage;
use crate::service::transaction_builder::FilecoinSignedMessage;

pub fn actor_request(id: u64, address: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "Filecoin.StateGetActor", json!([address, null]))
}

pub fn gas_estimate_request(id: u64, message: &FilecoinMessage) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(
        id,
        "Filecoin.GasEstimateMessageGas",
        json!([message, { "MaxFee": "0" }, null]),
    )
}

pub fn push_request(id: u64, signed: &FilecoinSignedMessage) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "Filecoin.MpoolPush", json!([signed]))
}

/// 链上 actor 状态
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilecoinActorInfo {
    /// attoFIL
    #[serde(deserialize_with = "deserialize_big_uint")]
    pub balance: BigUint,
    #[serde(deserialize_with = "deserialize_u64")]
    pub nonce: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GasEstimateResult {
    #[serde(deserialize_with = "deserialize_u64")]
    gas_limit: u64,
    #[serde(deserialize_with = "deserialize_big_uint")]
    gas_fee_cap: BigUint,
    #[serde(deserialize_with = "deserialize_big_uint")]
    gas_premium: BigUint,
}

#[derive(Deserialize)]
struct CidResult {
    #[serde(rename = "/")]
    cid: String,
}

/// `Filecoin.StateGetActor`
pub fn decode_actor_info(body: &str) -> CoreResult<FilecoinActorInfo> {
    decode_result(body)
}

/// `Filecoin.GasEstimateMessageGas` → `FeeParameters::Filecoin`
pub fn decode_gas_estimate(body: &str) -> CoreResult<FeeParameters> {
    let estimate: GasEstimateResult = decode_result(body)?;
    if estimate.gas_limit == 0 {
        return Err(CoreError::MalformedResponse(
            "gas estimate with zero gas limit".to_string(),
        ));
    }
    Ok(FeeParameters::Filecoin {
        gas_limit: estimate.gas_limit,
        gas_fee_cap: estimate.gas_fee_cap,
        gas_premium: estimate.gas_premium,
    })
}

/// `Filecoin.MpoolPush` → 消息 CID
pub fn decode_push_result(body: &str) -> CoreResult<String> {
    let result: CidResult = decode_result(body)?;
    tracing::debug!(cid = %result.cid, "filecoin message pushed");
    Ok(result.cid)
}
