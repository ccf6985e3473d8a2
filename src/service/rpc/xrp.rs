//! rippled JSON-RPC
//!
//! rippled 把错误放在 `result` 内（`status: "error"`），这里统一转换为 `RpcError`

use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_result, deserialize_big_uint, malformed, JsonRpcRequest};
use crate::error::{CoreError, CoreResult};

const ACCOUNT_NOT_FOUND: &str = "actNotFound";

pub fn account_info_request(id: u64, account: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(
        id,
        "account_info",
        json!([{ "account": account, "ledger_index": "current" }]),
    )
}

pub fn server_state_request(id: u64) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "server_state", json!([{}]))
}

pub fn fee_request(id: u64) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "fee", json!([{}]))
}

pub fn submit_request(id: u64, tx_blob: &str) -> JsonRpcRequest<Value> {
    JsonRpcRequest::new(id, "submit", json!([{ "tx_blob": tx_blob }]))
}

/// 账户状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XrpAccountState {
    Funded {
        /// drops
        balance: BigUint,
        sequence: u32,
    },
    /// 账户尚未激活
    NotFound,
}

/// 账户保留金（drops）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct XrpReserve {
    #[serde(rename = "reserve_base", deserialize_with = "deserialize_big_uint")]
    pub base: BigUint,
    #[serde(rename = "reserve_inc", deserialize_with = "deserialize_big_uint")]
    pub increment: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrpSubmitResult {
    pub engine_result: String,
    pub hash: String,
}

#[derive(Deserialize)]
struct ErrorResult {
    error: String,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccountData {
    #[serde(deserialize_with = "deserialize_big_uint")]
    balance: BigUint,
    sequence: u32,
}

#[derive(Deserialize)]
struct AccountInfoResult {
    account_data: AccountData,
}

#[derive(Deserialize)]
struct ServerStateResult {
    state: ServerState,
}

#[derive(Deserialize)]
struct ServerState {
    validated_ledger: XrpReserve,
}

#[derive(Deserialize)]
struct FeeResult {
    drops: FeeDrops,
}

#[derive(Deserialize)]
struct FeeDrops {
    #[serde(deserialize_with = "deserialize_big_uint")]
    open_ledger_fee: BigUint,
}

#[derive(Deserialize)]
struct SubmitResult {
    engine_result: String,
    #[serde(default)]
    engine_result_code: i64,
    #[serde(default)]
    engine_result_message: String,
    tx_json: SubmittedTransaction,
}

#[derive(Deserialize)]
struct SubmittedTransaction {
    hash: String,
}

/// `result` 内的错误状态
fn error_result(result: &Value) -> CoreResult<Option<ErrorResult>> {
    if result.get("status").and_then(Value::as_str) != Some("error") {
        return Ok(None);
    }
    serde_json::from_value(result.clone())
        .map(Some)
        .map_err(malformed)
}

fn rpc_error(error: ErrorResult) -> CoreError {
    CoreError::RpcError {
        code: error.error_code.unwrap_or_default(),
        message: error.error_message.unwrap_or(error.error),
    }
}

fn decode_success<T: DeserializeOwned>(body: &str) -> CoreResult<T> {
    let result: Value = decode_result(body)?;
    if let Some(error) = error_result(&result)? {
        return Err(rpc_error(error));
    }
    serde_json::from_value(result).map_err(malformed)
}

/// `account_info`，`actNotFound` 视为未激活账户
pub fn decode_account_info(body: &str) -> CoreResult<XrpAccountState> {
    let result: Value = decode_result(body)?;
    if let Some(error) = error_result(&result)? {
        if error.error == ACCOUNT_NOT_FOUND {
            return Ok(XrpAccountState::NotFound);
        }
        return Err(rpc_error(error));
    }

    let info: AccountInfoResult = serde_json::from_value(result).map_err(malformed)?;
    Ok(XrpAccountState::Funded {
        balance: info.account_data.balance,
        sequence: info.account_data.sequence,
    })
}

/// `server_state` → 保留金
pub fn decode_reserve(body: &str) -> CoreResult<XrpReserve> {
    let result: ServerStateResult = decode_success(body)?;
    Ok(result.state.validated_ledger)
}

/// `fee` → 当前开放账本手续费（drops）
pub fn decode_fee(body: &str) -> CoreResult<BigUint> {
    let result: FeeResult = decode_success(body)?;
    Ok(result.drops.open_ledger_fee)
}

/// `submit`，`tes`/`terQUEUED` 以外的引擎结果视为拒绝
pub fn decode_submit_result(body: &str) -> CoreResult<XrpSubmitResult> {
    let result: SubmitResult = decode_success(body)?;
    if !(result.engine_result.starts_with("tes") || result.engine_result == "terQUEUED") {
        tracing::warn!(
            engine_result = %result.engine_result,
            code = result.engine_result_code,
            "xrp transaction rejected"
        );
        return Err(CoreError::RpcError {
            code: result.engine_result_code,
            message: format!("{}: {}", result.engine_result, result.engine_result_message),
        });
    }
    Ok(XrpSubmitResult {
        engine_result: result.engine_result,
        hash: result.tx_json.hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_funded_account() {
        let body = r#"{"result":{
            "account_data":{
                "Account":"rJjXGYnKNcbTsnuwoaP9wfDebB8hDX8jdQ",
                "Balance":"25000000",
                "Flags":0,
                "LedgerEntryType":"AccountRoot",
                "OwnerCount":0,
                "Sequence":7
            },
            "ledger_current_index":84503212,
            "status":"success",
            "validated":false
        }}"#;
        assert_eq!(
            decode_account_info(body).unwrap(),
            XrpAccountState::Funded {
                balance: BigUint::from(25_000_000u32),
                sequence: 7
            }
        );
    }

    #[test]
    fn test_account_not_found() {
        let body = r#"{"result":{
            "account":"rrpCDJ3yxMGC1XPfg1iMRVwsg8a8rar4fa",
            "error":"actNotFound",
            "error_code":19,
            "error_message":"Account not found.",
            "status":"error",
            "validated":false
        }}"#;
        assert_eq!(decode_account_info(body).unwrap(), XrpAccountState::NotFound);
    }

    #[test]
    fn test_other_errors_surface() {
        let body = r#"{"result":{"error":"actMalformed","error_code":35,"error_message":"Account malformed.","status":"error"}}"#;
        assert_eq!(
            decode_account_info(body),
            Err(CoreError::RpcError {
                code: 35,
                message: "Account malformed.".to_string()
            })
        );
    }

    #[test]
    fn test_decode_reserve() {
        let body = r#"{"result":{"state":{"validated_ledger":{
            "base_fee":10,
            "close_time":780000000,
            "hash":"ABCD",
            "reserve_base":1000000,
            "reserve_inc":200000,
            "seq":90000000
        }},"status":"success"}}"#;
        let reserve = decode_reserve(body).unwrap();
        assert_eq!(reserve.base, BigUint::from(1_000_000u32));
        assert_eq!(reserve.increment, BigUint::from(200_000u32));
    }

    #[test]
    fn test_decode_fee() {
        let body = r#"{"result":{
            "current_ledger_size":"56",
            "drops":{"base_fee":"10","median_fee":"5000","minimum_fee":"10","open_ledger_fee":"12"},
            "status":"success"
        }}"#;
        assert_eq!(decode_fee(body).unwrap(), BigUint::from(12u32));

        let missing = r#"{"result":{"drops":{"base_fee":"10"},"status":"success"}}"#;
        assert!(matches!(
            decode_fee(missing),
            Err(CoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_submit_result() {
        let accepted = r#"{"result":{
            "engine_result":"tesSUCCESS",
            "engine_result_code":0,
            "engine_result_message":"The transaction was applied.",
            "status":"success",
            "tx_blob":"1200",
            "tx_json":{"hash":"C53ECF838647FA5A4C780377025FEC7999AB4182590510CA461444B207AB74A9"}
        }}"#;
        let result = decode_submit_result(accepted).unwrap();
        assert_eq!(result.engine_result, "tesSUCCESS");
        assert!(result.hash.starts_with("C53ECF"));

        let rejected = r#"{"result":{
            "engine_result":"tecUNFUNDED_PAYMENT",
            "engine_result_code":104,
            "engine_result_message":"Insufficient XRP balance to send.",
            "status":"success",
            "tx_json":{"hash":"00"}
        }}"#;
        assert!(matches!(
            decode_submit_result(rejected),
            Err(CoreError::RpcError { code: 104, .. })
        ));
    }
}
