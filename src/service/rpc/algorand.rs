//! Algorand algod REST（v2）

use serde::Deserialize;

use super::decode_body;
use crate::error::{CoreError, CoreResult};
use crate::service::transaction_builder::AlgorandBuildContext;

pub const ACCOUNT_PATH: &str = "/v2/accounts";
pub const TRANSACTION_PARAMS_PATH: &str = "/v2/transactions/params";
pub const SUBMIT_PATH: &str = "/v2/transactions";

/// `GET /v2/accounts/{address}`（microAlgos）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlgorandAccount {
    pub amount: u64,
    #[serde(rename = "min-balance")]
    pub min_balance: u64,
}

impl AlgorandAccount {
    /// 可花费余额 = amount - min-balance
    pub fn spendable(&self) -> u64 {
        self.amount.saturating_sub(self.min_balance)
    }
}

/// `GET /v2/transactions/params` 解码结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorandTransactionParams {
    pub context: AlgorandBuildContext,
    /// microAlgos
    pub min_fee: u64,
}

#[derive(Deserialize)]
struct TransactionParamsResponse {
    #[serde(rename = "genesis-id")]
    genesis_id: String,
    #[serde(rename = "genesis-hash")]
    genesis_hash: String,
    #[serde(rename = "last-round")]
    last_round: u64,
    #[serde(rename = "min-fee")]
    min_fee: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubmitResponse {
    Accepted {
        #[serde(rename = "txId")]
        tx_id: String,
    },
    Rejected {
        message: String,
    },
}

pub fn account_path(address: &str) -> String {
    format!("{ACCOUNT_PATH}/{address}")
}

pub fn decode_account(body: &str) -> CoreResult<AlgorandAccount> {
    decode_body(body)
}

/// 首个有效轮次取 `last-round`，有效期 1000 轮
pub fn decode_transaction_params(body: &str) -> CoreResult<AlgorandTransactionParams> {
    let response: TransactionParamsResponse = decode_body(body)?;
    let context = AlgorandBuildContext::new(
        response.genesis_id,
        &response.genesis_hash,
        response.last_round,
    )
    .map_err(|e| CoreError::MalformedResponse(e.to_string()))?;

    Ok(AlgorandTransactionParams {
        context,
        min_fee: response.min_fee,
    })
}

/// `POST /v2/transactions` → 交易 ID
///
/// algod 的 REST 错误只有 `message`，错误码记为 0
pub fn decode_submit_result(body: &str) -> CoreResult<String> {
    match decode_body::<SubmitResponse>(body)? {
        SubmitResponse::Accepted { tx_id } => {
            tracing::debug!(tx_id = %tx_id, "algorand transaction submitted");
            Ok(tx_id)
        }
        SubmitResponse::Rejected { message } => {
            tracing::warn!(message = %message, "algorand transaction rejected");
            Err(CoreError::RpcError { code: 0, message })
        }
    }
}
