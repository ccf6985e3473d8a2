//! 链无关的交易模型
//!
//! 地址在进入构建器前已由地址编解码器校验；构建器只检查结构形状

use crate::domain::amount::Amount;
use crate::domain::fee::Fee;
use crate::error::{CoreError, CoreResult};

/// XRP 交易参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrpTransactionParams {
    pub sequence: u32,
    pub destination_tag: Option<u32>,
    pub last_ledger_sequence: Option<u32>,
}

/// Filecoin 交易参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilecoinTransactionParams {
    pub nonce: u64,
}

/// Koinos 交易参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KoinosTransactionParams {
    /// 写入交易头的 nonce（账户当前 nonce + 1）
    pub nonce: u64,
}

/// Algorand 交易参数
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlgorandTransactionParams {
    pub note: Option<Vec<u8>>,
}

/// EVM 交易参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthereumTransactionParams {
    pub nonce: u64,
    pub data: Option<Vec<u8>>,
}

/// 链特定参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionParams {
    Xrp(XrpTransactionParams),
    Filecoin(FilecoinTransactionParams),
    Koinos(KoinosTransactionParams),
    Algorand(AlgorandTransactionParams),
    Ethereum(EthereumTransactionParams),
}

/// 交易
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub amount: Amount,
    pub fee: Option<Fee>,
    pub source_address: String,
    pub destination_address: String,
    pub change_address: String,
    pub params: Option<TransactionParams>,
}

impl Transaction {
    /// 找零地址默认等于发送地址
    pub fn new(
        amount: Amount,
        fee: Fee,
        source_address: impl Into<String>,
        destination_address: impl Into<String>,
    ) -> Self {
        let source_address = source_address.into();
        Self {
            amount,
            fee: Some(fee),
            change_address: source_address.clone(),
            source_address,
            destination_address: destination_address.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: TransactionParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_change_address(mut self, change_address: impl Into<String>) -> Self {
        self.change_address = change_address.into();
        self
    }

    pub fn fee(&self) -> CoreResult<&Fee> {
        self.fee
            .as_ref()
            .ok_or_else(|| CoreError::MissingRequiredParameter("fee".to_string()))
    }

    pub fn xrp_params(&self) -> CoreResult<&XrpTransactionParams> {
        match &self.params {
            Some(TransactionParams::Xrp(params)) => Ok(params),
            _ => Err(missing("sequence")),
        }
    }

    pub fn filecoin_params(&self) -> CoreResult<FilecoinTransactionParams> {
        match &self.params {
            Some(TransactionParams::Filecoin(params)) => Ok(*params),
            _ => Err(missing("nonce")),
        }
    }

    pub fn koinos_params(&self) -> CoreResult<KoinosTransactionParams> {
        match &self.params {
            Some(TransactionParams::Koinos(params)) => Ok(*params),
            _ => Err(missing("nonce")),
        }
    }

    pub fn ethereum_params(&self) -> CoreResult<&EthereumTransactionParams> {
        match &self.params {
            Some(TransactionParams::Ethereum(params)) => Ok(params),
            _ => Err(missing("nonce")),
        }
    }

    /// Algorand 参数可选；缺省时没有 note
    pub fn algorand_note(&self) -> Option<&[u8]> {
        match &self.params {
            Some(TransactionParams::Algorand(params)) => params.note.as_deref(),
            _ => None,
        }
    }
}

fn missing(name: &str) -> CoreError {
    CoreError::MissingRequiredParameter(name.to_string())
}
