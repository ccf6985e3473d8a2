//! 统一错误类型
//!
//! 链抽象核心的所有操作都返回 `CoreResult<T>`，错误种类可被调用方精确匹配

use rust_decimal::Decimal;
use thiserror::Error;

use crate::utils::error_codes::ErrorCode;

/// 核心错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 地址 / 名称
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid ENS name: {0}")]
    InvalidName(String),

    #[error("invalid ENS label length {length} for label '{label}'")]
    InvalidLabelLength { label: String, length: usize },

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 链 / 构建
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("value does not fit the target encoding: {0}")]
    EncodingOverflow(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("fee parameters do not match fee amount: {0}")]
    InvalidFee(String),

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // RPC
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("rpc error {code}: {message}")]
    RpcError { code: i64, message: String },

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 经济校验
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    #[error("amount exceeds balance")]
    AmountExceedsBalance,

    #[error("fee exceeds balance")]
    FeeExceedsBalance,

    #[error("amount plus fee exceeds balance")]
    TotalExceedsBalance,

    #[error("balance not found for {0}")]
    BalanceNotFound(String),

    #[error("amount is below dust threshold {minimum}")]
    DustAmount { minimum: Decimal },

    #[error("change would be below dust threshold {minimum}")]
    DustChange { minimum: Decimal },

    #[error("destination account requires at least {required}")]
    InsufficientReserve { required: Decimal },

    #[error("fee exceeds the maximum fee resource")]
    FeeExceedsMaxFeeResource,

    #[error("amount exceeds fee resource capacity, at most {max_amount} can be sent")]
    AmountExceedsFeeResourceCapacity { max_amount: Decimal },

    #[error("insufficient fee resource")]
    InsufficientFeeResource,
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// 稳定的错误码字符串
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidAddress(_) => "invalid_address",
            CoreError::InvalidPublicKey(_) => "invalid_public_key",
            CoreError::InvalidName(_) => "invalid_name",
            CoreError::InvalidLabelLength { .. } => "invalid_label_length",
            CoreError::UnsupportedChain(_) => "unsupported_chain",
            CoreError::UnsupportedOperation(_) => "unsupported_operation",
            CoreError::MissingRequiredParameter(_) => "missing_required_parameter",
            CoreError::EncodingOverflow(_) => "encoding_overflow",
            CoreError::InvalidSignature(_) => "invalid_signature",
            CoreError::InvalidFee(_) => "invalid_fee",
            CoreError::MalformedResponse(_) => "malformed_response",
            CoreError::RpcError { .. } => "rpc_error",
            CoreError::AmountExceedsBalance => "amount_exceeds_balance",
            CoreError::FeeExceedsBalance => "fee_exceeds_balance",
            CoreError::TotalExceedsBalance => "total_exceeds_balance",
            CoreError::BalanceNotFound(_) => "balance_not_found",
            CoreError::DustAmount { .. } => "dust_amount",
            CoreError::DustChange { .. } => "dust_change",
            CoreError::InsufficientReserve { .. } => "insufficient_reserve",
            CoreError::FeeExceedsMaxFeeResource => "fee_exceeds_max_fee_resource",
            CoreError::AmountExceedsFeeResourceCapacity { .. } => {
                "amount_exceeds_fee_resource_capacity"
            }
            CoreError::InsufficientFeeResource => "insufficient_fee_resource",
        }
    }

    /// 数字错误码（客户端展示用）
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidAddress(_) => ErrorCode::InvalidAddressFormat,
            CoreError::InvalidPublicKey(_) => ErrorCode::InvalidPublicKey,
            CoreError::InvalidName(_) | CoreError::InvalidLabelLength { .. } => {
                ErrorCode::InvalidEnsName
            }
            CoreError::UnsupportedChain(_) => ErrorCode::UnsupportedChain,
            CoreError::UnsupportedOperation(_) => ErrorCode::UnsupportedOperation,
            CoreError::MissingRequiredParameter(_) => ErrorCode::MissingParameter,
            CoreError::EncodingOverflow(_) => ErrorCode::EncodingOverflow,
            CoreError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            CoreError::InvalidFee(_) => ErrorCode::InvalidFee,
            CoreError::MalformedResponse(_) => ErrorCode::MalformedResponse,
            CoreError::RpcError { .. } => ErrorCode::RpcRejected,
            CoreError::AmountExceedsBalance
            | CoreError::FeeExceedsBalance
            | CoreError::TotalExceedsBalance
            | CoreError::BalanceNotFound(_) => ErrorCode::InsufficientBalance,
            CoreError::DustAmount { .. } => ErrorCode::DustAmount,
            CoreError::DustChange { .. } => ErrorCode::DustChange,
            CoreError::InsufficientReserve { .. } => ErrorCode::InsufficientReserve,
            CoreError::FeeExceedsMaxFeeResource => ErrorCode::FeeExceedsMaxFeeResource,
            CoreError::AmountExceedsFeeResourceCapacity { .. } => {
                ErrorCode::AmountExceedsFeeResourceCapacity
            }
            CoreError::InsufficientFeeResource => ErrorCode::InsufficientFeeResource,
        }
    }

    /// 校验类错误可由用户修改输入后恢复
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CoreError::AmountExceedsBalance
                | CoreError::FeeExceedsBalance
                | CoreError::TotalExceedsBalance
                | CoreError::DustAmount { .. }
                | CoreError::DustChange { .. }
                | CoreError::InsufficientReserve { .. }
                | CoreError::FeeExceedsMaxFeeResource
                | CoreError::AmountExceedsFeeResourceCapacity { .. }
                | CoreError::InsufficientFeeResource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            CoreError::InvalidAddress("x".into()).code(),
            "invalid_address"
        );
        assert_eq!(
            CoreError::DustChange {
                minimum: Decimal::new(2, 1)
            }
            .code(),
            "dust_change"
        );
        assert_eq!(
            CoreError::UnsupportedChain("foo".into()).error_code() as u32,
            1101
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(CoreError::InsufficientFeeResource.is_validation_error());
        assert!(!CoreError::MalformedResponse("bad".into()).is_validation_error());
    }

    #[test]
    fn test_display_includes_threshold() {
        let err = CoreError::DustAmount {
            minimum: Decimal::new(2, 1),
        };
        assert_eq!(err.to_string(), "amount is below dust threshold 0.2");
    }
}
