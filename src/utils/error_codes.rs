//! 统一错误代码标准
//! 客户端按数字码展示本地化文案

use serde::{Deserialize, Serialize};

/// 标准错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 输入错误（10xx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// 签名无效
    InvalidSignature = 1001,
    /// 公钥无效
    InvalidPublicKey = 1002,
    /// 地址格式错误
    InvalidAddressFormat = 1006,
    /// ENS 名称无效
    InvalidEnsName = 1007,

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 构建错误（11xx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    UnsupportedChain = 1101,
    UnsupportedOperation = 1102,
    MissingParameter = 1103,
    EncodingOverflow = 1104,
    InvalidFee = 1105,

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 节点响应错误（3xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    MalformedResponse = 3001,
    RpcRejected = 3002,

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 经济校验错误（4xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    InsufficientBalance = 4001,
    DustAmount = 4006,
    DustChange = 4007,
    FeeExceedsMaxFeeResource = 4009,
    InsufficientFeeResource = 4010,
    AmountExceedsFeeResourceCapacity = 4011,
    InsufficientReserve = 4017,
}

impl ErrorCode {
    pub fn message_en(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignature => "Invalid transaction signature",
            ErrorCode::InvalidPublicKey => "Invalid public key",
            ErrorCode::InvalidAddressFormat => "Invalid address format",
            ErrorCode::InvalidEnsName => "Invalid ENS name",

            ErrorCode::UnsupportedChain => "Chain not supported",
            ErrorCode::UnsupportedOperation => "Operation not supported on this chain",
            ErrorCode::MissingParameter => "Required transaction parameter is missing",
            ErrorCode::EncodingOverflow => "Amount is too large for this network",
            ErrorCode::InvalidFee => "Fee parameters are inconsistent",

            ErrorCode::MalformedResponse => "Unexpected response from node",
            ErrorCode::RpcRejected => "Node rejected the request",

            ErrorCode::InsufficientBalance => "Insufficient balance",
            ErrorCode::DustAmount => "Amount is too small to send",
            ErrorCode::DustChange => "Remaining balance would be too small",
            ErrorCode::FeeExceedsMaxFeeResource => "Fee exceeds the maximum available resource",
            ErrorCode::InsufficientFeeResource => "Not enough resource to pay the fee",
            ErrorCode::AmountExceedsFeeResourceCapacity => {
                "Amount leaves not enough resource for the fee"
            }
            ErrorCode::InsufficientReserve => "Destination account requires a reserve",
        }
    }

    pub fn message_zh(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignature => "交易签名无效",
            ErrorCode::InvalidPublicKey => "公钥无效",
            ErrorCode::InvalidAddressFormat => "地址格式错误",
            ErrorCode::InvalidEnsName => "ENS 名称无效",

            ErrorCode::UnsupportedChain => "不支持的链",
            ErrorCode::UnsupportedOperation => "该链不支持此操作",
            ErrorCode::MissingParameter => "缺少必要的交易参数",
            ErrorCode::EncodingOverflow => "金额超出该网络可表示范围",
            ErrorCode::InvalidFee => "手续费参数不一致",

            ErrorCode::MalformedResponse => "节点响应格式错误",
            ErrorCode::RpcRejected => "节点拒绝请求",

            ErrorCode::InsufficientBalance => "余额不足",
            ErrorCode::DustAmount => "金额过小",
            ErrorCode::DustChange => "剩余余额过小",
            ErrorCode::FeeExceedsMaxFeeResource => "手续费超过资源上限",
            ErrorCode::InsufficientFeeResource => "手续费资源不足",
            ErrorCode::AmountExceedsFeeResourceCapacity => "发送金额后资源不足以支付手续费",
            ErrorCode::InsufficientReserve => "目标账户需要最低储备金",
        }
    }

    pub fn message(&self, lang: &str) -> &'static str {
        match lang {
            "zh" | "zh-CN" | "zh-TW" => self.message_zh(),
            _ => self.message_en(),
        }
    }
}
