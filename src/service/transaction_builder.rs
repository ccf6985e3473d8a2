//! 交易构建器
//!
//! 两阶段协议：
//! 1. `build_for_sign`：生成交给外部签名器的字节（或其哈希），纯函数且确定性
//! 2. `build_for_send`：把签名合并进未签名结构，得到可广播的字节或 DTO
//!
//! nonce / sequence 等网络状态由调用方通过 `TransactionParams` 显式传入

pub mod algorand;
pub mod ethereum;
pub mod filecoin;
pub mod kaspa;
pub mod koinos;
pub mod koinos_proto;
pub mod xrp;
pub mod xrp_codec;

pub use self::algorand::{AlgorandBuildContext, AlgorandTransactionBuilder};
pub use self::ethereum::EthereumTransactionBuilder;
pub use self::filecoin::{FilecoinSignedMessage, FilecoinTransactionBuilder};
pub use self::kaspa::{
    KaspaBuildContext, KaspaTransactionBuilder, KaspaTransactionDto, KaspaUnspentOutput,
};
pub use self::koinos::{KoinosNetworkContext, KoinosTransactionBuilder, KoinosTransactionDto};
pub use self::xrp::XrpTransactionBuilder;

use crate::domain::amount::AmountType;
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

/// 交易构建器 trait
///
/// `Context` 为链特定的网络上下文（创世哈希、链 ID 等），`Signed` 为签名后的可广播形式
pub trait TransactionBuilder {
    type Context;
    type Signed;

    fn build_for_sign(&self, transaction: &Transaction, context: &Self::Context)
        -> CoreResult<Vec<u8>>;

    fn build_for_send(
        &self,
        transaction: &Transaction,
        context: &Self::Context,
        signature: &[u8],
    ) -> CoreResult<Self::Signed>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 公共工具
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 只允许原生币转账
pub(crate) fn ensure_coin_transfer(transaction: &Transaction, chain: Blockchain) -> CoreResult<()> {
    match &transaction.amount.amount_type {
        AmountType::Coin => Ok(()),
        other => Err(CoreError::UnsupportedOperation(format!(
            "{other} transfer on {chain}"
        ))),
    }
}

/// 可恢复 secp256k1 签名：`r || s` 与恢复 ID（0/1）
///
/// 接受 64 字节（恢复 ID 视为 0）或 65 字节 `r || s || v`，v 可以是 0/1 或 27/28
pub(crate) fn split_recoverable_signature(signature: &[u8]) -> CoreResult<([u8; 64], u8)> {
    let (rs, recovery_id) = match signature.len() {
        64 => (signature, 0),
        65 => {
            let v = signature[64];
            let recovery_id = match v {
                0 | 1 => v,
                27 | 28 => v - 27,
                other => {
                    return Err(CoreError::InvalidSignature(format!(
                        "unexpected recovery byte {other}"
                    )))
                }
            };
            (&signature[..64], recovery_id)
        }
        other => {
            return Err(CoreError::InvalidSignature(format!(
                "expected 64 or 65 bytes, got {other}"
            )))
        }
    };

    let mut out = [0u8; 64];
    out.copy_from_slice(rs);
    Ok((out, recovery_id))
}
