//! IronCore Chains - 多链钱包的区块链抽象核心
//!
//! 非托管模式：只接收公钥和外部签名，从不接触私钥

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{CoreError, CoreResult};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::CoreConfig,
        domain::{
            Amount, AmountType, Blockchain, ChainRegistry, CurveType, Fee, FeeParameters,
            Transaction, TransactionParams,
        },
        error::{CoreError, CoreResult},
        service::transaction_builder::TransactionBuilder,
    };
}
