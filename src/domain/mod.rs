//! Domain 模块
//!
//! 链目录、金额与交易模型、地址编解码

pub mod address;
pub mod amount;
pub mod chain_config;
pub mod fee;
pub mod transaction;

// 重新导出常用类型
pub use address::{AddressComponents, AddressKind, AddressService, AddressServiceFactory};
pub use amount::{Amount, AmountType, FeeResourceKind, Token};
pub use chain_config::{Blockchain, ChainRegistry, CurveType, RoundingMode};
pub use fee::{Fee, FeeParameters};
pub use transaction::{Transaction, TransactionParams};
