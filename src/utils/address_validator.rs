//! 地址验证模块
//!
//! 统一入口：链标识符 → 地址编解码器 → 校验

use crate::domain::address::{AddressComponents, AddressServiceFactory};
use crate::domain::chain_config::Blockchain;
use crate::error::CoreResult;

/// 地址验证器
pub struct AddressValidator;

impl AddressValidator {
    /// 验证地址格式
    ///
    /// # 参数
    /// - `chain`: 链标识符（会自动标准化，支持 `/test` 等测试网后缀）
    /// - `address`: 待验证的地址
    ///
    /// # 返回
    /// - Ok(true): 地址有效
    /// - Ok(false): 地址无效
    /// - Err: 不支持的链
    pub fn validate(chain: &str, address: &str) -> CoreResult<bool> {
        let blockchain = Blockchain::from_identifier(chain)?;
        let service = AddressServiceFactory::create(blockchain)?;
        let valid = service.validate(address);

        if !valid {
            tracing::debug!(chain = %blockchain, address = %address, "address rejected");
        }
        Ok(valid)
    }

    /// 解析地址，失败时返回 `InvalidAddress`
    pub fn parse(chain: &str, address: &str) -> CoreResult<AddressComponents> {
        let blockchain = Blockchain::from_identifier(chain)?;
        AddressServiceFactory::create(blockchain)?.parse(address)
    }
}
