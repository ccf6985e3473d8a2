//! 交易经济性验证
//!
//! 构建交易前对钱包余额快照做纯函数检查：余额、粉尘、储备金、手续费资源。
//! 所有检查都显式接收快照，不依赖钱包状态。

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::config::EconomicsConfig;
use crate::domain::amount::{Amount, AmountType, FeeResourceKind};
use crate::domain::chain_config::Blockchain;
use crate::domain::fee::Fee;
use crate::error::{CoreError, CoreResult};

/// 钱包余额快照（按金额类型索引）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSnapshot {
    balances: HashMap<AmountType, Amount>,
}

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, balance: Amount) -> Self {
        self.insert(balance);
        self
    }

    pub fn insert(&mut self, balance: Amount) {
        self.balances.insert(balance.amount_type.clone(), balance);
    }

    pub fn balance(&self, amount_type: &AmountType) -> CoreResult<&Amount> {
        self.balances
            .get(amount_type)
            .ok_or_else(|| CoreError::BalanceNotFound(amount_type.to_string()))
    }
}

/// 目标账户状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationAccount {
    /// 已在链上创建
    Created(String),
    NotCreated,
}

/// 余额检查
pub fn validate_balance(amount: &Amount, fee: &Fee, snapshot: &BalanceSnapshot) -> CoreResult<()> {
    let balance = snapshot.balance(&amount.amount_type)?;
    if amount.value > balance.value {
        return Err(CoreError::AmountExceedsBalance);
    }

    let fee_balance = snapshot.balance(&fee.amount.amount_type)?;
    if fee.amount.value > fee_balance.value {
        return Err(CoreError::FeeExceedsBalance);
    }

    if fee.amount.amount_type == amount.amount_type {
        let total = amount.checked_add(&fee.amount)?;
        if total.value > balance.value {
            return Err(CoreError::TotalExceedsBalance);
        }
    }
    Ok(())
}

/// 粉尘检查
///
/// 只在金额类型与粉尘阈值类型一致时生效。手续费与金额同类型时计入发送总额。
/// 余额未知时只检查金额，跳过找零检查。
pub fn validate_dust(
    amount: &Amount,
    fee: &Fee,
    dust: &Amount,
    snapshot: &BalanceSnapshot,
) -> CoreResult<()> {
    if amount.amount_type != dust.amount_type {
        return Ok(());
    }

    if amount.value < dust.value {
        tracing::warn!(amount = %amount, dust = %dust, "amount below dust threshold");
        return Err(CoreError::DustAmount {
            minimum: dust.value,
        });
    }

    let Some(balance) = snapshot.balances.get(&amount.amount_type) else {
        tracing::debug!(amount_type = %amount.amount_type, "no balance loaded, change dust check skipped");
        return Ok(());
    };
    let sending = if fee.amount.amount_type == amount.amount_type {
        amount.value + fee.amount.value
    } else {
        amount.value
    };

    let change = balance.value - sending;
    if change > Decimal::ZERO && change < dust.value {
        tracing::warn!(change = %change, dust = %dust, "change below dust threshold");
        return Err(CoreError::DustChange {
            minimum: dust.value,
        });
    }
    Ok(())
}

/// 储备金检查
///
/// 目标账户未创建时，原生币转账必须覆盖开户最低额（未配置时取储备金），代币无法转入。
pub fn validate_reserve(
    amount: &Amount,
    destination: &DestinationAccount,
    reserve: &Amount,
    create_account_minimum: Option<&Amount>,
) -> CoreResult<()> {
    if let DestinationAccount::Created(_) = destination {
        return Ok(());
    }

    let required = create_account_minimum.unwrap_or(reserve);
    match &amount.amount_type {
        AmountType::Coin => {
            if amount.currency_symbol != required.currency_symbol {
                return Err(CoreError::UnsupportedOperation(format!(
                    "reserve in {} for amount in {}",
                    required.currency_symbol, amount.currency_symbol
                )));
            }
            if amount.value < required.value {
                tracing::warn!(amount = %amount, required = %required, "destination account not created");
                return Err(CoreError::InsufficientReserve {
                    required: required.value,
                });
            }
            Ok(())
        }
        AmountType::Token(_) => Err(CoreError::InsufficientReserve {
            required: required.value,
        }),
        other => Err(CoreError::UnsupportedOperation(format!(
            "{other} transfer to a new account"
        ))),
    }
}

/// 手续费资源检查（Koinos mana）
///
/// 资源上限等于原生币余额。金额与手续费共同消耗当前 mana，
/// 因此可发送金额不超过 mana - fee。
pub fn validate_fee_resource(
    amount: &Amount,
    fee: &Fee,
    snapshot: &BalanceSnapshot,
) -> CoreResult<()> {
    let coin_balance = snapshot.balance(&AmountType::Coin)?;
    let mana = snapshot.balance(&AmountType::FeeResource(FeeResourceKind::Mana))?;
    let fee_value = fee.amount.value;

    if fee_value > coin_balance.value {
        return Err(CoreError::FeeExceedsMaxFeeResource);
    }
    if fee_value > mana.value {
        return Err(CoreError::InsufficientFeeResource);
    }

    if amount.amount_type == AmountType::Coin {
        if amount.value > coin_balance.value {
            return Err(CoreError::AmountExceedsBalance);
        }
        let max_amount = mana.value - fee_value;
        if amount.value > max_amount {
            tracing::warn!(amount = %amount, max_amount = %max_amount, "amount exceeds fee resource capacity");
            return Err(CoreError::AmountExceedsFeeResourceCapacity { max_amount });
        }
    }
    Ok(())
}

/// 链的经济参数
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEconomics {
    pub dust: Option<Amount>,
    pub reserve: Option<Amount>,
    pub create_account_minimum: Option<Amount>,
    pub uses_fee_resource: bool,
}

impl ChainEconomics {
    pub fn for_chain(chain: Blockchain, config: &EconomicsConfig) -> Self {
        let coin = |value: Decimal| Amount::coin(chain, value);
        let reserve = |value: Decimal| Amount::reserve(chain, value);

        let (dust, reserve, create_account_minimum) = match chain {
            Blockchain::Bitcoin { .. } => (Some(coin(config.bitcoin_dust)), None, None),
            Blockchain::Litecoin => (Some(coin(config.litecoin_dust)), None, None),
            Blockchain::Dogecoin => (Some(coin(config.dogecoin_dust)), None, None),
            Blockchain::Kaspa { .. } => (Some(coin(config.kaspa_dust)), None, None),
            Blockchain::Xrp { .. } => (None, Some(reserve(config.xrp_base_reserve)), None),
            Blockchain::Stellar { .. } => (
                None,
                Some(reserve(config.stellar_base_reserve)),
                Some(coin(config.stellar_create_account_minimum)),
            ),
            _ => (None, None, None),
        };

        Self {
            dust,
            reserve,
            create_account_minimum,
            uses_fee_resource: chain.has_fee_resource(),
        }
    }

    /// 按链配置依次执行适用的检查
    pub fn validate(
        &self,
        amount: &Amount,
        fee: &Fee,
        destination: &DestinationAccount,
        snapshot: &BalanceSnapshot,
    ) -> CoreResult<()> {
        if self.uses_fee_resource {
            validate_fee_resource(amount, fee, snapshot)?;
        } else {
            validate_balance(amount, fee, snapshot)?;
        }
        if let Some(dust) = &self.dust {
            validate_dust(amount, fee, dust, snapshot)?;
        }
        if let Some(reserve) = &self.reserve {
            validate_reserve(
                amount,
                destination,
                reserve,
                self.create_account_minimum.as_ref(),
            )?;
        }
        Ok(())
    }
}
