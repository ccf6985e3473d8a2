//! 金额模型
//!
//! 金额始终以整币（人类可读）精度保存，只有在编码边界才按链精度和舍入策略转换为最小单位整数

use std::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::chain_config::{Blockchain, RoundingMode};
use crate::error::{CoreError, CoreResult};

/// 代币描述
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub contract_address: String,
    pub decimal_count: u32,
}

/// 手续费资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeResourceKind {
    /// Koinos mana
    Mana,
}

/// 金额类型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AmountType {
    Coin,
    Token(Token),
    Reserve,
    FeeResource(FeeResourceKind),
}

impl fmt::Display for AmountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountType::Coin => f.write_str("coin"),
            AmountType::Token(token) => write!(f, "token:{}", token.symbol),
            AmountType::Reserve => f.write_str("reserve"),
            AmountType::FeeResource(FeeResourceKind::Mana) => f.write_str("fee_resource:mana"),
        }
    }
}

/// 金额
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub amount_type: AmountType,
    pub currency_symbol: String,
    pub value: Decimal,
    pub decimals: u32,
}

impl Amount {
    pub fn new(
        amount_type: AmountType,
        currency_symbol: impl Into<String>,
        value: Decimal,
        decimals: u32,
    ) -> Self {
        Self {
            amount_type,
            currency_symbol: currency_symbol.into(),
            value,
            decimals,
        }
    }

    /// 链原生币金额
    pub fn coin(chain: Blockchain, value: Decimal) -> Self {
        Self::new(
            AmountType::Coin,
            chain.currency_symbol(),
            value,
            chain.decimal_count(),
        )
    }

    /// 代币金额
    pub fn token(token: Token, value: Decimal) -> Self {
        let symbol = token.symbol.clone();
        let decimals = token.decimal_count;
        Self::new(AmountType::Token(token), symbol, value, decimals)
    }

    /// 储备金金额（以链原生币计价）
    pub fn reserve(chain: Blockchain, value: Decimal) -> Self {
        Self::new(
            AmountType::Reserve,
            chain.currency_symbol(),
            value,
            chain.decimal_count(),
        )
    }

    /// 手续费资源金额
    pub fn fee_resource(kind: FeeResourceKind, chain: Blockchain, value: Decimal) -> Self {
        Self::new(
            AmountType::FeeResource(kind),
            chain.currency_symbol(),
            value,
            chain.decimal_count(),
        )
    }

    /// 从最小单位整数构造（RPC 余额解码）
    pub fn from_minimal_units(
        amount_type: AmountType,
        currency_symbol: impl Into<String>,
        units: &BigUint,
        decimals: u32,
    ) -> CoreResult<Self> {
        let raw = units
            .to_i128()
            .ok_or_else(|| CoreError::EncodingOverflow(format!("{units} exceeds 128 bits")))?;
        let value = Decimal::try_from_i128_with_scale(raw, decimals)
            .map_err(|e| CoreError::EncodingOverflow(format!("{units}: {e}")))?
            .normalize();
        Ok(Self::new(amount_type, currency_symbol, value, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// 同类型同币种的另一个金额
    pub fn with_value(&self, value: Decimal) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    /// 与另一个金额类型和币种一致
    pub fn is_same_kind(&self, other: &Amount) -> bool {
        self.amount_type == other.amount_type && self.currency_symbol == other.currency_symbol
    }

    /// 转换为最小单位整数
    pub fn to_minimal_units(&self, rounding: RoundingMode) -> CoreResult<BigUint> {
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err(CoreError::EncodingOverflow(format!(
                "negative amount {}",
                self.value
            )));
        }

        let multiplier = 10i128
            .checked_pow(self.decimals)
            .and_then(|m| Decimal::try_from_i128_with_scale(m, 0).ok())
            .ok_or_else(|| {
                CoreError::EncodingOverflow(format!("{} decimals not representable", self.decimals))
            })?;

        let scaled = self.value.checked_mul(multiplier).ok_or_else(|| {
            CoreError::EncodingOverflow(format!("{} {}", self.value, self.currency_symbol))
        })?;

        let units = scaled
            .round_dp_with_strategy(0, rounding.strategy())
            .to_u128()
            .ok_or_else(|| {
                CoreError::EncodingOverflow(format!("{} {}", self.value, self.currency_symbol))
            })?;

        Ok(BigUint::from(units))
    }

    /// 转换为 u64 最小单位（大多数链的金额字段宽度）
    pub fn to_u64_units(&self, rounding: RoundingMode) -> CoreResult<u64> {
        let units = self.to_minimal_units(rounding)?;
        units.to_u64().ok_or_else(|| {
            CoreError::EncodingOverflow(format!("{units} does not fit in 64 bits"))
        })
    }

    pub fn checked_add(&self, other: &Amount) -> CoreResult<Amount> {
        self.ensure_same_kind(other)?;
        let value = self.value.checked_add(other.value).ok_or_else(|| {
            CoreError::EncodingOverflow(format!("{} + {}", self.value, other.value))
        })?;
        Ok(self.with_value(value))
    }

    pub fn checked_sub(&self, other: &Amount) -> CoreResult<Amount> {
        self.ensure_same_kind(other)?;
        let value = self.value.checked_sub(other.value).ok_or_else(|| {
            CoreError::EncodingOverflow(format!("{} - {}", self.value, other.value))
        })?;
        Ok(self.with_value(value))
    }

    fn ensure_same_kind(&self, other: &Amount) -> CoreResult<()> {
        if self.is_same_kind(other) {
            Ok(())
        } else {
            Err(CoreError::UnsupportedOperation(format!(
                "cannot combine {} {} with {} {}",
                self.amount_type, self.currency_symbol, other.amount_type, other.currency_symbol
            )))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.currency_symbol)
    }
}
