//! 手续费模型

use num_bigint::BigUint;

use crate::domain::amount::Amount;
use crate::domain::chain_config::RoundingMode;
use crate::error::{CoreError, CoreResult};

/// 链特定的手续费参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeParameters {
    /// Filecoin: fee = gas_limit * gas_fee_cap (attoFIL)
    Filecoin {
        gas_limit: u64,
        gas_fee_cap: BigUint,
        gas_premium: BigUint,
    },
    /// EVM legacy: fee = gas_limit * gas_price (wei)
    Ethereum { gas_limit: u64, gas_price: BigUint },
}

impl FeeParameters {
    /// 由参数推导出的手续费（最小单位）
    pub fn total(&self) -> BigUint {
        match self {
            FeeParameters::Filecoin {
                gas_limit,
                gas_fee_cap,
                ..
            } => gas_fee_cap * BigUint::from(*gas_limit),
            FeeParameters::Ethereum {
                gas_limit,
                gas_price,
            } => gas_price * BigUint::from(*gas_limit),
        }
    }
}

/// 手续费
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub amount: Amount,
    pub parameters: Option<FeeParameters>,
}

impl Fee {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount,
            parameters: None,
        }
    }

    pub fn with_parameters(amount: Amount, parameters: FeeParameters) -> Self {
        Self {
            amount,
            parameters: Some(parameters),
        }
    }

    /// 参数存在时，金额必须等于参数乘积
    pub fn ensure_consistent(&self) -> CoreResult<()> {
        let Some(parameters) = &self.parameters else {
            return Ok(());
        };
        let expected = parameters.total();
        let actual = self.amount.to_minimal_units(RoundingMode::Plain)?;
        if expected != actual {
            return Err(CoreError::InvalidFee(format!(
                "amount {actual} but parameters give {expected}"
            )));
        }
        Ok(())
    }

    pub fn filecoin_parameters(&self) -> CoreResult<(u64, &BigUint, &BigUint)> {
        match &self.parameters {
            Some(FeeParameters::Filecoin {
                gas_limit,
                gas_fee_cap,
                gas_premium,
            }) => Ok((*gas_limit, gas_fee_cap, gas_premium)),
            _ => Err(CoreError::MissingRequiredParameter(
                "filecoin fee parameters".to_string(),
            )),
        }
    }

    pub fn ethereum_parameters(&self) -> CoreResult<(u64, &BigUint)> {
        match &self.parameters {
            Some(FeeParameters::Ethereum {
                gas_limit,
                gas_price,
            }) => Ok((*gas_limit, gas_price)),
            _ => Err(CoreError::MissingRequiredParameter(
                "ethereum fee parameters".to_string(),
            )),
        }
    }
}
