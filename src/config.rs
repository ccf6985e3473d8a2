//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::service::transaction_builder::koinos::{
    MAINNET_CHAIN_ID, MAINNET_KOIN_CONTRACT, TESTNET_CHAIN_ID, TESTNET_KOIN_CONTRACT,
};
use crate::service::transaction_builder::{AlgorandBuildContext, KoinosNetworkContext};
use crate::utils::encoding::BASE64_URL;

/// 核心配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub networks: NetworksConfig,
    #[serde(default)]
    pub economics: EconomicsConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    #[serde(default)]
    pub ansi: bool,
}

/// Algorand 网络参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorandNetworkConfig {
    pub genesis_id: String,
    /// 标准 base64
    pub genesis_hash: String,
}

/// 网络常量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworksConfig {
    pub koinos_mainnet: KoinosNetworkContext,
    pub koinos_testnet: KoinosNetworkContext,
    pub algorand_mainnet: AlgorandNetworkConfig,
    pub algorand_testnet: AlgorandNetworkConfig,
}

/// 经济参数（整币单位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicsConfig {
    pub bitcoin_dust: Decimal,
    pub litecoin_dust: Decimal,
    pub dogecoin_dust: Decimal,
    pub kaspa_dust: Decimal,
    pub xrp_base_reserve: Decimal,
    pub stellar_base_reserve: Decimal,
    pub stellar_create_account_minimum: Decimal,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            koinos_mainnet: KoinosNetworkContext::new(
                std::env::var("KOINOS_CHAIN_ID").unwrap_or_else(|_| MAINNET_CHAIN_ID.into()),
                std::env::var("KOINOS_KOIN_CONTRACT")
                    .unwrap_or_else(|_| MAINNET_KOIN_CONTRACT.into()),
            ),
            koinos_testnet: KoinosNetworkContext::new(
                std::env::var("KOINOS_TESTNET_CHAIN_ID")
                    .unwrap_or_else(|_| TESTNET_CHAIN_ID.into()),
                std::env::var("KOINOS_TESTNET_KOIN_CONTRACT")
                    .unwrap_or_else(|_| TESTNET_KOIN_CONTRACT.into()),
            ),
            algorand_mainnet: AlgorandNetworkConfig {
                genesis_id: std::env::var("ALGORAND_GENESIS_ID")
                    .unwrap_or_else(|_| "mainnet-v1.0".into()),
                genesis_hash: std::env::var("ALGORAND_GENESIS_HASH")
                    .unwrap_or_else(|_| "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=".into()),
            },
            algorand_testnet: AlgorandNetworkConfig {
                genesis_id: std::env::var("ALGORAND_TESTNET_GENESIS_ID")
                    .unwrap_or_else(|_| "testnet-v1.0".into()),
                genesis_hash: std::env::var("ALGORAND_TESTNET_GENESIS_HASH")
                    .unwrap_or_else(|_| "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".into()),
            },
        }
    }
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            bitcoin_dust: Decimal::new(env_units("BITCOIN_DUST_SAT", 546), 8),
            litecoin_dust: Decimal::new(env_units("LITECOIN_DUST_LITOSHI", 5460), 8),
            dogecoin_dust: env_decimal("DOGECOIN_DUST", Decimal::ONE),
            kaspa_dust: Decimal::new(env_units("KASPA_DUST_SOMPI", 20_000_000), 8),
            xrp_base_reserve: env_decimal("XRP_BASE_RESERVE", Decimal::ONE),
            stellar_base_reserve: env_decimal("STELLAR_BASE_RESERVE", Decimal::new(5, 1)),
            stellar_create_account_minimum: env_decimal(
                "STELLAR_CREATE_ACCOUNT_MINIMUM",
                Decimal::ONE,
            ),
        }
    }
}

fn env_units(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl NetworksConfig {
    pub fn koinos(&self, testnet: bool) -> &KoinosNetworkContext {
        if testnet {
            &self.koinos_testnet
        } else {
            &self.koinos_mainnet
        }
    }

    pub fn algorand(&self, testnet: bool) -> &AlgorandNetworkConfig {
        if testnet {
            &self.algorand_testnet
        } else {
            &self.algorand_mainnet
        }
    }

    /// 以 `first_valid` 为起点的 Algorand 构建上下文
    pub fn algorand_context(&self, testnet: bool, first_valid: u64) -> CoreResult<AlgorandBuildContext> {
        let network = self.algorand(testnet);
        AlgorandBuildContext::new(network.genesis_id.clone(), &network.genesis_hash, first_valid)
    }
}

impl CoreConfig {
    /// 从环境变量加载配置（先读取 `.env`）
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            logging: LoggingConfig::default(),
            networks: NetworksConfig::default(),
            economics: EconomicsConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: CoreConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        for (name, koinos) in [
            ("koinos_mainnet", &self.networks.koinos_mainnet),
            ("koinos_testnet", &self.networks.koinos_testnet),
        ] {
            if koinos.chain_id.is_empty() {
                anyhow::bail!("{name}.chain_id must not be empty");
            }
            BASE64_URL
                .decode(&koinos.chain_id)
                .with_context(|| format!("{name}.chain_id is not base64url"))?;
            if koinos.koin_contract_id.is_empty() {
                anyhow::bail!("{name}.koin_contract_id must not be empty");
            }
        }

        for (name, algorand) in [
            ("algorand_mainnet", &self.networks.algorand_mainnet),
            ("algorand_testnet", &self.networks.algorand_testnet),
        ] {
            let hash = STANDARD
                .decode(&algorand.genesis_hash)
                .with_context(|| format!("{name}.genesis_hash is not base64"))?;
            if hash.len() != 32 {
                anyhow::bail!("{name}.genesis_hash must decode to 32 bytes");
            }
        }

        let economics = &self.economics;
        for (name, value) in [
            ("bitcoin_dust", economics.bitcoin_dust),
            ("litecoin_dust", economics.litecoin_dust),
            ("dogecoin_dust", economics.dogecoin_dust),
            ("kaspa_dust", economics.kaspa_dust),
            ("xrp_base_reserve", economics.xrp_base_reserve),
            ("stellar_base_reserve", economics.stellar_base_reserve),
            (
                "stellar_create_account_minimum",
                economics.stellar_create_account_minimum,
            ),
        ] {
            if value.is_sign_negative() {
                anyhow::bail!("economics.{name} must not be negative");
            }
        }

        Ok(())
    }
}
