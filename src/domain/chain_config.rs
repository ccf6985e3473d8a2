//! 多链配置模块
//!
//! 定义所有支持的区块链（封闭枚举）及其静态元数据：精度、舍入策略、曲线、测试网标记

use std::fmt;

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::utils::chain_normalizer::{normalize_chain_identifier, split_network_suffix};

/// 加密曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 曲线 (Bitcoin, Kaspa, EVM, Filecoin, Koinos, XRP)
    Secp256k1,
    /// ed25519 曲线 (Algorand, Stellar, Cardano, XRP)
    Ed25519,
}

/// 金额转换为最小单位时的舍入策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// 向零截断
    Down,
    /// 远离零进位
    Up,
    /// 四舍五入（中点远离零）
    Plain,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Plain => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// 支持的区块链
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum Blockchain {
    Bitcoin { testnet: bool },
    Litecoin,
    Dogecoin,
    Kaspa { testnet: bool },
    Ethereum { testnet: bool },
    #[serde(rename = "bsc")]
    BinanceSmartChain { testnet: bool },
    Polygon { testnet: bool },
    Arbitrum { testnet: bool },
    Optimism { testnet: bool },
    Avalanche { testnet: bool },
    Filecoin,
    Algorand { testnet: bool },
    Xrp { curve: CurveType },
    Koinos { testnet: bool },
    Stellar { testnet: bool },
    Cardano,
}

impl Blockchain {
    /// 从链标识符解析，等同于 [`ChainRegistry::resolve`]
    pub fn from_identifier(id: &str) -> CoreResult<Self> {
        ChainRegistry::resolve(id)
    }

    /// 规范名称（不含网络后缀）
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin { .. } => "bitcoin",
            Blockchain::Litecoin => "litecoin",
            Blockchain::Dogecoin => "dogecoin",
            Blockchain::Kaspa { .. } => "kaspa",
            Blockchain::Ethereum { .. } => "ethereum",
            Blockchain::BinanceSmartChain { .. } => "bsc",
            Blockchain::Polygon { .. } => "polygon",
            Blockchain::Arbitrum { .. } => "arbitrum",
            Blockchain::Optimism { .. } => "optimism",
            Blockchain::Avalanche { .. } => "avalanche",
            Blockchain::Filecoin => "filecoin",
            Blockchain::Algorand { .. } => "algorand",
            Blockchain::Xrp { .. } => "xrp",
            Blockchain::Koinos { .. } => "koinos",
            Blockchain::Stellar { .. } => "stellar",
            Blockchain::Cardano => "cardano",
        }
    }

    /// 完整标识符，测试网带 `/test` 后缀
    pub fn identifier(&self) -> String {
        if self.is_testnet() {
            format!("{}/test", self.canonical_name())
        } else {
            self.canonical_name().to_string()
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin { .. } => "Bitcoin",
            Blockchain::Litecoin => "Litecoin",
            Blockchain::Dogecoin => "Dogecoin",
            Blockchain::Kaspa { .. } => "Kaspa",
            Blockchain::Ethereum { .. } => "Ethereum",
            Blockchain::BinanceSmartChain { .. } => "BNB Smart Chain",
            Blockchain::Polygon { .. } => "Polygon",
            Blockchain::Arbitrum { .. } => "Arbitrum One",
            Blockchain::Optimism { .. } => "Optimism",
            Blockchain::Avalanche { .. } => "Avalanche C-Chain",
            Blockchain::Filecoin => "Filecoin",
            Blockchain::Algorand { .. } => "Algorand",
            Blockchain::Xrp { .. } => "XRP Ledger",
            Blockchain::Koinos { .. } => "Koinos",
            Blockchain::Stellar { .. } => "Stellar",
            Blockchain::Cardano => "Cardano",
        }
    }

    pub fn is_testnet(&self) -> bool {
        match *self {
            Blockchain::Bitcoin { testnet }
            | Blockchain::Kaspa { testnet }
            | Blockchain::Ethereum { testnet }
            | Blockchain::BinanceSmartChain { testnet }
            | Blockchain::Polygon { testnet }
            | Blockchain::Arbitrum { testnet }
            | Blockchain::Optimism { testnet }
            | Blockchain::Avalanche { testnet }
            | Blockchain::Algorand { testnet }
            | Blockchain::Koinos { testnet }
            | Blockchain::Stellar { testnet } => testnet,
            Blockchain::Litecoin
            | Blockchain::Dogecoin
            | Blockchain::Filecoin
            | Blockchain::Xrp { .. }
            | Blockchain::Cardano => false,
        }
    }

    /// 小数精度（最小单位 = 10^-decimals）
    pub fn decimal_count(&self) -> u32 {
        match self {
            Blockchain::Bitcoin { .. }
            | Blockchain::Litecoin
            | Blockchain::Dogecoin
            | Blockchain::Kaspa { .. }
            | Blockchain::Koinos { .. } => 8,
            Blockchain::Ethereum { .. }
            | Blockchain::BinanceSmartChain { .. }
            | Blockchain::Polygon { .. }
            | Blockchain::Arbitrum { .. }
            | Blockchain::Optimism { .. }
            | Blockchain::Avalanche { .. }
            | Blockchain::Filecoin => 18,
            Blockchain::Xrp { .. } | Blockchain::Cardano | Blockchain::Algorand { .. } => 6,
            Blockchain::Stellar { .. } => 7,
        }
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        if self.is_evm() || matches!(self, Blockchain::Filecoin) {
            RoundingMode::Plain
        } else {
            RoundingMode::Down
        }
    }

    pub fn curve(&self) -> CurveType {
        match self {
            Blockchain::Xrp { curve } => *curve,
            Blockchain::Algorand { .. } | Blockchain::Stellar { .. } | Blockchain::Cardano => {
                CurveType::Ed25519
            }
            _ => CurveType::Secp256k1,
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin { .. } => "BTC",
            Blockchain::Litecoin => "LTC",
            Blockchain::Dogecoin => "DOGE",
            Blockchain::Kaspa { .. } => "KAS",
            Blockchain::Ethereum { .. }
            | Blockchain::Arbitrum { .. }
            | Blockchain::Optimism { .. } => "ETH",
            Blockchain::BinanceSmartChain { .. } => "BNB",
            Blockchain::Polygon { .. } => "POL",
            Blockchain::Avalanche { .. } => "AVAX",
            Blockchain::Filecoin => "FIL",
            Blockchain::Algorand { .. } => "ALGO",
            Blockchain::Xrp { .. } => "XRP",
            Blockchain::Koinos { testnet: true } => "tKOIN",
            Blockchain::Koinos { testnet: false } => "KOIN",
            Blockchain::Stellar { .. } => "XLM",
            Blockchain::Cardano => "ADA",
        }
    }

    pub fn is_evm(&self) -> bool {
        self.evm_chain_id().is_some()
    }

    /// EIP-155 链 ID
    pub fn evm_chain_id(&self) -> Option<u64> {
        match *self {
            Blockchain::Ethereum { testnet } => Some(if testnet { 11_155_111 } else { 1 }),
            Blockchain::BinanceSmartChain { testnet } => Some(if testnet { 97 } else { 56 }),
            Blockchain::Polygon { testnet } => Some(if testnet { 80_002 } else { 137 }),
            Blockchain::Arbitrum { testnet } => Some(if testnet { 421_614 } else { 42_161 }),
            Blockchain::Optimism { testnet } => Some(if testnet { 11_155_420 } else { 10 }),
            Blockchain::Avalanche { testnet } => Some(if testnet { 43_113 } else { 43_114 }),
            _ => None,
        }
    }

    /// 链上是否存在代币资产
    pub fn can_handle_tokens(&self) -> bool {
        self.is_evm()
            || matches!(
                self,
                Blockchain::Stellar { .. }
                    | Blockchain::Xrp { .. }
                    | Blockchain::Algorand { .. }
                    | Blockchain::Cardano
            )
    }

    /// 手续费是否从独立资源池（而非可用余额）扣除
    pub fn has_fee_resource(&self) -> bool {
        matches!(self, Blockchain::Koinos { .. })
    }

    fn from_canonical(name: &str, testnet: bool) -> CoreResult<Self> {
        let chain = match name {
            "bitcoin" => Blockchain::Bitcoin { testnet },
            "kaspa" => Blockchain::Kaspa { testnet },
            "ethereum" => Blockchain::Ethereum { testnet },
            "bsc" => Blockchain::BinanceSmartChain { testnet },
            "polygon" => Blockchain::Polygon { testnet },
            "arbitrum" => Blockchain::Arbitrum { testnet },
            "optimism" => Blockchain::Optimism { testnet },
            "avalanche" => Blockchain::Avalanche { testnet },
            "algorand" => Blockchain::Algorand { testnet },
            "koinos" => Blockchain::Koinos { testnet },
            "stellar" => Blockchain::Stellar { testnet },
            "litecoin" | "dogecoin" | "filecoin" | "xrp" | "cardano" if testnet => {
                return Err(CoreError::UnsupportedChain(format!("{name}/test")));
            }
            "litecoin" => Blockchain::Litecoin,
            "dogecoin" => Blockchain::Dogecoin,
            "filecoin" => Blockchain::Filecoin,
            "xrp" => Blockchain::Xrp {
                curve: CurveType::Secp256k1,
            },
            "cardano" => Blockchain::Cardano,
            other => return Err(CoreError::UnsupportedChain(other.to_string())),
        };
        Ok(chain)
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// 链配置注册表
pub struct ChainRegistry {
    chains: Vec<Blockchain>,
}

impl ChainRegistry {
    /// 创建预配置的注册表（主网 + 测试网）
    pub fn new() -> Self {
        let mut registry = Self { chains: Vec::new() };
        for chain in Self::all() {
            registry.register(chain);
            if let Ok(testnet) = Blockchain::from_canonical(chain.canonical_name(), true) {
                registry.register(testnet);
            }
        }
        registry.register(Blockchain::Xrp {
            curve: CurveType::Ed25519,
        });
        registry
    }

    /// 主网目录
    pub fn all() -> Vec<Blockchain> {
        vec![
            Blockchain::Bitcoin { testnet: false },
            Blockchain::Litecoin,
            Blockchain::Dogecoin,
            Blockchain::Kaspa { testnet: false },
            Blockchain::Ethereum { testnet: false },
            Blockchain::BinanceSmartChain { testnet: false },
            Blockchain::Polygon { testnet: false },
            Blockchain::Arbitrum { testnet: false },
            Blockchain::Optimism { testnet: false },
            Blockchain::Avalanche { testnet: false },
            Blockchain::Filecoin,
            Blockchain::Algorand { testnet: false },
            Blockchain::Xrp {
                curve: CurveType::Secp256k1,
            },
            Blockchain::Koinos { testnet: false },
            Blockchain::Stellar { testnet: false },
            Blockchain::Cardano,
        ]
    }

    /// 解析链标识符，未知标识符返回 `UnsupportedChain`
    pub fn resolve(id: &str) -> CoreResult<Blockchain> {
        let (base, testnet) = split_network_suffix(id.trim());
        let canonical = normalize_chain_identifier(base)?;
        Blockchain::from_canonical(canonical, testnet)
    }

    /// 注册链
    pub fn register(&mut self, chain: Blockchain) {
        if !self.chains.contains(&chain) {
            self.chains.push(chain);
        }
    }

    /// 根据货币符号获取链（仅主网）
    pub fn get_by_symbol(&self, symbol: &str) -> Option<Blockchain> {
        self.chains
            .iter()
            .find(|chain| !chain.is_testnet() && chain.currency_symbol().eq_ignore_ascii_case(symbol))
            .copied()
    }

    /// 根据曲线类型获取所有链
    pub fn get_by_curve_type(&self, curve_type: CurveType) -> Vec<Blockchain> {
        self.chains
            .iter()
            .filter(|chain| chain.curve() == curve_type)
            .copied()
            .collect()
    }

    /// 获取所有链
    pub fn list_all(&self) -> &[Blockchain] {
        &self.chains
    }

    /// 验证所有配置的一致性
    pub fn validate_configs(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for chain in &self.chains {
            if chain.decimal_count() == 0 || chain.decimal_count() > 24 {
                errors.push(format!("{}: invalid decimal count", chain));
            }
            if chain.is_evm() && chain.curve() != CurveType::Secp256k1 {
                errors.push(format!("{}: EVM chain must use secp256k1", chain));
            }
            match ChainRegistry::resolve(&chain.identifier()) {
                Ok(resolved) if resolved.canonical_name() == chain.canonical_name() => {}
                _ => errors.push(format!("{}: identifier does not resolve", chain)),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
