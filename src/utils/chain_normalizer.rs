//! 链标识符标准化模块
//!
//! 统一所有链标识符的处理逻辑：别名、大小写、测试网后缀

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{CoreError, CoreResult};

/// 链标识符配置
#[derive(Debug, Clone)]
pub struct ChainIdentifier {
    /// 规范名称（小写，用于内部处理）
    pub canonical_name: &'static str,
    /// 别名列表（小写）
    pub aliases: &'static [&'static str],
}

/// 测试网后缀
const TESTNET_SUFFIXES: &[&str] = &["/test", "-testnet", ":testnet", "/testnet"];

static CHAIN_IDENTIFIERS: &[ChainIdentifier] = &[
    ChainIdentifier {
        canonical_name: "bitcoin",
        aliases: &["btc", "xbt"],
    },
    ChainIdentifier {
        canonical_name: "litecoin",
        aliases: &["ltc"],
    },
    ChainIdentifier {
        canonical_name: "dogecoin",
        aliases: &["doge"],
    },
    ChainIdentifier {
        canonical_name: "kaspa",
        aliases: &["kas"],
    },
    ChainIdentifier {
        canonical_name: "ethereum",
        aliases: &["eth"],
    },
    ChainIdentifier {
        canonical_name: "bsc",
        aliases: &["binance", "bnb", "binancesmartchain"],
    },
    ChainIdentifier {
        canonical_name: "polygon",
        aliases: &["matic", "pol"],
    },
    ChainIdentifier {
        canonical_name: "arbitrum",
        aliases: &["arb", "arbitrum-one"],
    },
    ChainIdentifier {
        canonical_name: "optimism",
        aliases: &["op"],
    },
    ChainIdentifier {
        canonical_name: "avalanche",
        aliases: &["avax"],
    },
    ChainIdentifier {
        canonical_name: "filecoin",
        aliases: &["fil"],
    },
    ChainIdentifier {
        canonical_name: "algorand",
        aliases: &["algo"],
    },
    ChainIdentifier {
        canonical_name: "xrp",
        aliases: &["ripple", "xrpl"],
    },
    ChainIdentifier {
        canonical_name: "koinos",
        aliases: &["koin"],
    },
    ChainIdentifier {
        canonical_name: "stellar",
        aliases: &["xlm"],
    },
    ChainIdentifier {
        canonical_name: "cardano",
        aliases: &["ada"],
    },
];

/// 别名 → 标识符（静态初始化）
static CHAIN_REGISTRY: Lazy<HashMap<&'static str, &'static ChainIdentifier>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for chain in CHAIN_IDENTIFIERS {
        registry.insert(chain.canonical_name, chain);
        for alias in chain.aliases {
            registry.insert(*alias, chain);
        }
    }
    registry
});

/// 拆分测试网后缀，返回 (基础标识符, 是否测试网)
pub fn split_network_suffix(input: &str) -> (&str, bool) {
    for suffix in TESTNET_SUFFIXES {
        if input.len() <= suffix.len() {
            continue;
        }
        let idx = input.len() - suffix.len();
        if input.is_char_boundary(idx) && input[idx..].eq_ignore_ascii_case(suffix) {
            return (&input[..idx], true);
        }
    }
    (input, false)
}

/// 标准化链标识符
///
/// 接受任何大小写的规范名称或别名，返回小写的规范名称。
/// 测试网后缀需要先用 [`split_network_suffix`] 去掉。
pub fn normalize_chain_identifier(input: &str) -> CoreResult<&'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(CoreError::UnsupportedChain(
            "chain identifier cannot be empty".to_string(),
        ));
    }

    CHAIN_REGISTRY
        .get(trimmed.to_ascii_lowercase().as_str())
        .map(|chain| chain.canonical_name)
        .ok_or_else(|| CoreError::UnsupportedChain(trimmed.to_string()))
}

/// 判断是否为EVM链
pub fn is_evm_chain(chain: &str) -> bool {
    match normalize_chain_identifier(split_network_suffix(chain.trim()).0) {
        Ok(canonical) => matches!(
            canonical,
            "ethereum" | "bsc" | "polygon" | "arbitrum" | "optimism" | "avalanche"
        ),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_chain_identifier("BTC").unwrap(), "bitcoin");
        assert_eq!(normalize_chain_identifier("Ripple").unwrap(), "xrp");
        assert_eq!(normalize_chain_identifier(" koin ").unwrap(), "koinos");
        assert_eq!(normalize_chain_identifier("kaspa").unwrap(), "kaspa");
    }

    #[test]
    fn test_unknown_identifier_is_error() {
        assert!(matches!(
            normalize_chain_identifier("solana"),
            Err(CoreError::UnsupportedChain(_))
        ));
        assert!(matches!(
            normalize_chain_identifier(""),
            Err(CoreError::UnsupportedChain(_))
        ));
    }

    #[test]
    fn test_split_network_suffix() {
        assert_eq!(split_network_suffix("kaspa/test"), ("kaspa", true));
        assert_eq!(split_network_suffix("ETH-TESTNET"), ("ETH", true));
        assert_eq!(split_network_suffix("bitcoin"), ("bitcoin", false));
        assert_eq!(split_network_suffix("/test"), ("/test", false));
    }

    #[test]
    fn test_is_evm_chain() {
        assert!(is_evm_chain("eth"));
        assert!(is_evm_chain("polygon/test"));
        assert!(!is_evm_chain("xrp"));
        assert!(!is_evm_chain("unknown"));
    }
}
