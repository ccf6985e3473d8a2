//! 地址编解码
//!
//! 为每个链族提供统一的地址接口：从公钥生成地址、把地址解析为结构化组件、
//! 以及把组件重新编码为地址字符串

pub mod algorand;
pub mod bitcoin;
pub mod cardano;
pub mod ens;
pub mod evm;
pub mod filecoin;
pub mod kaspa;
pub mod stellar;
pub mod xrp;

use ::bitcoin::hashes::{hash160, Hash};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::domain::chain_config::Blockchain;
use crate::error::{CoreError, CoreResult};

pub use self::algorand::AlgorandAddressService;
pub use self::bitcoin::{BitcoinAddressService, BitcoinNetworkParams};
pub use self::cardano::CardanoAddressService;
pub use self::evm::EvmAddressService;
pub use self::filecoin::FilecoinAddressService;
pub use self::kaspa::{KaspaAddressComponents, KaspaAddressService, KaspaAddressType};
pub use self::stellar::StellarAddressService;
pub use self::xrp::XrpAddressService;

/// 地址种类（同一链存在多种格式时选择）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    /// 链的默认格式（Bitcoin 为原生隔离见证）
    #[default]
    Default,
    /// Base58Check P2PKH
    Legacy,
}

/// 解析后的地址组件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressComponents {
    /// Base58Check：版本字节 + 20 字节哈希
    Base58Check { version: u8, hash: [u8; 20] },
    /// 隔离见证：人类可读前缀 + 见证版本 + 见证程序
    Segwit {
        hrp: String,
        version: u8,
        program: Vec<u8>,
    },
    Kaspa(KaspaAddressComponents),
    Evm { address: [u8; 20] },
    Algorand { public_key: [u8; 32] },
    Filecoin {
        testnet: bool,
        protocol: u8,
        payload: Vec<u8>,
    },
    Xrp { account_id: [u8; 20] },
    Stellar { public_key: [u8; 32] },
    /// Shelley：头字节 + 凭证哈希
    Cardano { header: u8, payload: Vec<u8> },
}

/// 地址服务 trait
pub trait AddressService: Send + Sync {
    /// 从公钥生成地址
    fn make_address(&self, public_key: &[u8], kind: AddressKind) -> CoreResult<String>;

    /// 解析地址，校验和、前缀或字符集错误时返回 `InvalidAddress`
    fn parse(&self, address: &str) -> CoreResult<AddressComponents>;

    /// 把组件重新编码为地址
    fn encode(&self, components: &AddressComponents) -> CoreResult<String>;

    /// 验证地址，不会返回错误
    fn validate(&self, address: &str) -> bool {
        self.parse(address).is_ok()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 公钥 / 哈希工具
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// secp256k1 公钥转 33 字节压缩格式
pub fn compress_secp256k1(public_key: &[u8]) -> CoreResult<[u8; 33]> {
    let point = parse_secp256k1(public_key)?.to_encoded_point(true);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| CoreError::InvalidPublicKey("unexpected compressed length".to_string()))
}

/// secp256k1 公钥转 65 字节非压缩格式
pub fn decompress_secp256k1(public_key: &[u8]) -> CoreResult<[u8; 65]> {
    let point = parse_secp256k1(public_key)?.to_encoded_point(false);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| CoreError::InvalidPublicKey("unexpected uncompressed length".to_string()))
}

fn parse_secp256k1(public_key: &[u8]) -> CoreResult<k256::PublicKey> {
    k256::PublicKey::from_sec1_bytes(public_key).map_err(|_| {
        CoreError::InvalidPublicKey(format!(
            "not a secp256k1 point ({} bytes)",
            public_key.len()
        ))
    })
}

/// 32 字节 ed25519 公钥
pub fn ed25519_public_key(public_key: &[u8]) -> CoreResult<[u8; 32]> {
    let bytes: [u8; 32] = public_key.try_into().map_err(|_| {
        CoreError::InvalidPublicKey(format!(
            "ed25519 key must be 32 bytes, got {}",
            public_key.len()
        ))
    })?;
    ed25519_dalek::VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
    Ok(bytes)
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 地址服务工厂
pub struct AddressServiceFactory;

impl AddressServiceFactory {
    /// 根据链创建地址服务
    pub fn create(chain: Blockchain) -> CoreResult<Box<dyn AddressService>> {
        let service: Box<dyn AddressService> = match chain {
            Blockchain::Bitcoin { testnet } => Box::new(BitcoinAddressService::new(if testnet {
                BitcoinNetworkParams::BITCOIN_TESTNET
            } else {
                BitcoinNetworkParams::BITCOIN
            })),
            Blockchain::Litecoin => Box::new(BitcoinAddressService::new(
                BitcoinNetworkParams::LITECOIN,
            )),
            Blockchain::Dogecoin => Box::new(BitcoinAddressService::new(
                BitcoinNetworkParams::DOGECOIN,
            )),
            Blockchain::Koinos { .. } => {
                Box::new(BitcoinAddressService::new(BitcoinNetworkParams::KOINOS))
            }
            Blockchain::Kaspa { testnet } => Box::new(KaspaAddressService::new(testnet)),
            Blockchain::Filecoin => Box::new(FilecoinAddressService::new(false)),
            Blockchain::Algorand { .. } => Box::new(AlgorandAddressService),
            Blockchain::Xrp { curve } => Box::new(XrpAddressService::new(curve)),
            Blockchain::Stellar { .. } => Box::new(StellarAddressService),
            Blockchain::Cardano => Box::new(CardanoAddressService::new(false)),
            chain if chain.is_evm() => Box::new(EvmAddressService),
            other => {
                return Err(CoreError::UnsupportedOperation(format!(
                    "address codec for {other}"
                )))
            }
        };
        Ok(service)
    }
}
