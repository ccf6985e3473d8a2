//! Bitcoin 系列地址
//!
//! P2PKH / P2SH 使用 Base58Check(版本字节 + HASH160)，Bitcoin 原生隔离见证地址通过 bitcoin crate 生成

use ::bitcoin::address::NetworkUnchecked;
use ::bitcoin::{Address, Network, PublicKey, ScriptBuf};

use super::{compress_secp256k1, hash160, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

/// 网络版本参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitcoinNetworkParams {
    pub p2pkh_version: u8,
    pub p2sh_version: Option<u8>,
    /// 支持隔离见证时的网络和人类可读前缀
    pub segwit: Option<(Network, &'static str)>,
}

impl BitcoinNetworkParams {
    pub const BITCOIN: Self = Self {
        p2pkh_version: 0x00,
        p2sh_version: Some(0x05),
        segwit: Some((Network::Bitcoin, "bc")),
    };
    pub const BITCOIN_TESTNET: Self = Self {
        p2pkh_version: 0x6f,
        p2sh_version: Some(0xc4),
        segwit: Some((Network::Testnet, "tb")),
    };
    pub const LITECOIN: Self = Self {
        p2pkh_version: 0x30,
        p2sh_version: Some(0x32),
        segwit: None,
    };
    pub const DOGECOIN: Self = Self {
        p2pkh_version: 0x1e,
        p2sh_version: Some(0x16),
        segwit: None,
    };
    /// Koinos 账户地址与 Bitcoin 主网 P2PKH 同构
    pub const KOINOS: Self = Self {
        p2pkh_version: 0x00,
        p2sh_version: None,
        segwit: None,
    };
}

pub struct BitcoinAddressService {
    params: BitcoinNetworkParams,
}

impl BitcoinAddressService {
    pub fn new(params: BitcoinNetworkParams) -> Self {
        Self { params }
    }

    /// Base58Check 编码：版本字节 + 20 字节哈希
    pub fn encode_base58check(version: u8, hash: &[u8; 20]) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(hash);
        bs58::encode(payload).with_check().into_string()
    }

    fn make_legacy(&self, compressed: &[u8; 33]) -> String {
        Self::encode_base58check(self.params.p2pkh_version, &hash160(compressed))
    }

    fn make_segwit(&self, compressed: &[u8; 33], network: Network) -> CoreResult<String> {
        let public_key = PublicKey::from_slice(compressed)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
        let address = Address::p2wpkh(&public_key, network)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
        Ok(address.to_string())
    }

    fn parse_legacy(&self, address: &str) -> CoreResult<AddressComponents> {
        let decoded = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;

        if decoded.len() != 21 {
            return Err(CoreError::InvalidAddress(format!(
                "{address}: payload length {}",
                decoded.len()
            )));
        }

        let version = decoded[0];
        if !self.is_known_version(version) {
            return Err(CoreError::InvalidAddress(format!(
                "{address}: unexpected version byte {version:#04x}"
            )));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..]);
        Ok(AddressComponents::Base58Check { version, hash })
    }

    fn parse_segwit(
        &self,
        address: &str,
        network: Network,
        hrp: &str,
    ) -> CoreResult<AddressComponents> {
        let unchecked: Address<NetworkUnchecked> = address
            .parse()
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;
        let checked = unchecked
            .require_network(network)
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;

        let script = checked.script_pubkey();
        let bytes = script.as_bytes();
        if bytes.len() < 4 || bytes[1] as usize != bytes.len() - 2 {
            return Err(CoreError::InvalidAddress(format!(
                "{address}: not a witness program"
            )));
        }
        let version = match bytes[0] {
            0x00 => 0,
            op @ 0x51..=0x60 => op - 0x50,
            _ => {
                return Err(CoreError::InvalidAddress(format!(
                    "{address}: not a witness program"
                )))
            }
        };

        Ok(AddressComponents::Segwit {
            hrp: hrp.to_string(),
            version,
            program: bytes[2..].to_vec(),
        })
    }

    fn is_known_version(&self, version: u8) -> bool {
        version == self.params.p2pkh_version || Some(version) == self.params.p2sh_version
    }

    fn segwit_for(&self, address: &str) -> Option<(Network, &'static str)> {
        self.params.segwit.filter(|(_, hrp)| {
            address.len() > hrp.len()
                && address.is_char_boundary(hrp.len() + 1)
                && address[..hrp.len() + 1].eq_ignore_ascii_case(&format!("{hrp}1"))
        })
    }
}

impl AddressService for BitcoinAddressService {
    fn make_address(&self, public_key: &[u8], kind: AddressKind) -> CoreResult<String> {
        let compressed = compress_secp256k1(public_key)?;
        match (kind, self.params.segwit) {
            (AddressKind::Default, Some((network, _))) => self.make_segwit(&compressed, network),
            _ => Ok(self.make_legacy(&compressed)),
        }
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        match self.segwit_for(address) {
            Some((network, hrp)) => self.parse_segwit(address, network, hrp),
            None => self.parse_legacy(address),
        }
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Base58Check { version, hash } if self.is_known_version(*version) => {
                Ok(Self::encode_base58check(*version, hash))
            }
            AddressComponents::Segwit {
                hrp,
                version,
                program,
            } => {
                let (network, expected_hrp) = self
                    .params
                    .segwit
                    .filter(|(_, expected)| expected == hrp)
                    .ok_or_else(|| CoreError::InvalidAddress(format!("unexpected hrp {hrp}")))?;

                let opcode = match *version {
                    0 => 0x00,
                    v @ 1..=16 => 0x50 + v,
                    v => {
                        return Err(CoreError::InvalidAddress(format!(
                            "witness version {v} out of range"
                        )))
                    }
                };
                let mut script = Vec::with_capacity(program.len() + 2);
                script.push(opcode);
                script.push(program.len() as u8);
                script.extend_from_slice(program);

                let address = Address::from_script(&ScriptBuf::from_bytes(script), network)
                    .map_err(|e| CoreError::InvalidAddress(format!("{expected_hrp}: {e}")))?;
                Ok(address.to_string())
            }
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} do not belong to this network"
            ))),
        }
    }
}
