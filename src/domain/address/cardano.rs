//! Cardano Shelley 地址
//!
//! 字节格式：头字节（高 4 位地址类型，低 4 位网络）|| 凭证，bech32 编码，
//! 主网前缀 `addr`，测试网 `addr_test`。凭证为 blake2b-224(ed25519 公钥)。

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use super::filecoin::blake2b;
use super::{ed25519_public_key, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

const KEY_HASH_LENGTH: usize = 28;
/// 企业地址：只有支付凭证
const TYPE_ENTERPRISE_KEY: u8 = 0b0110;
const NETWORK_MAINNET: u8 = 1;
const NETWORK_TESTNET: u8 = 0;

pub struct CardanoAddressService {
    testnet: bool,
}

impl CardanoAddressService {
    pub fn new(testnet: bool) -> Self {
        Self { testnet }
    }

    fn hrp(&self) -> &'static str {
        if self.testnet {
            "addr_test"
        } else {
            "addr"
        }
    }

    fn network(&self) -> u8 {
        if self.testnet {
            NETWORK_TESTNET
        } else {
            NETWORK_MAINNET
        }
    }

    /// 凭证长度：基础地址（类型 0-3）两个凭证，企业地址（类型 6-7）一个
    fn payload_length(address_type: u8) -> Option<usize> {
        match address_type {
            0..=3 => Some(2 * KEY_HASH_LENGTH),
            6 | 7 => Some(KEY_HASH_LENGTH),
            _ => None,
        }
    }

    fn encode_bytes(&self, header: u8, payload: &[u8]) -> CoreResult<String> {
        let hrp = Hrp::parse(self.hrp())
            .map_err(|e| CoreError::InvalidAddress(format!("hrp {}: {e}", self.hrp())))?;
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(header);
        bytes.extend_from_slice(payload);
        bech32::encode::<Bech32>(hrp, &bytes)
            .map_err(|e| CoreError::EncodingOverflow(format!("bech32: {e}")))
    }

    fn check_components(&self, header: u8, payload: &[u8]) -> Result<(), String> {
        if header & 0x0f != self.network() {
            return Err(format!("network {} in header", header & 0x0f));
        }
        match Self::payload_length(header >> 4) {
            Some(length) if length == payload.len() => Ok(()),
            Some(length) => Err(format!(
                "expected {length} payload bytes, got {}",
                payload.len()
            )),
            None => Err(format!("unsupported address type {}", header >> 4)),
        }
    }
}

impl AddressService for CardanoAddressService {
    /// 生成企业地址
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        let key_hash = blake2b::<KEY_HASH_LENGTH>(&ed25519_public_key(public_key)?)?;
        self.encode_bytes(TYPE_ENTERPRISE_KEY << 4 | self.network(), &key_hash)
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        let invalid = |reason: String| CoreError::InvalidAddress(format!("{address}: {reason}"));

        let checked =
            CheckedHrpstring::new::<Bech32>(address).map_err(|e| invalid(e.to_string()))?;
        let hrp = checked.hrp().to_lowercase();
        if hrp != self.hrp() {
            return Err(invalid(format!("unexpected prefix {hrp}")));
        }

        let bytes: Vec<u8> = checked.byte_iter().collect();
        let (&header, payload) = bytes
            .split_first()
            .ok_or_else(|| invalid("empty payload".to_string()))?;
        self.check_components(header, payload).map_err(invalid)?;

        Ok(AddressComponents::Cardano {
            header,
            payload: payload.to_vec(),
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Cardano { header, payload } => {
                self.check_components(*header, payload)
                    .map_err(CoreError::InvalidAddress)?;
                self.encode_bytes(*header, payload)
            }
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not a Cardano address"
            ))),
        }
    }
}
