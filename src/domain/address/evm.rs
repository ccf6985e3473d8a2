//! EVM 地址（EIP-55）
//!
//! 地址 = Keccak256(非压缩公钥去掉 0x04 前缀) 的后 20 字节

use sha3::{Digest, Keccak256};

use super::{decompress_secp256k1, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

pub struct EvmAddressService;

impl EvmAddressService {
    /// 公钥对应的 20 字节地址
    pub fn address_bytes(public_key: &[u8]) -> CoreResult<[u8; 20]> {
        let uncompressed = decompress_secp256k1(public_key)?;
        let hash = Keccak256::digest(&uncompressed[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Ok(address)
    }

    /// EIP-55 校验大小写
    /// https://eips.ethereum.org/EIPS/eip-55
    pub fn to_checksum_address(address: &[u8; 20]) -> String {
        let lower = hex::encode(address);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, ch) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// 解析 `0x` + 40 位十六进制；大小写混合时必须满足 EIP-55
    pub fn parse_bytes(address: &str) -> CoreResult<[u8; 20]> {
        let invalid = |reason: &str| CoreError::InvalidAddress(format!("{address}: {reason}"));

        let hex_part = address
            .strip_prefix("0x")
            .ok_or_else(|| invalid("missing 0x prefix"))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("expected 40 hex characters"));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes).map_err(|e| invalid(&e.to_string()))?;

        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        if has_upper && has_lower && Self::to_checksum_address(&bytes) != address {
            return Err(invalid("checksum mismatch"));
        }

        Ok(bytes)
    }
}

impl AddressService for EvmAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        Ok(Self::to_checksum_address(&Self::address_bytes(public_key)?))
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        Ok(AddressComponents::Evm {
            address: Self::parse_bytes(address)?,
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Evm { address } => Ok(Self::to_checksum_address(address)),
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not an EVM address"
            ))),
        }
    }
}
