//! XRP Ledger 地址
//!
//! 账户 ID = HASH160(公钥)，ed25519 公钥带 0xED 前缀参与哈希；
//! 地址 = Ripple 字母表 Base58Check(0x00 || 账户 ID)

use super::{
    compress_secp256k1, ed25519_public_key, hash160, AddressComponents, AddressKind,
    AddressService,
};
use crate::domain::chain_config::CurveType;
use crate::error::{CoreError, CoreResult};

const ACCOUNT_VERSION: u8 = 0x00;
const ED25519_PREFIX: u8 = 0xed;

pub struct XrpAddressService {
    curve: CurveType,
}

impl XrpAddressService {
    pub fn new(curve: CurveType) -> Self {
        Self { curve }
    }

    /// 签名时写入 SigningPubKey 字段的公钥格式
    pub fn signing_public_key(&self, public_key: &[u8]) -> CoreResult<Vec<u8>> {
        match self.curve {
            CurveType::Secp256k1 => Ok(compress_secp256k1(public_key)?.to_vec()),
            CurveType::Ed25519 => {
                let raw = match public_key {
                    [ED25519_PREFIX, rest @ ..] if rest.len() == 32 => rest,
                    other => other,
                };
                let mut prefixed = Vec::with_capacity(33);
                prefixed.push(ED25519_PREFIX);
                prefixed.extend_from_slice(&ed25519_public_key(raw)?);
                Ok(prefixed)
            }
        }
    }

    pub fn account_id(&self, public_key: &[u8]) -> CoreResult<[u8; 20]> {
        Ok(hash160(&self.signing_public_key(public_key)?))
    }

    pub fn encode_account_id(account_id: &[u8; 20]) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(ACCOUNT_VERSION);
        payload.extend_from_slice(account_id);
        bs58::encode(payload)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check()
            .into_string()
    }

    pub fn decode_account_id(address: &str) -> CoreResult<[u8; 20]> {
        let decoded = bs58::decode(address)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .with_check(Some(ACCOUNT_VERSION))
            .into_vec()
            .map_err(|e| CoreError::InvalidAddress(format!("{address}: {e}")))?;
        if decoded.len() != 21 {
            return Err(CoreError::InvalidAddress(format!(
                "{address}: payload length {}",
                decoded.len()
            )));
        }
        let mut account_id = [0u8; 20];
        account_id.copy_from_slice(&decoded[1..]);
        Ok(account_id)
    }
}

impl AddressService for XrpAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        Ok(Self::encode_account_id(&self.account_id(public_key)?))
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        Ok(AddressComponents::Xrp {
            account_id: Self::decode_account_id(address)?,
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Xrp { account_id } => Ok(Self::encode_account_id(account_id)),
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not an XRP address"
            ))),
        }
    }
}
