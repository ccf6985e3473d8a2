//! Algorand 地址：base32(公钥 || SHA512/256(公钥) 后 4 字节)，无填充

use sha2::{Digest, Sha512_256};

use super::{ed25519_public_key, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

const ALPHABET: base32::Alphabet = base32::Alphabet::RFC4648 { padding: false };
const CHECKSUM_LENGTH: usize = 4;
const ADDRESS_LENGTH: usize = 58;

pub struct AlgorandAddressService;

impl AlgorandAddressService {
    pub fn encode_public_key(public_key: &[u8; 32]) -> String {
        let checksum = Sha512_256::digest(public_key);
        let mut bytes = Vec::with_capacity(32 + CHECKSUM_LENGTH);
        bytes.extend_from_slice(public_key);
        bytes.extend_from_slice(&checksum[checksum.len() - CHECKSUM_LENGTH..]);
        base32::encode(ALPHABET, &bytes)
    }

    pub fn decode_public_key(address: &str) -> CoreResult<[u8; 32]> {
        let invalid = |reason: &str| CoreError::InvalidAddress(format!("{address}: {reason}"));

        if address.len() != ADDRESS_LENGTH {
            return Err(invalid("unexpected length"));
        }
        let bytes = base32::decode(ALPHABET, address).ok_or_else(|| invalid("not base32"))?;
        if bytes.len() != 32 + CHECKSUM_LENGTH {
            return Err(invalid("unexpected payload length"));
        }

        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&bytes[..32]);
        if Self::encode_public_key(&public_key) != address {
            return Err(invalid("checksum mismatch"));
        }
        Ok(public_key)
    }
}

impl AddressService for AlgorandAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        Ok(Self::encode_public_key(&ed25519_public_key(public_key)?))
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        Ok(AddressComponents::Algorand {
            public_key: Self::decode_public_key(address)?,
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Algorand { public_key } => Ok(Self::encode_public_key(public_key)),
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not an Algorand address"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER_KEY: &str = "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";
    const SENDER: &str = "RKEOHXLUBHYZL7KS3MWTZOS5OLFGOCN7DWKBEG7TOSEADNAPN5OOTUNSLE";

    #[test]
    fn test_make_address() {
        let key = hex::decode(SENDER_KEY).unwrap();
        assert_eq!(
            AlgorandAddressService
                .make_address(&key, AddressKind::Default)
                .unwrap(),
            SENDER
        );
        let key = hex::decode("8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394")
            .unwrap();
        assert_eq!(
            AlgorandAddressService
                .make_address(&key, AddressKind::Default)
                .unwrap(),
            "QE4XODVIPULV6VVDKRTMGTD6ZTFY3CURWTXDPIS56YHVXD6JWOKORTLPBU"
        );
    }

    #[test]
    fn test_parse_returns_public_key() {
        let components = AlgorandAddressService.parse(SENDER).unwrap();
        assert_eq!(
            components,
            AddressComponents::Algorand {
                public_key: hex::decode(SENDER_KEY).unwrap().try_into().unwrap()
            }
        );
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!AlgorandAddressService
            .validate("RKEOHXLUBHYZL7KS3MWTZOS5OLFGOCN7DWKBEG7TOSEADNAPN5OOTUNSLA"));
        assert!(!AlgorandAddressService.validate("RKEOHXLUBHYZL7KS3MWTZOS5"));
        assert!(!AlgorandAddressService
            .validate("rkeohxlubhyzl7ks3mwtzos5olfgocn7dwkbeg7tosseadnapn5ootunsle"));
    }

    #[test]
    fn test_rejects_secp256k1_key() {
        let key = hex::decode("0241DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45")
            .unwrap();
        assert!(matches!(
            AlgorandAddressService.make_address(&key, AddressKind::Default),
            Err(CoreError::InvalidPublicKey(_))
        ));
    }
}
