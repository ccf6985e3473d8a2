//! Stellar 账户地址（StrKey）：base32(版本字节 || ed25519 公钥 || CRC16-XModem 小端)

use super::{ed25519_public_key, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

const ALPHABET: base32::Alphabet = base32::Alphabet::RFC4648 { padding: false };
/// 'G' 前缀账户公钥
const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);

pub struct StellarAddressService;

impl StellarAddressService {
    pub fn encode_public_key(public_key: &[u8; 32]) -> String {
        let mut bytes = Vec::with_capacity(35);
        bytes.push(VERSION_ACCOUNT_ID);
        bytes.extend_from_slice(public_key);
        let checksum = CRC16.checksum(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        base32::encode(ALPHABET, &bytes)
    }

    pub fn decode_public_key(address: &str) -> CoreResult<[u8; 32]> {
        let invalid = |reason: &str| CoreError::InvalidAddress(format!("{address}: {reason}"));

        if address.len() != 56 || !address.starts_with('G') {
            return Err(invalid("not an account id"));
        }
        let bytes = base32::decode(ALPHABET, address).ok_or_else(|| invalid("not base32"))?;
        if bytes.len() != 35 || bytes[0] != VERSION_ACCOUNT_ID {
            return Err(invalid("unexpected version byte"));
        }

        let (body, checksum) = bytes.split_at(33);
        if checksum != CRC16.checksum(body).to_le_bytes().as_slice() {
            return Err(invalid("checksum mismatch"));
        }

        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&body[1..]);
        Ok(public_key)
    }
}

impl AddressService for StellarAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        Ok(Self::encode_public_key(&ed25519_public_key(public_key)?))
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        Ok(AddressComponents::Stellar {
            public_key: Self::decode_public_key(address)?,
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Stellar { public_key } => Ok(Self::encode_public_key(public_key)),
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not a Stellar address"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";

    #[test]
    fn test_make_address() {
        let key = hex::decode("8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c")
            .unwrap();
        assert_eq!(
            StellarAddressService
                .make_address(&key, AddressKind::Default)
                .unwrap(),
            ADDRESS
        );
    }

    #[test]
    fn test_round_trip() {
        let components = StellarAddressService.parse(ADDRESS).unwrap();
        assert_eq!(StellarAddressService.encode(&components).unwrap(), ADDRESS);
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!StellarAddressService
            .validate("GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJA"));
        assert!(!StellarAddressService
            .validate("SCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR"));
        assert!(!StellarAddressService.validate("GCFIRY65"));
    }
}
