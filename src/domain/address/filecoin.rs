//! Filecoin 地址
//!
//! 文本格式：`<网络 f|t><协议 0-3><载荷>`
//! - 协议 0：十进制 actor ID
//! - 协议 1/2/3：小写 base32(载荷 || blake2b-4(协议字节 || 载荷))
//!
//! 字节格式（CBOR 消息中使用）：协议字节 || 载荷，协议 0 的载荷为 LEB128 编码的 ID

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;

use super::{decompress_secp256k1, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

const ALPHABET: base32::Alphabet = base32::Alphabet::RFC4648 { padding: false };
const CHECKSUM_LENGTH: usize = 4;

pub const PROTOCOL_ID: u8 = 0;
pub const PROTOCOL_SECP256K1: u8 = 1;
pub const PROTOCOL_ACTOR: u8 = 2;
pub const PROTOCOL_BLS: u8 = 3;

/// 可变长度 Blake2b
pub fn blake2b<const N: usize>(data: &[u8]) -> CoreResult<[u8; N]> {
    let mut hasher = Blake2bVar::new(N)
        .map_err(|_| CoreError::EncodingOverflow(format!("blake2b output of {N} bytes")))?;
    hasher.update(data);
    let mut output = [0u8; N];
    hasher
        .finalize_variable(&mut output)
        .map_err(|_| CoreError::EncodingOverflow(format!("blake2b output of {N} bytes")))?;
    Ok(output)
}

pub struct FilecoinAddressService {
    testnet: bool,
}

impl FilecoinAddressService {
    pub fn new(testnet: bool) -> Self {
        Self { testnet }
    }

    fn network_char(testnet: bool) -> char {
        if testnet {
            't'
        } else {
            'f'
        }
    }

    fn payload_length(protocol: u8) -> Option<usize> {
        match protocol {
            PROTOCOL_SECP256K1 | PROTOCOL_ACTOR => Some(20),
            PROTOCOL_BLS => Some(48),
            _ => None,
        }
    }

    fn checksum(protocol: u8, payload: &[u8]) -> CoreResult<[u8; CHECKSUM_LENGTH]> {
        let mut data = Vec::with_capacity(payload.len() + 1);
        data.push(protocol);
        data.extend_from_slice(payload);
        blake2b::<CHECKSUM_LENGTH>(&data)
    }

    /// 地址字符串转消息中使用的字节格式
    pub fn address_bytes(address: &str) -> CoreResult<Vec<u8>> {
        let testnet = address.starts_with('t');
        match Self::new(testnet).parse(address)? {
            AddressComponents::Filecoin {
                protocol, payload, ..
            } => {
                let mut bytes = Vec::with_capacity(payload.len() + 1);
                bytes.push(protocol);
                bytes.extend_from_slice(&payload);
                Ok(bytes)
            }
            other => Err(CoreError::InvalidAddress(format!("{other:?}"))),
        }
    }

    fn encode_parts(testnet: bool, protocol: u8, payload: &[u8]) -> CoreResult<String> {
        let network = Self::network_char(testnet);
        if protocol == PROTOCOL_ID {
            let id = read_uvarint(payload)
                .ok_or_else(|| CoreError::InvalidAddress("malformed actor id".to_string()))?;
            return Ok(format!("{network}0{id}"));
        }

        let expected = Self::payload_length(protocol).ok_or_else(|| {
            CoreError::InvalidAddress(format!("unknown address protocol {protocol}"))
        })?;
        if payload.len() != expected {
            return Err(CoreError::InvalidAddress(format!(
                "protocol {protocol} payload must be {expected} bytes"
            )));
        }

        let mut bytes = payload.to_vec();
        bytes.extend_from_slice(&Self::checksum(protocol, payload)?);
        Ok(format!(
            "{network}{protocol}{}",
            base32::encode(ALPHABET, &bytes).to_ascii_lowercase()
        ))
    }
}

impl AddressService for FilecoinAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        let uncompressed = decompress_secp256k1(public_key)?;
        let payload = blake2b::<20>(&uncompressed)?;
        Self::encode_parts(self.testnet, PROTOCOL_SECP256K1, &payload)
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        let invalid = |reason: &str| CoreError::InvalidAddress(format!("{address}: {reason}"));

        let mut chars = address.chars();
        if chars.next() != Some(Self::network_char(self.testnet)) {
            return Err(invalid("unexpected network prefix"));
        }
        let protocol = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| invalid("missing protocol"))? as u8;
        let body = chars.as_str();

        let payload = if protocol == PROTOCOL_ID {
            if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("malformed actor id"));
            }
            let id: u64 = body.parse().map_err(|_| invalid("actor id out of range"))?;
            write_uvarint(id)
        } else {
            let expected =
                Self::payload_length(protocol).ok_or_else(|| invalid("unknown protocol"))?;
            if body.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(invalid("uppercase characters"));
            }
            let bytes = base32::decode(ALPHABET, &body.to_ascii_uppercase())
                .ok_or_else(|| invalid("not base32"))?;
            if bytes.len() != expected + CHECKSUM_LENGTH {
                return Err(invalid("unexpected payload length"));
            }
            let (payload, checksum) = bytes.split_at(expected);
            if checksum != Self::checksum(protocol, payload)?.as_slice() {
                return Err(invalid("checksum mismatch"));
            }
            payload.to_vec()
        };

        Ok(AddressComponents::Filecoin {
            testnet: self.testnet,
            protocol,
            payload,
        })
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Filecoin {
                testnet,
                protocol,
                payload,
            } if *testnet == self.testnet => Self::encode_parts(*testnet, *protocol, payload),
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not a Filecoin address for this network"
            ))),
        }
    }
}

fn write_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn read_uvarint(bytes: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if i >= 10 {
            return None;
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return (i + 1 == bytes.len()).then_some(value);
        }
    }
    None
}
