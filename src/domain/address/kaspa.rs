//! Kaspa 地址
//!
//! 格式：`<prefix>:<data>`，data 为 (版本字节 + 载荷) 的 5 位分组加 8 个校验字符。
//! 字符集与 Bech32 相同，校验和使用 CashAddr 的 40 位多项式。

use super::{compress_secp256k1, AddressComponents, AddressKind, AddressService};
use crate::error::{CoreError, CoreResult};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LENGTH: usize = 8;

const MAINNET_PREFIX: &str = "kaspa";
const TESTNET_PREFIX: &str = "kaspatest";

/// 地址类型（版本字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KaspaAddressType {
    P2pkSchnorr,
    P2pkEcdsa,
    P2sh,
}

impl KaspaAddressType {
    pub fn version(self) -> u8 {
        match self {
            KaspaAddressType::P2pkSchnorr => 0,
            KaspaAddressType::P2pkEcdsa => 1,
            KaspaAddressType::P2sh => 8,
        }
    }

    pub fn from_version(version: u8) -> Option<Self> {
        match version {
            0 => Some(KaspaAddressType::P2pkSchnorr),
            1 => Some(KaspaAddressType::P2pkEcdsa),
            8 => Some(KaspaAddressType::P2sh),
            _ => None,
        }
    }

    /// 载荷长度
    pub fn payload_length(self) -> usize {
        match self {
            KaspaAddressType::P2pkSchnorr | KaspaAddressType::P2sh => 32,
            KaspaAddressType::P2pkEcdsa => 33,
        }
    }
}

/// 解析后的 Kaspa 地址
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KaspaAddressComponents {
    pub prefix: String,
    pub address_type: KaspaAddressType,
    pub hash: Vec<u8>,
}

impl KaspaAddressComponents {
    /// 锁定脚本
    pub fn script_public_key(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(self.hash.len() + 3);
        match self.address_type {
            KaspaAddressType::P2pkSchnorr => {
                script.push(0x20);
                script.extend_from_slice(&self.hash);
                script.push(0xac); // OP_CHECKSIG
            }
            KaspaAddressType::P2pkEcdsa => {
                script.push(0x21);
                script.extend_from_slice(&self.hash);
                script.push(0xab); // OP_CHECKSIGECDSA
            }
            KaspaAddressType::P2sh => {
                script.push(0xaa); // OP_BLAKE2B
                script.push(0x20);
                script.extend_from_slice(&self.hash);
                script.push(0x87); // OP_EQUAL
            }
        }
        script
    }
}

pub struct KaspaAddressService {
    prefix: &'static str,
}

impl KaspaAddressService {
    pub fn new(testnet: bool) -> Self {
        Self {
            prefix: if testnet {
                TESTNET_PREFIX
            } else {
                MAINNET_PREFIX
            },
        }
    }

    pub fn parse_components(&self, address: &str) -> CoreResult<KaspaAddressComponents> {
        let invalid = |reason: &str| CoreError::InvalidAddress(format!("{address}: {reason}"));

        let (prefix, data) = address
            .split_once(':')
            .ok_or_else(|| invalid("missing prefix separator"))?;
        if prefix != self.prefix {
            return Err(invalid("unexpected prefix"));
        }
        // 第一个数据字符决定地址类别，只允许 q (P2PK) 或 p (P2SH)
        if !matches!(data.as_bytes().first(), Some(b'q') | Some(b'p')) {
            return Err(invalid("unexpected address class"));
        }
        if data.len() <= CHECKSUM_LENGTH {
            return Err(invalid("too short"));
        }

        let values = data
            .bytes()
            .map(|c| {
                CHARSET
                    .iter()
                    .position(|&x| x == c)
                    .map(|i| i as u8)
                    .ok_or_else(|| invalid("invalid character"))
            })
            .collect::<CoreResult<Vec<u8>>>()?;

        if polymod(&checksum_input(prefix, &values)) != 0 {
            return Err(invalid("checksum mismatch"));
        }

        let payload = convert_bits(&values[..values.len() - CHECKSUM_LENGTH], 5, 8, false)
            .ok_or_else(|| invalid("invalid padding"))?;
        let (&version, hash) = payload
            .split_first()
            .ok_or_else(|| invalid("empty payload"))?;
        let address_type =
            KaspaAddressType::from_version(version).ok_or_else(|| invalid("unknown version"))?;
        if hash.len() != address_type.payload_length() {
            return Err(invalid("unexpected payload length"));
        }

        Ok(KaspaAddressComponents {
            prefix: prefix.to_string(),
            address_type,
            hash: hash.to_vec(),
        })
    }

    pub fn encode_components(&self, components: &KaspaAddressComponents) -> CoreResult<String> {
        if components.hash.len() != components.address_type.payload_length() {
            return Err(CoreError::InvalidAddress(format!(
                "payload length {} does not match {:?}",
                components.hash.len(),
                components.address_type
            )));
        }

        let mut payload = Vec::with_capacity(components.hash.len() + 1);
        payload.push(components.address_type.version());
        payload.extend_from_slice(&components.hash);

        let mut values = convert_bits(&payload, 8, 5, true).unwrap_or_default();
        let mut input = checksum_input(&components.prefix, &values);
        input.extend_from_slice(&[0u8; CHECKSUM_LENGTH]);
        let checksum = polymod(&input);
        values.extend((0..CHECKSUM_LENGTH).map(|i| ((checksum >> (5 * (7 - i))) & 0x1f) as u8));

        let data: String = values.iter().map(|&v| CHARSET[v as usize] as char).collect();
        Ok(format!("{}:{}", components.prefix, data))
    }
}

impl AddressService for KaspaAddressService {
    fn make_address(&self, public_key: &[u8], _kind: AddressKind) -> CoreResult<String> {
        let compressed = compress_secp256k1(public_key)?;
        self.encode_components(&KaspaAddressComponents {
            prefix: self.prefix.to_string(),
            address_type: KaspaAddressType::P2pkEcdsa,
            hash: compressed.to_vec(),
        })
    }

    fn parse(&self, address: &str) -> CoreResult<AddressComponents> {
        self.parse_components(address).map(AddressComponents::Kaspa)
    }

    fn encode(&self, components: &AddressComponents) -> CoreResult<String> {
        match components {
            AddressComponents::Kaspa(kaspa) if kaspa.prefix == self.prefix => {
                self.encode_components(kaspa)
            }
            other => Err(CoreError::InvalidAddress(format!(
                "components {other:?} are not a {} address",
                self.prefix
            ))),
        }
    }
}

/// 前缀低 5 位 + 分隔符 0 + 数据
fn checksum_input(prefix: &str, data: &[u8]) -> Vec<u8> {
    let mut input: Vec<u8> = prefix.bytes().map(|c| c & 0x1f).collect();
    input.push(0);
    input.extend_from_slice(data);
    input
}

fn polymod(values: &[u8]) -> u64 {
    const GENERATORS: [u64; 5] = [
        0x98f2bc8e61,
        0x79b76d99e2,
        0xf33e5fb3c4,
        0xae2eabe2a8,
        0x1e4f43e470,
    ];

    let mut c: u64 = 1;
    for &d in values {
        let c0 = c >> 35;
        c = ((c & 0x07ffffffff) << 5) ^ u64::from(d);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value = (1u32 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return None;
        }
        acc = (acc << from) | value;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> KaspaAddressService {
        KaspaAddressService::new(false)
    }

    #[test]
    fn test_make_address_from_compressed_and_uncompressed() {
        let compressed =
            hex::decode("0241DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45")
                .unwrap();
        let uncompressed = hex::decode("0441DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45E3D67E8D2947E6FEE8B62D3D3B6A4D5F212DA23E478DD69A2C6CCC851F300D80").unwrap();
        let expected = "kaspa:qypyrhxkfd055qulcvu6zccq4qe63qajrzgf7t4u4uusveguw6zzc3grrceeuex";

        assert_eq!(
            service()
                .make_address(&compressed, AddressKind::Default)
                .unwrap(),
            expected
        );
        assert_eq!(
            service()
                .make_address(&uncompressed, AddressKind::Default)
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_more_reference_keys() {
        let cases = [
            (
                "02f1d3780546da20728ea8a1f5e5e51b8438002cd7c8382aafa7ddf680e12557e4",
                "kaspa:qyp0r5mcq4rd5grj3652ra09u5dcgwqq9ntuswp247nama5quyj40eq03sc2dkx",
            ),
            (
                "03401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01deb",
                "kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s",
            ),
        ];
        for (key, address) in cases {
            let key = hex::decode(key).unwrap();
            assert_eq!(
                service().make_address(&key, AddressKind::Default).unwrap(),
                address
            );
            assert!(service().validate(address));
        }
    }

    #[test]
    fn test_invalid_addresses() {
        // 错误前缀
        assert!(!service().validate(
            "kaspb:qyp5ez9p4q6xnh0jp5xq0ewy58nmsde5uus7vrty9w222v3zc37xwrgeqhkq7v3"
        ));
        // 错误校验和
        assert!(!service().validate(
            "kaspa:qyp5ez9p4q6xnh0jp5xq0ewy58nmsde5uus7vrty9w222v3zc37xwrgeqhkq7v4"
        ));
        assert!(!service().validate("kaspa"));
        assert!(!service().validate("kaspa:"));
        // 测试网前缀不属于主网
        assert!(!service().validate(
            "kaspatest:qypyrhxkfd055qulcvu6zccq4qe63qajrzgf7t4u4uusveguw6zzc3grrceeuex"
        ));
    }

    #[test]
    fn test_parse_address_types() {
        let ecdsa = service()
            .parse_components(
                "kaspa:qyp4scvsxvkrjxyq98gd4xedhgrqtmf78l7wl8p8p4j0mjuvpwjg5cqhy97n472",
            )
            .unwrap();
        assert_eq!(ecdsa.address_type, KaspaAddressType::P2pkEcdsa);
        assert_eq!(
            hex::encode(&ecdsa.hash),
            "03586190332c39188029d0da9b2dba0605ed3e3ffcef9c270d64fdcb8c0ba48a60"
        );

        let schnorr = service()
            .parse_components(
                "kaspa:qpsqw2aamda868dlgqczeczd28d5nc3rlrj3t87vu9q58l2tugpjs2psdm4fv",
            )
            .unwrap();
        assert_eq!(schnorr.address_type, KaspaAddressType::P2pkSchnorr);
        assert_eq!(
            hex::encode_upper(&schnorr.hash),
            "60072BBDDB7A7D1DBF40302CE04D51DB49E223F8E5159FCCE14143FD4BE20328"
        );

        let p2sh = service()
            .parse_components(
                "kaspa:pqurku73qluhxrmvyj799yeyptpmsflpnc8pha80z6zjh6efwg3v2rrepjm5r",
            )
            .unwrap();
        assert_eq!(p2sh.address_type, KaspaAddressType::P2sh);
        assert_eq!(
            hex::encode(&p2sh.hash),
            "383b73d107f9730f6c24bc5293240ac3b827e19e0e1bf4ef16852beb297222c5"
        );
    }

    #[test]
    fn test_round_trip() {
        for address in [
            "kaspa:qyp4scvsxvkrjxyq98gd4xedhgrqtmf78l7wl8p8p4j0mjuvpwjg5cqhy97n472",
            "kaspa:qpsqw2aamda868dlgqczeczd28d5nc3rlrj3t87vu9q58l2tugpjs2psdm4fv",
            "kaspa:pqurku73qluhxrmvyj799yeyptpmsflpnc8pha80z6zjh6efwg3v2rrepjm5r",
        ] {
            let components = service().parse(address).unwrap();
            assert_eq!(service().encode(&components).unwrap(), address);
        }
    }

    #[test]
    fn test_script_public_key() {
        let components = service()
            .parse_components(
                "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u",
            )
            .unwrap();
        assert_eq!(
            hex::encode(components.script_public_key()),
            "2102b93a8fb0301d77c6d98f2e31e666d0bde7754b3ebc9cf8fad56ea7b03ea33e8eab"
        );
    }

    #[test]
    fn test_testnet_prefix() {
        let testnet = KaspaAddressService::new(true);
        let key = hex::decode("0241DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45")
            .unwrap();
        let address = testnet.make_address(&key, AddressKind::Default).unwrap();
        assert!(address.starts_with("kaspatest:q"));
        assert!(testnet.validate(&address));
        assert!(!service().validate(&address));
    }
}
