//! XRP Ledger 二进制序列化
//!
//! 每个字段由 (类型码, 字段码) 标识，按该二元组升序排列。
//! 变长字段带长度前缀：<=192 一字节，<=12480 两字节，<=918744 三字节。

use crate::error::{CoreError, CoreResult};

/// 原生币金额上限（drops）
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;
const POSITIVE_AMOUNT_BIT: u64 = 0x4000_0000_0000_0000;

const TYPE_UINT16: u8 = 1;
const TYPE_UINT32: u8 = 2;
const TYPE_AMOUNT: u8 = 6;
const TYPE_BLOB: u8 = 7;
const TYPE_ACCOUNT_ID: u8 = 8;

/// 交易字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XrpField {
    TransactionType(u16),
    Flags(u32),
    Sequence(u32),
    DestinationTag(u32),
    LastLedgerSequence(u32),
    Amount(u64),
    Fee(u64),
    SigningPubKey(Vec<u8>),
    TxnSignature(Vec<u8>),
    Account([u8; 20]),
    Destination([u8; 20]),
}

impl XrpField {
    /// (类型码, 字段码)
    pub fn id(&self) -> (u8, u8) {
        match self {
            XrpField::TransactionType(_) => (TYPE_UINT16, 2),
            XrpField::Flags(_) => (TYPE_UINT32, 2),
            XrpField::Sequence(_) => (TYPE_UINT32, 4),
            XrpField::DestinationTag(_) => (TYPE_UINT32, 14),
            XrpField::LastLedgerSequence(_) => (TYPE_UINT32, 27),
            XrpField::Amount(_) => (TYPE_AMOUNT, 1),
            XrpField::Fee(_) => (TYPE_AMOUNT, 8),
            XrpField::SigningPubKey(_) => (TYPE_BLOB, 3),
            XrpField::TxnSignature(_) => (TYPE_BLOB, 4),
            XrpField::Account(_) => (TYPE_ACCOUNT_ID, 1),
            XrpField::Destination(_) => (TYPE_ACCOUNT_ID, 3),
        }
    }

    /// 签名数据中不包含签名字段本身
    pub fn is_signing_field(&self) -> bool {
        !matches!(self, XrpField::TxnSignature(_))
    }

    fn write_value(&self, out: &mut Vec<u8>) -> CoreResult<()> {
        match self {
            XrpField::TransactionType(v) => out.extend_from_slice(&v.to_be_bytes()),
            XrpField::Flags(v)
            | XrpField::Sequence(v)
            | XrpField::DestinationTag(v)
            | XrpField::LastLedgerSequence(v) => out.extend_from_slice(&v.to_be_bytes()),
            XrpField::Amount(drops) | XrpField::Fee(drops) => {
                out.extend_from_slice(&encode_native_amount(*drops)?)
            }
            XrpField::SigningPubKey(bytes) | XrpField::TxnSignature(bytes) => {
                write_length_prefix(out, bytes.len())?;
                out.extend_from_slice(bytes);
            }
            XrpField::Account(account) | XrpField::Destination(account) => {
                write_length_prefix(out, account.len())?;
                out.extend_from_slice(account);
            }
        }
        Ok(())
    }
}

/// 序列化字段集合；`for_signing` 时跳过签名字段
pub fn serialize(fields: &[XrpField], for_signing: bool) -> CoreResult<Vec<u8>> {
    let mut sorted: Vec<&XrpField> = fields
        .iter()
        .filter(|field| !for_signing || field.is_signing_field())
        .collect();
    sorted.sort_by_key(|field| field.id());

    let mut out = Vec::with_capacity(256);
    for field in sorted {
        let (type_code, field_code) = field.id();
        write_field_id(&mut out, type_code, field_code);
        field.write_value(&mut out)?;
    }
    Ok(out)
}

fn write_field_id(out: &mut Vec<u8>, type_code: u8, field_code: u8) {
    match (type_code < 16, field_code < 16) {
        (true, true) => out.push((type_code << 4) | field_code),
        (true, false) => out.extend_from_slice(&[type_code << 4, field_code]),
        (false, true) => out.extend_from_slice(&[field_code, type_code]),
        (false, false) => out.extend_from_slice(&[0, type_code, field_code]),
    }
}

/// 变长字段的长度前缀
pub fn write_length_prefix(out: &mut Vec<u8>, length: usize) -> CoreResult<()> {
    match length {
        0..=192 => out.push(length as u8),
        193..=12_480 => {
            let length = length - 193;
            out.push(193 + (length >> 8) as u8);
            out.push((length & 0xff) as u8);
        }
        12_481..=918_744 => {
            let length = length - 12_481;
            out.push(241 + (length >> 16) as u8);
            out.push(((length >> 8) & 0xff) as u8);
            out.push((length & 0xff) as u8);
        }
        _ => {
            return Err(CoreError::EncodingOverflow(format!(
                "variable length {length} exceeds 918744 bytes"
            )))
        }
    }
    Ok(())
}

/// 原生 XRP 金额：最高位 0（原生），次高位 1（正数），低 62 位为 drops
pub fn encode_native_amount(drops: u64) -> CoreResult<[u8; 8]> {
    if drops > MAX_DROPS {
        return Err(CoreError::EncodingOverflow(format!(
            "{drops} drops exceeds the native amount limit"
        )));
    }
    Ok((drops | POSITIVE_AMOUNT_BIT).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> [u8; 20] {
        let mut account = [0x50u8; 20];
        account[0] = 0x00;
        account
    }

    #[test]
    fn test_account_only_blob() {
        let blob = serialize(&[XrpField::Account(account())], false).unwrap();
        assert_eq!(
            hex::encode(blob),
            "81140050505050505050505050505050505050505050"
        );
    }

    #[test]
    fn test_fields_sorted_by_type_then_field() {
        let blob = serialize(
            &[
                XrpField::Fee(12),
                XrpField::Sequence(7),
                XrpField::TransactionType(0),
                XrpField::LastLedgerSequence(100),
            ],
            false,
        )
        .unwrap();
        assert_eq!(
            hex::encode_upper(blob),
            "1200002400000007201B0000006468400000000000000C"
        );
    }

    #[test]
    fn test_signing_skips_signature() {
        let fields = [
            XrpField::TxnSignature(vec![0xaa; 3]),
            XrpField::Sequence(1),
        ];
        assert_eq!(hex::encode(serialize(&fields, true).unwrap()), "2400000001");
        assert_eq!(
            hex::encode(serialize(&fields, false).unwrap()),
            "24000000017403aaaaaa"
        );
    }

    #[test]
    fn test_length_prefix_boundaries() {
        let mut out = Vec::new();
        write_length_prefix(&mut out, 192).unwrap();
        assert_eq!(out, vec![192]);

        out.clear();
        write_length_prefix(&mut out, 193).unwrap();
        assert_eq!(out, vec![193, 0]);

        out.clear();
        write_length_prefix(&mut out, 12_480).unwrap();
        assert_eq!(out, vec![240, 255]);

        out.clear();
        write_length_prefix(&mut out, 12_481).unwrap();
        assert_eq!(out, vec![241, 0, 0]);

        out.clear();
        write_length_prefix(&mut out, 918_744).unwrap();
        assert_eq!(out, vec![254, 212, 23]);

        assert!(matches!(
            write_length_prefix(&mut out, 918_745),
            Err(CoreError::EncodingOverflow(_))
        ));
    }

    #[test]
    fn test_native_amount_encoding() {
        assert_eq!(
            hex::encode(encode_native_amount(10_000_000).unwrap()),
            "4000000000989680"
        );
        assert!(encode_native_amount(MAX_DROPS).is_ok());
        assert!(matches!(
            encode_native_amount(MAX_DROPS + 1),
            Err(CoreError::EncodingOverflow(_))
        ));
    }
}
