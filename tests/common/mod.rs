//! 测试辅助模块
//! 提供共享的参考公钥和金额构造函数

#![allow(dead_code)]

use ironcore_chains::domain::{Amount, Blockchain};
use rust_decimal::Decimal;

/// secp256k1 压缩公钥
pub const SECP256K1_PUBLIC_KEY: &str =
    "0241DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45";

/// 同一公钥的未压缩形式
pub const SECP256K1_UNCOMPRESSED: &str = "0441DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45E3D67E8D2947E6FEE8B62D3D3B6A4D5F212DA23E478DD69A2C6CCC851F300D80";

/// 第二个 secp256k1 公钥（转账目标）
pub const SECP256K1_DESTINATION_KEY: &str =
    "02f1d3780546da20728ea8a1f5e5e51b8438002cd7c8382aafa7ddf680e12557e4";

/// Ed25519 公钥，对应私钥种子 [1u8; 32]
pub const ED25519_PUBLIC_KEY: &str =
    "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";

pub fn secp256k1_key() -> Vec<u8> {
    hex::decode(SECP256K1_PUBLIC_KEY).unwrap()
}

pub fn ed25519_key() -> Vec<u8> {
    hex::decode(ED25519_PUBLIC_KEY).unwrap()
}

pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn coin(chain: Blockchain, value: &str) -> Amount {
    Amount::coin(chain, dec(value))
}

/// 标准 JSON-RPC 2.0 成功响应
pub fn rpc_result(result: &str) -> String {
    format!(r#"{{"jsonrpc":"2.0","id":1,"result":{result}}}"#)
}
