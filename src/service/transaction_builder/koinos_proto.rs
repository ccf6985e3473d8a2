//! Koinos protobuf 消息（koinos-proto 的子集）

use prost::Message;

/// `koin.transfer_arguments`
#[derive(Clone, PartialEq, Message)]
pub struct TransferArguments {
    #[prost(bytes, tag = "1")]
    pub from: Vec<u8>,
    #[prost(bytes, tag = "2")]
    pub to: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub value: u64,
}

/// `koin.balance_of_arguments`
#[derive(Clone, PartialEq, Message)]
pub struct BalanceOfArguments {
    #[prost(bytes, tag = "1")]
    pub owner: Vec<u8>,
}

/// `koin.balance_of_result`
#[derive(Clone, PartialEq, Message)]
pub struct BalanceOfResult {
    #[prost(uint64, tag = "1")]
    pub value: u64,
}

/// `chain.value_type`，nonce 使用 uint64_value
#[derive(Clone, PartialEq, Message)]
pub struct ValueType {
    #[prost(uint64, tag = "5")]
    pub uint64_value: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct CallContractOperation {
    #[prost(bytes, tag = "1")]
    pub contract_id: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub entry_point: u32,
    #[prost(bytes, tag = "3")]
    pub args: Vec<u8>,
}

/// `protocol.operation`，这里只需要 call_contract 分支
#[derive(Clone, PartialEq, Message)]
pub struct Operation {
    #[prost(message, optional, tag = "2")]
    pub call_contract: Option<CallContractOperation>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionHeader {
    #[prost(bytes, tag = "1")]
    pub chain_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub rc_limit: u64,
    #[prost(bytes, tag = "3")]
    pub nonce: Vec<u8>,
    #[prost(bytes, tag = "4")]
    pub operation_merkle_root: Vec<u8>,
    #[prost(bytes, tag = "5")]
    pub payer: Vec<u8>,
    #[prost(bytes, tag = "6")]
    pub payee: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(bytes, tag = "1")]
    pub id: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub header: Option<TransactionHeader>,
    #[prost(message, repeated, tag = "3")]
    pub operations: Vec<Operation>,
    #[prost(bytes, repeated, tag = "4")]
    pub signatures: Vec<Vec<u8>>,
}

/// 编码 nonce：`value_type { uint64_value }`
pub fn encode_nonce(nonce: u64) -> Vec<u8> {
    ValueType {
        uint64_value: nonce,
    }
    .encode_to_vec()
}
