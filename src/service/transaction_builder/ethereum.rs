//! EVM 交易（EIP-155 legacy）
//!
//! 签名数据：keccak256(RLP([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))
//! 已签名：RLP([nonce, gasPrice, gasLimit, to, value, data, v, r, s])，v = recid + 35 + 2 * chainId

use num_bigint::BigUint;
use num_traits::Zero;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

use super::{split_recoverable_signature, TransactionBuilder};
use crate::domain::address::evm::EvmAddressService;
use crate::domain::amount::AmountType;
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

/// `transfer(address,uint256)`
const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// 交易字段（未签名）
struct LegacyTransaction {
    nonce: u64,
    gas_price: BigUint,
    gas_limit: u64,
    to: [u8; 20],
    value: BigUint,
    data: Vec<u8>,
}

impl LegacyTransaction {
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&uint_bytes(&self.gas_price));
        stream.append(&self.gas_limit);
        stream.append(&self.to.to_vec());
        stream.append(&uint_bytes(&self.value));
        stream.append(&self.data);
    }
}

pub struct EthereumTransactionBuilder {
    chain: Blockchain,
    chain_id: u64,
}

impl EthereumTransactionBuilder {
    pub fn new(chain: Blockchain) -> CoreResult<Self> {
        let chain_id = chain.evm_chain_id().ok_or_else(|| {
            CoreError::UnsupportedOperation(format!("{chain} is not an EVM chain"))
        })?;
        Ok(Self { chain, chain_id })
    }

    fn legacy_transaction(&self, transaction: &Transaction) -> CoreResult<LegacyTransaction> {
        let params = transaction.ethereum_params()?;
        let fee = transaction.fee()?;
        fee.ensure_consistent()?;
        let (gas_limit, gas_price) = fee.ethereum_parameters()?;
        let rounding = self.chain.rounding_mode();
        let destination = EvmAddressService::parse_bytes(&transaction.destination_address)?;

        let (to, value, data) = match &transaction.amount.amount_type {
            AmountType::Coin => (
                destination,
                transaction.amount.to_minimal_units(rounding)?,
                params.data.clone().unwrap_or_default(),
            ),
            AmountType::Token(token) => {
                let contract = EvmAddressService::parse_bytes(&token.contract_address)?;
                let units = transaction.amount.to_minimal_units(rounding)?;
                (
                    contract,
                    BigUint::zero(),
                    erc20_transfer_data(&destination, &units)?,
                )
            }
            other => {
                return Err(CoreError::UnsupportedOperation(format!(
                    "{other} transfer on {}",
                    self.chain
                )))
            }
        };

        Ok(LegacyTransaction {
            nonce: params.nonce,
            gas_price: gas_price.clone(),
            gas_limit,
            to,
            value,
            data,
        })
    }

    /// 未签名交易的 RLP（EIP-155 签名原文）
    pub fn signing_payload(&self, transaction: &Transaction) -> CoreResult<Vec<u8>> {
        let legacy = self.legacy_transaction(transaction)?;
        let mut stream = RlpStream::new();
        stream.begin_list(9);
        legacy.append_fields(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        Ok(stream.out().to_vec())
    }
}

impl TransactionBuilder for EthereumTransactionBuilder {
    type Context = ();
    type Signed = Vec<u8>;

    fn build_for_sign(&self, transaction: &Transaction, _context: &()) -> CoreResult<Vec<u8>> {
        let payload = self.signing_payload(transaction)?;
        tracing::debug!(chain = %self.chain, chain_id = self.chain_id, len = payload.len(), "built evm signing payload");
        Ok(Keccak256::digest(&payload).to_vec())
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        _context: &(),
        signature: &[u8],
    ) -> CoreResult<Vec<u8>> {
        let (rs, recovery_id) = split_recoverable_signature(signature)?;
        let legacy = self.legacy_transaction(transaction)?;

        let v = self
            .chain_id
            .checked_mul(2)
            .and_then(|id| id.checked_add(35 + u64::from(recovery_id)))
            .ok_or_else(|| CoreError::EncodingOverflow(format!("v for chain id {}", self.chain_id)))?;

        let mut stream = RlpStream::new();
        stream.begin_list(9);
        legacy.append_fields(&mut stream);
        stream.append(&v);
        stream.append(&trim_leading_zeros(&rs[..32]));
        stream.append(&trim_leading_zeros(&rs[32..]));
        Ok(stream.out().to_vec())
    }
}

/// ERC-20 `transfer(to, amount)` 调用数据
pub fn erc20_transfer_data(to: &[u8; 20], amount: &BigUint) -> CoreResult<Vec<u8>> {
    let amount_bytes = amount.to_bytes_be();
    if amount_bytes.len() > 32 {
        return Err(CoreError::EncodingOverflow(format!(
            "token amount {amount} exceeds uint256"
        )));
    }

    let mut data = Vec::with_capacity(4 + 64);
    data.extend_from_slice(&ERC20_TRANSFER_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(to);
    data.extend_from_slice(&vec![0u8; 32 - amount_bytes.len()]);
    data.extend_from_slice(&amount_bytes);
    Ok(data)
}

/// RLP 整数：大端、无前导零，零为空
fn uint_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}
