//! Kaspa KAS 转账
//!
//! - 输入：钱包的未花费输出按给定顺序全部花费，最多 `MAX_INPUTS` 个
//! - 输出：目标输出，找零大于零时追加找零输出（不得低于粉尘阈值）
//! - 每个输入单独签名，签名哈希为 ECDSA 形式的 SigHashAll 摘要
//!
//! `build_for_sign` 返回按输入顺序拼接的 32 字节哈希，
//! `build_for_send` 接收按同样顺序拼接的 64 字节 `r || s` 签名

use blake2::digest::consts::U32;
use blake2::digest::Mac;
use blake2::Blake2bMac;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ensure_coin_transfer, TransactionBuilder};
use crate::domain::address::kaspa::{KaspaAddressService, KaspaAddressType};
use crate::domain::amount::{Amount, AmountType};
use crate::domain::chain_config::Blockchain;
use crate::domain::transaction::Transaction;
use crate::error::{CoreError, CoreResult};

/// 0.2 KAS
pub const DUST_SOMPI: u64 = 20_000_000;
/// 单笔交易的输入上限（交易 mass 限制）
pub const MAX_INPUTS: usize = 84;

const SIGNING_HASH_KEY: &[u8] = b"TransactionSigningHash";
const ECDSA_SIGNING_DOMAIN: &[u8] = b"TransactionSigningHashECDSA";
const SIG_HASH_ALL: u8 = 0x01;
const SIG_OP_COUNT: u8 = 1;
const SCRIPT_VERSION: u16 = 0;
const TRANSACTION_VERSION: u16 = 0;
const SIGNATURE_LENGTH: usize = 64;
/// OP_DATA_65：签名 + 哈希类型
const OP_DATA_65: u8 = 0x41;

/// 未花费输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaspaUnspentOutput {
    pub transaction_id: [u8; 32],
    pub index: u32,
    /// sompi
    pub amount: u64,
}

impl KaspaUnspentOutput {
    /// `transaction_id` 为十六进制
    pub fn new(transaction_id: &str, index: u32, amount: u64) -> CoreResult<Self> {
        let transaction_id = hex::decode(transaction_id)
            .ok()
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .ok_or_else(|| {
                CoreError::MissingRequiredParameter(format!(
                    "transaction id {transaction_id} must be 32 hex bytes"
                ))
            })?;
        Ok(Self {
            transaction_id,
            index,
            amount,
        })
    }

    fn write_outpoint(&self, hasher: &mut SigningHasher) {
        hasher.write(&self.transaction_id);
        hasher.write(&self.index.to_le_bytes());
    }
}

/// 构建上下文：钱包当前的未花费输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KaspaBuildContext {
    pub unspent_outputs: Vec<KaspaUnspentOutput>,
}

impl KaspaBuildContext {
    pub fn new(unspent_outputs: Vec<KaspaUnspentOutput>) -> Self {
        Self { unspent_outputs }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KaspaOutput {
    amount: u64,
    script_public_key: Vec<u8>,
}

/// 未签名交易
#[derive(Debug, Clone, PartialEq, Eq)]
struct KaspaTransaction {
    inputs: Vec<KaspaUnspentOutput>,
    outputs: Vec<KaspaOutput>,
    /// 被花费输出的锁定脚本
    source_script: Vec<u8>,
}

impl KaspaTransaction {
    fn signature_hashes(&self) -> CoreResult<Vec<[u8; 32]>> {
        let previous_outputs = SigningHasher::digest(|h| {
            for input in &self.inputs {
                input.write_outpoint(h);
            }
        })?;
        let sequences = SigningHasher::digest(|h| {
            for _ in &self.inputs {
                h.write(&0u64.to_le_bytes());
            }
        })?;
        let sig_op_counts = SigningHasher::digest(|h| {
            for _ in &self.inputs {
                h.write(&[SIG_OP_COUNT]);
            }
        })?;
        let outputs = SigningHasher::digest(|h| {
            for output in &self.outputs {
                h.write(&output.amount.to_le_bytes());
                h.write_script(&output.script_public_key);
            }
        })?;

        let domain = Sha256::digest(ECDSA_SIGNING_DOMAIN);
        self.inputs
            .iter()
            .map(|input| {
                let schnorr_hash = SigningHasher::digest(|h| {
                    h.write(&TRANSACTION_VERSION.to_le_bytes());
                    h.write(&previous_outputs);
                    h.write(&sequences);
                    h.write(&sig_op_counts);
                    input.write_outpoint(h);
                    h.write_script(&self.source_script);
                    h.write(&input.amount.to_le_bytes());
                    // sequence
                    h.write(&0u64.to_le_bytes());
                    h.write(&[SIG_OP_COUNT]);
                    h.write(&outputs);
                    // lock_time
                    h.write(&0u64.to_le_bytes());
                    // 原生子网络
                    h.write(&[0u8; 20]);
                    // gas
                    h.write(&0u64.to_le_bytes());
                    // 空 payload 的哈希为全零
                    h.write(&[0u8; 32]);
                    h.write(&[SIG_HASH_ALL]);
                })?;

                let mut hasher = Sha256::new();
                hasher.update(domain);
                hasher.update(schnorr_hash);
                Ok(hasher.finalize().into())
            })
            .collect()
    }
}

/// blake2b-256，密钥 "TransactionSigningHash"
struct SigningHasher(Blake2bMac<U32>);

impl SigningHasher {
    fn digest(fill: impl FnOnce(&mut SigningHasher)) -> CoreResult<[u8; 32]> {
        let mac = <Blake2bMac<U32> as Mac>::new_from_slice(SIGNING_HASH_KEY)
            .map_err(|e| CoreError::EncodingOverflow(format!("blake2b key: {e}")))?;
        let mut hasher = SigningHasher(mac);
        fill(&mut hasher);
        Ok(hasher.0.finalize().into_bytes().into())
    }

    fn write(&mut self, data: &[u8]) {
        Mac::update(&mut self.0, data);
    }

    /// 脚本版本 + u64 长度前缀 + 脚本
    fn write_script(&mut self, script: &[u8]) {
        self.write(&SCRIPT_VERSION.to_le_bytes());
        self.write(&(script.len() as u64).to_le_bytes());
        self.write(script);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REST DTO（POST /transactions）
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaOutpointDto {
    pub transaction_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaInputDto {
    pub previous_outpoint: KaspaOutpointDto,
    pub signature_script: String,
    pub sequence: u64,
    pub sig_op_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaScriptPublicKeyDto {
    pub version: u16,
    pub script_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaOutputDto {
    pub amount: u64,
    pub script_public_key: KaspaScriptPublicKeyDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaTransactionDto {
    pub version: u16,
    pub inputs: Vec<KaspaInputDto>,
    pub outputs: Vec<KaspaOutputDto>,
    pub lock_time: u64,
    pub subnetwork_id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct KaspaTransactionBuilder {
    chain: Blockchain,
    address_service: KaspaAddressService,
    dust: u64,
}

impl KaspaTransactionBuilder {
    pub fn new(testnet: bool) -> Self {
        Self {
            chain: Blockchain::Kaspa { testnet },
            address_service: KaspaAddressService::new(testnet),
            dust: DUST_SOMPI,
        }
    }

    /// 覆盖粉尘阈值（sompi）
    pub fn with_dust(mut self, dust: u64) -> Self {
        self.dust = dust;
        self
    }

    /// 每个输入的签名哈希
    pub fn hashes_for_sign(
        &self,
        transaction: &Transaction,
        context: &KaspaBuildContext,
    ) -> CoreResult<Vec<[u8; 32]>> {
        self.unsigned(transaction, context)?.signature_hashes()
    }

    fn script_for(&self, address: &str) -> CoreResult<(KaspaAddressType, Vec<u8>)> {
        let components = self.address_service.parse_components(address)?;
        Ok((components.address_type, components.script_public_key()))
    }

    fn unsigned(
        &self,
        transaction: &Transaction,
        context: &KaspaBuildContext,
    ) -> CoreResult<KaspaTransaction> {
        ensure_coin_transfer(transaction, self.chain)?;

        let rounding = self.chain.rounding_mode();
        let amount = transaction.amount.to_u64_units(rounding)?;
        let fee = transaction.fee()?.amount.to_u64_units(rounding)?;
        if amount < self.dust {
            return Err(CoreError::DustAmount {
                minimum: self.sompi_to_decimal(self.dust)?,
            });
        }

        let (source_type, source_script) = self.script_for(&transaction.source_address)?;
        if source_type != KaspaAddressType::P2pkEcdsa {
            return Err(CoreError::UnsupportedOperation(format!(
                "spending from {source_type:?} address"
            )));
        }
        let (_, destination_script) = self.script_for(&transaction.destination_address)?;
        let (_, change_script) = self.script_for(&transaction.change_address)?;

        let inputs: Vec<KaspaUnspentOutput> = context
            .unspent_outputs
            .iter()
            .take(MAX_INPUTS)
            .cloned()
            .collect();
        let available = inputs
            .iter()
            .try_fold(0u64, |total, input| total.checked_add(input.amount))
            .ok_or_else(|| CoreError::EncodingOverflow("sum of unspent outputs".to_string()))?;
        let required = amount
            .checked_add(fee)
            .ok_or_else(|| CoreError::EncodingOverflow("amount + fee".to_string()))?;
        if required > available {
            tracing::warn!(required, available, inputs = inputs.len(), "kaspa inputs do not cover amount and fee");
            return Err(CoreError::TotalExceedsBalance);
        }

        let mut outputs = vec![KaspaOutput {
            amount,
            script_public_key: destination_script,
        }];
        let change = available - required;
        if change > 0 {
            if change < self.dust {
                return Err(CoreError::DustChange {
                    minimum: self.sompi_to_decimal(self.dust)?,
                });
            }
            outputs.push(KaspaOutput {
                amount: change,
                script_public_key: change_script,
            });
        }

        Ok(KaspaTransaction {
            inputs,
            outputs,
            source_script,
        })
    }

    fn sompi_to_decimal(&self, value: u64) -> CoreResult<Decimal> {
        Ok(Amount::from_minimal_units(
            AmountType::Coin,
            self.chain.currency_symbol(),
            &BigUint::from(value),
            self.chain.decimal_count(),
        )?
        .value)
    }
}

impl TransactionBuilder for KaspaTransactionBuilder {
    type Context = KaspaBuildContext;
    type Signed = KaspaTransactionDto;

    fn build_for_sign(
        &self,
        transaction: &Transaction,
        context: &KaspaBuildContext,
    ) -> CoreResult<Vec<u8>> {
        let hashes = self.hashes_for_sign(transaction, context)?;
        tracing::debug!(chain = %self.chain, inputs = hashes.len(), "built kaspa signature hashes");
        Ok(hashes.concat())
    }

    fn build_for_send(
        &self,
        transaction: &Transaction,
        context: &KaspaBuildContext,
        signature: &[u8],
    ) -> CoreResult<KaspaTransactionDto> {
        let unsigned = self.unsigned(transaction, context)?;
        let expected = unsigned.inputs.len() * SIGNATURE_LENGTH;
        if signature.len() != expected {
            return Err(CoreError::InvalidSignature(format!(
                "expected {expected} bytes for {} inputs, got {}",
                unsigned.inputs.len(),
                signature.len()
            )));
        }

        let inputs = unsigned
            .inputs
            .iter()
            .zip(signature.chunks_exact(SIGNATURE_LENGTH))
            .map(|(input, signature)| {
                let mut script = Vec::with_capacity(SIGNATURE_LENGTH + 2);
                script.push(OP_DATA_65);
                script.extend_from_slice(signature);
                script.push(SIG_HASH_ALL);
                KaspaInputDto {
                    previous_outpoint: KaspaOutpointDto {
                        transaction_id: hex::encode(input.transaction_id),
                        index: input.index,
                    },
                    signature_script: hex::encode(script),
                    sequence: 0,
                    sig_op_count: SIG_OP_COUNT,
                }
            })
            .collect();

        let outputs = unsigned
            .outputs
            .iter()
            .map(|output| KaspaOutputDto {
                amount: output.amount,
                script_public_key: KaspaScriptPublicKeyDto {
                    version: SCRIPT_VERSION,
                    script_public_key: hex::encode(&output.script_public_key),
                },
            })
            .collect();

        Ok(KaspaTransactionDto {
            version: TRANSACTION_VERSION,
            inputs,
            outputs,
            lock_time: 0,
            subnetwork_id: hex::encode([0u8; 20]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::{AddressKind, AddressService};
    use crate::domain::fee::Fee;

    const PUBLIC_KEY: &str = "03401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01deb";
    const SOURCE: &str = "kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s";
    const DESTINATION: &str =
        "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u";
    const SOURCE_SCRIPT: &str =
        "2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab";

    const KASPA: Blockchain = Blockchain::Kaspa { testnet: false };

    fn kas(value: &str) -> Amount {
        Amount::coin(KASPA, value.parse().unwrap())
    }

    fn transaction(amount: &str, fee: &str) -> Transaction {
        Transaction::new(kas(amount), Fee::new(kas(fee)), SOURCE, DESTINATION)
    }

    fn context() -> KaspaBuildContext {
        KaspaBuildContext::new(vec![
            KaspaUnspentOutput::new(
                "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134",
                0,
                20_000_000,
            )
            .unwrap(),
            KaspaUnspentOutput::new(
                "5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113",
                1,
                19_736_854,
            )
            .unwrap(),
            KaspaUnspentOutput::new(
                "c97e84228b68aa37a0c51c5a93f0005eb9543a353b6cf59c33052eab33f16e0b",
                0,
                20_000_000,
            )
            .unwrap(),
        ])
    }

    fn signatures() -> Vec<u8> {
        [
            "401dc920bf148e0fcdcfae009b9dc805553f74f883aaff8a5c0445a1169d89196035a177eb33dc57076fe6c4453843e11e36d229ee895bfdd18f7b63131d5889",
            "0a51d8d2e737f1cf8d3440e31736aa07a230a3ec4f811d50f8abc6f86369a27c3425813510a06f9f5648afda58d1e15a91be29d41779c16d49415cfe962c9095",
            "c0aebb30e5638c7f98d870ab40f43fe2a6bdec0ed848f8e9622cb8733df9988278501064c5876e978e1c9fbd78bf96111b94487c5e9fbb99399342a9fb16667b",
        ]
        .iter()
        .flat_map(|s| hex::decode(s).unwrap())
        .collect()
    }

    #[test]
    fn test_source_address_from_public_key() {
        let key = hex::decode(PUBLIC_KEY).unwrap();
        assert_eq!(
            KaspaAddressService::new(false)
                .make_address(&key, AddressKind::Default)
                .unwrap(),
            SOURCE
        );
    }

    #[test]
    fn test_signature_hashes_reference() {
        let hashes = KaspaTransactionBuilder::new(false)
            .hashes_for_sign(&transaction("0.2", "0.00004297"), &context())
            .unwrap();
        let hashes: Vec<String> = hashes.iter().map(hex::encode).collect();
        assert_eq!(
            hashes,
            [
                "80a72a2ba65dba21a64527015ceab6312f5da668cd83285fa63bcd55b6f5610d",
                "f48c41fa6d58273438278100ab0ae3e0a07bfedd1f00561030873a381421dd08",
                "9e4d470b5d4888d4b0e036281142af776f3a1b7d9a1c4b2d8550f2ecd41d7bea",
            ]
        );

        let concatenated = KaspaTransactionBuilder::new(false)
            .build_for_sign(&transaction("0.2", "0.00004297"), &context())
            .unwrap();
        assert_eq!(concatenated.len(), 3 * 32);
        assert_eq!(hex::encode(&concatenated[32..64]), hashes[1]);
    }

    #[test]
    fn test_signed_transaction_reference() {
        let dto = KaspaTransactionBuilder::new(false)
            .build_for_send(&transaction("0.2", "0.00004297"), &context(), &signatures())
            .unwrap();

        assert_eq!(dto.inputs.len(), 3);
        assert_eq!(
            dto.inputs[0].previous_outpoint,
            KaspaOutpointDto {
                transaction_id: "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134"
                    .to_string(),
                index: 0,
            }
        );
        assert_eq!(dto.inputs[1].previous_outpoint.index, 1);
        assert_eq!(
            dto.inputs[0].signature_script,
            "41401dc920bf148e0fcdcfae009b9dc805553f74f883aaff8a5c0445a1169d89196035a177eb33dc57076fe6c4453843e11e36d229ee895bfdd18f7b63131d588901"
        );
        assert_eq!(
            dto.inputs[2].signature_script,
            "41c0aebb30e5638c7f98d870ab40f43fe2a6bdec0ed848f8e9622cb8733df9988278501064c5876e978e1c9fbd78bf96111b94487c5e9fbb99399342a9fb16667b01"
        );

        assert_eq!(
            dto.outputs,
            vec![
                KaspaOutputDto {
                    amount: 20_000_000,
                    script_public_key: KaspaScriptPublicKeyDto {
                        version: 0,
                        script_public_key:
                            "2102b93a8fb0301d77c6d98f2e31e666d0bde7754b3ebc9cf8fad56ea7b03ea33e8eab"
                                .to_string(),
                    },
                },
                // 找零
                KaspaOutputDto {
                    amount: 39_732_557,
                    script_public_key: KaspaScriptPublicKeyDto {
                        version: 0,
                        script_public_key: SOURCE_SCRIPT.to_string(),
                    },
                },
            ]
        );

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json["inputs"][1]["previousOutpoint"]["transactionId"],
            "5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113"
        );
        assert_eq!(json["outputs"][1]["scriptPublicKey"]["scriptPublicKey"], SOURCE_SCRIPT);
        assert_eq!(json["subnetworkId"], "0000000000000000000000000000000000000000");
    }

    #[test]
    fn test_exact_spend_has_no_change_output() {
        let context = KaspaBuildContext::new(vec![KaspaUnspentOutput::new(
            "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134",
            0,
            20_004_297,
        )
        .unwrap()]);
        let dto = KaspaTransactionBuilder::new(false)
            .build_for_send(&transaction("0.2", "0.00004297"), &context, &[0x11; 64])
            .unwrap();
        assert_eq!(dto.outputs.len(), 1);
        assert_eq!(dto.outputs[0].amount, 20_000_000);
    }

    #[test]
    fn test_dust_rules() {
        let builder = KaspaTransactionBuilder::new(false);
        assert_eq!(
            builder.build_for_sign(&transaction("0.1", "0.00004297"), &context()),
            Err(CoreError::DustAmount {
                minimum: "0.2".parse().unwrap()
            })
        );

        // 只有前两个输入：找零 0.19732557 低于 0.2
        let mut two_inputs = context();
        two_inputs.unspent_outputs.truncate(2);
        assert_eq!(
            builder.build_for_sign(&transaction("0.2", "0.00004297"), &two_inputs),
            Err(CoreError::DustChange {
                minimum: "0.2".parse().unwrap()
            })
        );

        // 降低阈值后同一组输入可以构建
        let hashes = KaspaTransactionBuilder::new(false)
            .with_dust(1)
            .hashes_for_sign(&transaction("0.2", "0.00004297"), &two_inputs)
            .unwrap();
        assert_eq!(hashes.len(), 2);
    }

    #[test]
    fn test_insufficient_inputs() {
        assert_eq!(
            KaspaTransactionBuilder::new(false)
                .build_for_sign(&transaction("0.6", "0.00004297"), &context()),
            Err(CoreError::TotalExceedsBalance)
        );
        assert_eq!(
            KaspaTransactionBuilder::new(false)
                .build_for_sign(&transaction("0.2", "0.0001"), &KaspaBuildContext::default()),
            Err(CoreError::TotalExceedsBalance)
        );
    }

    #[test]
    fn test_signature_count_must_match_inputs() {
        assert!(matches!(
            KaspaTransactionBuilder::new(false).build_for_send(
                &transaction("0.2", "0.00004297"),
                &context(),
                &signatures()[..128]
            ),
            Err(CoreError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_bad_transaction_ids() {
        assert!(KaspaUnspentOutput::new("abcd", 0, 1).is_err());
        assert!(KaspaUnspentOutput::new("zz", 0, 1).is_err());
    }

    #[test]
    fn test_rejects_invalid_destination() {
        let mut tx = transaction("0.2", "0.00004297");
        tx.destination_address = "kaspatest:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u".to_string();
        assert!(matches!(
            KaspaTransactionBuilder::new(false).build_for_sign(&tx, &context()),
            Err(CoreError::InvalidAddress(_))
        ));
    }
}
