//! Kaspa REST（api.kaspa.org）

use serde::{Deserialize, Serialize};

use super::{decode_body, deserialize_u64};
use crate::error::{CoreError, CoreResult};
use crate::service::transaction_builder::{KaspaTransactionDto, KaspaUnspentOutput};

pub const SUBMIT_PATH: &str = "/transactions";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Outpoint {
    transaction_id: String,
    index: u32,
}

#[derive(Deserialize)]
struct UtxoEntry {
    #[serde(deserialize_with = "deserialize_u64")]
    amount: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoResponse {
    outpoint: Outpoint,
    utxo_entry: UtxoEntry,
}

/// `POST /transactions` 请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KaspaSubmitRequest<'a> {
    pub transaction: &'a KaspaTransactionDto,
    pub allow_orphan: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubmitResponse {
    Accepted {
        #[serde(rename = "transactionId")]
        transaction_id: String,
    },
    Rejected {
        error: String,
    },
}

pub fn utxos_path(address: &str) -> String {
    format!("/addresses/{address}/utxos")
}

pub fn balance_path(address: &str) -> String {
    format!("/addresses/{address}/balance")
}

/// `GET /addresses/{address}/balance` → sompi
pub fn decode_balance(body: &str) -> CoreResult<u64> {
    #[derive(Deserialize)]
    struct Balance {
        #[serde(deserialize_with = "deserialize_u64")]
        balance: u64,
    }

    Ok(decode_body::<Balance>(body)?.balance)
}

/// `GET /addresses/{address}/utxos`，保持节点返回的顺序
pub fn decode_unspent_outputs(body: &str) -> CoreResult<Vec<KaspaUnspentOutput>> {
    decode_body::<Vec<UtxoResponse>>(body)?
        .into_iter()
        .map(|utxo| {
            KaspaUnspentOutput::new(
                &utxo.outpoint.transaction_id,
                utxo.outpoint.index,
                utxo.utxo_entry.amount,
            )
            .map_err(|e| CoreError::MalformedResponse(e.to_string()))
        })
        .collect()
}

pub fn submit_request(transaction: &KaspaTransactionDto) -> KaspaSubmitRequest<'_> {
    KaspaSubmitRequest {
        transaction,
        allow_orphan: false,
    }
}

/// `POST /transactions` → 交易 ID
pub fn decode_submit_result(body: &str) -> CoreResult<String> {
    match decode_body::<SubmitResponse>(body)? {
        SubmitResponse::Accepted { transaction_id } => {
            tracing::debug!(tx_id = %transaction_id, "kaspa transaction submitted");
            Ok(transaction_id)
        }
        SubmitResponse::Rejected { error } => {
            tracing::warn!(error = %error, "kaspa transaction rejected");
            Err(CoreError::RpcError {
                code: 0,
                message: error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTXOS: &str = r#"[
        {
            "address":"kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s",
            "outpoint":{"transactionId":"414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134","index":0},
            "utxoEntry":{
                "amount":"20000000",
                "scriptPublicKey":{"scriptPublicKey":"2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab"},
                "blockDaaScore":"53184961",
                "isCoinbase":false
            }
        },
        {
            "address":"kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s",
            "outpoint":{"transactionId":"5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113","index":1},
            "utxoEntry":{
                "amount":"19736854",
                "scriptPublicKey":{"scriptPublicKey":"2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab"},
                "blockDaaScore":"53185012",
                "isCoinbase":false
            }
        }
    ]"#;

    #[test]
    fn test_decode_unspent_outputs() {
        let utxos = decode_unspent_outputs(UTXOS).unwrap();
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos[0].amount, 20_000_000);
        assert_eq!(utxos[1].index, 1);
        assert_eq!(
            hex::encode(utxos[1].transaction_id),
            "5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113"
        );
        assert_eq!(decode_unspent_outputs("[]").unwrap(), vec![]);
    }

    #[test]
    fn test_bad_unspent_outputs_are_malformed() {
        for body in [
            r#"[{"outpoint":{"transactionId":"abcd","index":0},"utxoEntry":{"amount":"1"}}]"#,
            r#"[{"outpoint":{"transactionId":"414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134","index":0},"utxoEntry":{"amount":"-1"}}]"#,
            r#"{"error":"not found"}"#,
        ] {
            assert!(
                matches!(decode_unspent_outputs(body), Err(CoreError::MalformedResponse(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_decode_balance() {
        assert_eq!(
            decode_balance(r#"{"address":"kaspa:qyp","balance":39736854}"#).unwrap(),
            39_736_854
        );
        assert!(decode_balance(r#"{"balance":"x"}"#).is_err());
    }

    #[test]
    fn test_decode_submit_result() {
        assert_eq!(
            decode_submit_result(r#"{"transactionId":"ab12"}"#).unwrap(),
            "ab12"
        );
        assert!(matches!(
            decode_submit_result(r#"{"error":"orphan transaction"}"#),
            Err(CoreError::RpcError { code: 0, .. })
        ));
    }

    #[test]
    fn test_submit_request_shape() {
        let dto = KaspaTransactionDto {
            version: 0,
            inputs: vec![],
            outputs: vec![],
            lock_time: 0,
            subnetwork_id: "00".repeat(20),
        };
        let json = serde_json::to_value(submit_request(&dto)).unwrap();
        assert_eq!(json["allowOrphan"], false);
        assert_eq!(json["transaction"]["lockTime"], 0);
    }

    #[test]
    fn test_paths() {
        assert_eq!(utxos_path("kaspa:qyp"), "/addresses/kaspa:qyp/utxos");
        assert_eq!(balance_path("kaspa:qyp"), "/addresses/kaspa:qyp/balance");
    }
}
