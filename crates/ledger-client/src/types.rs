//! Ledger Types - Wire format of the `ledger` method and the display summary

use crate::error::LedgerError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============ Request Types ============

/// Params for the `ledger` method
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRequest {
    pub ledger_index: &'static str,
    pub transactions: bool,
}

impl LedgerRequest {
    /// Latest validated ledger, including its transaction list
    pub fn validated_with_transactions() -> Self {
        Self {
            ledger_index: "validated",
            transactions: true,
        }
    }
}

// ============ Response Types ============

/// `result` object of a `ledger` call
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerResponse {
    #[serde(default)]
    pub ledger: Option<LedgerData>,
    #[serde(default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Ledger header plus its transactions
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerData {
    pub close_time_human: String,
    pub ledger_hash: String,
    #[serde(deserialize_with = "deserialize_ledger_index")]
    pub ledger_index: u64,
    /// Hashes or expanded transactions; only the count is used
    pub transactions: Vec<Value>,
}

/// The inner `ledger_index` comes back as a decimal string on API v1
fn deserialize_ledger_index<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIndex {
        Number(u64),
        Text(String),
    }

    match RawIndex::deserialize(deserializer)? {
        RawIndex::Number(n) => Ok(n),
        RawIndex::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid ledger_index: {:?}", s))),
    }
}

// ============ Summary ============

/// The four fields shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub close_time_human: String,
    pub ledger_hash: String,
    pub ledger_index: u64,
    pub tx_count: usize,
}

impl LedgerSummary {
    /// Summarize a ledger. `tx_count` is the length of its transaction list.
    pub fn from_ledger(ledger: LedgerData) -> Self {
        Self {
            tx_count: ledger.transactions.len(),
            close_time_human: ledger.close_time_human,
            ledger_hash: ledger.ledger_hash,
            ledger_index: ledger.ledger_index,
        }
    }

    /// Summarize a full `ledger` result, rejecting error and unvalidated responses
    pub fn from_response(response: LedgerResponse) -> Result<Self, LedgerError> {
        if response.status.as_deref() == Some("error") || response.error.is_some() {
            return Err(LedgerError::Upstream {
                error: response.error.unwrap_or_else(|| "unknown".to_string()),
                message: response.error_message.unwrap_or_default(),
            });
        }

        let ledger = response
            .ledger
            .ok_or_else(|| LedgerError::Malformed("result has no ledger".to_string()))?;

        if response.validated == Some(false) {
            return Err(LedgerError::NotValidated(ledger.ledger_index));
        }

        Ok(Self::from_ledger(ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ledger_result(index: Value, tx_count: usize) -> Value {
        let transactions: Vec<String> = (0..tx_count).map(|i| format!("{:064X}", i)).collect();
        json!({
            "ledger": {
                "close_time_human": "2024-Mar-05 17:21:40.000000000 UTC",
                "ledger_hash": "4BC50C9B0D8515D3EAAE1E74B29A95804346C491EE1A95BF25E4AAB854A6A652",
                "ledger_index": index,
                "transactions": transactions,
            },
            "ledger_hash": "4BC50C9B0D8515D3EAAE1E74B29A95804346C491EE1A95BF25E4AAB854A6A652",
            "ledger_index": 12345678,
            "status": "success",
            "validated": true
        })
    }

    #[test]
    fn test_tx_count_matches_transaction_list() {
        let response: LedgerResponse = serde_json::from_value(ledger_result(json!("12345678"), 7)).unwrap();
        let summary = LedgerSummary::from_response(response).unwrap();

        assert_eq!(summary.tx_count, 7);
        assert_eq!(summary.ledger_index, 12345678);
        assert_eq!(summary.close_time_human, "2024-Mar-05 17:21:40.000000000 UTC");
    }

    #[test]
    fn test_empty_ledger() {
        let response: LedgerResponse = serde_json::from_value(ledger_result(json!(5), 0)).unwrap();
        let summary = LedgerSummary::from_response(response).unwrap();
        assert_eq!(summary.tx_count, 0);
    }

    #[test]
    fn test_ledger_index_accepts_number_and_string() {
        let from_text: LedgerResponse = serde_json::from_value(ledger_result(json!("42"), 1)).unwrap();
        let from_number: LedgerResponse = serde_json::from_value(ledger_result(json!(42), 1)).unwrap();

        assert_eq!(from_text.ledger.unwrap().ledger_index, 42);
        assert_eq!(from_number.ledger.unwrap().ledger_index, 42);
    }

    #[test]
    fn test_ledger_index_rejects_garbage() {
        let result = serde_json::from_value::<LedgerResponse>(ledger_result(json!("current"), 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_expanded_transactions_are_counted() {
        let mut value = ledger_result(json!(1), 0);
        value["ledger"]["transactions"] = json!([
            {"TransactionType": "Payment", "hash": "AA"},
            {"TransactionType": "OfferCreate", "hash": "BB"}
        ]);
        let response: LedgerResponse = serde_json::from_value(value).unwrap();
        assert_eq!(LedgerSummary::from_response(response).unwrap().tx_count, 2);
    }

    #[test]
    fn test_error_status_maps_to_upstream_error() {
        let response: LedgerResponse = serde_json::from_value(json!({
            "error": "lgrNotFound",
            "error_message": "ledgerNotFound",
            "status": "error"
        }))
        .unwrap();

        let err = LedgerSummary::from_response(response).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Upstream {
                error: "lgrNotFound".to_string(),
                message: "ledgerNotFound".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_ledger_is_malformed() {
        let response: LedgerResponse = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(matches!(
            LedgerSummary::from_response(response),
            Err(LedgerError::Malformed(_))
        ));
    }

    #[test]
    fn test_unvalidated_ledger_rejected() {
        let mut value = ledger_result(json!(99), 3);
        value["validated"] = json!(false);
        let response: LedgerResponse = serde_json::from_value(value).unwrap();

        assert_eq!(
            LedgerSummary::from_response(response),
            Err(LedgerError::NotValidated(99))
        );
    }

    #[test]
    fn test_request_params() {
        let params = serde_json::to_value(LedgerRequest::validated_with_transactions()).unwrap();
        assert_eq!(params, json!({"ledger_index": "validated", "transactions": true}));
    }
}
