//! Transaction records and timestamp normalisation.
//!
//! The ledgers evolved separately, so records arrive with uneven shapes:
//! timestamps may be a provider object carrying epoch seconds, a bare
//! number, or date text. Normalisation happens once, here, into an epoch
//! millisecond sort key; the stored fields themselves are never rewritten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Heterogeneous wire timestamp accepted from any ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecordTimestamp {
    /// Provider timestamp object carrying epoch seconds.
    Provider {
        /// Seconds since the Unix epoch.
        seconds: i64,
        /// Sub-second component, ignored for ordering.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nanoseconds: Option<u32>,
    },
    /// Bare numeric timestamp, interpreted as epoch seconds.
    #[schema(value_type = f64)]
    Numeric(serde_json::Number),
    /// RFC 3339 or plain-date text.
    Text(String),
}

impl RecordTimestamp {
    /// Normalise to milliseconds since the Unix epoch.
    ///
    /// Unparseable text collapses to zero so a malformed record sorts last
    /// instead of failing the batch.
    ///
    /// # Examples
    /// ```
    /// use amanah_backend::domain::RecordTimestamp;
    ///
    /// let ts = RecordTimestamp::Provider { seconds: 2, nanoseconds: None };
    /// assert_eq!(ts.epoch_millis(), 2000);
    /// ```
    #[must_use]
    pub fn epoch_millis(&self) -> i64 {
        match self {
            Self::Provider { seconds, .. } => seconds.saturating_mul(1000),
            Self::Numeric(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|secs| secs as i64))
                .unwrap_or(0)
                .saturating_mul(1000),
            Self::Text(raw) => parse_text_millis(raw),
        }
    }
}

fn parse_text_millis(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.timestamp_millis();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return parsed.and_utc().timestamp_millis();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return parsed
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
    }
    0
}

/// One ledger entry, donation or zakat.
///
/// Fields the application reads are typed; anything else a ledger stores
/// rides along in `extra` untouched, so reconciliation is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Source-assigned id, unique within its ledger only.
    #[serde(default)]
    pub id: String,
    /// Uid of the paying user.
    #[serde(default)]
    pub sender_id: String,
    /// Receiving party identifier, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// Non-negative payment amount in `currency` units.
    #[serde(default)]
    pub amount: f64,
    /// ISO-like currency code, or `RM` for ringgit records.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Source-specific status tag (`pending`, `completed`, `confirmed`, ...).
    #[serde(default = "default_status")]
    pub status: String,
    /// Free-form type tag distinguishing donation, zakat, and crypto records.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Wire timestamp in whichever shape the ledger stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RecordTimestamp>,
    /// Remaining ledger fields, preserved verbatim.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

fn default_currency() -> String {
    "RM".to_owned()
}

fn default_status() -> String {
    "completed".to_owned()
}

impl TransactionRecord {
    /// Millisecond sort key; records without a timestamp sort last.
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        self.timestamp
            .as_ref()
            .map_or(0, RecordTimestamp::epoch_millis)
    }
}

/// Payment data accepted for appending to a ledger.
///
/// The ledger adapter supplies the sender id and server timestamp; callers
/// provide only what the paying user chose.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Payment amount.
    pub amount: f64,
    /// Currency code; `RM` unless the payment rode the crypto rail.
    pub currency: String,
    /// Donation category or `Zakat Payment`.
    pub category: String,
    /// Free-form payer notes.
    pub notes: String,
    /// Payment method tag (`fpx`, `card`, `crypto`, ...).
    pub payment_method: String,
    /// Receiving party identifier.
    pub recipient_id: String,
    /// Receiving party display name.
    pub recipient_name: String,
    /// Name recorded for the sender.
    pub sender_name: String,
    /// Type tag written to the ledger.
    pub kind: String,
    /// Status written to the ledger.
    pub status: String,
    /// On-chain or mock transaction hash, when one exists.
    pub transaction_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"seconds": 1}), 1000)]
    #[case(json!({"seconds": 1, "nanoseconds": 500_000_000}), 1000)]
    #[case(json!(100), 100_000)]
    #[case(json!("1970-01-01T00:00:02Z"), 2000)]
    #[case(json!("2024-01-01"), 1_704_067_200_000)]
    #[case(json!("not a date"), 0)]
    fn wire_shapes_normalise_to_millis(#[case] wire: Value, #[case] expected: i64) {
        let ts: RecordTimestamp = serde_json::from_value(wire).expect("timestamp decodes");
        assert_eq!(ts.epoch_millis(), expected);
    }

    #[test]
    fn missing_timestamp_sorts_to_epoch_zero() {
        let record: TransactionRecord = serde_json::from_value(json!({
            "id": "d1",
            "senderId": "u1",
            "amount": 10.0,
            "type": "donation"
        }))
        .expect("record decodes");
        assert_eq!(record.sort_key(), 0);
        assert_eq!(record.currency, "RM");
        assert_eq!(record.status, "completed");
    }

    #[test]
    fn unknown_fields_are_preserved_verbatim() {
        let record: TransactionRecord = serde_json::from_value(json!({
            "id": "z1",
            "senderId": "u1",
            "type": "zakat",
            "transactionHash": "mock-tx-42",
            "paymentMethod": "fpx"
        }))
        .expect("record decodes");
        assert_eq!(
            record.extra.get("transactionHash"),
            Some(&json!("mock-tx-42"))
        );

        let round_tripped = serde_json::to_value(&record).expect("record encodes");
        assert_eq!(round_tripped["transactionHash"], json!("mock-tx-42"));
        assert_eq!(round_tripped["paymentMethod"], json!("fpx"));
    }
}
