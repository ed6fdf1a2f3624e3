//! Document-store-backed transaction ledger.
//!
//! Two instances cover the two collections: the donation ledger reads
//! `donations` unfiltered; the zakat ledger reads `transactions` filtered to
//! `type == "zakat"`. Field defaults are applied here, at the adapter
//! boundary, so the reconciler only ever sees normalised records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::client::{FirestoreClient, FirestoreError};
use super::dto::Document;
use crate::domain::ports::{LedgerError, TransactionLedger};
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::domain::user::UserId;

/// Ledger adapter bound to one collection.
pub struct FirestoreLedger {
    client: Arc<FirestoreClient>,
    collection: String,
    kind_filter: Option<String>,
}

impl FirestoreLedger {
    /// Donation ledger over the `donations` collection.
    #[must_use]
    pub fn donations(client: Arc<FirestoreClient>) -> Self {
        Self {
            client,
            collection: "donations".to_owned(),
            kind_filter: None,
        }
    }

    /// Zakat ledger over the `transactions` collection, `type == "zakat"`.
    #[must_use]
    pub fn zakat(client: Arc<FirestoreClient>) -> Self {
        Self {
            client,
            collection: "transactions".to_owned(),
            kind_filter: Some("zakat".to_owned()),
        }
    }

    fn sender_query(&self, sender: &UserId) -> Value {
        let sender_filter = json!({
            "fieldFilter": {
                "field": { "fieldPath": "senderId" },
                "op": "EQUAL",
                "value": { "stringValue": sender.as_ref() }
            }
        });
        let filter = match &self.kind_filter {
            Some(kind) => json!({
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        sender_filter,
                        {
                            "fieldFilter": {
                                "field": { "fieldPath": "type" },
                                "op": "EQUAL",
                                "value": { "stringValue": kind }
                            }
                        }
                    ]
                }
            }),
            None => sender_filter,
        };
        json!({
            "from": [{ "collectionId": self.collection }],
            "where": filter,
            "orderBy": [{ "field": { "fieldPath": "timestamp" }, "direction": "DESCENDING" }]
        })
    }
}

fn decode_record(document: Document) -> Option<TransactionRecord> {
    let id = document.doc_id().to_owned();
    let mut plain = document.into_json_map();
    plain.insert("id".to_owned(), Value::String(id.clone()));
    match serde_json::from_value(Value::Object(plain)) {
        Ok(record) => Some(record),
        Err(err) => {
            // One malformed document never fails the whole fetch.
            warn!(%id, error = %err, "skipping undecodable ledger document");
            None
        }
    }
}

fn map_error(err: FirestoreError) -> LedgerError {
    match err {
        FirestoreError::Transport { message } | FirestoreError::Status { message } => {
            LedgerError::transport(message)
        }
        FirestoreError::PermissionDenied { message } => LedgerError::permission_denied(message),
        FirestoreError::Decode { message } => LedgerError::decode(message),
    }
}

#[async_trait]
impl TransactionLedger for FirestoreLedger {
    async fn fetch_for_sender(
        &self,
        sender: &UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let documents = self
            .client
            .run_query(self.sender_query(sender))
            .await
            .map_err(map_error)?;
        Ok(documents.into_iter().filter_map(decode_record).collect())
    }

    async fn append(
        &self,
        sender: &UserId,
        payment: NewTransaction,
    ) -> Result<String, LedgerError> {
        let mut plain = Map::new();
        plain.insert("amount".to_owned(), json!(payment.amount));
        plain.insert("currency".to_owned(), json!(payment.currency));
        plain.insert("category".to_owned(), json!(payment.category));
        plain.insert("notes".to_owned(), json!(payment.notes));
        plain.insert("paymentMethod".to_owned(), json!(payment.payment_method));
        plain.insert("recipientId".to_owned(), json!(payment.recipient_id));
        plain.insert("recipientName".to_owned(), json!(payment.recipient_name));
        plain.insert("senderId".to_owned(), json!(sender.as_ref()));
        plain.insert("senderName".to_owned(), json!(payment.sender_name));
        plain.insert("type".to_owned(), json!(payment.kind));
        plain.insert("status".to_owned(), json!(payment.status));
        if let Some(hash) = payment.transaction_hash {
            plain.insert("transactionHash".to_owned(), json!(hash));
        }

        let mut fields = Document::fields_from_json(plain);
        // The store has no server-assigned timestamp on plain creates; stamp
        // the write time here so ordering matches the fetch query.
        fields.insert(
            "timestamp".to_owned(),
            super::dto::FirestoreValue::Timestamp(Utc::now().to_rfc3339()),
        );

        let created = self
            .client
            .create_document(&self.collection, fields)
            .await
            .map_err(map_error)?;
        Ok(created.doc_id().to_owned())
    }
}
