//! Document-store-backed asnaf report store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::client::{FirestoreClient, FirestoreError};
use super::dto::{Document, FirestoreValue};
use crate::domain::ports::{ReportStore, ReportStoreError};
use crate::domain::reports::AsnafReportRecord;
use crate::domain::user::UserId;

const REPORTS_COLLECTION: &str = "asnafReports";

/// Report store adapter over the `asnafReports` collection.
pub struct FirestoreReportStore {
    client: Arc<FirestoreClient>,
}

impl FirestoreReportStore {
    /// Build the adapter over a shared client.
    #[must_use]
    pub fn new(client: Arc<FirestoreClient>) -> Self {
        Self { client }
    }
}

fn map_error(err: FirestoreError) -> ReportStoreError {
    match err {
        FirestoreError::Transport { message } | FirestoreError::Status { message } => {
            ReportStoreError::transport(message)
        }
        FirestoreError::PermissionDenied { message } => {
            ReportStoreError::permission_denied(message)
        }
        FirestoreError::Decode { message } => ReportStoreError::decode(message),
    }
}

fn decode_report(document: Document) -> Option<AsnafReportRecord> {
    let id = document.doc_id().to_owned();
    let mut plain = document.into_json_map();
    plain.insert("id".to_owned(), Value::String(id.clone()));
    match serde_json::from_value(Value::Object(plain)) {
        Ok(report) => Some(report),
        Err(err) => {
            warn!(%id, error = %err, "skipping undecodable report document");
            None
        }
    }
}

#[async_trait]
impl ReportStore for FirestoreReportStore {
    async fn append_report(
        &self,
        reporter: &UserId,
        report: AsnafReportRecord,
    ) -> Result<String, ReportStoreError> {
        let reported_at = report.reported_at.clone();
        let mut plain = match serde_json::to_value(&report) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(ReportStoreError::decode("report did not encode to an object"))
            }
        };
        plain.remove("id");
        plain.insert("reportedBy".to_owned(), json!(reporter.as_ref()));

        let mut fields = Document::fields_from_json(plain);
        fields.insert(
            "reportedAt".to_owned(),
            FirestoreValue::Timestamp(reported_at),
        );

        let created = self
            .client
            .create_document(REPORTS_COLLECTION, fields)
            .await
            .map_err(map_error)?;
        Ok(created.doc_id().to_owned())
    }

    async fn list_reports(&self) -> Result<Vec<AsnafReportRecord>, ReportStoreError> {
        let query = json!({
            "from": [{ "collectionId": REPORTS_COLLECTION }],
            "orderBy": [{ "field": { "fieldPath": "reportedAt" }, "direction": "DESCENDING" }]
        });
        let documents = self.client.run_query(query).await.map_err(map_error)?;
        Ok(documents.into_iter().filter_map(decode_report).collect())
    }
}
