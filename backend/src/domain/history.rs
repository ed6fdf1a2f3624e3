//! Combined payment history across both ledgers.
//!
//! The two ledger fetches run concurrently and are joined before
//! reconciliation. Each source resolves to its own outcome: a failed ledger
//! contributes zero records plus a localized, non-fatal note, and never
//! discards what the other ledger returned.

use std::sync::Arc;

use futures_util::join;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::{LedgerError, TransactionLedger};
use crate::domain::reconcile::reconcile;
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;

/// Which ledger a record or failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// General donation ledger.
    Donation,
    /// Zakat payment ledger.
    Zakat,
}

/// Non-fatal note that one source could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SourceFailure {
    /// Ledger that failed.
    pub source: LedgerKind,
    /// Localized, user-presentable message.
    pub message: String,
}

/// Reconciled history plus any per-source failure notes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CombinedHistory {
    /// All surviving records, newest first.
    pub records: Vec<TransactionRecord>,
    /// Sources that contributed nothing because their fetch failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_errors: Vec<SourceFailure>,
}

const DONATION_LOAD_FAILURE: &str = "Gagal memuatkan sejarah transaksi.";
const ZAKAT_LOAD_FAILURE: &str = "Gagal memuatkan sejarah pembayaran zakat.";

/// Fetches and reconciles history from both ledgers.
#[derive(Clone)]
pub struct CombinedHistoryService {
    donations: Arc<dyn TransactionLedger>,
    zakat: Arc<dyn TransactionLedger>,
}

impl CombinedHistoryService {
    /// Build the service over the two ledgers.
    #[must_use]
    pub fn new(donations: Arc<dyn TransactionLedger>, zakat: Arc<dyn TransactionLedger>) -> Self {
        Self { donations, zakat }
    }

    /// Fetch both ledgers concurrently and reconcile whatever succeeded.
    ///
    /// Never fails as a whole: the worst case is an empty record list with a
    /// failure note per source.
    pub async fn combined_history(&self, user: &UserId) -> CombinedHistory {
        let (donations, zakat) = join!(
            self.donations.fetch_for_sender(user),
            self.zakat.fetch_for_sender(user)
        );

        let mut source_errors = Vec::new();
        let donations = Self::settle(
            donations,
            LedgerKind::Donation,
            DONATION_LOAD_FAILURE,
            &mut source_errors,
        );
        let zakat = Self::settle(
            zakat,
            LedgerKind::Zakat,
            ZAKAT_LOAD_FAILURE,
            &mut source_errors,
        );

        CombinedHistory {
            records: reconcile(&[donations, zakat]),
            source_errors,
        }
    }

    fn settle(
        outcome: Result<Vec<TransactionRecord>, LedgerError>,
        source: LedgerKind,
        message: &str,
        source_errors: &mut Vec<SourceFailure>,
    ) -> Vec<TransactionRecord> {
        match outcome {
            Ok(records) => records,
            Err(err) => {
                warn!(?source, error = %err, "ledger fetch failed; continuing without it");
                source_errors.push(SourceFailure {
                    source,
                    message: message.to_owned(),
                });
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockTransactionLedger;
    use serde_json::json;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("fixture uid")
    }

    fn record(id: &str, seconds: i64) -> TransactionRecord {
        serde_json::from_value(json!({
            "id": id,
            "senderId": "u1",
            "timestamp": { "seconds": seconds }
        }))
        .expect("record decodes")
    }

    fn ledger_returning(records: Vec<TransactionRecord>) -> MockTransactionLedger {
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_fetch_for_sender()
            .returning(move |_| Ok(records.clone()));
        ledger
    }

    fn failing_ledger() -> MockTransactionLedger {
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_fetch_for_sender()
            .returning(|_| Err(LedgerError::transport("socket closed")));
        ledger
    }

    #[tokio::test]
    async fn merges_both_ledgers_newest_first() {
        let service = CombinedHistoryService::new(
            Arc::new(ledger_returning(vec![record("d1", 10), record("d2", 1)])),
            Arc::new(ledger_returning(vec![record("z1", 5)])),
        );

        let history = service.combined_history(&uid("u1")).await;
        let ids: Vec<&str> = history.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "z1", "d2"]);
        assert!(history.source_errors.is_empty());
    }

    #[tokio::test]
    async fn one_failing_source_does_not_drop_the_other() {
        let service = CombinedHistoryService::new(
            Arc::new(failing_ledger()),
            Arc::new(ledger_returning(vec![record("a", 1)])),
        );

        let history = service.combined_history(&uid("u1")).await;
        assert_eq!(history.records.len(), 1);
        assert_eq!(history.records[0].id, "a");
        assert_eq!(history.source_errors.len(), 1);
        assert_eq!(history.source_errors[0].source, LedgerKind::Donation);
    }

    #[tokio::test]
    async fn both_sources_failing_yields_empty_history_with_two_notes() {
        let service = CombinedHistoryService::new(
            Arc::new(failing_ledger()),
            Arc::new(failing_ledger()),
        );

        let history = service.combined_history(&uid("u1")).await;
        assert!(history.records.is_empty());
        let sources: Vec<LedgerKind> = history.source_errors.iter().map(|e| e.source).collect();
        assert_eq!(sources, vec![LedgerKind::Donation, LedgerKind::Zakat]);
    }
}
