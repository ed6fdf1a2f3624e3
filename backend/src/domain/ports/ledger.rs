//! Driven port for a transaction ledger.
//!
//! Each ledger is an external, append-mostly collection queried by sender
//! identity. The port exposes exactly the two operations the application
//! needs: a sender-filtered fetch (newest first) and an append that returns
//! the source-assigned id. No update or delete is exposed.

use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::transaction::{NewTransaction, RecordTimestamp, TransactionRecord};
use crate::domain::user::UserId;

define_port_error! {
    /// Failures surfaced by a ledger source.
    pub enum LedgerError {
        /// The backing store could not be reached.
        Transport { message: String } => "ledger unreachable: {message}",
        /// The backing store denied the read or write.
        PermissionDenied { message: String } => "ledger denied access: {message}",
        /// A stored document could not be interpreted.
        Decode { message: String } => "ledger document invalid: {message}",
    }
}

/// Domain port over one transaction ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Fetch the sender's records, ordered newest first by the source.
    async fn fetch_for_sender(
        &self,
        sender: &UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Append a record and return the source-assigned id.
    async fn append(
        &self,
        sender: &UserId,
        payment: NewTransaction,
    ) -> Result<String, LedgerError>;
}

/// In-memory ledger used in tests and local development.
///
/// Appended records receive sequential ids and second-granularity timestamps
/// so fetch order is deterministic.
#[derive(Debug, Default)]
pub struct FixtureLedger {
    records: Mutex<Vec<TransactionRecord>>,
}

impl FixtureLedger {
    /// Seed the ledger with existing records, returning `self` for chaining.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned, which cannot happen before
    /// the fixture is shared.
    #[must_use]
    pub fn with_records(self, seeded: Vec<TransactionRecord>) -> Self {
        self.records.lock().expect("fixture lock").extend(seeded);
        self
    }
}

#[async_trait]
impl TransactionLedger for FixtureLedger {
    async fn fetch_for_sender(
        &self,
        sender: &UserId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let records = self
            .records
            .lock()
            .map_err(|_| LedgerError::transport("fixture lock poisoned"))?;
        let mut matching: Vec<TransactionRecord> = records
            .iter()
            .filter(|record| record.sender_id == sender.as_ref())
            .cloned()
            .collect();
        matching.sort_by_key(|record| std::cmp::Reverse(record.sort_key()));
        Ok(matching)
    }

    async fn append(
        &self,
        sender: &UserId,
        payment: NewTransaction,
    ) -> Result<String, LedgerError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| LedgerError::transport("fixture lock poisoned"))?;
        let id = format!("fixture-{}", records.len() + 1);
        let seconds = i64::try_from(records.len() + 1).unwrap_or(i64::MAX);
        let mut extra = serde_json::Map::new();
        extra.insert("category".to_owned(), payment.category.into());
        extra.insert("notes".to_owned(), payment.notes.into());
        extra.insert("paymentMethod".to_owned(), payment.payment_method.into());
        extra.insert("recipientName".to_owned(), payment.recipient_name.into());
        extra.insert("senderName".to_owned(), payment.sender_name.into());
        if let Some(hash) = payment.transaction_hash {
            extra.insert("transactionHash".to_owned(), hash.into());
        }
        records.push(TransactionRecord {
            id: id.clone(),
            sender_id: sender.as_ref().to_owned(),
            recipient_id: Some(payment.recipient_id),
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            kind: payment.kind,
            timestamp: Some(RecordTimestamp::Provider {
                seconds,
                nanoseconds: None,
            }),
            extra,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("fixture uid")
    }

    fn payment(kind: &str) -> NewTransaction {
        NewTransaction {
            amount: 25.0,
            currency: "RM".to_owned(),
            category: "Zakat Payment".to_owned(),
            notes: String::new(),
            payment_method: "fpx".to_owned(),
            recipient_id: "zakat-authority".to_owned(),
            recipient_name: "Zakat Authority".to_owned(),
            sender_name: "Nurul".to_owned(),
            kind: kind.to_owned(),
            status: "completed".to_owned(),
            transaction_hash: None,
        }
    }

    #[tokio::test]
    async fn append_then_fetch_filters_by_sender() {
        let ledger = FixtureLedger::default();
        let alice = uid("alice");
        let bob = uid("bob");
        ledger.append(&alice, payment("zakat")).await.expect("append");
        ledger.append(&bob, payment("zakat")).await.expect("append");

        let fetched = ledger.fetch_for_sender(&alice).await.expect("fetch");
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].sender_id, "alice");
    }

    #[tokio::test]
    async fn fetch_returns_newest_first() {
        let ledger = FixtureLedger::default();
        let alice = uid("alice");
        let first = ledger.append(&alice, payment("zakat")).await.expect("append");
        let second = ledger.append(&alice, payment("zakat")).await.expect("append");

        let fetched = ledger.fetch_for_sender(&alice).await.expect("fetch");
        assert_eq!(fetched[0].id, second);
        assert_eq!(fetched[1].id, first);
    }
}
