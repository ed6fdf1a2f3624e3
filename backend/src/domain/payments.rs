//! Recording donation and zakat payments.
//!
//! Appends go through here so both ledgers receive the same defaults the
//! client historically relied on: the sender's directory full name wins over
//! the session display name, zakat records carry the authority recipient,
//! and card/bank payments get a generated placeholder transaction hash.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::domain::ports::{DirectoryError, LedgerError, TransactionLedger, UserDirectory};
use crate::domain::session::SessionSnapshot;
use crate::domain::transaction::NewTransaction;

/// Type tag written on zakat ledger records.
pub const ZAKAT_KIND: &str = "zakat";
/// Default recipient identifier for zakat payments.
pub const ZAKAT_AUTHORITY_ID: &str = "zakat-authority";
/// Default recipient display name for zakat payments.
pub const ZAKAT_AUTHORITY_NAME: &str = "Zakat Authority";

/// Payment fields a caller actually chooses; everything else is defaulted.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequest {
    /// Payment amount; must be positive.
    pub amount: f64,
    /// Currency code; defaults to `RM`.
    pub currency: Option<String>,
    /// Donation category; zakat payments default to `Zakat Payment`.
    pub category: Option<String>,
    /// Free-form payer notes.
    pub notes: Option<String>,
    /// Payment method tag.
    pub payment_method: Option<String>,
    /// Receiving party identifier (donations only).
    pub recipient_id: Option<String>,
    /// Receiving party display name (donations only).
    pub recipient_name: Option<String>,
    /// Type tag; donations default to `donation`.
    pub kind: Option<String>,
    /// Status override; defaults to `completed`.
    pub status: Option<String>,
    /// Existing on-chain hash for crypto payments.
    pub transaction_hash: Option<String>,
}

/// Failure while recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// The amount was zero, negative, or not finite.
    #[error("payment amount must be positive")]
    InvalidAmount,
    /// The ledger append failed.
    #[error("ledger append failed: {source}")]
    Ledger {
        /// Underlying ledger failure.
        #[from]
        source: LedgerError,
    },
}

/// Records payments against the donation and zakat ledgers.
#[derive(Clone)]
pub struct PaymentService {
    donations: Arc<dyn TransactionLedger>,
    zakat: Arc<dyn TransactionLedger>,
    directory: Arc<dyn UserDirectory>,
}

impl PaymentService {
    /// Build the service over both ledgers and the user directory.
    #[must_use]
    pub fn new(
        donations: Arc<dyn TransactionLedger>,
        zakat: Arc<dyn TransactionLedger>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            donations,
            zakat,
            directory,
        }
    }

    /// Record a donation for the signed-in caller; returns the record id.
    pub async fn record_donation(
        &self,
        session: &SessionSnapshot,
        request: PaymentRequest,
    ) -> Result<String, PaymentError> {
        validate_amount(request.amount)?;
        let sender_name = self.sender_name(session).await;
        let payment = NewTransaction {
            amount: request.amount,
            currency: request.currency.unwrap_or_else(|| "RM".to_owned()),
            category: request.category.unwrap_or_default(),
            notes: request.notes.unwrap_or_default(),
            payment_method: request
                .payment_method
                .unwrap_or_else(|| "unknown".to_owned()),
            recipient_id: request.recipient_id.unwrap_or_default(),
            recipient_name: request.recipient_name.unwrap_or_default(),
            sender_name,
            kind: request.kind.unwrap_or_else(|| "donation".to_owned()),
            status: request.status.unwrap_or_else(|| "completed".to_owned()),
            transaction_hash: request.transaction_hash,
        };
        let id = self.donations.append(&session.uid, payment).await?;
        info!(uid = %session.uid, %id, "donation recorded");
        Ok(id)
    }

    /// Record a zakat payment for the signed-in caller; returns the record id.
    ///
    /// Zakat records always target the authority recipient and carry a
    /// transaction hash; payments that did not ride the crypto rail get a
    /// generated placeholder hash.
    pub async fn record_zakat(
        &self,
        session: &SessionSnapshot,
        request: PaymentRequest,
    ) -> Result<String, PaymentError> {
        validate_amount(request.amount)?;
        let sender_name = self.sender_name(session).await;
        let payment = NewTransaction {
            amount: request.amount,
            currency: request.currency.unwrap_or_else(|| "RM".to_owned()),
            category: request
                .category
                .unwrap_or_else(|| "Zakat Payment".to_owned()),
            notes: request.notes.unwrap_or_default(),
            payment_method: request
                .payment_method
                .unwrap_or_else(|| "unknown".to_owned()),
            recipient_id: request
                .recipient_id
                .unwrap_or_else(|| ZAKAT_AUTHORITY_ID.to_owned()),
            recipient_name: request
                .recipient_name
                .unwrap_or_else(|| ZAKAT_AUTHORITY_NAME.to_owned()),
            sender_name,
            kind: request.kind.unwrap_or_else(|| ZAKAT_KIND.to_owned()),
            status: request.status.unwrap_or_else(|| "completed".to_owned()),
            transaction_hash: Some(
                request
                    .transaction_hash
                    .unwrap_or_else(generate_mock_transaction_hash),
            ),
        };
        let id = self.zakat.append(&session.uid, payment).await?;
        info!(uid = %session.uid, %id, "zakat payment recorded");
        Ok(id)
    }

    /// Prefer the directory's full name; fall back to the session display
    /// name, then the anonymous placeholder. A directory failure only costs
    /// the nicer name, never the payment.
    async fn sender_name(&self, session: &SessionSnapshot) -> String {
        let full_name = match self.directory.fetch_profile(&session.uid).await {
            Ok(profile) => profile.and_then(|p| p.full_name),
            Err(err) => {
                log_name_lookup_failure(&err);
                None
            }
        };
        full_name
            .or_else(|| {
                session
                    .display_name
                    .as_ref()
                    .map(|name| name.as_ref().to_owned())
            })
            .unwrap_or_else(|| "Anonymous User".to_owned())
    }
}

fn log_name_lookup_failure(err: &DirectoryError) {
    info!(error = %err, "sender name lookup failed; using fallback");
}

fn validate_amount(amount: f64) -> Result<(), PaymentError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(PaymentError::InvalidAmount)
    }
}

fn generate_mock_transaction_hash() -> String {
    let mut rng = SmallRng::from_entropy();
    format!("mock-tx-{}", rng.gen_range(1_000_000_000_u64..10_000_000_000))
}
