//! Payment history and recording handlers.
//!
//! ```text
//! GET  /api/v1/transactions/history   combined donation + zakat history
//! GET  /api/v1/donations              donation history
//! POST /api/v1/donations              record a donation
//! GET  /api/v1/zakat                  zakat payment history
//! POST /api/v1/zakat                  record a zakat payment
//! ```
//!
//! History is fetched fresh per request for the signed-in sender; nothing is
//! cached across sessions.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    CombinedHistory, Error, LedgerKind, PaymentError, PaymentRequest, SourceFailure,
    TransactionRecord,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Payment payload for `POST /api/v1/donations` and `POST /api/v1/zakat`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    /// Payment amount; must be positive.
    pub amount: f64,
    /// Currency code; defaults to `RM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Donation category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-form payer notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Payment method tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Receiving party identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// Receiving party display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    /// Type tag override.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
    /// Status override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Existing on-chain hash for crypto payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl From<PaymentBody> for PaymentRequest {
    fn from(body: PaymentBody) -> Self {
        Self {
            amount: body.amount,
            currency: body.currency,
            category: body.category,
            notes: body.notes,
            payment_method: body.payment_method,
            recipient_id: body.recipient_id,
            recipient_name: body.recipient_name,
            kind: body.kind,
            status: body.status,
            transaction_hash: body.transaction_hash,
        }
    }
}

/// Response for a recorded payment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordedPayment {
    /// Ledger-assigned record id.
    pub id: String,
}

/// History payload for one ledger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerHistory {
    /// Records, newest first.
    pub records: Vec<TransactionRecord>,
    /// Non-fatal failure note, present when the fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<SourceFailure>,
}

fn map_payment_error(err: PaymentError) -> Error {
    match err {
        PaymentError::InvalidAmount => Error::invalid_request("payment amount must be positive")
            .with_details(json!({ "field": "amount" })),
        PaymentError::Ledger { source } => {
            tracing::error!(error = %source, "ledger append failed");
            Error::unavailable("payment could not be recorded")
        }
    }
}

/// Combined donation and zakat history, newest first.
///
/// Degrades gracefully: a failed source contributes no records plus a
/// localized note; the endpoint itself still answers 200.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/history",
    responses(
        (status = 200, description = "Combined history", body = CombinedHistory),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "combinedHistory"
)]
#[get("/transactions/history")]
pub async fn combined_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CombinedHistory>> {
    let snapshot = session.require_snapshot()?;
    Ok(web::Json(state.history.combined_history(&snapshot.uid).await))
}

/// Donation history for the signed-in sender.
#[utoipa::path(
    get,
    path = "/api/v1/donations",
    responses(
        (status = 200, description = "Donation history", body = LedgerHistory),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "donationHistory"
)]
#[get("/donations")]
pub async fn donation_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<LedgerHistory>> {
    let snapshot = session.require_snapshot()?;
    let history = match state.donations.fetch_for_sender(&snapshot.uid).await {
        Ok(records) => LedgerHistory {
            records,
            source_error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "donation history fetch failed");
            LedgerHistory {
                records: Vec::new(),
                source_error: Some(SourceFailure {
                    source: LedgerKind::Donation,
                    message: "Gagal memuatkan sejarah transaksi.".to_owned(),
                }),
            }
        }
    };
    Ok(web::Json(history))
}

/// Record a donation for the signed-in sender.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = PaymentBody,
    responses(
        (status = 200, description = "Donation recorded", body = RecordedPayment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Ledger unavailable", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "recordDonation"
)]
#[post("/donations")]
pub async fn record_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PaymentBody>,
) -> ApiResult<web::Json<RecordedPayment>> {
    let snapshot = session.require_snapshot()?;
    let id = state
        .payments
        .record_donation(&snapshot, payload.into_inner().into())
        .await
        .map_err(map_payment_error)?;
    Ok(web::Json(RecordedPayment { id }))
}

/// Zakat payment history for the signed-in sender.
#[utoipa::path(
    get,
    path = "/api/v1/zakat",
    responses(
        (status = 200, description = "Zakat history", body = LedgerHistory),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "zakatHistory"
)]
#[get("/zakat")]
pub async fn zakat_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<LedgerHistory>> {
    let snapshot = session.require_snapshot()?;
    let history = match state.zakat.fetch_for_sender(&snapshot.uid).await {
        Ok(records) => LedgerHistory {
            records,
            source_error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "zakat history fetch failed");
            LedgerHistory {
                records: Vec::new(),
                source_error: Some(SourceFailure {
                    source: LedgerKind::Zakat,
                    message: "Gagal memuatkan sejarah pembayaran zakat.".to_owned(),
                }),
            }
        }
    };
    Ok(web::Json(history))
}

/// Record a zakat payment for the signed-in sender.
#[utoipa::path(
    post,
    path = "/api/v1/zakat",
    request_body = PaymentBody,
    responses(
        (status = 200, description = "Zakat payment recorded", body = RecordedPayment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Ledger unavailable", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "recordZakat"
)]
#[post("/zakat")]
pub async fn record_zakat(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PaymentBody>,
) -> ApiResult<web::Json<RecordedPayment>> {
    let snapshot = session.require_snapshot()?;
    let id = state
        .payments
        .record_zakat(&snapshot, payload.into_inner().into())
        .await
        .map_err(map_payment_error)?;
    Ok(web::Json(RecordedPayment { id }))
}
