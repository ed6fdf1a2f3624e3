//! Exchange wallet handlers (crypto rail).
//!
//! ```text
//! GET  /api/v1/wallet/balances
//! POST /api/v1/wallet/send
//! GET  /api/v1/wallet/transactions
//! ```
//!
//! Thin pass-through over the exchange gateway port; outside production the
//! wiring installs the deterministic fixture gateway, so these endpoints
//! never reach the network in development.

use actix_web::{get, post, web};

use crate::domain::ports::{
    AssetBalance, ExchangeError, ExchangeTransaction, SendReceipt, SendRequest,
};
use crate::domain::Error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn map_exchange_error(err: ExchangeError) -> Error {
    match err {
        ExchangeError::Unauthorized => {
            tracing::error!("exchange credentials rejected");
            Error::unavailable("exchange unavailable")
        }
        ExchangeError::Rejected { message } => Error::invalid_request(message),
        ExchangeError::RateLimited { .. }
        | ExchangeError::Transport { .. }
        | ExchangeError::Decode { .. } => {
            tracing::warn!(error = %err, "exchange call failed");
            Error::unavailable("exchange unavailable")
        }
    }
}

/// Per-asset balances held at the exchange.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/balances",
    responses(
        (status = 200, description = "Balances", body = [AssetBalance]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Exchange unavailable", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "walletBalances"
)]
#[get("/wallet/balances")]
pub async fn balances(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AssetBalance>>> {
    session.require_user_id()?;
    let balances = state
        .exchange
        .balances()
        .await
        .map_err(map_exchange_error)?;
    Ok(web::Json(balances))
}

/// Send an asset to an external address.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/send",
    request_body = SendRequest,
    responses(
        (status = 200, description = "Transfer accepted", body = SendReceipt),
        (status = 400, description = "Transfer rejected", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Exchange unavailable", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "walletSend"
)]
#[post("/wallet/send")]
pub async fn send(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendRequest>,
) -> ApiResult<web::Json<SendReceipt>> {
    session.require_user_id()?;
    let receipt = state
        .exchange
        .send(payload.into_inner())
        .await
        .map_err(map_exchange_error)?;
    Ok(web::Json(receipt))
}

/// Exchange-side transaction history.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    responses(
        (status = 200, description = "Transactions", body = [ExchangeTransaction]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Exchange unavailable", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "walletTransactions"
)]
#[get("/wallet/transactions")]
pub async fn transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExchangeTransaction>>> {
    session.require_user_id()?;
    let transactions = state
        .exchange
        .transactions()
        .await
        .map_err(map_exchange_error)?;
    Ok(web::Json(transactions))
}
