//! Driven port for the third-party exchange (crypto rail).
//!
//! The dev/prod split is part of the contract: outside production the wiring
//! must install [`FixtureExchangeGateway`], which answers deterministically
//! and never touches the network.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by the exchange gateway.
    pub enum ExchangeError {
        /// The exchange rejected the API credentials.
        Unauthorized => "exchange rejected the API credentials",
        /// The exchange could not be reached.
        Transport { message: String } => "exchange unreachable: {message}",
        /// The exchange throttled the caller.
        RateLimited { message: String } => "exchange rate limited: {message}",
        /// The exchange answered with an unparseable payload.
        Decode { message: String } => "exchange response invalid: {message}",
        /// The exchange refused the request itself.
        Rejected { message: String } => "exchange rejected the request: {message}",
    }
}

/// Balance of one asset held at the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssetBalance {
    /// Asset code, e.g. `XBT` or `ETH`.
    pub asset: String,
    /// Available balance as a decimal string, exchange convention.
    pub balance: String,
    /// Amount reserved by open orders.
    #[serde(default)]
    pub reserved: String,
    /// Amount awaiting confirmation.
    #[serde(default)]
    pub unconfirmed: String,
}

/// Outgoing transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendRequest {
    /// Asset code to send.
    pub currency: String,
    /// Amount as a decimal string, exchange convention.
    pub amount: String,
    /// Destination address.
    pub address: String,
    /// Free-form transfer description.
    #[serde(default)]
    pub description: String,
}

/// Acknowledgement of an accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendReceipt {
    /// Exchange-assigned transfer id.
    pub id: String,
    /// Exchange status tag, e.g. `PENDING`.
    pub status: String,
}

/// One historical exchange transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeTransaction {
    /// Exchange-assigned transaction id.
    pub id: String,
    /// RFC 3339 timestamp of the transaction.
    pub timestamp: String,
    /// Signed amount as a decimal string.
    pub amount: String,
    /// Asset code.
    pub currency: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Exchange status tag.
    pub status: String,
}

/// Domain port over the exchange API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Fetch per-asset balances.
    async fn balances(&self) -> Result<Vec<AssetBalance>, ExchangeError>;

    /// Send an asset to an external address.
    async fn send(&self, request: SendRequest) -> Result<SendReceipt, ExchangeError>;

    /// Fetch the account's transaction history.
    async fn transactions(&self) -> Result<Vec<ExchangeTransaction>, ExchangeError>;
}

/// Deterministic gateway installed outside production.
///
/// Balances and history are fixed; send receipts carry sequential ids so
/// repeated test runs see identical responses.
#[derive(Debug, Default)]
pub struct FixtureExchangeGateway {
    sends: AtomicU64,
}

#[async_trait]
impl ExchangeGateway for FixtureExchangeGateway {
    async fn balances(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        Ok(vec![
            AssetBalance {
                asset: "XBT".to_owned(),
                balance: "0.01234567".to_owned(),
                reserved: "0".to_owned(),
                unconfirmed: "0".to_owned(),
            },
            AssetBalance {
                asset: "ETH".to_owned(),
                balance: "0.5432100".to_owned(),
                reserved: "0".to_owned(),
                unconfirmed: "0".to_owned(),
            },
        ])
    }

    async fn send(&self, request: SendRequest) -> Result<SendReceipt, ExchangeError> {
        if request.address.trim().is_empty() {
            return Err(ExchangeError::rejected("destination address is required"));
        }
        let sequence = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SendReceipt {
            id: format!("mock-tx-{sequence}"),
            status: "PENDING".to_owned(),
        })
    }

    async fn transactions(&self) -> Result<Vec<ExchangeTransaction>, ExchangeError> {
        Ok(vec![ExchangeTransaction {
            id: "mock-tx-1".to_owned(),
            timestamp: "2024-01-01T00:00:00Z".to_owned(),
            amount: "0.01".to_owned(),
            currency: "XBT".to_owned(),
            description: "Mock transaction".to_owned(),
            status: "COMPLETED".to_owned(),
        }])
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_send_receipts_are_sequential() {
        let gateway = FixtureExchangeGateway::default();
        let request = SendRequest {
            currency: "XBT".to_owned(),
            amount: "0.001".to_owned(),
            address: "bc1-test-address".to_owned(),
            description: String::new(),
        };
        let first = gateway.send(request.clone()).await.expect("send accepted");
        let second = gateway.send(request).await.expect("send accepted");
        assert_eq!(first.id, "mock-tx-1");
        assert_eq!(second.id, "mock-tx-2");
        assert_eq!(first.status, "PENDING");
    }

    #[tokio::test]
    async fn fixture_rejects_blank_address() {
        let gateway = FixtureExchangeGateway::default();
        let err = gateway
            .send(SendRequest {
                currency: "XBT".to_owned(),
                amount: "0.001".to_owned(),
                address: "  ".to_owned(),
                description: String::new(),
            })
            .await
            .expect_err("blank address must be rejected");
        assert!(matches!(err, ExchangeError::Rejected { .. }));
    }

    #[tokio::test]
    async fn fixture_balances_are_deterministic() {
        let gateway = FixtureExchangeGateway::default();
        let first = gateway.balances().await.expect("balances");
        let second = gateway.balances().await.expect("balances");
        assert_eq!(first, second);
        assert_eq!(first[0].asset, "XBT");
    }
}
