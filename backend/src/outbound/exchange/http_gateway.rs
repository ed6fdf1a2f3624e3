//! Reqwest-backed exchange gateway.
//!
//! Live adapter for production only; every request carries basic auth
//! derived from the configured key pair. The send call is form-encoded, the
//! reads are JSON, matching the exchange's API conventions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{BalanceListDto, SendReceiptDto, TransactionListDto};
use crate::domain::ports::{
    AssetBalance, ExchangeError, ExchangeGateway, ExchangeTransaction, SendReceipt, SendRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Live exchange gateway speaking the public API.
pub struct LunoHttpGateway {
    http: Client,
    base: Url,
    key_id: String,
    key_secret: String,
}

impl LunoHttpGateway {
    /// Build a gateway from the endpoint and key pair.
    ///
    /// # Errors
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str, key_id: String, key_secret: String) -> Result<Self, ExchangeError> {
        let base = Url::parse(base_url)
            .map_err(|err| ExchangeError::decode(format!("invalid base url: {err}")))?;
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| ExchangeError::transport(err.to_string()))?;
        Ok(Self {
            http,
            base,
            key_id,
            key_secret,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExchangeError> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| ExchangeError::decode(format!("invalid endpoint: {err}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.key_id, Some(&self.key_secret))
    }

    async fn read_success_body(
        response: reqwest::Response,
    ) -> Result<Vec<u8>, ExchangeError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ExchangeError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ExchangeError {
    let preview = body_preview(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExchangeError::unauthorized(),
        StatusCode::TOO_MANY_REQUESTS => ExchangeError::rate_limited(preview),
        _ if status.is_client_error() => ExchangeError::rejected(preview),
        _ => ExchangeError::transport(format!("status {}: {preview}", status.as_u16())),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ExchangeError> {
    serde_json::from_slice(body).map_err(|err| ExchangeError::decode(err.to_string()))
}

#[async_trait]
impl ExchangeGateway for LunoHttpGateway {
    async fn balances(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        let url = self.endpoint("balance")?;
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|err| ExchangeError::transport(err.to_string()))?;
        let body = Self::read_success_body(response).await?;
        let listed: BalanceListDto = decode(&body)?;
        Ok(listed.balance)
    }

    async fn send(&self, request: SendRequest) -> Result<SendReceipt, ExchangeError> {
        let url = self.endpoint("send")?;
        let response = self
            .authorized(self.http.post(url).form(&request))
            .send()
            .await
            .map_err(|err| ExchangeError::transport(err.to_string()))?;
        let body = Self::read_success_body(response).await?;
        let receipt: SendReceiptDto = decode(&body)?;
        Ok(receipt.into())
    }

    async fn transactions(&self) -> Result<Vec<ExchangeTransaction>, ExchangeError> {
        let url = self.endpoint("transactions")?;
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|err| ExchangeError::transport(err.to_string()))?;
        let body = Self::read_success_body(response).await?;
        let listed: TransactionListDto = decode(&body)?;
        Ok(listed.transactions)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for status mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_http_statuses_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"error\":\"nope\"}");
        let matched = match expected {
            "Unauthorized" => matches!(error, ExchangeError::Unauthorized),
            "RateLimited" => matches!(error, ExchangeError::RateLimited { .. }),
            "Rejected" => matches!(error, ExchangeError::Rejected { .. }),
            "Transport" => matches!(error, ExchangeError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}");
    }

    #[test]
    fn endpoints_join_cleanly() {
        let gateway = LunoHttpGateway::new(
            "https://api.luno.com/api/1",
            "key".to_owned(),
            "secret".to_owned(),
        )
        .expect("gateway builds");
        let url = gateway.endpoint("balance").expect("endpoint builds");
        assert_eq!(url.as_str(), "https://api.luno.com/api/1/balance");
    }
}
