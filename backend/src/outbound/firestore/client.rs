//! Reqwest-backed client for the document store REST API.
//!
//! Owns transport details only: URL construction, authentication headers,
//! timeout and HTTP error mapping, and envelope decoding. Collection
//! semantics live in the adapters built on top.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::json;

use super::config::FirestoreSettings;
use super::dto::{Document, FirestoreValue, RunQueryEntry};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Transport-level failure talking to the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirestoreError {
    /// The store could not be reached.
    #[error("document store unreachable: {message}")]
    Transport {
        /// Underlying transport error text.
        message: String,
    },
    /// The store denied the request.
    #[error("document store denied the request: {message}")]
    PermissionDenied {
        /// Status and body preview.
        message: String,
    },
    /// The store answered with an unexpected status.
    #[error("document store request failed: {message}")]
    Status {
        /// Status and body preview.
        message: String,
    },
    /// The store answered with an unparseable payload.
    #[error("document store response invalid: {message}")]
    Decode {
        /// Decode error text.
        message: String,
    },
}

/// Numeric field increment applied atomically in a commit.
#[derive(Debug, Clone)]
pub struct FieldIncrement {
    /// Dotted field path.
    pub field_path: String,
    /// Amount to add.
    pub amount: i64,
}

/// Client bound to one project's document root.
pub struct FirestoreClient {
    http: Client,
    base: Url,
    project_id: String,
    auth_token: Option<String>,
}

impl FirestoreClient {
    /// Build a client from settings.
    ///
    /// # Errors
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &FirestoreSettings, project_id: String) -> Result<Self, FirestoreError> {
        let base = Url::parse(settings.base_url()).map_err(|err| FirestoreError::Decode {
            message: format!("invalid base url: {err}"),
        })?;
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| FirestoreError::Transport {
                message: err.to_string(),
            })?;
        Ok(Self {
            http,
            base,
            project_id,
            auth_token: settings.auth_token.clone(),
        })
    }

    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn url_for(&self, suffix: &str) -> Result<Url, FirestoreError> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            suffix.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| FirestoreError::Decode {
            message: format!("invalid request url: {err}"),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), FirestoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(map_transport_error)?
            .to_vec();
        Ok((status, body))
    }

    /// Fetch one document; `Ok(None)` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = self.url_for(&format!("{}/{collection}/{id}", self.documents_root()))?;
        let (status, body) = self.execute(self.http.get(url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        decode(&body).map(Some)
    }

    /// Create a document with a store-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: BTreeMap<String, FirestoreValue>,
    ) -> Result<Document, FirestoreError> {
        let url = self.url_for(&format!("{}/{collection}", self.documents_root()))?;
        let payload = json!({ "fields": fields });
        let (status, body) = self.execute(self.http.post(url).json(&payload)).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        decode(&body)
    }

    /// Create or replace a document under a caller-chosen id.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, FirestoreValue>,
    ) -> Result<Document, FirestoreError> {
        let url = self.url_for(&format!("{}/{collection}/{id}", self.documents_root()))?;
        let payload = json!({ "fields": fields });
        let (status, body) = self.execute(self.http.patch(url).json(&payload)).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        decode(&body)
    }

    /// Run a structured query and collect the matched documents.
    pub async fn run_query(
        &self,
        structured_query: serde_json::Value,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.url_for(&format!("{}:runQuery", self.documents_root()))?;
        let payload = json!({ "structuredQuery": structured_query });
        let (status, body) = self.execute(self.http.post(url).json(&payload)).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let entries: Vec<RunQueryEntry> = decode(&body)?;
        Ok(entries.into_iter().filter_map(|e| e.document).collect())
    }

    /// Apply numeric increments to one document atomically.
    pub async fn commit_increments(
        &self,
        collection: &str,
        id: &str,
        increments: Vec<FieldIncrement>,
    ) -> Result<(), FirestoreError> {
        let document = format!("{}/{collection}/{id}", self.documents_root());
        let transforms: Vec<serde_json::Value> = increments
            .into_iter()
            .map(|inc| {
                json!({
                    "fieldPath": inc.field_path,
                    "increment": { "integerValue": inc.amount.to_string() }
                })
            })
            .collect();
        let payload = json!({
            "writes": [{
                "transform": {
                    "document": document,
                    "fieldTransforms": transforms
                }
            }]
        });
        let url = self.url_for(&format!("{}:commit", self.documents_root()))?;
        let (status, body) = self.execute(self.http.post(url).json(&payload)).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, FirestoreError> {
    serde_json::from_slice(body).map_err(|err| FirestoreError::Decode {
        message: err.to_string(),
    })
}

fn map_transport_error(error: reqwest::Error) -> FirestoreError {
    FirestoreError::Transport {
        message: error.to_string(),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FirestoreError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FirestoreError::PermissionDenied { message }
        }
        _ => FirestoreError::Status { message },
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

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network helpers.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, true)]
    #[case::forbidden(StatusCode::FORBIDDEN, true)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    fn maps_statuses_to_permission_or_status_errors(
        #[case] status: StatusCode,
        #[case] permission: bool,
    ) {
        let error = map_status_error(status, b"{\"error\":{\"message\":\"denied\"}}");
        assert_eq!(
            matches!(error, FirestoreError::PermissionDenied { .. }),
            permission
        );
    }

    #[test]
    fn body_preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 163);
    }
}
