//! Object-store adapter for report attachments.
//!
//! Uploads ride the bucket's media endpoint; the returned token builds the
//! public download URL handed back to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::{AttachmentStore, AttachmentStoreError};

const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attachment store bound to one bucket.
pub struct FirebaseStorageStore {
    http: Client,
    base: Url,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponseDto {
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

impl FirebaseStorageStore {
    /// Build a store for the given bucket against the public endpoint.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(bucket: String) -> Result<Self, AttachmentStoreError> {
        Self::with_base_url(bucket, DEFAULT_BASE_URL)
    }

    /// Build a store against an explicit endpoint (emulator or test server).
    ///
    /// # Errors
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(bucket: String, base_url: &str) -> Result<Self, AttachmentStoreError> {
        let base = Url::parse(base_url)
            .map_err(|err| AttachmentStoreError::decode(format!("invalid base url: {err}")))?;
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| AttachmentStoreError::transport(err.to_string()))?;
        Ok(Self { http, base, bucket })
    }

    fn upload_url(&self, object_name: &str) -> Result<Url, AttachmentStoreError> {
        let mut url = self
            .base
            .join(&format!("v0/b/{}/o", self.bucket))
            .map_err(|err| AttachmentStoreError::decode(format!("invalid upload url: {err}")))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object_name);
        Ok(url)
    }

    fn download_url(&self, object_name: &str, token: Option<&str>) -> Result<String, AttachmentStoreError> {
        let mut url = self
            .base
            .join(&format!("v0/b/{}/o/", self.bucket))
            .map_err(|err| AttachmentStoreError::decode(format!("invalid download url: {err}")))?;
        // Push the object name as a single segment so slashes are escaped.
        url.path_segments_mut()
            .map_err(|()| AttachmentStoreError::decode("download url cannot be a base"))?
            .pop_if_empty()
            .push(object_name);
        url.query_pairs_mut().append_pair("alt", "media");
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url.into())
    }
}

#[async_trait]
impl AttachmentStore for FirebaseStorageStore {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AttachmentStoreError> {
        let url = self.upload_url(object_name)?;
        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| AttachmentStoreError::transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttachmentStoreError::permission_denied(format!(
                "status {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(AttachmentStoreError::transport(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let payload: UploadResponseDto = response
            .json()
            .await
            .map_err(|err| AttachmentStoreError::decode(err.to_string()))?;
        self.download_url(object_name, payload.download_tokens.as_deref())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for URL construction.
    use super::*;

    fn store() -> FirebaseStorageStore {
        FirebaseStorageStore::new("amanah-prod.appspot.com".to_owned()).expect("store builds")
    }

    #[test]
    fn upload_url_carries_the_object_name_as_a_query() {
        let url = store()
            .upload_url("asnaf_reports/1714550400000_u1_roof.jpg")
            .expect("url builds");
        assert!(url.as_str().contains("uploadType=media"));
        assert!(url
            .as_str()
            .contains("name=asnaf_reports%2F1714550400000_u1_roof.jpg"));
    }

    #[test]
    fn download_url_escapes_slashes_in_the_object_segment() {
        let url = store()
            .download_url("asnaf_reports/roof.jpg", Some("tok-123"))
            .expect("url builds");
        assert!(url.contains("/o/asnaf_reports%2Froof.jpg"));
        assert!(url.contains("alt=media"));
        assert!(url.contains("token=tok-123"));
    }
}
