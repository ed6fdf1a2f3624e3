//! Driven port for report attachment uploads.

use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by the attachment store.
    pub enum AttachmentStoreError {
        /// The object store could not be reached.
        Transport { message: String } => "attachment store unreachable: {message}",
        /// The object store denied the upload.
        PermissionDenied { message: String } => "attachment store denied upload: {message}",
        /// The object store answered with an unparseable payload.
        Decode { message: String } => "attachment store response invalid: {message}",
    }
}

/// Domain port for uploading one attachment and obtaining its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Upload the bytes under the given object name; returns a download URL.
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AttachmentStoreError>;
}

/// In-memory attachment store used in tests and local development.
///
/// Remembers uploaded object names and hands back deterministic URLs.
#[derive(Debug, Default)]
pub struct FixtureAttachmentStore {
    uploaded: Mutex<Vec<String>>,
}

impl FixtureAttachmentStore {
    /// Object names uploaded so far, in order.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned, which cannot happen before
    /// the fixture is shared.
    #[must_use]
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().expect("fixture lock").clone()
    }
}

#[async_trait]
impl AttachmentStore for FixtureAttachmentStore {
    async fn upload(
        &self,
        object_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, AttachmentStoreError> {
        let mut uploaded = self
            .uploaded
            .lock()
            .map_err(|_| AttachmentStoreError::transport("fixture lock poisoned"))?;
        uploaded.push(object_name.to_owned());
        Ok(format!("https://storage.invalid/{object_name}"))
    }
}
