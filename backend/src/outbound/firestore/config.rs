//! Document store configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Connection settings for the managed document store.
///
/// Loaded from `FIRESTORE_*` environment variables. Without a project id the
/// server wires in-memory fixtures instead of the live store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FIRESTORE")]
pub struct FirestoreSettings {
    /// Cloud project that owns the database.
    pub project_id: Option<String>,
    /// API endpoint override (emulator or test server).
    pub base_url: Option<String>,
    /// Bearer token attached to every request, when the database rules
    /// require one.
    pub auth_token: Option<String>,
    /// Object-store bucket for report attachments.
    pub storage_bucket: Option<String>,
}

impl FirestoreSettings {
    /// Return the configured base URL, falling back to the public endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for document store configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> FirestoreSettings {
        FirestoreSettings::load_from_iter([OsString::from("amanah-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env([
            ("FIRESTORE_PROJECT_ID", None::<String>),
            ("FIRESTORE_BASE_URL", None::<String>),
            ("FIRESTORE_AUTH_TOKEN", None::<String>),
            ("FIRESTORE_STORAGE_BUCKET", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.project_id.is_none());
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FIRESTORE_PROJECT_ID", Some("amanah-prod".to_owned())),
            ("FIRESTORE_BASE_URL", Some("http://localhost:8787/v1".to_owned())),
            ("FIRESTORE_AUTH_TOKEN", None::<String>),
            ("FIRESTORE_STORAGE_BUCKET", Some("amanah-prod.appspot.com".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.project_id.as_deref(), Some("amanah-prod"));
        assert_eq!(settings.base_url(), "http://localhost:8787/v1");
        assert_eq!(
            settings.storage_bucket.as_deref(),
            Some("amanah-prod.appspot.com")
        );
    }
}
