//! Exchange gateway configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.luno.com/api/1";

/// Credentials and endpoint for the exchange API.
///
/// Loaded from `LUNO_*` environment variables. Without a key pair — or
/// outside production — the server wires the deterministic mock gateway
/// instead of the live adapter.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LUNO")]
pub struct ExchangeSettings {
    /// API key id for basic auth.
    pub key_id: Option<String>,
    /// API key secret for basic auth.
    pub key_secret: Option<String>,
    /// Endpoint override (test server).
    pub base_url: Option<String>,
}

impl ExchangeSettings {
    /// Return the configured base URL, falling back to the public endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Both halves of the key pair, when configured.
    #[must_use]
    pub fn key_pair(&self) -> Option<(&str, &str)> {
        match (self.key_id.as_deref(), self.key_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for exchange configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ExchangeSettings {
        ExchangeSettings::load_from_iter([OsString::from("amanah-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn missing_key_pair_reads_as_none() {
        let _guard = lock_env([
            ("LUNO_KEY_ID", Some("abc".to_owned())),
            ("LUNO_KEY_SECRET", None::<String>),
            ("LUNO_BASE_URL", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.key_pair().is_none());
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
    }

    #[rstest]
    fn full_key_pair_is_returned() {
        let _guard = lock_env([
            ("LUNO_KEY_ID", Some("abc".to_owned())),
            ("LUNO_KEY_SECRET", Some("s3cr3t".to_owned())),
            ("LUNO_BASE_URL", Some("http://localhost:9999/api/1".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.key_pair(), Some(("abc", "s3cr3t")));
        assert_eq!(settings.base_url(), "http://localhost:9999/api/1");
    }
}
