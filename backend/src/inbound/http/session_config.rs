//! Session and runtime configuration parsing and validation.
//!
//! Centralises the environment-driven settings so they are validated
//! consistently and can be tested in isolation. Release builds require an
//! explicit session key; debug builds may fall back to an ephemeral one.

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const APP_ENV: &str = "APP_ENV";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Length of a secret fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Deployment environment, driving the dev/prod adapter split.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuntimeMode {
    /// Real outbound adapters; live exchange gateway.
    Production,
    /// Fixture adapters where a live backend is not configured; mock
    /// exchange gateway always.
    Development,
}

impl RuntimeMode {
    /// Read `APP_ENV`; anything other than `production` is development.
    #[must_use]
    pub fn from_env<E: Env>(env: &E) -> Self {
        match env.string(APP_ENV).as_deref().map(str::trim) {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Session settings derived from configuration toggles.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {message}")]
    KeyUnreadable {
        /// Configured key path.
        path: String,
        /// Underlying IO error text.
        message: String,
    },
    /// The key file contents are too short to derive a signing key.
    #[error("session key at {path} must be at least {min} bytes")]
    KeyTooShort {
        /// Configured key path.
        path: String,
        /// Minimum accepted length.
        min: usize,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Accepted forms.
        expected: &'static str,
    },
}

impl SessionSettings {
    /// Load and validate session settings from the environment.
    pub fn load<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let key = load_key(env, mode)?;
        let cookie_secure = parse_bool(env, COOKIE_SECURE_ENV, true)?;
        let same_site = parse_same_site(env)?;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }
}

fn load_key<E: Env>(env: &E, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let path = env
        .string(KEY_FILE_ENV)
        .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned());
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            if bytes.len() < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    min: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            tracing::info!(fingerprint = %key_fingerprint(&key), "session key loaded");
            Ok(key)
        }
        Err(err) => {
            let allow_ephemeral = env.string(ALLOW_EPHEMERAL_ENV).as_deref() == Some("1");
            if mode.is_debug() || allow_ephemeral {
                warn!(path = %path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyUnreadable {
                    path,
                    message: err.to_string(),
                })
            }
        }
    }
}

fn parse_bool<E: Env>(
    env: &E,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    match env.string(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected: BOOL_EXPECTED,
            }),
        },
    }
}

fn parse_same_site<E: Env>(env: &E) -> Result<SameSite, SessionConfigError> {
    match env.string(SAMESITE_ENV) {
        None => Ok(SameSite::Lax),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: raw,
                expected: SAMESITE_EXPECTED,
            }),
        },
    }
}

/// Truncated SHA-256 fingerprint of the key's signing material.
///
/// Lets operators verify which key is active from the logs without exposing
/// the key itself.
///
/// # Examples
/// ```
/// use actix_web::cookie::Key;
/// use amanah_backend::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    secret_fingerprint(key.signing())
}

/// Truncated SHA-256 fingerprint of arbitrary secret material.
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    let digest = hasher.finalize();
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
