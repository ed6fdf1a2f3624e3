//! Identity provider adapter over the Firebase Auth REST API.
//!
//! Owns transport only: the two `identitytoolkit` calls the application
//! needs, keyed by the project's web API key, with provider error codes
//! mapped onto the port taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::domain::auth::SignInCredentials;
use crate::domain::ports::{AuthenticatedUser, IdentityProvider, IdentityProviderError};
use crate::domain::user::{DisplayName, UserId};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider configuration loaded via OrthoConfig.
///
/// Loaded from `FIREBASE_*` environment variables. Without an API key the
/// server wires the fixture provider instead of the live one.
#[derive(Debug, Clone, serde::Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "FIREBASE")]
pub struct IdentitySettings {
    /// Web API key for the identity toolkit endpoints.
    pub api_key: Option<String>,
    /// Endpoint override (emulator or test server).
    pub auth_base_url: Option<String>,
}

impl IdentitySettings {
    /// Return the configured base URL, falling back to the public endpoint.
    #[must_use]
    pub fn auth_base_url(&self) -> &str {
        self.auth_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Identity provider adapter bound to one project API key.
pub struct FirebaseAuthProvider {
    http: Client,
    base: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponseDto {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDto {
    error: ProviderErrorBodyDto,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBodyDto {
    #[serde(default)]
    message: String,
}

impl FirebaseAuthProvider {
    /// Build a provider against the public endpoint.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self, IdentityProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Build a provider against an explicit endpoint (emulator or test
    /// server).
    ///
    /// # Errors
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// constructed.
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, IdentityProviderError> {
        let base = Url::parse(base_url)
            .map_err(|err| IdentityProviderError::decode(format!("invalid base url: {err}")))?;
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| IdentityProviderError::transport(err.to_string()))?;
        Ok(Self {
            http,
            base,
            api_key,
        })
    }

    fn endpoint(&self, action: &str) -> Result<Url, IdentityProviderError> {
        let mut url = self
            .base
            .join(&format!("v1/accounts:{action}"))
            .map_err(|err| IdentityProviderError::decode(format!("invalid endpoint: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn call(
        &self,
        action: &str,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        let url = self.endpoint(action)?;
        let payload = json!({
            "email": credentials.email(),
            "password": credentials.password(),
            "returnSecureToken": true
        });
        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| IdentityProviderError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityProviderError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_provider_error(status, body.as_ref()));
        }

        let decoded: SignInResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
        let uid = UserId::new(&decoded.local_id)
            .map_err(|err| IdentityProviderError::decode(format!("invalid uid: {err}")))?;
        let display_name = decoded
            .display_name
            .and_then(|raw| DisplayName::new(raw).ok());
        Ok(AuthenticatedUser { uid, display_name })
    }
}

fn map_provider_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let code = serde_json::from_slice::<ProviderErrorDto>(body)
        .map(|dto| dto.error.message)
        .unwrap_or_default();
    // The provider multiplexes everything onto 400 with a message code.
    let prefix = code.split(':').next().unwrap_or_default().trim().to_owned();
    match prefix.as_str() {
        "EMAIL_EXISTS" => IdentityProviderError::email_in_use(),
        "WEAK_PASSWORD" => IdentityProviderError::weak_password(code),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityProviderError::invalid_credentials()
        }
        _ if status.is_server_error() => {
            IdentityProviderError::transport(format!("status {}", status.as_u16()))
        }
        other => IdentityProviderError::decode(format!(
            "unrecognised provider error '{other}' (status {})",
            status.as_u16()
        )),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthProvider {
    async fn sign_up(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        self.call("signUp", credentials).await
    }

    async fn sign_in(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        self.call("signInWithPassword", credentials).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for provider error mapping.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn body(message: &str) -> Vec<u8> {
        json!({ "error": { "message": message, "code": 400 } })
            .to_string()
            .into_bytes()
    }

    #[rstest]
    #[case("EMAIL_EXISTS", IdentityProviderError::EmailInUse)]
    #[case("EMAIL_NOT_FOUND", IdentityProviderError::InvalidCredentials)]
    #[case("INVALID_PASSWORD", IdentityProviderError::InvalidCredentials)]
    #[case("INVALID_LOGIN_CREDENTIALS", IdentityProviderError::InvalidCredentials)]
    #[case("USER_DISABLED", IdentityProviderError::InvalidCredentials)]
    fn provider_codes_map_to_the_port_taxonomy(
        #[case] code: &str,
        #[case] expected: IdentityProviderError,
    ) {
        let mapped = map_provider_error(StatusCode::BAD_REQUEST, &body(code));
        assert_eq!(mapped, expected);
    }

    #[test]
    fn weak_password_keeps_the_provider_message() {
        let mapped = map_provider_error(
            StatusCode::BAD_REQUEST,
            &body("WEAK_PASSWORD : Password should be at least 6 characters"),
        );
        assert!(matches!(mapped, IdentityProviderError::WeakPassword { .. }));
    }

    #[test]
    fn server_errors_map_to_transport() {
        let mapped = map_provider_error(StatusCode::INTERNAL_SERVER_ERROR, b"oops");
        assert!(matches!(mapped, IdentityProviderError::Transport { .. }));
    }

    #[test]
    fn endpoints_carry_the_api_key() {
        let provider =
            FirebaseAuthProvider::new("test-key".to_owned()).expect("provider builds");
        let url = provider.endpoint("signUp").expect("endpoint builds");
        assert!(url.as_str().starts_with(
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=test-key"
        ));
    }
}
