//! Driven port for the external identity provider.
//!
//! In hexagonal terms this is a *driven* port: the auth handlers call it to
//! create or verify identities without knowing the backing provider. Session
//! persistence stays with the inbound cookie layer; the provider only vouches
//! for credentials and hands back the stable uid.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::auth::SignInCredentials;
use crate::domain::user::{DisplayName, UserId};

define_port_error! {
    /// Failures surfaced by the identity provider.
    pub enum IdentityProviderError {
        /// The email/password pair was rejected.
        InvalidCredentials => "invalid credentials",
        /// Sign-up attempted with an email that already has an account.
        EmailInUse => "email address already in use",
        /// The provider rejected the password as too weak.
        WeakPassword { message: String } => "password rejected: {message}",
        /// The provider could not be reached.
        Transport { message: String } => "identity provider unreachable: {message}",
        /// The provider answered with an unparseable payload.
        Decode { message: String } => "identity provider response invalid: {message}",
    }
}

/// Identity returned by a successful provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Provider-assigned stable identifier.
    pub uid: UserId,
    /// Display name, when the provider has one on file.
    pub display_name: Option<DisplayName>,
}

/// Domain port for sign-up and sign-in against the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new identity for the credentials.
    async fn sign_up(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError>;

    /// Verify the credentials and return the existing identity.
    async fn sign_in(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError>;
}

/// In-memory authenticator used in tests and local development.
///
/// `admin@amanah.example` / `password` signs in as a fixed uid; any other
/// credential pair is rejected. Sign-up always succeeds with a uid derived
/// from the email's local part.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

const FIXTURE_UID: &str = "fixture-admin-uid-0001";

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn sign_up(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        let local = credentials
            .email()
            .split('@')
            .next()
            .unwrap_or("user")
            .replace(['.', '+'], "-");
        let uid = UserId::new(format!("fixture-{local}"))
            .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
        Ok(AuthenticatedUser {
            uid,
            display_name: None,
        })
    }

    async fn sign_in(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        if credentials.email() == "admin@amanah.example" && credentials.password() == "password" {
            let uid = UserId::new(FIXTURE_UID)
                .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
            Ok(AuthenticatedUser {
                uid,
                display_name: DisplayName::new("Amanah Admin").ok(),
            })
        } else {
            Err(IdentityProviderError::invalid_credentials())
        }
    }
}
