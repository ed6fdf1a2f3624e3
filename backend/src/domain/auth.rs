//! Authentication primitives such as sign-in credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to the identity
//! provider port.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{Email, UserValidationError};

/// Minimum password length accepted by the identity provider.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when sign-in payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than the provider minimum.
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Validated sign-in/sign-up credentials used by the identity provider port.
///
/// ## Invariants
/// - `email` is trimmed and structurally valid.
/// - `password` is non-empty, at least [`PASSWORD_MIN`] characters, and
///   retains caller-provided whitespace to avoid surprising comparisons.
///
/// # Examples
/// ```
/// use amanah_backend::domain::SignInCredentials;
///
/// let creds = SignInCredentials::try_from_parts("amira@example.com", "secret1").unwrap();
/// assert_eq!(creds.email(), "amira@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct SignInCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = Email::new(email).map_err(|err| match err {
            UserValidationError::InvalidEmail => CredentialValidationError::InvalidEmail,
            _ => CredentialValidationError::InvalidEmail,
        })?;

        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for provider calls.
    pub fn email(&self) -> &str {
        self.email.as_ref()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
