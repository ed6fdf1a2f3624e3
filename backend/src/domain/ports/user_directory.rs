//! Driven port for the user directory (profile documents).
//!
//! One document per identity, keyed by uid. Absence of the document, or of
//! any individual field, is a valid non-error state: new identities simply
//! have no profile yet.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::user::UserId;

define_port_error! {
    /// Failures surfaced by the user directory.
    pub enum DirectoryError {
        /// The backing store could not be reached.
        Transport { message: String } => "user directory unreachable: {message}",
        /// The backing store denied the read or write.
        PermissionDenied { message: String } => "user directory denied access: {message}",
        /// A stored document could not be interpreted.
        Decode { message: String } => "user directory document invalid: {message}",
    }
}

/// Profile document fields the application reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Full legal name used on payment records.
    pub full_name: Option<String>,
    /// Raw stored role tag; interpreted by [`crate::domain::Role::from_stored`].
    pub role: Option<String>,
    /// Accumulated reward points from accepted reports.
    pub reward_points: i64,
    /// Number of reports this user has submitted.
    pub reports_submitted: i64,
}

/// New profile fields written at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUserProfile {
    /// Full legal name, when collected at sign-up.
    pub full_name: Option<String>,
    /// Contact email for the account record.
    pub email: Option<String>,
}

/// Domain port over the user directory collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create (or replace) the profile document for a new identity.
    async fn create_profile(
        &self,
        user_id: &UserId,
        profile: NewUserProfile,
    ) -> Result<(), DirectoryError>;

    /// Fetch the profile document; `None` when no document exists.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError>;

    /// Add reward points and bump the submitted-report counter atomically.
    async fn award_report_points(&self, user_id: &UserId, points: u32)
        -> Result<(), DirectoryError>;
}

/// In-memory directory used in tests and local development.
#[derive(Debug, Default)]
pub struct FixtureUserDirectory {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl FixtureUserDirectory {
    /// Seed a profile, returning `self` for chaining.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned, which cannot happen before
    /// the fixture is shared.
    #[must_use]
    pub fn with_profile(self, user_id: &UserId, profile: UserProfile) -> Self {
        self.profiles
            .lock()
            .expect("fixture lock")
            .insert(user_id.as_ref().to_owned(), profile);
        self
    }
}

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn create_profile(
        &self,
        user_id: &UserId,
        profile: NewUserProfile,
    ) -> Result<(), DirectoryError> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| DirectoryError::transport("fixture lock poisoned"))?;
        profiles.insert(
            user_id.as_ref().to_owned(),
            UserProfile {
                full_name: profile.full_name,
                ..UserProfile::default()
            },
        );
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DirectoryError> {
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| DirectoryError::transport("fixture lock poisoned"))?;
        Ok(profiles.get(user_id.as_ref()).cloned())
    }

    async fn award_report_points(
        &self,
        user_id: &UserId,
        points: u32,
    ) -> Result<(), DirectoryError> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| DirectoryError::transport("fixture lock poisoned"))?;
        let profile = profiles.entry(user_id.as_ref().to_owned()).or_default();
        profile.reward_points = profile.reward_points.saturating_add(i64::from(points));
        profile.reports_submitted = profile.reports_submitted.saturating_add(1);
        Ok(())
    }
}
