//! On-demand role resolution against the user directory.
//!
//! Roles are re-read on every invocation; there is no TTL or per-session
//! cache, so a privilege change takes effect on the next navigation.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{DirectoryError, UserDirectory};
use crate::domain::role::Role;
use crate::domain::user::UserId;

/// Failure while determining a user's role.
///
/// Callers must treat this as "role unknown" and never grant admin access on
/// the strength of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleResolutionError {
    /// The directory read failed.
    #[error("role lookup failed: {source}")]
    Lookup {
        /// Underlying directory failure.
        #[from]
        source: DirectoryError,
    },
    /// The directory did not answer within the allowed time.
    #[error("role lookup timed out after {waited_ms} ms")]
    Timeout {
        /// Milliseconds waited before giving up.
        waited_ms: u64,
    },
}

/// Resolves the privilege role for an identity.
#[derive(Clone)]
pub struct RoleResolver {
    directory: Arc<dyn UserDirectory>,
}

impl RoleResolver {
    /// Build a resolver over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the role for a raw identifier.
    ///
    /// A blank identifier short-circuits to [`Role::User`] without touching
    /// the directory: an unidentifiable caller gets the lowest privilege,
    /// not an error. A missing profile document, or a profile without a role
    /// field, also resolves to [`Role::User`]. Only a directory failure is
    /// surfaced, so callers can fail closed.
    pub async fn resolve(&self, raw_id: &str) -> Result<Role, RoleResolutionError> {
        let trimmed = raw_id.trim();
        if trimmed.is_empty() {
            return Ok(Role::User);
        }
        let Ok(user_id) = UserId::new(trimmed) else {
            return Ok(Role::User);
        };

        let profile = self.directory.fetch_profile(&user_id).await?;
        match profile {
            Some(profile) => Ok(Role::from_stored(profile.role.as_deref())),
            None => {
                info!(uid = %user_id, "no directory profile; defaulting to user role");
                Ok(Role::User)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{FixtureUserDirectory, MockUserDirectory, UserProfile};
    use rstest::rstest;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("fixture uid")
    }

    fn resolver_with_role(stored: Option<&str>) -> RoleResolver {
        let directory = FixtureUserDirectory::default().with_profile(
            &uid("someone"),
            UserProfile {
                role: stored.map(str::to_owned),
                ..UserProfile::default()
            },
        );
        RoleResolver::new(Arc::new(directory))
    }

    #[rstest]
    #[case(Some("admin"), Role::Admin)]
    #[case(Some("user"), Role::User)]
    #[case(Some(""), Role::User)]
    #[case(None, Role::User)]
    #[tokio::test]
    async fn stored_roles_resolve(#[case] stored: Option<&str>, #[case] expected: Role) {
        let resolver = resolver_with_role(stored);
        let role = resolver.resolve("someone").await.expect("resolution succeeds");
        assert_eq!(role, expected);
    }

    #[tokio::test]
    async fn blank_identifier_short_circuits_without_directory_call() {
        let mut directory = MockUserDirectory::new();
        directory.expect_fetch_profile().never();
        let resolver = RoleResolver::new(Arc::new(directory));

        let role = resolver.resolve("   ").await.expect("short-circuits");
        assert_eq!(role, Role::User);
    }

    #[tokio::test]
    async fn missing_profile_defaults_to_user() {
        let resolver = RoleResolver::new(Arc::new(FixtureUserDirectory::default()));
        let role = resolver.resolve("stranger").await.expect("resolution succeeds");
        assert_eq!(role, Role::User);
    }

    #[tokio::test]
    async fn directory_failure_is_surfaced() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_fetch_profile()
            .returning(|_| Err(DirectoryError::transport("socket closed")));
        let resolver = RoleResolver::new(Arc::new(directory));

        let err = resolver
            .resolve("someone")
            .await
            .expect_err("failure propagates");
        assert!(matches!(err, RoleResolutionError::Lookup { .. }));
    }
}
