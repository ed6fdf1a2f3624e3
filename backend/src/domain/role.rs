//! Coarse privilege roles attached to an identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Privilege tag resolved on demand from the user directory.
///
/// Roles are never cached across navigations; every gate evaluation re-reads
/// the directory so a revoked privilege takes effect immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrative access to review dashboards and reports.
    Admin,
    /// Default privilege for every signed-in identity.
    User,
}

impl Role {
    /// Interpret the raw `user_role` directory field.
    ///
    /// Absent, empty, or unrecognised values all collapse to [`Role::User`];
    /// only the exact stored tag grants [`Role::Admin`].
    ///
    /// # Examples
    /// ```
    /// use amanah_backend::domain::Role;
    ///
    /// assert_eq!(Role::from_stored(Some("admin")), Role::Admin);
    /// assert_eq!(Role::from_stored(Some("moderator")), Role::User);
    /// assert_eq!(Role::from_stored(None), Role::User);
    /// ```
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("admin") => Self::Admin,
            _ => Self::User,
        }
    }

    /// Whether this role grants administrative access.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}
