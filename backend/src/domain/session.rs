//! Session snapshot passed explicitly into domain services.
//!
//! The session reference is owned by the inbound layer (cookie middleware);
//! domain code receives an immutable snapshot per call instead of reading
//! ambient shared state, so there is no hidden mutable singleton to race on.

use crate::domain::user::{DisplayName, UserId};

/// Immutable view of the authenticated caller for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Provider-assigned stable identifier.
    pub uid: UserId,
    /// Optional display name captured at sign-in.
    pub display_name: Option<DisplayName>,
}

impl SessionSnapshot {
    /// Build a snapshot for the given identity.
    #[must_use]
    pub fn new(uid: UserId, display_name: Option<DisplayName>) -> Self {
        Self { uid, display_name }
    }
}
