//! Navigation gate: decides every navigation attempt.
//!
//! Evaluation precedence is fixed and order-sensitive:
//! 1. auth-required route without a session redirects to sign-in, carrying
//!    the intended path so the post-login flow can resume it;
//! 2. admin-required route resolves the role and fails closed;
//! 3. guest-only route with a live session redirects by role, forcing a
//!    sign-out if the role cannot be determined;
//! 4. everything else is allowed.
//!
//! Navigations can overlap (rapid back/forward). Each evaluation takes a
//! generation token; a resolution that completes after a newer navigation
//! started is reported as superseded and its outcome discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::warn;

use crate::domain::role::Role;
use crate::domain::role_resolver::{RoleResolutionError, RoleResolver};
use crate::domain::routes::{RouteAccess, RouteDescriptor, ADMIN_LANDING_ROUTE, HOME_ROUTE};
use crate::domain::session::SessionSnapshot;

/// Default ceiling on one role resolution during navigation.
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of one navigation evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested route.
    Allowed,
    /// Send the visitor to sign-in; `resume` is the intended destination.
    RedirectLogin {
        /// Path to forward to after a successful sign-in.
        resume: Option<String>,
    },
    /// Send the visitor to the standard landing page.
    RedirectHome,
    /// Signed-in visitor on a guest-only page; send them to their area.
    RedirectByRole {
        /// Landing route matching the resolved role.
        destination: &'static str,
    },
    /// Session state is undeterminable; clear it and start over at sign-in.
    ForceSignOut,
    /// A newer navigation started while this one was evaluating.
    Superseded,
}

/// Role-aware navigation gate.
///
/// Holds no session state of its own; the caller passes an immutable
/// [`SessionSnapshot`] per evaluation.
pub struct NavigationGate {
    resolver: RoleResolver,
    generation: AtomicU64,
    resolution_timeout: Duration,
}

impl NavigationGate {
    /// Build a gate with the default role-resolution timeout.
    #[must_use]
    pub fn new(resolver: RoleResolver) -> Self {
        Self::with_timeout(resolver, DEFAULT_RESOLUTION_TIMEOUT)
    }

    /// Build a gate with an explicit role-resolution timeout.
    #[must_use]
    pub fn with_timeout(resolver: RoleResolver, resolution_timeout: Duration) -> Self {
        Self {
            resolver,
            generation: AtomicU64::new(0),
            resolution_timeout,
        }
    }

    /// Evaluate one navigation attempt.
    pub async fn evaluate(
        &self,
        route: RouteDescriptor,
        session: Option<&SessionSnapshot>,
    ) -> NavigationDecision {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if route.access.requires_auth() && session.is_none() {
            return NavigationDecision::RedirectLogin {
                resume: Some(route.path.to_owned()),
            };
        }

        match (route.access, session) {
            (RouteAccess::RequiresAdmin, Some(session)) => {
                let resolved = self.resolve_role(session).await;
                if self.superseded(generation) {
                    return NavigationDecision::Superseded;
                }
                match resolved {
                    Ok(Role::Admin) => NavigationDecision::Allowed,
                    Ok(Role::User) => {
                        warn!(uid = %session.uid, route = route.name, "admin route denied");
                        NavigationDecision::RedirectHome
                    }
                    Err(err) => {
                        // Fail closed: an unknown role never opens an admin page.
                        warn!(uid = %session.uid, route = route.name, error = %err,
                            "role resolution failed; denying admin route");
                        NavigationDecision::RedirectHome
                    }
                }
            }
            (RouteAccess::GuestOnly, Some(session)) => {
                let resolved = self.resolve_role(session).await;
                if self.superseded(generation) {
                    return NavigationDecision::Superseded;
                }
                match resolved {
                    Ok(Role::Admin) => NavigationDecision::RedirectByRole {
                        destination: ADMIN_LANDING_ROUTE,
                    },
                    Ok(Role::User) => NavigationDecision::RedirectByRole {
                        destination: HOME_ROUTE,
                    },
                    Err(err) => {
                        // A session whose role cannot be determined is half-known;
                        // clear it rather than guessing a landing page.
                        warn!(uid = %session.uid, error = %err,
                            "role resolution failed on guest-only route; forcing sign-out");
                        NavigationDecision::ForceSignOut
                    }
                }
            }
            _ => NavigationDecision::Allowed,
        }
    }

    async fn resolve_role(&self, session: &SessionSnapshot) -> Result<Role, RoleResolutionError> {
        let waited_ms = u64::try_from(self.resolution_timeout.as_millis()).unwrap_or(u64::MAX);
        match tokio::time::timeout(
            self.resolution_timeout,
            self.resolver.resolve(session.uid.as_ref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RoleResolutionError::Timeout { waited_ms }),
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) > generation
    }
}
