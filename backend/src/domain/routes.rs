//! Route descriptors and the static navigation table.
//!
//! Access requirements are a single enum rather than three independent
//! booleans: an admin page implies an authenticated caller, and an
//! authenticated page cannot simultaneously be guest-only. Encoding the
//! requirement as one value makes those contradictions unrepresentable.

use serde::Serialize;
use utoipa::ToSchema;

/// Path of the standard signed-in landing page.
pub const HOME_ROUTE: &str = "/";
/// Path of the sign-in page.
pub const LOGIN_ROUTE: &str = "/login";
/// Path of the administrative landing page.
pub const ADMIN_LANDING_ROUTE: &str = "/admin/dashboard";

/// Access requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteAccess {
    /// Reachable by anyone.
    Public,
    /// Requires a signed-in session.
    RequiresAuth,
    /// Requires a signed-in session holding the admin role.
    RequiresAdmin,
    /// Only sensible for signed-out visitors (sign-in, sign-up).
    GuestOnly,
}

impl RouteAccess {
    /// Whether the route needs a signed-in session at all.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::RequiresAuth | Self::RequiresAdmin)
    }
}

/// Static description of a navigable route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Absolute path as the client navigates to it.
    pub path: &'static str,
    /// Stable route name used in logs.
    pub name: &'static str,
    /// Access requirement evaluated by the navigation gate.
    pub access: RouteAccess,
}

/// The application's navigation table.
///
/// Mirrors the client routes: public browsing pages, payment and history
/// pages behind sign-in, the guest-only auth pages, and the admin review
/// area.
const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: HOME_ROUTE,
        name: "home",
        access: RouteAccess::Public,
    },
    RouteDescriptor {
        path: "/categories",
        name: "categories",
        access: RouteAccess::Public,
    },
    RouteDescriptor {
        path: LOGIN_ROUTE,
        name: "login",
        access: RouteAccess::GuestOnly,
    },
    RouteDescriptor {
        path: "/signup",
        name: "signup",
        access: RouteAccess::GuestOnly,
    },
    RouteDescriptor {
        path: "/payment",
        name: "payment",
        access: RouteAccess::RequiresAuth,
    },
    RouteDescriptor {
        path: "/history",
        name: "history",
        access: RouteAccess::RequiresAuth,
    },
    RouteDescriptor {
        path: "/profile",
        name: "profile",
        access: RouteAccess::RequiresAuth,
    },
    RouteDescriptor {
        path: "/rewards",
        name: "rewards",
        access: RouteAccess::RequiresAuth,
    },
    RouteDescriptor {
        path: ADMIN_LANDING_ROUTE,
        name: "admin-dashboard",
        access: RouteAccess::RequiresAdmin,
    },
    RouteDescriptor {
        path: "/admin/reports",
        name: "admin-reports",
        access: RouteAccess::RequiresAdmin,
    },
];

/// Lookup over the static route table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRegistry;

impl RouteRegistry {
    /// Resolve a navigated path to its descriptor.
    ///
    /// The query string and a trailing slash are ignored. Unknown paths are
    /// treated as public: the gate only enforces requirements a route has
    /// declared.
    ///
    /// # Examples
    /// ```
    /// use amanah_backend::domain::{RouteAccess, RouteRegistry};
    ///
    /// let route = RouteRegistry.resolve("/admin/dashboard?tab=reports");
    /// assert_eq!(route.access, RouteAccess::RequiresAdmin);
    /// ```
    #[must_use]
    pub fn resolve(&self, path: &str) -> RouteDescriptor {
        let normalized = Self::normalize(path);
        ROUTES
            .iter()
            .find(|route| route.path == normalized)
            .copied()
            .unwrap_or(RouteDescriptor {
                path: HOME_ROUTE,
                name: "unknown",
                access: RouteAccess::Public,
            })
    }

    fn normalize(path: &str) -> &str {
        let without_query = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = without_query.trim_end_matches('/');
        if trimmed.is_empty() {
            HOME_ROUTE
        } else {
            trimmed
        }
    }
}
