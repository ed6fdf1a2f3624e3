//! Domain types and services.
//!
//! Purpose: strongly typed entities, the navigation gate, and the payment
//! history services, all free of transport concerns. Inbound adapters map
//! these onto HTTP; outbound adapters implement the ports in
//! [`ports`].

pub mod auth;
pub mod error;
pub mod history;
pub mod navigation;
pub mod payments;
pub mod ports;
pub mod reconcile;
pub mod reports;
pub mod role;
pub mod role_resolver;
pub mod routes;
pub mod session;
pub mod transaction;
pub mod user;

pub use self::auth::{CredentialValidationError, SignInCredentials, PASSWORD_MIN};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::history::{CombinedHistory, CombinedHistoryService, LedgerKind, SourceFailure};
pub use self::navigation::{NavigationDecision, NavigationGate, DEFAULT_RESOLUTION_TIMEOUT};
pub use self::payments::{PaymentError, PaymentRequest, PaymentService};
pub use self::reconcile::reconcile;
pub use self::reports::{
    AsnafReportDraft, AsnafReportForm, AsnafReportRecord, ReportAttachment,
    ReportSubmissionError, ReportSubmissionService, ReportValidationError, SubmittedReport,
};
pub use self::role::Role;
pub use self::role_resolver::{RoleResolutionError, RoleResolver};
pub use self::routes::{
    RouteAccess, RouteDescriptor, RouteRegistry, ADMIN_LANDING_ROUTE, HOME_ROUTE, LOGIN_ROUTE,
};
pub use self::session::SessionSnapshot;
pub use self::transaction::{NewTransaction, RecordTimestamp, TransactionRecord};
pub use self::user::{DisplayName, Email, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use amanah_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
