//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the shared
//! payload schemas, and the session cookie security scheme. The generated
//! specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Amanah backend API",
        description = "HTTP interface for donation and zakat payment tracking."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::navigation::decision,
        crate::inbound::http::transactions::combined_history,
        crate::inbound::http::transactions::donation_history,
        crate::inbound::http::transactions::record_donation,
        crate::inbound::http::transactions::zakat_history,
        crate::inbound::http::transactions::record_zakat,
        crate::inbound::http::reports::submit_report,
        crate::inbound::http::reports::list_reports,
        crate::inbound::http::wallet::balances,
        crate::inbound::http::wallet::send,
        crate::inbound::http::wallet::transactions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Role,
        crate::domain::TransactionRecord,
        crate::domain::RecordTimestamp,
        crate::domain::CombinedHistory,
        crate::domain::SourceFailure,
        crate::domain::LedgerKind,
        crate::domain::AsnafReportRecord,
        crate::domain::ports::AssetBalance,
        crate::domain::ports::SendRequest,
        crate::domain::ports::SendReceipt,
        crate::domain::ports::ExchangeTransaction,
        crate::inbound::http::auth::CredentialsRequest,
        crate::inbound::http::auth::IdentityResponse,
        crate::inbound::http::navigation::DecisionResponse,
        crate::inbound::http::transactions::PaymentBody,
        crate::inbound::http::transactions::RecordedPayment,
        crate::inbound::http::transactions::LedgerHistory,
        crate::inbound::http::reports::AttachmentBody,
        crate::inbound::http::reports::ReportBody,
        crate::inbound::http::reports::SubmittedReportResponse,
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in, and session operations"),
        (name = "navigation", description = "Role-aware navigation decisions"),
        (name = "transactions", description = "Donation and zakat ledgers"),
        (name = "reports", description = "Asnaf report submission and review"),
        (name = "wallet", description = "Exchange wallet operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
