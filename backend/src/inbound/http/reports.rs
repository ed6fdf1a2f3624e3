//! Asnaf report handlers.
//!
//! ```text
//! POST /api/v1/asnaf-reports   submit a report (signed-in users)
//! GET  /api/v1/asnaf-reports   list reports (admins only)
//! ```
//!
//! Listing is admin-gated with the same fail-closed semantics as admin
//! navigation: an unresolvable role is denied, never granted.

use actix_web::{get, post, web};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AsnafReportDraft, AsnafReportForm, AsnafReportRecord, Error, ReportAttachment,
    ReportSubmissionError, Role,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// One attachment in the submission payload, base64-encoded.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    /// Original file name.
    pub file_name: String,
    /// MIME type of the file.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Base64-encoded file bytes.
    pub content_base64: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_owned()
}

/// Report payload for `POST /api/v1/asnaf-reports`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    /// Name of the nominated recipient.
    pub name: String,
    /// Street address of the nominated recipient.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Why this person qualifies for aid.
    pub description: String,
    /// Area or coordinates of the household.
    pub location: String,
    /// Points claimed for this report.
    #[serde(default)]
    pub reward_points: u32,
    /// Photo evidence.
    #[serde(default)]
    pub attachments: Vec<AttachmentBody>,
}

/// Response for a submitted report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReportResponse {
    /// Store-assigned report id.
    pub id: String,
    /// Points credited to the reporter.
    pub points_awarded: u32,
}

fn decode_attachments(bodies: Vec<AttachmentBody>) -> Result<Vec<ReportAttachment>, Error> {
    bodies
        .into_iter()
        .map(|body| {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(body.content_base64.as_bytes())
                .map_err(|_| {
                    Error::invalid_request(format!(
                        "attachment '{}' is not valid base64",
                        body.file_name
                    ))
                    .with_details(json!({ "field": "attachments" }))
                })?;
            Ok(ReportAttachment {
                file_name: body.file_name,
                content_type: body.content_type,
                bytes,
            })
        })
        .collect()
}

fn map_submission_error(err: ReportSubmissionError) -> Error {
    tracing::error!(error = %err, "report submission failed");
    Error::unavailable("report could not be submitted")
}

/// Submit an asnaf report.
#[utoipa::path(
    post,
    path = "/api/v1/asnaf-reports",
    request_body = ReportBody,
    responses(
        (status = 200, description = "Report submitted", body = SubmittedReportResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "submitAsnafReport"
)]
#[post("/asnaf-reports")]
pub async fn submit_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReportBody>,
) -> ApiResult<web::Json<SubmittedReportResponse>> {
    let snapshot = session.require_snapshot()?;
    let body = payload.into_inner();
    let attachments = decode_attachments(body.attachments)?;

    let form = AsnafReportForm::try_from_draft(AsnafReportDraft {
        name: body.name,
        address: body.address,
        phone_number: body.phone_number,
        description: body.description,
        location: body.location,
        reward_points: body.reward_points,
        attachments,
    })
    .map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
    })?;

    let submitted = state
        .report_submission
        .submit(&snapshot.uid, form)
        .await
        .map_err(map_submission_error)?;
    Ok(web::Json(SubmittedReportResponse {
        id: submitted.id,
        points_awarded: submitted.points_awarded,
    }))
}

/// List submitted reports for review. Admins only.
#[utoipa::path(
    get,
    path = "/api/v1/asnaf-reports",
    responses(
        (status = 200, description = "Reports, newest first", body = [AsnafReportRecord]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listAsnafReports"
)]
#[get("/asnaf-reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AsnafReportRecord>>> {
    let snapshot = session.require_snapshot()?;

    // Fail closed: a failed role lookup reads as "not admin".
    let role = state
        .resolver
        .resolve(snapshot.uid.as_ref())
        .await
        .unwrap_or(Role::User);
    if !role.is_admin() {
        tracing::warn!(uid = %snapshot.uid, "report listing denied");
        return Err(Error::forbidden("admin role required"));
    }

    let reports = state.report_store.list_reports().await.map_err(|err| {
        tracing::error!(error = %err, "report listing failed");
        Error::unavailable("reports could not be loaded")
    })?;
    Ok(web::Json(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureUserDirectory, UserProfile};
    use crate::domain::UserId;
    use crate::inbound::http::session::USER_ID_KEY;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App, HttpResponse};
    use base64::engine::general_purpose::STANDARD;
    use serde_json::Value;
    use std::sync::Arc;

    fn report_body() -> ReportBody {
        ReportBody {
            name: "Pak Abu".to_owned(),
            address: "Kampung Baru, Lot 7".to_owned(),
            phone_number: "0123456789".to_owned(),
            description: "Roof damaged by floods".to_owned(),
            location: "Kelantan".to_owned(),
            reward_points: 5,
            attachments: vec![AttachmentBody {
                file_name: "roof.jpg".to_owned(),
                content_type: "image/jpeg".to_owned(),
                content_base64: STANDARD.encode([0xFF, 0xD8, 0xFF]),
            }],
        }
    }

    async fn signed_in_app(
        ports: HttpStatePorts,
        uid: &str,
    ) -> (
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        actix_web::cookie::Cookie<'static>,
    ) {
        let state = web::Data::new(HttpState::new(ports));
        let uid = uid.to_owned();
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(submit_report)
                .service(list_reports)
                .route(
                    "/test-login",
                    web::get().to(move |session: Session| {
                        let uid = uid.clone();
                        async move {
                            session.insert(USER_ID_KEY, uid).expect("set uid");
                            HttpResponse::Ok().finish()
                        }
                    }),
                ),
        )
        .await;

        let login = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/test-login").to_request(),
        )
        .await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();
        (app, cookie)
    }

    fn admin_ports(uid: &str) -> HttpStatePorts {
        HttpStatePorts {
            directory: Arc::new(FixtureUserDirectory::default().with_profile(
                &UserId::new(uid).expect("fixture uid"),
                UserProfile {
                    role: Some("admin".to_owned()),
                    ..UserProfile::default()
                },
            )),
            ..HttpStatePorts::default()
        }
    }

    #[actix_web::test]
    async fn submitted_report_is_listed_for_admins() {
        let (app, cookie) = signed_in_app(admin_ports("boss"), "boss").await;

        let submit = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/asnaf-reports")
                .cookie(cookie.clone())
                .set_json(report_body())
                .to_request(),
        )
        .await;
        assert_eq!(submit.status(), StatusCode::OK);
        let submitted: SubmittedReportResponse = actix_test::read_body_json(submit).await;
        assert_eq!(submitted.points_awarded, 5);

        let list = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/asnaf-reports")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(list.status(), StatusCode::OK);
        let reports: Vec<AsnafReportRecord> = actix_test::read_body_json(list).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, "pending");
        assert_eq!(reports[0].image_urls.len(), 1);
    }

    #[actix_web::test]
    async fn listing_is_forbidden_for_ordinary_users() {
        let (app, cookie) = signed_in_app(HttpStatePorts::default(), "plain").await;

        let list = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/asnaf-reports")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(list.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn validation_failure_names_the_field() {
        let (app, cookie) = signed_in_app(HttpStatePorts::default(), "reporter").await;

        let mut invalid = report_body();
        invalid.phone_number = "123".to_owned();
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/asnaf-reports")
                .cookie(cookie)
                .set_json(invalid)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "phoneNumber");
    }

    #[actix_web::test]
    async fn malformed_base64_is_rejected() {
        let (app, cookie) = signed_in_app(HttpStatePorts::default(), "reporter").await;

        let mut invalid = report_body();
        invalid.attachments[0].content_base64 = "%%not-base64%%".to_owned();
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/asnaf-reports")
                .cookie(cookie)
                .set_json(invalid)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
