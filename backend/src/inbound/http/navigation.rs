//! Navigation decision endpoint.
//!
//! ```text
//! GET /api/v1/navigation/decision?path=/admin/dashboard
//! ```
//!
//! The client asks before rendering a route; the gate answers with allow or
//! a redirect target. A forced sign-out purges the session here, in the
//! adapter, so the domain gate stays side-effect free.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{NavigationDecision, LOGIN_ROUTE};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters for the decision endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DecisionQuery {
    /// Path the client intends to navigate to.
    pub path: String,
}

/// Wire form of a navigation decision.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    /// Decision tag: `allowed`, `redirect`, or `superseded`.
    pub decision: String,
    /// Redirect target, absent when allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Destination to resume after sign-in, when redirected to login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
}

impl DecisionResponse {
    fn allowed() -> Self {
        Self {
            decision: "allowed".to_owned(),
            redirect: None,
            resume: None,
        }
    }

    fn redirect(target: impl Into<String>, resume: Option<String>) -> Self {
        Self {
            decision: "redirect".to_owned(),
            redirect: Some(target.into()),
            resume,
        }
    }

    fn superseded() -> Self {
        Self {
            decision: "superseded".to_owned(),
            redirect: None,
            resume: None,
        }
    }
}

/// Evaluate a navigation intent against the caller's session.
#[utoipa::path(
    get,
    path = "/api/v1/navigation/decision",
    params(DecisionQuery),
    responses(
        (status = 200, description = "Navigation decision", body = DecisionResponse),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["navigation"],
    operation_id = "navigationDecision",
    security([])
)]
#[get("/navigation/decision")]
pub async fn decision(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DecisionQuery>,
) -> ApiResult<web::Json<DecisionResponse>> {
    let snapshot = session.snapshot()?;
    let route = state.routes.resolve(&query.path);
    let decision = state.gate.evaluate(route, snapshot.as_ref()).await;

    let response = match decision {
        NavigationDecision::Allowed => DecisionResponse::allowed(),
        NavigationDecision::RedirectLogin { resume } => {
            DecisionResponse::redirect(LOGIN_ROUTE, resume)
        }
        NavigationDecision::RedirectHome => {
            DecisionResponse::redirect(crate::domain::HOME_ROUTE, None)
        }
        NavigationDecision::RedirectByRole { destination } => {
            DecisionResponse::redirect(destination, None)
        }
        NavigationDecision::ForceSignOut => {
            session.purge();
            DecisionResponse::redirect(LOGIN_ROUTE, None)
        }
        NavigationDecision::Superseded => DecisionResponse::superseded(),
    };
    Ok(web::Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureUserDirectory, MockUserDirectory, UserProfile};
    use crate::domain::UserId;
    use crate::inbound::http::session::USER_ID_KEY;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App, HttpResponse};
    use std::sync::Arc;

    async fn anonymous_decision_for(ports: HttpStatePorts, path: &str) -> DecisionResponse {
        let state = web::Data::new(HttpState::new(ports));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(decision),
        )
        .await;

        let uri = format!("/navigation/decision?path={path}");
        let request = actix_test::TestRequest::get().uri(&uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        actix_test::read_body_json(response).await
    }

    async fn signed_in_decision_for(
        ports: HttpStatePorts,
        path: &str,
        uid: &str,
    ) -> DecisionResponse {
        let state = web::Data::new(HttpState::new(ports));
        let uid = uid.to_owned();
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(decision)
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
            .expect("session cookie");

        let uri = format!("/navigation/decision?path={path}");
        let request = actix_test::TestRequest::get()
            .uri(&uri)
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        actix_test::read_body_json(response).await
    }

    fn admin_directory(uid: &str) -> FixtureUserDirectory {
        FixtureUserDirectory::default().with_profile(
            &UserId::new(uid).expect("fixture uid"),
            UserProfile {
                role: Some("admin".to_owned()),
                ..UserProfile::default()
            },
        )
    }

    #[actix_web::test]
    async fn anonymous_admin_navigation_redirects_to_login_with_resume() {
        let response =
            anonymous_decision_for(HttpStatePorts::default(), "/admin/dashboard").await;
        assert_eq!(response.decision, "redirect");
        assert_eq!(response.redirect.as_deref(), Some("/login"));
        assert_eq!(response.resume.as_deref(), Some("/admin/dashboard"));
    }

    #[actix_web::test]
    async fn public_navigation_is_allowed() {
        let response = anonymous_decision_for(HttpStatePorts::default(), "/categories").await;
        assert_eq!(response, DecisionResponse::allowed());
    }

    #[actix_web::test]
    async fn admin_user_reaches_admin_dashboard() {
        let ports = HttpStatePorts {
            directory: Arc::new(admin_directory("boss")),
            ..HttpStatePorts::default()
        };
        let response = signed_in_decision_for(ports, "/admin/dashboard", "boss").await;
        assert_eq!(response, DecisionResponse::allowed());
    }

    #[actix_web::test]
    async fn ordinary_user_is_sent_home_from_admin_routes() {
        let response =
            signed_in_decision_for(HttpStatePorts::default(), "/admin/dashboard", "plain").await;
        assert_eq!(response.decision, "redirect");
        assert_eq!(response.redirect.as_deref(), Some("/"));
    }

    #[actix_web::test]
    async fn signed_in_admin_visiting_login_lands_on_admin_dashboard() {
        let ports = HttpStatePorts {
            directory: Arc::new(admin_directory("boss")),
            ..HttpStatePorts::default()
        };
        let response = signed_in_decision_for(ports, "/login", "boss").await;
        assert_eq!(response.decision, "redirect");
        assert_eq!(response.redirect.as_deref(), Some("/admin/dashboard"));
    }

    #[actix_web::test]
    async fn directory_outage_on_guest_route_forces_sign_out() {
        let mut directory = MockUserDirectory::new();
        directory.expect_fetch_profile().returning(|_| {
            Err(crate::domain::ports::DirectoryError::transport("down"))
        });
        let ports = HttpStatePorts {
            directory: Arc::new(directory),
            ..HttpStatePorts::default()
        };
        let response = signed_in_decision_for(ports, "/login", "anyone").await;
        assert_eq!(response.decision, "redirect");
        assert_eq!(response.redirect.as_deref(), Some("/login"));
        assert_eq!(response.resume, None);
    }
}
