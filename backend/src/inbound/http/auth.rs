//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/signup {"email":"a@b.example","password":"secret1"}
//! POST /api/v1/login  {"email":"a@b.example","password":"secret1"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```
//!
//! The identity provider vouches for credentials; the cookie session carries
//! the resulting identity. Handlers never render protected data before the
//! session snapshot resolves.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{IdentityProviderError, NewUserProfile};
use crate::domain::{CredentialValidationError, Error, SignInCredentials};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Credentials payload for `POST /api/v1/signup` and `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Full legal name, collected at sign-up only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Identity payload returned by sign-up, sign-in, and `GET /api/v1/me`.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    /// Provider-assigned stable identifier.
    pub uid: String,
    /// Display name, when one is on file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl TryFrom<&CredentialsRequest> for SignInCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: &CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_credential_validation_error(err: &CredentialValidationError) -> Error {
    let field = match err {
        CredentialValidationError::InvalidEmail => "email",
        CredentialValidationError::EmptyPassword
        | CredentialValidationError::PasswordTooShort { .. } => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn map_identity_error(err: IdentityProviderError) -> Error {
    match err {
        IdentityProviderError::InvalidCredentials => Error::unauthorized("invalid credentials"),
        IdentityProviderError::EmailInUse => Error::invalid_request("email address already in use")
            .with_details(json!({ "field": "email", "code": "email_in_use" })),
        IdentityProviderError::WeakPassword { message } => Error::invalid_request(message)
            .with_details(json!({ "field": "password", "code": "weak_password" })),
        IdentityProviderError::Transport { .. } | IdentityProviderError::Decode { .. } => {
            Error::unavailable("authentication service unavailable")
        }
    }
}

/// Create an account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = IdentityResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<IdentityResponse>> {
    let credentials =
        SignInCredentials::try_from(&*payload).map_err(|e| map_credential_validation_error(&e))?;
    let user = state
        .identity
        .sign_up(&credentials)
        .await
        .map_err(map_identity_error)?;

    // Profile creation is best-effort: the account exists either way and the
    // directory document is recreated on first write.
    if let Err(err) = state
        .directory
        .create_profile(
            &user.uid,
            NewUserProfile {
                full_name: payload.full_name.clone(),
                email: Some(credentials.email().to_owned()),
            },
        )
        .await
    {
        tracing::warn!(uid = %user.uid, error = %err, "profile creation failed at sign-up");
    }

    session.persist_user(&user.uid, user.display_name.as_ref())?;
    info!(uid = %user.uid, "account created");
    Ok(web::Json(IdentityResponse {
        uid: user.uid.to_string(),
        display_name: user.display_name.map(|n| n.as_ref().to_owned()),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = IdentityResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<IdentityResponse>> {
    let credentials =
        SignInCredentials::try_from(&*payload).map_err(|e| map_credential_validation_error(&e))?;
    let user = state
        .identity
        .sign_in(&credentials)
        .await
        .map_err(map_identity_error)?;
    session.persist_user(&user.uid, user.display_name.as_ref())?;
    Ok(web::Json(IdentityResponse {
        uid: user.uid.to_string(),
        display_name: user.display_name.map(|n| n.as_ref().to_owned()),
    }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Return the signed-in identity.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Signed-in identity", body = IdentityResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(session: SessionContext) -> ApiResult<web::Json<IdentityResponse>> {
    let snapshot = session.require_snapshot()?;
    Ok(web::Json(IdentityResponse {
        uid: snapshot.uid.to_string(),
        display_name: snapshot.display_name.map(|n| n.as_ref().to_owned()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockIdentityProvider, UserDirectory};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use rstest::rstest;
    use rstest_bdd_macros::{given, then};
    use serde_json::Value;
    use std::sync::Arc;

    fn app_state(ports: HttpStatePorts) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(ports))
    }

    async fn post_json(
        state: web::Data<HttpState>,
        uri: &str,
        body: &CredentialsRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(signup)
                .service(login)
                .service(logout)
                .service(me),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        actix_test::call_service(&app, request).await
    }

    #[given("valid fixture credentials")]
    fn valid_fixture_credentials() -> CredentialsRequest {
        CredentialsRequest {
            email: "admin@amanah.example".to_owned(),
            password: "password".to_owned(),
            full_name: None,
        }
    }

    #[given("a wrong password")]
    fn wrong_password() -> CredentialsRequest {
        CredentialsRequest {
            email: "admin@amanah.example".to_owned(),
            password: "wrong-password".to_owned(),
            full_name: None,
        }
    }

    async fn login_called(body: CredentialsRequest) -> actix_web::dev::ServiceResponse {
        post_json(app_state(HttpStatePorts::default()), "/login", &body).await
    }

    #[then("a session cookie is issued")]
    fn session_cookie_issued(response: &actix_web::dev::ServiceResponse) {
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .response()
                .cookies()
                .any(|cookie| cookie.name() == "session"),
            "session cookie expected"
        );
    }

    #[then("the request is rejected as unauthorised")]
    fn rejected_unauthorised(response: &actix_web::dev::ServiceResponse) {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn login_happy_path() {
        let body = valid_fixture_credentials();
        let response = login_called(body).await;
        session_cookie_issued(&response);
    }

    #[rstest]
    #[tokio::test]
    async fn login_unhappy_path() {
        let body = wrong_password();
        let response = login_called(body).await;
        rejected_unauthorised(&response);
    }

    #[rstest]
    #[case("not-an-email", "secret1", "email")]
    #[case("a@b.example", "", "password")]
    #[case("a@b.example", "short", "password")]
    #[tokio::test]
    async fn login_validation_errors_carry_the_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let response = post_json(
            app_state(HttpStatePorts::default()),
            "/login",
            &CredentialsRequest {
                email: email.to_owned(),
                password: password.to_owned(),
                full_name: None,
            },
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(
            value.get("details").and_then(|d| d.get("field")).and_then(Value::as_str),
            Some(field)
        );
    }

    #[tokio::test]
    async fn provider_outage_maps_to_service_unavailable() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|_| Err(IdentityProviderError::transport("dns failure")));
        let response = post_json(
            app_state(HttpStatePorts {
                identity: Arc::new(identity),
                ..HttpStatePorts::default()
            }),
            "/login",
            &valid_fixture_credentials(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn signup_creates_a_directory_profile() {
        let state = app_state(HttpStatePorts::default());
        let response = post_json(
            state.clone(),
            "/signup",
            &CredentialsRequest {
                email: "nurul@example.com".to_owned(),
                password: "secret1".to_owned(),
                full_name: Some("Nurul Huda".to_owned()),
            },
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: IdentityResponse = actix_test::read_body_json(response).await;

        let uid = crate::domain::UserId::new(&body.uid).expect("uid shape");
        let profile = state
            .directory
            .fetch_profile(&uid)
            .await
            .expect("fetch succeeds")
            .expect("profile written at sign-up");
        assert_eq!(profile.full_name.as_deref(), Some("Nurul Huda"));
    }
}
