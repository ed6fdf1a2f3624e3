//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting the signed-in identity, taking an
//! immutable snapshot per request, and purging on sign-out. Domain services
//! never see the cookie; they receive a [`SessionSnapshot`].

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{DisplayName, Error, SessionSnapshot, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const DISPLAY_NAME_KEY: &str = "display_name";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated identity in the session cookie.
    pub fn persist_user(
        &self,
        user_id: &UserId,
        display_name: Option<&DisplayName>,
    ) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        if let Some(name) = display_name {
            self.0
                .insert(DISPLAY_NAME_KEY, name.as_ref())
                .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        }
        Ok(())
    }

    /// Remove every session entry; used on sign-out and forced sign-out.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Take an immutable snapshot of the signed-in identity, if any.
    ///
    /// A cookie holding an invalid user id is treated as signed out rather
    /// than an error: tampered cookies must not grant a session.
    pub fn snapshot(&self) -> Result<Option<SessionSnapshot>, Error> {
        let raw_id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw_id) = raw_id else {
            return Ok(None);
        };
        let uid = match UserId::new(raw_id) {
            Ok(uid) => uid,
            Err(error) => {
                tracing::warn!("invalid user id in session cookie: {error}");
                return Ok(None);
            }
        };

        let display_name = self
            .0
            .get::<String>(DISPLAY_NAME_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
            .and_then(|raw| DisplayName::new(raw).ok());

        Ok(Some(SessionSnapshot::new(uid, display_name)))
    }

    /// Require a signed-in identity or return `401 Unauthorized`.
    pub fn require_snapshot(&self) -> Result<SessionSnapshot, Error> {
        self.snapshot()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a signed-in user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        Ok(self.require_snapshot()?.uid)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
