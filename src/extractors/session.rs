use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::auth::cookie::SESSION_COOKIE;
use crate::auth::{jwt, SessionClaims};
use crate::error::AppError;
use crate::state::AppState;

/// Verified session claims for API handlers.
///
/// Absent or unverifiable cookies fail with 401. Page requests never use
/// this extractor; the access gate redirects them instead.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

impl Deref for Session {
    type Target = SessionClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available"))?;

            let cookie = req
                .cookie(SESSION_COOKIE)
                .ok_or_else(AppError::unauthenticated)?;

            let claims = jwt::verify_session(cookie.value(), &state.security)?;
            Ok(Session(claims))
        })
    }
}
