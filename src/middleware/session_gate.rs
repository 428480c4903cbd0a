//! Access gate for the subscriber-only pages.
//!
//! API routes answer 401 JSON through the `Session` extractor; pages
//! redirect instead. The gate covers `/tools`, `/dashboard` and
//! `/onboarding` (and their subpaths) and leaves every other path alone.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::cookie::{removal_cookie, SESSION_COOKIE};
use crate::auth::{jwt, SessionClaims};
use crate::error::AppError;
use crate::state::AppState;

const PROTECTED_PATHS: [&str; 3] = ["/tools", "/dashboard", "/onboarding"];

/// What the request presented, after cookie lookup and verification.
pub enum SessionOutcome {
    Missing,
    Invalid,
    Valid(SessionClaims),
}

#[derive(Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Send to the login page; the cookie is cleared only when one was
    /// presented and failed verification.
    RedirectLogin { clear_cookie: bool },
    RedirectOnboarding,
}

fn is_protected(path: &str) -> bool {
    PROTECTED_PATHS.iter().any(|p| {
        path.strip_prefix(p)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// The whole gate policy as a pure function.
///
/// `/onboarding` itself stays reachable for a valid session so a new
/// subscriber can create their profile, and an existing one can edit it.
pub fn decide(path: &str, outcome: SessionOutcome) -> AccessDecision {
    if !is_protected(path) {
        return AccessDecision::Allow;
    }

    match outcome {
        SessionOutcome::Missing => AccessDecision::RedirectLogin { clear_cookie: false },
        SessionOutcome::Invalid => AccessDecision::RedirectLogin { clear_cookie: true },
        SessionOutcome::Valid(claims) => {
            if path != "/onboarding" && !claims.profile_complete() {
                AccessDecision::RedirectOnboarding
            } else {
                AccessDecision::Allow
            }
        }
    }
}

pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = SessionGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateMiddleware { service }))
    }
}

pub struct SessionGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SessionGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();

        let outcome = if is_protected(&path) {
            let Some(state) = req.app_data::<web::Data<AppState>>() else {
                return Box::pin(ready(Err(AppError::internal("AppState not available").into())));
            };
            match req.request().cookie(SESSION_COOKIE) {
                None => SessionOutcome::Missing,
                Some(cookie) => match jwt::verify_session(cookie.value(), &state.security) {
                    Ok(claims) => SessionOutcome::Valid(claims),
                    Err(_) => SessionOutcome::Invalid,
                },
            }
        } else {
            SessionOutcome::Missing
        };

        match decide(&path, outcome) {
            AccessDecision::Allow => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            AccessDecision::RedirectLogin { clear_cookie } => {
                Box::pin(ready(Ok(redirect(req, "/login", clear_cookie))))
            }
            AccessDecision::RedirectOnboarding => {
                Box::pin(ready(Ok(redirect(req, "/onboarding", false))))
            }
        }
    }
}

fn redirect<B>(
    req: ServiceRequest,
    location: &str,
    clear_cookie: bool,
) -> ServiceResponse<EitherBody<B>> {
    let (request, _) = req.into_parts();

    let mut builder = HttpResponse::TemporaryRedirect();
    builder.insert_header((header::LOCATION, location));
    if clear_cookie {
        builder.cookie(removal_cookie());
    }

    ServiceResponse::new(request, builder.finish().map_into_right_body())
}
