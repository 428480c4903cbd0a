use std::time::SystemTime;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::cookie::{removal_cookie, session_cookie};
use crate::auth::{jwt, magic_link, RedeemOutcome};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::ValidatedJson;
use crate::logging::security;
use crate::services::{profiles, rate_limit, subscribers};
use crate::state::AppState;

/// The login endpoint never reveals whether an account exists.
const LINK_SENT: &str = "If an account exists, a login link has been sent.";

const DEV_EMAIL: &str = "dev@toolgate.local";
const DEV_CUSTOMER_ID: &str = "cus_dev_local";
const DEV_SUBSCRIPTION_ID: &str = "sub_dev_local";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

/// Request a magic link. Enumeration-safe: unknown and inactive emails get
/// the same message as active ones, and the rate limit counts them all.
async fn login(
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::validation(
            ErrorCode::InvalidEmail,
            "Email is required",
        ));
    }

    let now = OffsetDateTime::now_utc();
    if !rate_limit::allow(&app_state.kv, &rate_limit::LOGIN, &email, now).await? {
        security::rate_limit_hit("/api/auth/login");
        return Err(AppError::rate_limited(
            "Too many login attempts. Please try again later.",
        ));
    }
    rate_limit::record(&app_state.kv, &rate_limit::LOGIN, &email, now).await?;

    let Some(subscriber) = subscribers::get(&app_state.kv, &email).await? else {
        security::login_failed("unknown email", Some(email.as_str()));
        return Ok(HttpResponse::Ok().json(LoginResponse {
            message: LINK_SENT,
            redirect: None,
        }));
    };

    if !subscriber.is_active() {
        security::login_failed("inactive subscription", Some(email.as_str()));
        return Ok(HttpResponse::Ok().json(LoginResponse {
            message: LINK_SENT,
            redirect: Some("/expired"),
        }));
    }

    let token = magic_link::issue(&app_state.kv, &email, now).await?;
    app_state
        .mailer
        .send_magic_link(&email, &token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "magic link email failed");
            AppError::upstream("Failed to send login email. Please try again.")
        })?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: LINK_SENT,
        redirect: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
    pub checkout_session: Option<String>,
}

fn redirect_to(url: String) -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, url))
        .finish()
}

fn login_redirect(base: &str, code: &str) -> HttpResponse {
    redirect_to(format!("{base}/login?error={code}"))
}

/// Redeem a magic link, or complete a checkout-success redirect. Every
/// failure leaves through a redirect with a fixed error code; this
/// endpoint is opened from an email client, not called as an API.
async fn verify(
    query: web::Query<VerifyQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let base = app_state.config.public_base_url.clone();

    if let Some(checkout_session_id) = &query.checkout_session {
        return Ok(checkout_success(checkout_session_id, &app_state)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "checkout success handling failed");
                login_redirect(&base, "checkout_failed")
            }));
    }

    let Some(token) = &query.token else {
        return Ok(login_redirect(&base, "missing_token"));
    };

    let now = OffsetDateTime::now_utc();
    let email = match magic_link::redeem(&app_state.kv, token, now).await? {
        RedeemOutcome::Redeemed(email) => email,
        RedeemOutcome::Invalid => {
            security::login_failed("invalid magic link token", None);
            return Ok(login_redirect(&base, "invalid_token"));
        }
        RedeemOutcome::AlreadyUsed => {
            security::login_failed("magic link token replayed", None);
            return Ok(login_redirect(&base, "token_used"));
        }
        RedeemOutcome::Expired => {
            return Ok(login_redirect(&base, "token_expired"));
        }
    };

    let Some(subscriber) = subscribers::get(&app_state.kv, &email).await? else {
        return Ok(login_redirect(&base, "no_subscription"));
    };

    if !subscriber.is_active() {
        return Ok(redirect_to(format!("{base}/expired")));
    }

    let profile_exists = profiles::exists(&app_state.kv, &email).await?;
    let session_token = jwt::mint_session(
        &subscriber.email,
        &subscriber.stripe_customer_id,
        Some(profile_exists),
        SystemTime::now(),
        &app_state.security,
    )?;

    let target = if profile_exists {
        "/dashboard"
    } else {
        "/onboarding"
    };

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, format!("{base}{target}")))
        .cookie(session_cookie(
            session_token,
            app_state.config.cookie_secure(),
        ))
        .finish())
}

/// The browser lands here from the payment provider before the webhook is
/// guaranteed to have arrived, so the subscriber record is upserted from
/// the checkout session itself.
async fn checkout_success(
    checkout_session_id: &str,
    app_state: &web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let base = &app_state.config.public_base_url;

    let session = app_state
        .billing
        .retrieve_checkout_session(checkout_session_id)
        .await?;

    let (Some(email), Some(customer_id)) = (session.email(), session.customer.as_deref()) else {
        tracing::warn!("checkout session missing email or customer");
        return Ok(login_redirect(base, "checkout_failed"));
    };

    if let Some(subscription_id) = session.subscription.as_deref() {
        subscribers::upsert(
            &app_state.kv,
            email,
            customer_id,
            subscription_id,
            OffsetDateTime::now_utc(),
        )
        .await?;
    }

    // A brand-new subscriber has no profile yet.
    let session_token = jwt::mint_session(
        email,
        customer_id,
        Some(false),
        SystemTime::now(),
        &app_state.security,
    )?;

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, format!("{base}/onboarding")))
        .cookie(session_cookie(
            session_token,
            app_state.config.cookie_secure(),
        ))
        .finish())
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    success: bool,
}

async fn logout() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(LogoutResponse { success: true }))
}

#[derive(Debug, Serialize)]
struct DevLoginResponse {
    message: &'static str,
    email: &'static str,
}

/// Seed a local subscriber and session without going through billing.
/// Answers 404 outside the dev runtime so it cannot leak into production.
async fn dev_login(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if app_state.config.runtime_env.is_prod() {
        return Err(AppError::not_found(ErrorCode::NotFound, "Not available"));
    }

    subscribers::upsert(
        &app_state.kv,
        DEV_EMAIL,
        DEV_CUSTOMER_ID,
        DEV_SUBSCRIPTION_ID,
        OffsetDateTime::now_utc(),
    )
    .await?;

    let token = jwt::mint_session(
        DEV_EMAIL,
        DEV_CUSTOMER_ID,
        None,
        SystemTime::now(),
        &app_state.security,
    )?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, false))
        .json(DevLoginResponse {
            message: "Dev session created",
            email: DEV_EMAIL,
        }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/auth/login").route(web::post().to(login)))
        .service(
            web::resource("/api/auth/verify")
                .route(web::get().to(verify))
                .route(web::post().to(logout)),
        )
        .service(web::resource("/api/auth/dev-login").route(web::post().to(dev_login)));
}
