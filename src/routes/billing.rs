use std::time::SystemTime;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::billing::{parse_event, verify_signature, BillingEvent, WebhookEvent};
use crate::domain::SubscriptionStatus;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::Session;
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::services::subscribers;
use crate::state::AppState;
use crate::storage::Kv;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct UrlResponse {
    url: String,
}

/// Start a checkout session. Public: the buyer has no account yet. A
/// malformed or absent body simply means no prefilled email.
async fn checkout(
    body: Option<web::Json<CheckoutRequest>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = body.and_then(|b| b.into_inner().email);
    let url = app_state
        .billing
        .create_checkout_session(email.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(UrlResponse { url }))
}

/// Billing portal for the signed-in subscriber's customer record.
async fn portal(
    session: Session,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let url = app_state
        .billing
        .create_portal_session(&session.stripe_customer_id)
        .await?;
    Ok(HttpResponse::Ok().json(UrlResponse { url }))
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    received: bool,
}

/// Billing provider webhook. The signature covers the raw bytes, so the
/// body must not pass through a JSON extractor first.
async fn webhook(
    req: HttpRequest,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request(ErrorCode::SignatureInvalid, "Missing signature"))?;

    verify_signature(
        &body,
        signature,
        &app_state.config.stripe_webhook_secret,
        SystemTime::now(),
    )
    .map_err(|e| {
        security::webhook_rejected(&e.to_string());
        AppError::signature_invalid()
    })?;

    let event = parse_event(&body)?;
    info!(
        kind = %event.kind,
        id = event.id.as_deref().unwrap_or("-"),
        "webhook received"
    );

    apply(&app_state.kv, event).await?;
    Ok(HttpResponse::Ok().json(WebhookAck { received: true }))
}

/// Fold one verified event into subscriber state. Events that reference
/// nothing we know are logged and acknowledged; only storage failures
/// bubble up, so the provider retries exactly the deliveries that might
/// still take effect.
async fn apply(kv: &Kv, event: WebhookEvent) -> Result<(), AppError> {
    let now = OffsetDateTime::now_utc();
    match event.action {
        BillingEvent::CheckoutCompleted {
            email,
            customer_id,
            subscription_id,
        } => match (email, customer_id, subscription_id) {
            (Some(email), Some(customer_id), Some(subscription_id)) => {
                subscribers::upsert(kv, &email, &customer_id, &subscription_id, now).await?;
                info!(email = %Redacted(&email), "subscriber provisioned from checkout");
            }
            _ => {
                error!(kind = %event.kind, "checkout completed event missing fields");
            }
        },
        BillingEvent::SubscriptionUpdated {
            subscription_id,
            status,
        } => {
            let Some(subscription_id) = subscription_id else {
                warn!(kind = %event.kind, "subscription event carried no id");
                return Ok(());
            };
            let updated =
                subscribers::set_status_by_subscription(kv, &subscription_id, status, now).await?;
            if updated.is_none() {
                warn!(%subscription_id, "no subscriber for subscription");
            }
        }
        BillingEvent::SubscriptionDeleted { subscription_id } => {
            let Some(subscription_id) = subscription_id else {
                warn!(kind = %event.kind, "subscription event carried no id");
                return Ok(());
            };
            let updated = subscribers::set_status_by_subscription(
                kv,
                &subscription_id,
                SubscriptionStatus::Cancelled,
                now,
            )
            .await?;
            if updated.is_none() {
                warn!(%subscription_id, "no subscriber for subscription");
            }
        }
        BillingEvent::PaymentFailed { customer_id } => {
            let Some(customer_id) = customer_id else {
                warn!(kind = %event.kind, "payment event carried no customer");
                return Ok(());
            };
            let updated =
                subscribers::set_status_by_customer(kv, &customer_id, SubscriptionStatus::PastDue, now)
                    .await?;
            if updated.is_none() {
                warn!(%customer_id, "no subscriber for customer");
            }
        }
        BillingEvent::Unknown => {
            info!(kind = %event.kind, "unhandled webhook event");
        }
    }
    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/stripe/checkout").route(web::post().to(checkout)))
        .service(web::resource("/api/stripe/portal").route(web::post().to(portal)))
        .service(web::resource("/api/stripe/webhook").route(web::post().to(webhook)));
}
