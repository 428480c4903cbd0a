//! Decoding webhook payloads into the closed set of events the subscriber
//! store reacts to. Everything else becomes `Unknown` and is acknowledged
//! without touching state.

use serde_json::Value;

use crate::domain::SubscriptionStatus;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// One webhook delivery, decoded down to the fields the dispatcher needs.
#[derive(Debug)]
pub struct WebhookEvent {
    /// Provider event id, kept for log correlation.
    pub id: Option<String>,
    /// Raw event type string.
    pub kind: String,
    pub action: BillingEvent,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BillingEvent {
    /// A completed checkout; fields are optional because the provider omits
    /// them in some payment flows, and the dispatcher requires all three.
    CheckoutCompleted {
        email: Option<String>,
        customer_id: Option<String>,
        subscription_id: Option<String>,
    },
    SubscriptionUpdated {
        subscription_id: Option<String>,
        status: SubscriptionStatus,
    },
    SubscriptionDeleted {
        subscription_id: Option<String>,
    },
    PaymentFailed {
        customer_id: Option<String>,
    },
    Unknown,
}

/// Decode a verified delivery. Only a body that is not JSON at all fails;
/// missing fields surface as `None` for the dispatcher to judge.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, AppError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|_| AppError::bad_request(ErrorCode::BadRequest, "Invalid payload"))?;

    let id = string_at(&value, &["id"]);
    let kind = string_at(&value, &["type"]).unwrap_or_default();

    let action = match kind.as_str() {
        "checkout.session.completed" => BillingEvent::CheckoutCompleted {
            email: string_at(&value, &["data", "object", "customer_email"]).or_else(|| {
                string_at(&value, &["data", "object", "customer_details", "email"])
            }),
            customer_id: string_at(&value, &["data", "object", "customer"]),
            subscription_id: string_at(&value, &["data", "object", "subscription"]),
        },
        "customer.subscription.updated" => BillingEvent::SubscriptionUpdated {
            subscription_id: string_at(&value, &["data", "object", "id"]),
            status: SubscriptionStatus::from_provider(
                string_at(&value, &["data", "object", "status"])
                    .as_deref()
                    .unwrap_or(""),
            ),
        },
        "customer.subscription.deleted" => BillingEvent::SubscriptionDeleted {
            subscription_id: string_at(&value, &["data", "object", "id"]),
        },
        "invoice.payment_failed" => BillingEvent::PaymentFailed {
            customer_id: string_at(&value, &["data", "object", "customer"]),
        },
        _ => BillingEvent::Unknown,
    };

    Ok(WebhookEvent { id, kind, action })
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> WebhookEvent {
        parse_event(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn checkout_completed_mines_email_customer_subscription() {
        let event = parse(json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "customer_email": null,
                "customer_details": {"email": "buyer@example.com"},
                "customer": "cus_1",
                "subscription": "sub_1"
            }}
        }));

        assert_eq!(event.id.as_deref(), Some("evt_1"));
        assert_eq!(event.kind, "checkout.session.completed");
        assert_eq!(
            event.action,
            BillingEvent::CheckoutCompleted {
                email: Some("buyer@example.com".to_string()),
                customer_id: Some("cus_1".to_string()),
                subscription_id: Some("sub_1".to_string()),
            }
        );
    }

    #[test]
    fn checkout_completed_tolerates_missing_fields() {
        let event = parse(json!({
            "type": "checkout.session.completed",
            "data": {"object": {}}
        }));

        assert_eq!(
            event.action,
            BillingEvent::CheckoutCompleted {
                email: None,
                customer_id: None,
                subscription_id: None,
            }
        );
    }

    #[test]
    fn subscription_updated_maps_provider_status() {
        let event = parse(json!({
            "type": "customer.subscription.updated",
            "data": {"object": {"id": "sub_1", "status": "past_due"}}
        }));

        assert_eq!(
            event.action,
            BillingEvent::SubscriptionUpdated {
                subscription_id: Some("sub_1".to_string()),
                status: SubscriptionStatus::PastDue,
            }
        );
    }

    #[test]
    fn subscription_updated_without_status_collapses_to_cancelled() {
        let event = parse(json!({
            "type": "customer.subscription.updated",
            "data": {"object": {"id": "sub_1"}}
        }));

        assert_eq!(
            event.action,
            BillingEvent::SubscriptionUpdated {
                subscription_id: Some("sub_1".to_string()),
                status: SubscriptionStatus::Cancelled,
            }
        );
    }

    #[test]
    fn deleted_and_payment_failed_carry_their_ids() {
        let deleted = parse(json!({
            "type": "customer.subscription.deleted",
            "data": {"object": {"id": "sub_9"}}
        }));
        assert_eq!(
            deleted.action,
            BillingEvent::SubscriptionDeleted {
                subscription_id: Some("sub_9".to_string()),
            }
        );

        let failed = parse(json!({
            "type": "invoice.payment_failed",
            "data": {"object": {"customer": "cus_9"}}
        }));
        assert_eq!(
            failed.action,
            BillingEvent::PaymentFailed {
                customer_id: Some("cus_9".to_string()),
            }
        );
    }

    #[test]
    fn unhandled_types_become_unknown() {
        let event = parse(json!({
            "id": "evt_2",
            "type": "invoice.finalized",
            "data": {"object": {}}
        }));
        assert_eq!(event.kind, "invoice.finalized");
        assert_eq!(event.action, BillingEvent::Unknown);
    }

    #[test]
    fn non_json_body_is_rejected() {
        assert!(parse_event(b"not json").is_err());
    }
}
