//! Subscriber records and the subscription status machine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle states a subscription moves through, driven entirely by
/// billing webhooks. Anything the provider sends that we do not track
/// collapses to `Cancelled`, which denies access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    Paused,
}

impl SubscriptionStatus {
    /// Map the billing provider's status string onto our vocabulary.
    /// `active` and `trialing` both count as active; `canceled` and
    /// `unpaid` both mean the subscription is gone.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "active" | "trialing" => Self::Active,
            "past_due" => Self::PastDue,
            "paused" => Self::Paused,
            _ => Self::Cancelled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
            Self::Paused => "paused",
        }
    }
}

/// Canonical subscriber record, stored under the email key with pointer
/// keys from the billing customer and subscription ids back to the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub status: SubscriptionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Subscriber {
    /// Only `active` unlocks the catalog. `past_due` and `paused` keep the
    /// record around so a recovered payment restores access, but they do
    /// not grant it.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
