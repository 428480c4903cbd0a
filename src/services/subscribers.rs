//! Subscriber records keyed by email, with pointer keys from the billing
//! customer and subscription ids back to the email. `save` rewrites all
//! three keys so the indexes stay consistent.

use time::OffsetDateTime;

use crate::domain::{Subscriber, SubscriptionStatus};
use crate::error::AppError;
use crate::storage::Kv;

fn email_key(email: &str) -> String {
    format!("subscriber:email:{email}")
}

fn customer_key(customer_id: &str) -> String {
    format!("subscriber:customer:{customer_id}")
}

fn subscription_key(subscription_id: &str) -> String {
    format!("subscriber:sub:{subscription_id}")
}

pub async fn get(kv: &Kv, email: &str) -> Result<Option<Subscriber>, AppError> {
    kv.get_json(&email_key(email)).await
}

async fn save(kv: &Kv, subscriber: &Subscriber) -> Result<(), AppError> {
    kv.set_json(&email_key(&subscriber.email), subscriber, None)
        .await?;
    kv.set_raw(
        &customer_key(&subscriber.stripe_customer_id),
        &subscriber.email,
        None,
    )
    .await?;
    kv.set_raw(
        &subscription_key(&subscriber.stripe_subscription_id),
        &subscriber.email,
        None,
    )
    .await
}

/// A pointer without a record is stale and behaves as not-found.
pub async fn get_by_customer(kv: &Kv, customer_id: &str) -> Result<Option<Subscriber>, AppError> {
    let Some(email) = kv.get_raw(&customer_key(customer_id)).await? else {
        return Ok(None);
    };
    get(kv, &email).await
}

pub async fn get_by_subscription(
    kv: &Kv,
    subscription_id: &str,
) -> Result<Option<Subscriber>, AppError> {
    let Some(email) = kv.get_raw(&subscription_key(subscription_id)).await? else {
        return Ok(None);
    };
    get(kv, &email).await
}

/// Create a subscriber on first checkout, or flip an existing record back
/// to `active` with fresh billing ids. Idempotent by email: replaying the
/// same checkout event leaves exactly one record.
pub async fn upsert(
    kv: &Kv,
    email: &str,
    customer_id: &str,
    subscription_id: &str,
    now: OffsetDateTime,
) -> Result<Subscriber, AppError> {
    let subscriber = match get(kv, email).await? {
        Some(mut existing) => {
            existing.stripe_customer_id = customer_id.to_string();
            existing.stripe_subscription_id = subscription_id.to_string();
            existing.status = SubscriptionStatus::Active;
            existing.updated_at = now;
            existing
        }
        None => Subscriber {
            email: email.to_string(),
            stripe_customer_id: customer_id.to_string(),
            stripe_subscription_id: subscription_id.to_string(),
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        },
    };
    save(kv, &subscriber).await?;
    Ok(subscriber)
}

async fn set_status(
    kv: &Kv,
    mut subscriber: Subscriber,
    status: SubscriptionStatus,
    now: OffsetDateTime,
) -> Result<Subscriber, AppError> {
    subscriber.status = status;
    subscriber.updated_at = now;
    save(kv, &subscriber).await?;
    Ok(subscriber)
}

/// Unconditional status overwrite, including onto `cancelled`. Returns
/// `None` when no record matches the subscription id; the caller logs and
/// drops the event rather than creating a phantom record.
pub async fn set_status_by_subscription(
    kv: &Kv,
    subscription_id: &str,
    status: SubscriptionStatus,
    now: OffsetDateTime,
) -> Result<Option<Subscriber>, AppError> {
    match get_by_subscription(kv, subscription_id).await? {
        Some(subscriber) => Ok(Some(set_status(kv, subscriber, status, now).await?)),
        None => Ok(None),
    }
}

pub async fn set_status_by_customer(
    kv: &Kv,
    customer_id: &str,
    status: SubscriptionStatus,
    now: OffsetDateTime,
) -> Result<Option<Subscriber>, AppError> {
    match get_by_customer(kv, customer_id).await? {
        Some(subscriber) => Ok(Some(set_status(kv, subscriber, status, now).await?)),
        None => Ok(None),
    }
}

/// Access check used by login, verification and downloads.
pub async fn is_active(kv: &Kv, email: &str) -> Result<bool, AppError> {
    Ok(get(kv, email).await?.is_some_and(|s| s.is_active()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use tempfile::tempdir;
    use time::OffsetDateTime;

    use super::*;
    use crate::storage::{FileStore, Kv};

    fn kv(dir: &Path) -> Kv {
        Kv::new(Arc::new(FileStore::open(dir).unwrap()))
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[tokio::test]
    async fn upsert_creates_and_all_lookups_resolve() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());

        upsert(&kv, "a@b.test", "cus_1", "sub_1", now()).await.unwrap();

        let by_email = get(&kv, "a@b.test").await.unwrap().unwrap();
        let by_customer = get_by_customer(&kv, "cus_1").await.unwrap().unwrap();
        let by_subscription = get_by_subscription(&kv, "sub_1").await.unwrap().unwrap();

        assert_eq!(by_email.status, SubscriptionStatus::Active);
        assert_eq!(by_customer.email, "a@b.test");
        assert_eq!(by_subscription.email, "a@b.test");
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_email() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());
        let t0 = now();

        let first = upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();
        let second = upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(get(&kv, "a@b.test").await.unwrap().unwrap().email, "a@b.test");
    }

    #[tokio::test]
    async fn upsert_reactivates_and_refreshes_ids() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());
        let t0 = now();

        upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();
        set_status_by_subscription(&kv, "sub_1", SubscriptionStatus::Cancelled, t0)
            .await
            .unwrap();

        let reborn = upsert(&kv, "a@b.test", "cus_2", "sub_2", t0).await.unwrap();
        assert_eq!(reborn.status, SubscriptionStatus::Active);
        assert_eq!(reborn.stripe_customer_id, "cus_2");
        assert_eq!(reborn.created_at, t0);

        // The new subscription id resolves; the record keeps one identity.
        let by_new = get_by_subscription(&kv, "sub_2").await.unwrap().unwrap();
        assert_eq!(by_new.email, "a@b.test");
    }

    #[tokio::test]
    async fn status_updates_by_subscription_and_customer() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());
        let t0 = now();

        upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();

        let updated = set_status_by_subscription(&kv, "sub_1", SubscriptionStatus::PastDue, t0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SubscriptionStatus::PastDue);

        let updated = set_status_by_customer(&kv, "cus_1", SubscriptionStatus::Cancelled, t0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn payment_failure_overwrites_even_a_cancelled_record() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());
        let t0 = now();

        upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();
        set_status_by_subscription(&kv, "sub_1", SubscriptionStatus::Cancelled, t0)
            .await
            .unwrap();

        let overwritten = set_status_by_customer(&kv, "cus_1", SubscriptionStatus::PastDue, t0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(overwritten.status, SubscriptionStatus::PastDue);
    }

    #[tokio::test]
    async fn updates_for_unknown_ids_return_none() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());

        let by_sub = set_status_by_subscription(&kv, "sub_nope", SubscriptionStatus::Active, now())
            .await
            .unwrap();
        let by_cus = set_status_by_customer(&kv, "cus_nope", SubscriptionStatus::Active, now())
            .await
            .unwrap();

        assert!(by_sub.is_none());
        assert!(by_cus.is_none());
        // No phantom record was created.
        assert!(get_by_subscription(&kv, "sub_nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn is_active_follows_status() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());
        let t0 = now();

        assert!(!is_active(&kv, "a@b.test").await.unwrap());

        upsert(&kv, "a@b.test", "cus_1", "sub_1", t0).await.unwrap();
        assert!(is_active(&kv, "a@b.test").await.unwrap());

        set_status_by_subscription(&kv, "sub_1", SubscriptionStatus::PastDue, t0)
            .await
            .unwrap();
        assert!(!is_active(&kv, "a@b.test").await.unwrap());
    }

    #[tokio::test]
    async fn stale_pointer_behaves_as_not_found() {
        let dir = tempdir().unwrap();
        let kv = kv(dir.path());

        // A pointer left behind without its record.
        kv.set_raw("subscriber:customer:cus_ghost", "ghost@b.test", None)
            .await
            .unwrap();

        assert!(get_by_customer(&kv, "cus_ghost").await.unwrap().is_none());
    }
}
