//! Single-use login tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::storage::Kv;
use crate::util::unix_ms;

/// How long a login link stays valid.
pub const TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Residual lifetime of a redeemed record, so a near-simultaneous retry
/// sees "already used" instead of "invalid". Duplicate-click courtesy,
/// not a security boundary; the `used` flag is the replay defence.
const USED_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize, Deserialize)]
struct MagicLinkRecord {
    email: String,
    /// Unix milliseconds.
    expires_at: i64,
    used: bool,
}

fn token_key(token: &str) -> String {
    format!("magiclink:{token}")
}

fn email_key(email: &str) -> String {
    format!("magiclink:email:{email}")
}

/// Outcome of a redeem attempt. Storage failures surface as errors; every
/// condition of the token itself is a value so the caller can map each
/// case to its own redirect code.
#[derive(Debug, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed(String),
    Invalid,
    AlreadyUsed,
    Expired,
}

/// Issue a fresh token for `email`.
///
/// On the file backend the email index drops the previous token first, so
/// requesting a new link invalidates the old one. The durable backend
/// leaves prior tokens to their TTL and keeps only the index current.
pub async fn issue(kv: &Kv, email: &str, now: OffsetDateTime) -> Result<String, AppError> {
    if !kv.is_durable() {
        if let Some(prior) = kv.get_raw(&email_key(email)).await? {
            kv.delete(&token_key(&prior)).await?;
        }
    }

    let token = Uuid::new_v4().to_string();
    let record = MagicLinkRecord {
        email: email.to_string(),
        expires_at: unix_ms(now) + TOKEN_TTL.as_millis() as i64,
        used: false,
    };
    kv.set_json(&token_key(&token), &record, Some(TOKEN_TTL))
        .await?;
    kv.set_raw(&email_key(email), &token, Some(TOKEN_TTL))
        .await?;
    Ok(token)
}

/// Redeem `token`, flipping it to used on success.
///
/// Flag-then-persist, not compare-and-swap: two redeems racing between
/// the read and the write below can both succeed. Accepted narrow race.
pub async fn redeem(kv: &Kv, token: &str, now: OffsetDateTime) -> Result<RedeemOutcome, AppError> {
    let key = token_key(token);
    let Some(mut record) = kv.get_json::<MagicLinkRecord>(&key).await? else {
        return Ok(RedeemOutcome::Invalid);
    };

    if record.used {
        return Ok(RedeemOutcome::AlreadyUsed);
    }

    if record.expires_at < unix_ms(now) {
        kv.delete(&key).await?;
        return Ok(RedeemOutcome::Expired);
    }

    record.used = true;
    kv.set_json(&key, &record, Some(USED_TTL)).await?;

    Ok(RedeemOutcome::Redeemed(record.email))
}
