//! Webhook signature verification.
//!
//! The provider signs each delivery with a `stripe-signature` header of the
//! form `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. The digest is
//! HMAC-SHA256 over `"{t}.{raw body}"` with the endpoint secret.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed delivery before it is rejected as a replay.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,
    #[error("timestamp outside tolerance")]
    StaleTimestamp,
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a delivery against the endpoint secret.
///
/// Any `v1` candidate matching the expected digest passes; multiple
/// candidates appear while the endpoint secret is being rotated.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: SystemTime,
) -> Result<(), SignatureError> {
    let (timestamp, candidates) = parse_header(header)?;

    let now_secs = now
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64);
    if (now_secs - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let timestamp_prefix = timestamp.to_string();
    for candidate in candidates {
        let Ok(digest) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(timestamp_prefix.as_bytes());
        mac.update(b".");
        mac.update(payload);
        // Constant-time comparison.
        if mac.verify_slice(&digest).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

fn parse_header(header: &str) -> Result<(i64, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }
    Ok((timestamp, candidates))
}
