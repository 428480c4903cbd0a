use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::SessionClaims;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Session lifetime: 30 days. The cookie max-age matches.
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Mint a signed session token.
pub fn mint_session(
    email: &str,
    stripe_customer_id: &str,
    has_profile: Option<bool>,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time".to_string()))?
        .as_secs() as i64;
    let exp = iat + SESSION_TTL_SECS;

    let claims = SessionClaims {
        email: email.to_string(),
        stripe_customer_id: stripe_customer_id.to_string(),
        has_profile,
        iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
}

/// Verify a session token and return its claims.
///
/// Every failure collapses to the same `Unauthenticated` outcome: a caller
/// cannot tell an expired token from a tampered or malformed one. The
/// reason is logged at debug for operators.
pub fn verify_session(token: &str, security: &SecurityConfig) -> Result<SessionClaims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let validation = Validation::new(security.algorithm);

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(reason = %e, "session token rejected");
        AppError::unauthenticated()
    })
}
