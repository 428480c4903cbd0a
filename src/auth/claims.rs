use serde::{Deserialize, Serialize};

/// Claims carried by a session token. Everything the access gate needs is
/// in here, so protected requests never touch storage.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subscriber email, the primary identity
    pub email: String,
    #[serde(rename = "stripeCustomerId")]
    pub stripe_customer_id: String,
    /// Whether onboarding is complete. Absent on sessions minted before
    /// the profile status was known (dev login).
    #[serde(
        rename = "hasProfile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub has_profile: Option<bool>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl SessionClaims {
    /// The gate treats a missing claim as "no profile".
    pub fn profile_complete(&self) -> bool {
        self.has_profile == Some(true)
    }
}
