use jsonwebtoken::Algorithm;

/// Configuration for session-token signing.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret key for signing and verifying session tokens
    pub jwt_secret: Vec<u8>,
    /// Signing algorithm (defaults to HS256)
    pub algorithm: Algorithm,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given signing secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
        }
    }
}
