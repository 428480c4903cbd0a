//! Error codes for the Toolgate API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Toolgate API.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in `application/problem+json` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No valid session credential was presented
    Unauthenticated,
    /// Session is valid but the subscription is not active
    SubscriptionRequired,

    // Rate limiting
    /// Sliding-window limit exceeded for this identity
    RateLimited,

    // Magic-link token redemption
    /// Token not recognized
    InvalidToken,
    /// Token was already redeemed
    TokenAlreadyUsed,
    /// Token past its expiry
    TokenExpired,

    // Request Validation
    /// Invalid email address
    InvalidEmail,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Billing
    /// Webhook signature missing or failed verification
    SignatureInvalid,
    /// Billing or email provider call failed
    UpstreamFailure,

    // Resource Not Found
    /// Tool slug not in the registry
    ToolNotFound,
    /// Tool archive missing on disk
    FileNotFound,
    /// General not found error
    NotFound,

    // System Errors
    /// Storage backend error
    StorageError,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Authentication & Authorization
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::SubscriptionRequired => "SUBSCRIPTION_REQUIRED",

            // Rate limiting
            Self::RateLimited => "RATE_LIMITED",

            // Magic-link token redemption
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            Self::TokenExpired => "TOKEN_EXPIRED",

            // Request Validation
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            // Billing
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",

            // Resource Not Found
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // System Errors
            Self::StorageError => "STORAGE_ERROR",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
