//! Logging support: PII redaction and security event helpers.

pub mod pii;
pub mod security;
