//! Passwordless authentication: magic-link tokens, signed sessions and
//! the cookie that carries them.

pub mod claims;
pub mod cookie;
pub mod jwt;
pub mod magic_link;

pub use claims::SessionClaims;
pub use magic_link::RedeemOutcome;
