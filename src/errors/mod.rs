//! Error handling for the Toolgate backend.

pub mod error_code;

pub use error_code::ErrorCode;
