#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod billing;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod trace_ctx;
pub mod util;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use auth::jwt::{mint_session, verify_session};
pub use auth::SessionClaims;
pub use config::AppConfig;
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{Session, ValidatedJson};
pub use middleware::request_trace::RequestTrace;
pub use middleware::security_headers::SecurityHeaders;
pub use middleware::session_gate::SessionGate;
pub use middleware::structured_logger::StructuredLogger;
pub use middleware::trace_span::TraceSpan;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;
pub use storage::Kv;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
