//! One-time logging setup for tests.
//!
//! Level comes from `TEST_LOG`, then `RUST_LOG`, then defaults to `warn`.
//! Safe to call from every test; only the first call installs a
//! subscriber, and `try_init` tolerates one installed elsewhere.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
