#![allow(dead_code)]

use std::path::Path;
use std::time::SystemTime;

use actix_http::Request;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use toolgate::auth::cookie::session_cookie;
use toolgate::config::{AppConfig, RuntimeEnv};
use toolgate::middleware::request_trace::RequestTrace;
use toolgate::middleware::security_headers::SecurityHeaders;
use toolgate::middleware::session_gate::SessionGate;
use toolgate::middleware::structured_logger::StructuredLogger;
use toolgate::middleware::trace_span::TraceSpan;
use toolgate::routes;
use toolgate::state::app_state::AppState;
use toolgate::state::security_config::SecurityConfig;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// File-backed configuration rooted in a per-test directory.
pub fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_base_url: "https://tools.example.com".to_string(),
        runtime_env: RuntimeEnv::Dev,
        session_secret: TEST_SECRET.to_string(),
        redis_url: None,
        data_dir: root.join("data"),
        registry_path: root.join("registry.json"),
        downloads_dir: root.join("downloads"),
        stripe_secret_key: "sk_test_abc".to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        stripe_price_id: "price_123".to_string(),
        resend_api_key: None,
        email_from: "Toolgate <noreply@toolgate.test>".to_string(),
    }
}

/// Two-entry registry fixture, shaped like the generated file.
pub fn write_registry(root: &Path) {
    let registry = r#"[
  {
    "name": "Tie-Out Helper",
    "slug": "tie-out-helper",
    "description": "Automates workpaper tie-outs.",
    "category": "Audit",
    "type": "Excel Add-in",
    "tags": ["excel", "audit"],
    "instructions": "Unzip and run the installer.",
    "dateAdded": "2025-01-15",
    "version": "1.2.0",
    "files": ["tie-out-helper.zip"]
  },
  {
    "name": "Depreciation Calculator",
    "slug": "depreciation-calc",
    "description": "MACRS and straight-line schedules.",
    "category": "Tax",
    "type": "Spreadsheet",
    "instructions": "Open the workbook and enable macros.",
    "dateAdded": "2025-02-02",
    "version": "0.9.1",
    "files": ["depreciation-calc.zip"]
  }
]"#;
    std::fs::write(root.join("registry.json"), registry).expect("write registry fixture");
}

/// Build the full application state on the file backend, with the
/// registry fixture in place.
pub async fn build_test_state(root: &Path) -> AppState {
    write_registry(root);
    AppState::from_config(test_config(root))
        .await
        .expect("build test state")
}

/// Builder for test service instances running the production middleware
/// stack and routes.
pub struct TestAppBuilder {
    state: AppState,
}

impl TestAppBuilder {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn build(
        self,
    ) -> impl Service<Request, Response = ServiceResponse<EitherBody<BoxBody>>, Error = Error> {
        let data = web::Data::new(self.state);
        test::init_service(
            App::new()
                .wrap(SessionGate)
                .wrap(SecurityHeaders)
                .wrap(StructuredLogger)
                .wrap(TraceSpan)
                .wrap(RequestTrace)
                .app_data(data)
                .configure(routes::configure),
        )
        .await
    }
}

pub fn create_test_app(state: AppState) -> TestAppBuilder {
    TestAppBuilder::new(state)
}

/// Mint a session cookie the way the verify endpoint does.
pub fn session_for(
    security: &SecurityConfig,
    email: &str,
    has_profile: Option<bool>,
) -> Cookie<'static> {
    let token = toolgate::mint_session(email, "cus_test_1", has_profile, SystemTime::now(), security)
        .expect("mint session");
    session_cookie(token, false)
}

/// Provider-style signature header over `payload` at `timestamp`.
pub fn stripe_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={digest}")
}

/// Unix seconds for "now", for signing webhook payloads.
pub fn now_secs() -> i64 {
    use std::time::UNIX_EPOCH;
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}
