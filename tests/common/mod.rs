#![allow(dead_code)]

use std::sync::OnceLock;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderName;
use actix_web::test;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceLock<()> = OnceLock::new();

// Logging is auto-installed for every test binary that pulls this module in.
#[ctor::ctor]
fn init_logging() {
    LOGGING.get_or_init(|| {
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

/// Assert an error response is a problem document with the expected
/// status, code and detail, and that the body's trace id matches the
/// `x-trace-id` header.
pub async fn assert_problem_details<B>(
    resp: ServiceResponse<B>,
    expected_status: u16,
    expected_code: &str,
    expected_detail: &str,
) where
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    assert_eq!(resp.status().as_u16(), expected_status);

    let headers = resp.headers().clone();

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .expect("content-type header");
    assert_eq!(content_type, "application/problem+json");

    let trace_hdr = HeaderName::from_static("x-trace-id");
    let header_trace_id = headers
        .get(&trace_hdr)
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header")
        .to_string();

    let body = test::read_body(resp).await;
    let problem: Value = serde_json::from_slice(&body).expect("problem+json body");

    assert_eq!(problem["status"], expected_status);
    assert_eq!(problem["code"], expected_code);
    assert_eq!(problem["detail"], expected_detail);
    assert!(problem.get("type").is_some());
    assert!(problem.get("title").is_some());
    assert_eq!(problem["trace_id"], header_trace_id.as_str());
}

/// Read a success body as JSON.
pub async fn read_json<B>(resp: ServiceResponse<B>) -> Value
where
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("json body")
}
