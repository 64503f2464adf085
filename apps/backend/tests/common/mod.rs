#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderName, CONTENT_TYPE};
use actix_web::test;
use league_backend::test_support::MemoryStore;
use serde_json::Value;

// Logging is auto-installed for test binaries
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Fresh in-memory store with the tier catalog seeded.
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Validate that a response follows the ProblemDetails structure and that
/// trace_id in the body matches the x-trace-id header.
pub async fn assert_problem_details_structure(
    resp: ServiceResponse<BoxBody>,
    expected_status: u16,
    expected_code: &str,
) {
    assert_eq!(resp.status().as_u16(), expected_status);

    let headers = resp.headers().clone();

    let trace_hdr = HeaderName::from_static("x-trace-id");
    let trace_id = headers
        .get(&trace_hdr)
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present and valid UTF-8")
        .to_string();
    assert!(!trace_id.is_empty(), "x-trace-id header should not be empty");

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["code"].as_str(), Some(expected_code));
    assert_eq!(json["status"].as_u64(), Some(u64::from(expected_status)));
    assert_eq!(
        json["trace_id"].as_str(),
        Some(trace_id.as_str()),
        "trace_id in body should match x-trace-id header"
    );
}
