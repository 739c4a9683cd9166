//! Integration tests for ahp-ca API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Upload of one or more comparison tables
//! - Failure responses (malformed rows, degenerate matrices, bad requests)
//! - Report download
//! - CORS preflight for the web front end

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use ahp_ca::{build_router, AppState};
use ahp_common::config::ServiceConfig;

const BOUNDARY: &str = "ahp-test-boundary";

/// Test helper: app writing reports into a temporary directory
fn setup_app(reports: &TempDir) -> Router {
    setup_app_with(reports, |_| {})
}

fn setup_app_with(reports: &TempDir, tweak: impl FnOnce(&mut ServiceConfig)) -> Router {
    let mut config = ServiceConfig {
        reports_dir: reports.path().to_path_buf(),
        ..Default::default()
    };
    tweak(&mut config);
    build_router(AppState::new(config))
}

/// Test helper: multipart body with one part per `(file name, content)`
fn multipart_request(files: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ahp-ca");
    assert!(body["version"].is_string());
    assert!(!body["git_hash"].as_str().unwrap().is_empty());
    assert!(body["build_timestamp"].as_str().unwrap().ends_with('Z'));
}

// =============================================================================
// Upload Tests
// =============================================================================

#[tokio::test]
async fn test_upload_single_file() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[("survey.csv", "A-B,A-C,B-C\n2,3,1.5\n2,3,1.5\n")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Files processed successfully");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["engineer"], "Engineer 1");
    assert_eq!(results[0]["weights"], serde_json::json!([0.545, 0.273, 0.182]));
    assert_eq!(results[0]["ri"], 0.58);
    assert_eq!(results[0]["matrix"][0], serde_json::json!([1.0, 2.0, 3.0]));

    let aggregate = &body["aggregate_result"];
    assert_eq!(aggregate["aggregate_matrix"], results[0]["matrix"]);
    assert_eq!(aggregate["cr"], results[0]["cr"]);
    assert_eq!(aggregate["respondents"], 2);

    assert_eq!(body["files"][0]["file_name"], "survey.csv");
    assert_eq!(body["files"][0]["discarded_rows"], 1);

    // Report written into the configured directory
    let document = body["document"].as_str().unwrap();
    assert!(document.starts_with("reports/criteria_analysis_"));
    let file_name = document.trim_start_matches("reports/");
    assert!(reports.path().join(file_name).exists());
}

#[tokio::test]
async fn test_report_download() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let response = app
        .clone()
        .oneshot(multipart_request(&[("survey.csv", "2,3,1.5\n")]))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let document = body["document"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/{}", document))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("# Criteria Analysis"));
    assert!(text.contains("### Engineer 1"));
}

#[tokio::test]
async fn test_upload_all_inconsistent_has_null_aggregate() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[("bad.csv", "9,0.111111,9\n7,0.142857,7\n")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert!(body["aggregate_result"].is_null());
    assert!(body["files"][0]["aggregate_result"].is_null());
}

#[tokio::test]
async fn test_upload_multiple_files_processed_independently() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[
        ("inconsistent.csv", "9,0.111111,9\n"),
        ("pair.csv", "4\n"),
        ("triple.csv", "2,3,1.5\n"),
    ]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    assert!(files[0]["aggregate_result"].is_null());
    assert_eq!(files[1]["aggregate_result"]["respondents"], 1);
    assert_eq!(files[2]["aggregate_result"]["respondents"], 1);

    // Different criteria counts across files are fine: never aggregated together
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    // Top-level aggregate is the first one present
    assert_eq!(
        body["aggregate_result"]["aggregate_matrix"],
        serde_json::json!([[1.0, 4.0], [0.25, 1.0]])
    );
}

// =============================================================================
// Failure Tests
// =============================================================================

#[tokio::test]
async fn test_upload_malformed_row_rejected() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[("survey.csv", "2,3,1.5,4\n")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("survey.csv"), "{message}");
    assert!(message.contains("engineer 1"), "{message}");
    assert!(body.get("results").is_none());

    // No report for a failed request
    assert_eq!(std::fs::read_dir(reports.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_malformed_second_file_fails_whole_request() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[("good.csv", "2,3,1.5\n"), ("bad.csv", "1,2\n")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().starts_with("bad.csv"));
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn test_upload_degenerate_matrix() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = multipart_request(&[("zero.csv", "0,2,3\n")]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().contains("Numeric degeneracy"));
}

#[tokio::test]
async fn test_upload_without_parts() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let response = app.oneshot(multipart_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "No files uploaded");
}

#[tokio::test]
async fn test_upload_ignores_plain_form_fields() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         survey round 2\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"survey.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         2,3,1.5\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["file_name"], "survey.csv");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_only_form_fields_is_no_files() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         2,3,1.5\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "No files uploaded");
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("2,3,1.5"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());

    let body = extract_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().starts_with("Invalid upload"));
}

#[tokio::test]
async fn test_upload_over_body_limit() {
    let reports = TempDir::new().unwrap();
    let app = setup_app_with(&reports, |config| config.max_upload_bytes = 64);

    let big = "2,3,1.5\n".repeat(64);
    let response = app
        .oneshot(multipart_request(&[("big.csv", &big)]))
        .await
        .unwrap();
    assert!(!response.status().is_success());
}

// =============================================================================
// CORS Tests
// =============================================================================

#[tokio::test]
async fn test_cors_preflight_allows_front_end() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/uploadfile/")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_cors_unknown_origin_not_allowed() {
    let reports = TempDir::new().unwrap();
    let app = setup_app(&reports);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/uploadfile/")
        .header(header::ORIGIN, "http://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
