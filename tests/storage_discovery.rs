//! Integration tests for storage bucket discovery using wiremock
//!
//! These tests drive the real generator against mocked Cloud Storage
//! endpoints and verify the failure-isolation tiers: partial listings,
//! per-item skips, and benign absence.

use serde_json::json;
use tfharvest::core::{Diagnostic, GeneratorRun, Phase, ServiceContext};
use tfharvest::google::auth::GoogleCredentials;
use tfharvest::google::client::{ApiEndpoints, GoogleClient};
use tfharvest::google::http::GoogleHttpClient;
use tfharvest::google::registry;
use wiremock::matchers::{bearer_token, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_client(server: &MockServer) -> GoogleClient {
    GoogleClient::with_parts(
        GoogleCredentials::with_token("test-token"),
        GoogleHttpClient::default(),
        "test-project",
        ApiEndpoints::single_host(&server.uri()),
    )
}

fn storage_context() -> ServiceContext {
    ServiceContext::new("google")
        .with_arg("project", "test-project")
        .with_arg("region", "us-central1")
}

fn bucket_run(server: &MockServer) -> GeneratorRun {
    let client = mock_client(server);
    let generator = registry::generator_for("google_storage_bucket", &storage_context(), &client)
        .expect("storage kind should resolve");
    GeneratorRun::new(generator)
}

fn bucket(name: &str, location: &str) -> serde_json::Value {
    json!({"name": name, "location": location, "storageClass": "STANDARD"})
}

/// Mount a 404 for every bucket IAM lookup (benign absence).
async fn mount_no_policies(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/storage/v1/b/[^/]+/iam$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not Found"}
        })))
        .mount(server)
        .await;
}

/// Pages A and B are consumed, the third cursor advance fails: everything
/// already fetched is kept, discovery reports no error, and a
/// partial-listing diagnostic is recorded.
#[tokio::test]
async fn cursor_failure_keeps_consumed_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .and(query_param("project", "test-project"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [bucket("alpha", "US-CENTRAL1"), bucket("beta", "US-CENTRAL1")],
            "nextPageToken": "page-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [bucket("gamma", "US-CENTRAL1")],
            "nextPageToken": "page-3"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // The third advance hits a backend error.
    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "backend error"}
        })))
        .mount(&server)
        .await;

    mount_no_policies(&server).await;

    let mut run = bucket_run(&server);
    run.discover().await.expect("partial listing is not fatal");

    let outcome = run.into_outcome();
    let names: Vec<&str> = outcome.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(matches!(
        outcome.diagnostics[0],
        Diagnostic::PartialListing { .. }
    ));
}

/// A recognized "not found" from the policy lookup is benign absence: the
/// bucket is kept, the attribute is omitted, and nothing is recorded.
#[tokio::test]
async fn missing_policy_is_benign_absence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [bucket("quiet", "US-CENTRAL1")]
        })))
        .mount(&server)
        .await;

    mount_no_policies(&server).await;

    let mut run = bucket_run(&server);
    run.discover().await.unwrap();

    let outcome = run.into_outcome();
    assert_eq!(outcome.resources.len(), 1);
    assert!(!outcome.resources[0].attributes.contains_key("policy"));
    assert!(outcome.diagnostics.is_empty());
}

/// A transport failure on the policy lookup drops only that bucket.
#[tokio::test]
async fn policy_failure_skips_one_item() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [bucket("healthy", "US-CENTRAL1"), bucket("broken", "US-CENTRAL1")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/healthy/iam"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bindings": [{"role": "roles/storage.admin", "members": ["user:a@example.com"]}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/broken/iam"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "internal"}
        })))
        .mount(&server)
        .await;

    let mut run = bucket_run(&server);
    run.discover().await.unwrap();

    let outcome = run.into_outcome();
    assert_eq!(outcome.resources.len(), 1);
    assert_eq!(outcome.resources[0].name, "healthy");
    assert!(outcome.resources[0].attributes.contains_key("policy"));
    assert_eq!(outcome.diagnostics.len(), 1);
    match &outcome.diagnostics[0] {
        Diagnostic::ItemSkipped { item, .. } => assert_eq!(item, "broken"),
        other => panic!("expected ItemSkipped, got {other:?}"),
    }
}

/// 10 buckets listed, 3 in the requested region: exactly those 3 become
/// resources.
#[tokio::test]
async fn listing_is_filtered_to_the_requested_region() {
    let server = MockServer::start().await;

    let mut items = vec![
        bucket("in-region-1", "US-CENTRAL1"),
        bucket("in-region-2", "US-CENTRAL1"),
        bucket("in-region-3", "US-CENTRAL1"),
    ];
    for i in 0..7 {
        items.push(bucket(&format!("elsewhere-{i}"), "EUROPE-WEST1"));
    }

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(&server)
        .await;

    mount_no_policies(&server).await;

    let mut run = bucket_run(&server);
    run.discover().await.unwrap();

    let outcome = run.into_outcome();
    assert_eq!(outcome.resources.len(), 3);
    assert!(outcome
        .resources
        .iter()
        .all(|r| r.attributes.get("location").unwrap() == "US-CENTRAL1"));
}

/// A failure on the very first page is fatal: discovery errors, the
/// collection stays empty, and the run cannot be driven again.
#[tokio::test]
async fn first_page_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Permission denied"}
        })))
        .mount(&server)
        .await;

    let mut run = bucket_run(&server);
    let err = run.discover().await.unwrap_err();
    assert!(err.to_string().contains("403"));
    assert_eq!(run.phase(), Phase::Failed);
    assert!(run.discover().await.is_err());

    let outcome = run.into_outcome();
    assert!(outcome.is_failed());
    assert!(outcome.resources.is_empty());
}

/// Post-conversion drops the implicit storage class and wraps the policy
/// document as an escaped block literal.
#[tokio::test]
async fn post_convert_rewrites_bucket_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [bucket("policied", "US-CENTRAL1")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/policied/iam"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bindings": [{"role": "roles/viewer", "members": ["user:${who}@example.com"]}]
        })))
        .mount(&server)
        .await;

    let mut run = bucket_run(&server);
    run.discover().await.unwrap();
    run.convert().unwrap();

    let outcome = run.into_outcome();
    let resource = &outcome.resources[0];

    // Implicit default removed.
    assert!(!resource.attributes.contains_key("storage_class"));

    // Policy wrapped and interpolation escaped.
    let policy = resource.attributes.get("policy").unwrap();
    assert!(policy.starts_with("<<POLICY\n"));
    assert!(policy.ends_with("\nPOLICY"));
    assert!(policy.contains("user:$${who}@example.com"));
    assert!(!policy.contains("user:${who}@example.com"));
}
