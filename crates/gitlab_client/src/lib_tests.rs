//! Unit tests for the gitlab_client crate.

use super::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// --- Test Constants ---
const TEST_TOKEN: &str = "glpat-test-token";

fn create_test_client(server: &MockServer) -> GitLabClient {
    let token = SecretString::from(TEST_TOKEN.to_string());
    GitLabClient::new(&format!("{}/api/v4", server.uri()), &token)
        .expect("Failed to create client")
        .with_retry_policy(RetryPolicy {
            limit: 3,
            base_delay: Duration::ZERO,
        })
}

fn project_id(id: u64) -> ProjectId {
    ProjectId::new(id).expect("Test project ids are positive")
}

#[test]
fn test_normalize_base_uri_appends_separator() {
    let uri = normalize_base_uri("https://git.mysite.org/api/v4").expect("Valid URI");

    assert_eq!(uri.as_str(), "https://git.mysite.org/api/v4/");
    assert_eq!(
        uri.join("projects").expect("Joinable").as_str(),
        "https://git.mysite.org/api/v4/projects"
    );
}

#[test]
fn test_normalize_base_uri_keeps_existing_separator() {
    let uri = normalize_base_uri("http://git.lol/api/v4/").expect("Valid URI");

    assert_eq!(uri.as_str(), "http://git.lol/api/v4/");
}

#[test]
fn test_normalize_base_uri_rejects_garbage() {
    assert!(matches!(
        normalize_base_uri("not a uri"),
        Err(Error::InvalidBaseUri(_))
    ));
    assert!(matches!(
        normalize_base_uri("mailto:admin@example.org"),
        Err(Error::InvalidBaseUri(_))
    ));
}

#[test]
fn test_new_rejects_token_with_newline() {
    let token = SecretString::from("bad\ntoken".to_string());

    let result = GitLabClient::new("https://git.example.org/api/v4", &token);

    assert!(matches!(result, Err(Error::InvalidToken)));
}

#[tokio::test]
async fn test_list_labels_sends_token_and_page_size() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/labels"))
        .and(header("PRIVATE-TOKEN", TEST_TOKEN))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "bug", "color": "#ff0000", "description": null },
            { "id": 2, "name": "feature", "color": "#00ff00", "description": "New stuff" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let labels = client
        .list_labels(project_id(42))
        .await
        .expect("Failed to list labels");

    assert_eq!(
        labels,
        vec![
            Label::new("bug", "#ff0000", None),
            Label::new("feature", "#00ff00", Some("New stuff")),
        ]
    );
}

#[tokio::test]
async fn test_list_projects_requests_simple_listing_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("order_by", "id"))
        .and(query_param("simple", "true"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "name": "seven", "path_with_namespace": "group/seven" },
            { "id": 9, "name": "nine", "path_with_namespace": "group/nine" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let projects = client.list_projects(3).await.expect("Failed to list projects");

    let ids: Vec<u64> = projects.iter().map(|p| p.id.get()).collect();
    assert_eq!(ids, vec![7, 9]);
}

#[tokio::test]
async fn test_create_project_posts_private_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects"))
        .and(body_json(json!({
            "name": "deleteme-abc123",
            "visibility": "private",
            "issues_enabled": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1234,
            "name": "deleteme-abc123",
            "path_with_namespace": "root/deleteme-abc123",
            "visibility": "private"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let project = client
        .create_project(&ProjectCreatePayload::private("deleteme-abc123"))
        .await
        .expect("Failed to create project");

    assert_eq!(project.id, project_id(1234));
}

#[tokio::test]
async fn test_delete_project_accepts_accepted_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/1234"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({ "message": "202 Accepted" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.delete_project(project_id(1234)).await;

    assert!(result.is_ok(), "delete_project failed: {result:?}");
}

#[tokio::test]
async fn test_create_label_sends_fields_as_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects/42/labels"))
        .and(query_param("name", "bug"))
        .and(query_param("color", "#f00"))
        .and(query_param("description", "Something is broken"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5, "name": "bug", "color": "#f00", "description": "Something is broken"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .create_label(
            project_id(42),
            &Label::new("bug", "#f00", Some("Something is broken")),
        )
        .await;

    assert!(result.is_ok(), "create_label failed: {result:?}");
}

#[tokio::test]
async fn test_delete_label_accepts_empty_no_content_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/42/labels"))
        .and(query_param("name", "bug"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.delete_label(project_id(42), "bug").await;

    assert!(result.is_ok(), "delete_label failed: {result:?}");
    assert!(!client.overrun_guard().is_armed());
}

#[tokio::test]
async fn test_delete_label_not_found_is_success_and_arms_guard() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "404 Label Not Found" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.delete_label(project_id(42), "gone").await;

    assert!(result.is_ok(), "delete_label failed: {result:?}");
    assert!(client.overrun_guard().is_armed());
}

#[tokio::test]
async fn test_malformed_delete_response_tolerated_once_guard_armed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"200 O"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client.overrun_guard().arm();

    let result = client.delete_label(project_id(42), "bug").await;

    assert!(result.is_ok(), "delete_label failed: {result:?}");
}

#[tokio::test]
async fn test_malformed_delete_response_retried_while_guard_unarmed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"200 O"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.delete_label(project_id(42), "bug").await;

    assert!(matches!(result, Err(Error::Deserialization(_))));
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let mock_server = MockServer::start().await;

    for _ in 0..3 {
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/labels"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let labels = client
        .list_labels(project_id(42))
        .await
        .expect("Request should succeed on the fourth attempt");

    assert!(labels.is_empty());
}

#[tokio::test]
async fn test_server_errors_become_fatal_after_retry_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "500 Internal Server Error" })),
        )
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.list_labels(project_id(42)).await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "500 Internal Server Error");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_label_not_found_on_listing_reports_missing_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42/labels"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "404 Label Not Found" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.list_labels(project_id(42)).await;

    assert!(matches!(result, Err(Error::MissingResponse)));
}
