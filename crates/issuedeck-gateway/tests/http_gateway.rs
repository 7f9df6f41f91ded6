//! Integration tests for HttpGateway using wiremock.
//!
//! These tests verify the command wire format against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use issuedeck_core::{GatewayError, IssueState, SettingsPatch, TokenPoll};
use issuedeck_gateway::{Gateway, HttpGateway};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test issue JSON as the backend sends it
fn test_issue(number: u64, title: &str, created_at: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "title": title,
        "state": "open",
        "created_at": created_at,
        "body": "Test issue body",
        "labels": ["bug"],
        "assignees": [],
        "comments": [],
        "creator": "octocat"
    })
}

#[tokio::test]
async fn test_fetch_issues_sends_camel_case_args() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/fetch_issues"))
        .and(body_json(serde_json::json!({
            "owner": "octocat",
            "repo": "alpha",
            "forceRefresh": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            test_issue(1, "First", "2026-01-30T12:00:00Z"),
            test_issue(2, "Second", "2026-01-31T12:00:00Z"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let issues = gateway.fetch_issues("octocat", "alpha", true).await.unwrap();

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].title, "First");
    assert_eq!(issues[1].number, 2);
    assert_eq!(issues[0].state, IssueState::Open);
}

#[tokio::test]
async fn test_check_cache_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/check_cache_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cached": true,
            "last_updated": "2026-01-30T12:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let status = gateway.check_cache_status("octocat", "alpha").await.unwrap();

    assert!(status.cached);
    assert_eq!(status.last_updated.to_rfc3339(), "2026-01-30T12:00:00+00:00");
}

#[tokio::test]
async fn test_get_cached_issue_null_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/get_cached_issue"))
        .and(body_json(serde_json::json!({
            "owner": "octocat",
            "repo": "alpha",
            "issueNumber": 9
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let cached = gateway.get_cached_issue("octocat", "alpha", 9).await.unwrap();

    assert!(cached.is_none());
}

#[tokio::test]
async fn test_delete_comment_uses_comment_number_arg() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/delete_issue_comment"))
        .and(body_json(serde_json::json!({
            "repo": "alpha",
            "issueNumber": 3,
            "commentNumber": 77
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_issue(3, "T", "2026-01-30T12:00:00Z")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let issue = gateway.delete_issue_comment("alpha", 3, 77).await.unwrap();

    assert_eq!(issue.number, 3);
    assert!(issue.comments.is_empty());
}

#[tokio::test]
async fn test_unit_result_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/save_pinned_repos"))
        .and(body_json(serde_json::json!({ "repos": ["1", "2"] })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let result = gateway
        .save_pinned_repos(&["1".to_string(), "2".to_string()])
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_save_settings_sends_only_patched_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/save_settings"))
        .and(body_json(serde_json::json!({ "settings": { "theme": "dark" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "theme": "dark",
            "font_size": "medium",
            "notifications": true,
            "file_directory": "",
            "api_key": null,
            "recently_viewed": true
        })))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let settings = gateway
        .save_settings(&SettingsPatch {
            theme: Some("dark".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(settings.theme, "dark");
    assert_eq!(settings.font_size, "medium");
}

#[tokio::test]
async fn test_poll_for_token_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/poll_for_token"))
        .and(body_json(serde_json::json!({ "deviceCode": "dev-123" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "pending" })),
        )
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let poll = gateway.poll_for_token("dev-123").await.unwrap();

    assert_eq!(poll, TokenPoll::Pending);
}

#[tokio::test]
async fn test_generate_changelog_sends_issues_and_vault() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/generate_and_save_changelog"))
        .and(body_partial_json(serde_json::json!({ "vaultPath": "/home/me/vault" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json("Changelog saved to 2026-01-30.md"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let issue = serde_json::from_value(test_issue(3, "Crash", "2026-01-30T12:00:00Z")).unwrap();

    let message = gateway
        .generate_and_save_changelog(&[issue], "/home/me/vault")
        .await
        .unwrap();

    assert_eq!(message, "Changelog saved to 2026-01-30.md");
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/check_auth"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(true))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), Some("secret-token".to_string())).unwrap();
    assert!(gateway.check_auth().await.unwrap());
}

#[tokio::test]
async fn test_command_failure_maps_status_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/fetch_single_issue"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Issue not found"
        })))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let err = gateway
        .fetch_single_issue("octocat", "alpha", 404)
        .await
        .unwrap_err();

    match err {
        GatewayError::Command {
            command,
            status,
            message,
        } => {
            assert_eq!(command, "fetch_single_issue");
            assert_eq!(status, 404);
            assert_eq!(message, "Issue not found");
        }
        other => unreachable!("expected command error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoke/load_recents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": "not-a-list"
        })))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::new(&mock_server.uri(), None).unwrap();
    let err = gateway.load_recents().await.unwrap_err();

    assert!(matches!(err, GatewayError::Decode { ref command, .. } if command == "load_recents"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let gateway = HttpGateway::new("http://127.0.0.1:9", None).unwrap();
    let err = gateway.load_settings().await.unwrap_err();

    assert!(matches!(err, GatewayError::Network(_)));
}
