// Tests for the remote deadline store client against a mocked server.
use deadlines::client::RemoteClient;
use deadlines::error::FetchError;
use mockito::{Matcher, Server};
use std::time::Duration;
use tokio::net::TcpListener;

fn client(url: &str, token: Option<&str>) -> RemoteClient {
    RemoteClient::new(url, token, false, Duration::from_secs(5)).unwrap()
}

/// Accepts connections and never writes a byte back.
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/api/deadlines", addr)
}

#[tokio::test]
async fn test_fetch_sends_bearer_token_and_json_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/deadlines")
        .match_header("authorization", "Bearer s3cret")
        .match_header("accept", "application/json")
        .match_header("user-agent", Matcher::Regex(r"^deadlines/\d+\.\d+\.\d+$".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": 1, "user_id": 7, "name": "Thesis", "details": null,
                 "datetime": "2026-05-01 12:30:00", "tags": "[\"phd\"]",
                 "created_at": "2026-01-01T00:00:00.000Z"}
            ]"#,
        )
        .create_async()
        .await;

    let records = client(&format!("{}/api/deadlines", server.url()), Some("s3cret"))
        .fetch_deadlines()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].display_name(), "Thesis");
    assert_eq!(records[0].decode_tags().unwrap(), vec!["phd".to_string()]);
}

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let records = client(&server.url(), None).fetch_deadlines().await.unwrap();
    mock.assert_async().await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_server_error_is_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/deadlines")
        .with_status(500)
        .with_body(r#"{"error": "Database error"}"#)
        .create_async()
        .await;

    let err = client(&format!("{}/api/deadlines", server.url()), None)
        .fetch_deadlines()
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Status(500));
}

#[tokio::test]
async fn test_non_array_payload_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"{"deadlines": []}"#)
        .create_async()
        .await;

    let err = client(&server.url(), None).fetch_deadlines().await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn test_bad_tags_string_keeps_other_records() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(
            r#"[
                {"name": "Broken", "datetime": "2026-02-01 10:30", "tags": "not json"},
                {"name": "Fine", "datetime": "2026-02-02 10:30", "tags": ["ML"]}
            ]"#,
        )
        .create_async()
        .await;

    let records = client(&server.url(), None).fetch_deadlines().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].decode_tags().is_err());
    assert_eq!(records[1].decode_tags().unwrap(), vec!["ML".to_string()]);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Port 9 (discard) is essentially never listening on localhost.
    let err = client("http://127.0.0.1:9/api/deadlines", None)
        .fetch_deadlines()
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn test_silent_server_is_timeout() {
    let url = silent_server().await;
    let remote = RemoteClient::new(&url, None, false, Duration::from_secs(1)).unwrap();
    let result = remote.fetch_deadlines().await;
    assert_eq!(result, Err(FetchError::Timeout(1)));
}
