//! HTTP-level tests for [`gemini_client::GeminiClient`] against a mockito server.

use std::time::Duration;

use gemini_client::{
    Content, FileState, GeminiClient, GeminiError, GenerateContentRequest, Part,
};
use mockito::Matcher;

const MODEL: &str = "gemini-1.5-flash";
const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn simple_request(text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(text)])],
        system_instruction: Some(Content::instruction("You are Gemini.")),
        generation_config: None,
        safety_settings: vec![],
    }
}

/// **Test: A normal candidate returns its text; the key is sent in the x-goog-api-key header.**
#[tokio::test]
async fn test_generate_content_returns_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJsonString(
            r#"{"contents":[{"role":"user","parts":[{"text":"hello"}]}]}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hi!"}]},"finishReason":"STOP"}],
                "usageMetadata":{"promptTokenCount":3,"candidatesTokenCount":1,"totalTokenCount":4}}"#,
        )
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key", server.url()).unwrap();
    let response = client
        .generate_content(MODEL, &simple_request("hello"))
        .await
        .unwrap();

    assert_eq!(response.text(), "Hi!");
    mock.assert_async().await;
}

/// **Test: A SAFETY finish reason is reported as a generation stop.**
#[tokio::test]
async fn test_generate_content_safety_stop() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key", server.url()).unwrap();
    let err = client
        .generate_content(MODEL, &simple_request("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeminiError::Stopped(ref reason) if reason == "SAFETY"));
    assert!(err.is_generation_stop());
}

/// **Test: A blocked prompt is reported as Blocked.**
#[tokio::test]
async fn test_generate_content_blocked_prompt() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("test-key", server.url()).unwrap();
    let err = client
        .generate_content(MODEL, &simple_request("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeminiError::Blocked(_)));
}

/// **Test: Non-2xx responses surface status and the API error message.**
#[tokio::test]
async fn test_generate_content_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::with_base_url("bad-key", server.url()).unwrap();
    let err = client
        .generate_content(MODEL, &simple_request("hello"))
        .await
        .unwrap_err();

    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(!GeminiError::Api {
        status: 500,
        message: String::new()
    }
    .is_generation_stop());
}

/// **Test: Resumable upload posts start then bytes, and waiting polls until ACTIVE.**
#[tokio::test]
async fn test_upload_file_and_wait_for_active() {
    let mut server = mockito::Server::new_async().await;
    let session_url = format!("{}/upload-session/abc", server.url());

    let start = server
        .mock("POST", "/upload/v1beta/files")
        .match_header("x-goog-api-key", "test-key")
        .match_header("x-goog-upload-protocol", "resumable")
        .match_header("x-goog-upload-command", "start")
        .match_header("x-goog-upload-header-content-length", "5")
        .match_header("x-goog-upload-header-content-type", "image/png")
        .with_status(200)
        .with_header("x-goog-upload-url", &session_url)
        .create_async()
        .await;

    let upload = server
        .mock("POST", "/upload-session/abc")
        .match_header("x-goog-upload-command", "upload, finalize")
        .match_header("x-goog-upload-offset", "0")
        .match_body("hello")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"file":{"name":"files/abc","mimeType":"image/png","sizeBytes":"5",
                "uri":"https://generativelanguage.googleapis.com/v1beta/files/abc","state":"PROCESSING"}}"#,
        )
        .create_async()
        .await;

    let poll = server
        .mock("GET", "/v1beta/files/abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"name":"files/abc","mimeType":"image/png",
                "uri":"https://generativelanguage.googleapis.com/v1beta/files/abc","state":"ACTIVE"}"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"hello").unwrap();

    let client = GeminiClient::with_base_url("test-key", server.url()).unwrap();
    let file = client.upload_file(&path, "image/png", None).await.unwrap();
    assert_eq!(file.state, Some(FileState::Processing));

    let file = client
        .wait_for_active(file, 3, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(file.state, Some(FileState::Active));
    assert!(file.uri.ends_with("files/abc"));

    start.assert_async().await;
    upload.assert_async().await;
    poll.assert_async().await;
}

/// **Test: A missing upload URL header fails the upload.**
#[tokio::test]
async fn test_upload_without_session_url_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/upload/v1beta/files")
        .with_status(200)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, b"x").unwrap();

    let client = GeminiClient::with_base_url("test-key", server.url()).unwrap();
    let err = client
        .upload_file(&path, "text/plain", Some("doc.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::MissingUploadUrl));
}
