mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{workflow, StubAgent, StubStaging};
use http_body_util::BodyExt;
use media_summarizer::staging::FileState;
use media_summarizer::{create_app, AppState};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const BOUNDARY: &str = "media-summarizer-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn app(staging: Arc<StubStaging>, agent: Arc<StubAgent>, scratch: &Path) -> Router {
    create_app(AppState {
        workflow: Arc::new(workflow(staging, agent, scratch)),
        shutdown: CancellationToken::new(),
        max_upload_bytes: 1024 * 1024,
    })
}

async fn post(app: Router, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart(parts)))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn index_serves_three_tabs() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(
        StubStaging::new(&[FileState::Active]),
        StubAgent::replying("x"),
        dir.path(),
    );
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Video Analysis"));
    assert!(html.contains("Image Analysis"));
    assert!(html.contains("Text Summarization"));
}

#[tokio::test]
async fn health_reports_model() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(
        StubStaging::new(&[FileState::Active]),
        StubAgent::replying("x"),
        dir.path(),
    );
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "stub-model");
}

#[tokio::test]
async fn image_upload_returns_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let staging = StubStaging::new(&[FileState::Active]);
    let agent = StubAgent::replying("A red circle.");
    let app = app(staging.clone(), agent, dir.path());

    let (status, body) = post(
        app,
        "/api/image",
        &[
            Part::File("file", "circle.png", b"0123456789"),
            Part::Text("query", "What is shown?"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Analysis Result");
    assert_eq!(body["content"], "A red circle.");
    assert_eq!(body["model"], "stub-model");
    assert!(!staging.scratch_path().exists());
}

#[tokio::test]
async fn empty_query_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let staging = StubStaging::new(&[FileState::Active]);
    let agent = StubAgent::replying("unused");
    let app = app(staging.clone(), agent.clone(), dir.path());

    let (status, body) = post(
        app,
        "/api/video",
        &[
            Part::File("file", "clip.mp4", b"not a real video"),
            Part::Text("query", ""),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "warning");
    assert_eq!(
        body["message"],
        "Please enter a question or insight to analyze the video."
    );
    assert_eq!(staging.submit_count(), 0);
    assert_eq!(agent.call_count(), 0);
}

#[tokio::test]
async fn missing_video_file_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let staging = StubStaging::new(&[FileState::Active]);
    let app = app(staging.clone(), StubAgent::replying("unused"), dir.path());

    let (status, body) = post(app, "/api/video", &[Part::Text("query", "What happens?")]).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Upload a video file to begin analysis.");
    assert_eq!(staging.submit_count(), 0);
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let staging = StubStaging::new(&[FileState::Active]);
    let app = app(staging.clone(), StubAgent::replying("unused"), dir.path());

    let big = vec![0u8; 2 * 1024 * 1024];
    let (status, body) = post(
        app,
        "/api/video",
        &[
            Part::Text("query", "What happens?"),
            Part::File("file", "clip.mp4", &big),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["kind"], "error");
    assert_eq!(staging.submit_count(), 0);
}

#[tokio::test]
async fn model_failure_is_an_inline_error() {
    let dir = tempfile::tempdir().unwrap();
    let staging = StubStaging::new(&[FileState::Active]);
    let app = app(staging.clone(), StubAgent::failing("quota exceeded"), dir.path());

    let (status, body) = post(
        app,
        "/api/image",
        &[
            Part::File("file", "circle.png", b"0123456789"),
            Part::Text("query", "What is shown?"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "error");
    assert_eq!(
        body["message"],
        "An error occurred during analysis: model error: quota exceeded"
    );
    assert!(!staging.scratch_path().exists());
}

#[tokio::test]
async fn text_upload_beats_typed_text() {
    let dir = tempfile::tempdir().unwrap();
    let agent = StubAgent::replying("Summary.");
    let app = app(
        StubStaging::new(&[FileState::Active]),
        agent.clone(),
        dir.path(),
    );

    let (status, body) = post(
        app,
        "/api/text",
        &[
            Part::Text("text", "typed text"),
            Part::File("file", "notes.txt", b"file text"),
            Part::Text("instructions", ""),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Summary Result");
    let prompt = agent.last_request().prompt;
    assert!(prompt.contains("file text"));
    assert!(!prompt.contains("typed text"));
}

#[tokio::test]
async fn empty_file_part_falls_back_to_typed_text() {
    let dir = tempfile::tempdir().unwrap();
    let agent = StubAgent::replying("Summary.");
    let app = app(
        StubStaging::new(&[FileState::Active]),
        agent.clone(),
        dir.path(),
    );

    let (status, _) = post(
        app,
        "/api/text",
        &[
            Part::Text("text", "typed text"),
            Part::File("file", "", b""),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(agent.last_request().prompt.contains("typed text"));
}

#[tokio::test]
async fn blank_text_is_a_summarization_warning() {
    let dir = tempfile::tempdir().unwrap();
    let agent = StubAgent::replying("unused");
    let app = app(
        StubStaging::new(&[FileState::Active]),
        agent.clone(),
        dir.path(),
    );

    let (status, body) = post(app, "/api/text", &[Part::Text("text", "  ")]).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Please provide some text or upload a file to summarize."
    );
    assert_eq!(agent.call_count(), 0);
}
