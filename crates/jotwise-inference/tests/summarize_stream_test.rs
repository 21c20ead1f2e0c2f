//! Summarize service tests against a mock OpenAI-compatible endpoint.
//!
//! The framed output is fed through the enhancement pipeline to check that
//! what the server emits is what the client can clean.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use jotwise_core::{CompletionSource, Error, Result, SummaryWriter};
use jotwise_enhance::{
    accumulate, extract_and_clean, CycleOutcome, CycleRequest, CycleView, EnhancementCycle,
    FailureNotice,
};
use jotwise_inference::openai::{ChatBackend, ChatBackendConfig};
use jotwise_inference::SummarizeService;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_body(tokens: &[&str]) -> String {
    let mut body = String::new();
    for token in tokens {
        let chunk = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "delta": { "content": token }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

fn service_for(server: &MockServer) -> SummarizeService {
    let backend = ChatBackend::new(ChatBackendConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 10,
        ..Default::default()
    })
    .expect("Failed to create backend");
    SummarizeService::new(Arc::new(backend))
}

#[tokio::test]
async fn test_generated_tokens_round_trip_through_cleanup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gemini-1.5-flash",
            "max_tokens": 200,
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&[
                    "🎯 PRIORITY TASKS:\n* Call",
                    " the bank\n* Email Sam\n\n✅ SUM",
                    "MARY:\nTwo quick \"wins\".\n\n",
                    "💡 PRODUCTIVITY TIP:\nBatch them.",
                ])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let stream = service.stream("call bank\nemail Sam").await.unwrap();
    let raw = accumulate(stream).await.unwrap();

    assert!(raw.as_str().starts_with("f:{\"messageId\":\"msg-"));
    assert!(raw.as_str().ends_with("d:{\"finishReason\":\"stop\"}\n"));
    assert_eq!(
        extract_and_clean(raw.as_str()),
        "🎯 PRIORITY TASKS:\n* Call the bank\n* Email Sam\n\n✅ SUMMARY:\nTwo quick \\\"wins\\\".\n\n💡 PRODUCTIVITY TIP:\nBatch them."
    );
}

#[tokio::test]
async fn test_prompt_contains_note_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&["ok"])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let stream = service.stream("water the plants").await.unwrap();
    accumulate(stream).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("---\nwater the plants\n---"));
    assert_eq!(body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_blank_content_rejected_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let err = service.stream("   ").await.err().expect("expected an error");
    assert_eq!(err.to_string(), "Invalid input: Content is required");

    let err = service.open("").await.err().expect("expected an error");
    match err {
        Error::Transport { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "Content is required");
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_api_error_surfaces_as_generation_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let err = service.open("tasks").await.err().expect("expected an error");

    match err {
        Error::Transport { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.starts_with("Failed to generate summary: "));
            assert!(message.contains("Rate limit exceeded: Resource exhausted"));
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[derive(Default)]
struct RecordingWriter {
    writes: Mutex<Vec<String>>,
}

#[async_trait]
impl SummaryWriter for RecordingWriter {
    async fn update_summary(&self, _note_id: Uuid, summary: &str) -> Result<()> {
        self.writes.lock().unwrap().push(summary.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_mid_stream_failure_fails_in_process_cycle() {
    let mock_server = MockServer::start().await;

    let mut body = sse_body(&[
        "🎯 PRIORITY TASKS:\n* Call the bank\n\n",
        "✅ SUMMARY:\nOne errand.\n\n💡 PRODUCTIVITY TIP:\n",
        "Do it first.",
    ]);
    // Cut the stream short with a chunk the parser cannot read
    body = body.replace("data: [DONE]\n\n", "data: {\"choices\": [\n\n");

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&mock_server)
        .await;

    let service = Arc::new(service_for(&mock_server));
    let writer = Arc::new(RecordingWriter::default());
    let cycle = EnhancementCycle::new(service, writer.clone());
    let (tx, rx) = watch::channel(CycleView::idle(Some("prior".to_string())));

    let outcome = cycle
        .run(
            CycleRequest {
                note_id: Uuid::new_v4(),
                content: "call bank".to_string(),
                persisted_summary: Some("prior".to_string()),
            },
            &tx,
        )
        .await;

    match outcome {
        CycleOutcome::Failed(FailureNotice::Stream(message)) => {
            assert!(message.starts_with("Inference error: Failed to parse SSE chunk"));
        }
        other => panic!("Expected stream failure, got {:?}", other),
    }
    assert!(writer.writes.lock().unwrap().is_empty());
    assert_eq!(*rx.borrow(), CycleView::idle(Some("prior".to_string())));
}
