//! LlmAdapter against a local one-shot HTTP server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crew_llm::{
    ChatMessage, CompletionRequest, LlmAdapter, LlmClient, LlmError, LlmProvider, ModelSpec,
};

/// Accept one connection, answer with `status` and `body`, return the raw request.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);

            let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}", addr), handle)
}

fn request() -> CompletionRequest {
    CompletionRequest::new()
        .with_system("You are an SEO Keyword Strategist.")
        .with_message(ChatMessage::user("Pick keywords for rural healthcare."))
}

#[tokio::test]
async fn test_gemini_round_trip() {
    let (url, server) = serve_once(
        200,
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"primary_keywords\":[\"AI\"]}"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":21,"candidatesTokenCount":9}}"#,
    )
    .await;

    let adapter = LlmAdapter::new(ModelSpec::new(LlmProvider::Gemini, "gemini-2.0-flash"), "test-key")
        .with_base_url(url);
    let response = adapter.complete(&request()).await.unwrap();

    assert_eq!(response.content, r#"{"primary_keywords":["AI"]}"#);
    assert_eq!(response.input_tokens, 21);
    assert_eq!(response.output_tokens, 9);
    assert_eq!(response.model, "gemini-2.0-flash");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent HTTP/1.1"));
    assert!(raw.to_lowercase().contains("x-goog-api-key: test-key"));
    assert!(raw.contains("systemInstruction"));
    assert!(raw.contains("Pick keywords for rural healthcare."));
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let (url, server) = serve_once(429, r#"{"error":{"message":"quota exceeded"}}"#).await;

    let adapter = LlmAdapter::new(ModelSpec::new(LlmProvider::Gemini, "gemini-2.0-flash"), "k")
        .with_base_url(url);
    let err = adapter.complete(&request()).await.unwrap_err();

    match &err {
        LlmError::Api {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, "gemini");
            assert_eq!(*status, 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_configuration());

    // The server only ever accepts one connection.
    server.await.unwrap();
}

#[tokio::test]
async fn test_openai_round_trip() {
    let (url, server) = serve_once(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"A story."}}],"usage":{"prompt_tokens":30,"completion_tokens":3}}"#,
    )
    .await;

    let adapter = LlmAdapter::new(ModelSpec::new(LlmProvider::OpenAI, "gpt-4o-mini"), "sk-test")
        .with_base_url(url);
    let response = adapter.complete(&request()).await.unwrap();
    assert_eq!(response.content, "A story.");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions HTTP/1.1"));
    assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(raw.contains(r#""role":"system""#));
}

#[tokio::test]
async fn test_anthropic_round_trip() {
    let (url, server) = serve_once(
        200,
        r#"{"content":[{"type":"text","text":"Evaluation: 8/10"}],"usage":{"input_tokens":12,"output_tokens":4}}"#,
    )
    .await;

    let adapter = LlmAdapter::new(
        ModelSpec::new(LlmProvider::Anthropic, "claude-sonnet-4-5"),
        "ant-key",
    )
    .with_base_url(url);
    let response = adapter.complete(&request()).await.unwrap();
    assert_eq!(response.content, "Evaluation: 8/10");
    assert_eq!(response.output_tokens, 4);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/messages HTTP/1.1"));
    assert!(raw.to_lowercase().contains("x-api-key: ant-key"));
    assert!(raw.contains(r#""system":"You are an SEO Keyword Strategist.""#));
}

#[tokio::test]
async fn test_undecodable_body() {
    let (url, server) = serve_once(200, "not json").await;

    let adapter = LlmAdapter::new(ModelSpec::new(LlmProvider::Gemini, "gemini-2.0-flash"), "k")
        .with_base_url(url);
    let err = adapter.complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));

    server.await.unwrap();
}
