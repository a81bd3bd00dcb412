//! Wire-level tests for the OpenAI-compatible client and the engine built on it.
//!
//! A `wiremock` server stands in for the vision API.

#![cfg(feature = "openai")]

use edgequake_ocr::{
    ClientError, ImagePageBackend, LlmOcrModel, LlmOcrOptions, OcrError, OpenAiClient, Page,
    Timings, VisionClient, OCR_TIMER_KEY,
};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn models(ids: &[&str]) -> serde_json::Value {
    let data: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({"id": id, "object": "model"}))
        .collect();
    serde_json::json!({"object": "list", "data": data})
}

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        "test-api-key",
        &format!("{}/v1", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn image_page(page_no: usize) -> Page {
    let backend = ImagePageBackend::new(DynamicImage::new_rgb8(64, 32));
    Page::new(page_no).with_backend(Arc::new(backend))
}

#[tokio::test]
async fn list_models_sends_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models(&["gpt-4o-mini", "gpt-4o"])))
        .expect(1)
        .mount(&server)
        .await;

    let ids = client(&server).list_models().await.unwrap();
    assert_eq!(ids, vec!["gpt-4o-mini", "gpt-4o"]);
}

#[tokio::test]
async fn recognize_posts_prompt_and_jpeg_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello World")))
        .expect(1)
        .mount(&server)
        .await;

    let image = ImageData::new("QUJD", "image/jpeg");
    let text = client(&server)
        .recognize("gpt-4o-mini", "Extract all text", &image)
        .await
        .unwrap();
    assert_eq!(text, "Hello World");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    let content = messages[0]["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "Extract all text");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
}

#[tokio::test]
async fn content_is_returned_verbatim() {
    let server = MockServer::start().await;
    let raw = "  line one\n\n```\nline two\n```\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(raw)))
        .mount(&server)
        .await;

    let image = ImageData::new("QUJD", "image/jpeg");
    let text = client(&server)
        .recognize("m", "p", &image)
        .await
        .unwrap();
    assert_eq!(text, raw);
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let image = ImageData::new("QUJD", "image/jpeg");
    let err = client(&server)
        .recognize("m", "p", &image)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_choices_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let image = ImageData::new("QUJD", "image/jpeg");
    let err = client(&server)
        .recognize("m", "p", &image)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EmptyResponse), "got: {err:?}");
}

#[tokio::test]
async fn engine_resolves_first_listed_model_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models(&["llava-1.6", "other"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello World")))
        .expect(2)
        .mount(&server)
        .await;

    let options = LlmOcrOptions::builder()
        .api_key("test-api-key")
        .api_url(format!("{}/v1", server.uri()))
        .force_full_page_ocr(true)
        .build()
        .unwrap();
    let engine = LlmOcrModel::new(true, options).await.unwrap();
    assert_eq!(engine.model(), Some("llava-1.6"));

    let timings = Timings::new();
    for page_no in 0..2 {
        let page = engine.process_page(image_page(page_no), &timings).await;
        assert!(page.error.is_none());
        assert_eq!(page.cells.len(), 1);
        assert_eq!(page.cells[0].text, "Hello World");
    }
    assert_eq!(timings.get(OCR_TIMER_KEY).unwrap().count, 2);

    let requests = server.received_requests().await.unwrap();
    let chat: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/v1/chat/completions")
        .collect();
    let body: serde_json::Value = chat[0].body_json().unwrap();
    assert_eq!(body["model"], "llava-1.6");
    let url = body["messages"][0]["content"][1]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn engine_fails_when_service_lists_no_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(models(&[])))
        .mount(&server)
        .await;

    let options = LlmOcrOptions::builder()
        .api_key("test-api-key")
        .api_url(format!("{}/v1", server.uri()))
        .build()
        .unwrap();
    let err = LlmOcrModel::new(true, options).await.err().unwrap();
    assert!(matches!(err, OcrError::NoModelAvailable { .. }), "got: {err:?}");
}

#[tokio::test]
async fn http_failure_aborts_only_that_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let options = LlmOcrOptions::builder()
        .api_key("test-api-key")
        .api_url(format!("{}/v1", server.uri()))
        .model("gpt-4o-mini")
        .force_full_page_ocr(true)
        .build()
        .unwrap();
    let engine = LlmOcrModel::new(true, options).await.unwrap();

    let page = engine.process_page(image_page(0), &Timings::new()).await;
    assert!(page.cells.is_empty());
    let err = page.error.expect("page error recorded");
    assert_eq!(err.page(), 1);
    assert!(err.to_string().contains("500"), "got: {err}");
}
