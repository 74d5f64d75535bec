use serde_json::json;
use unichat::{ChatClient, ChatError, ChatRequest, DEFAULT_MODELS};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn send_returns_openai_reply_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "stream": false,
            "messages": [{"role": "user", "content": "Hi"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::builder().openai_base_url(server.uri()).build();
    let request = ChatRequest::builder()
        .model("gpt-4o")
        .user_message("Hi")
        .build();

    let reply = client.send(&request, "sk-test").await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn send_returns_gemini_reply_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "g-test"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hel"}, {"text": "lo!"}]}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::builder().gemini_base_url(server.uri()).build();
    let request = ChatRequest::builder()
        .model("gemini-2.5-flash")
        .user_message("Hi")
        .build();

    let reply = client.send(&request, "g-test").await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn send_maps_error_payloads_to_chat_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached"},
        })))
        .mount(&server)
        .await;

    let client = ChatClient::builder().openai_base_url(server.uri()).build();
    let request = ChatRequest::builder()
        .model("gpt-4o")
        .user_message("Hi")
        .build();

    let error = client.send(&request, "sk-test").await.unwrap_err();
    assert!(matches!(error, ChatError::Transport(_)));
    assert!(error.to_string().contains("Rate limit reached"));
}

#[tokio::test]
async fn list_models_filters_and_orders_known_generations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "whisper-1"},
                {"id": "gpt-3.5-turbo"},
                {"id": "gpt-4o"},
                {"id": "text-embedding-3-small"},
                {"id": "gpt-4o-mini"},
            ],
        })))
        .mount(&server)
        .await;

    let client = ChatClient::builder().openai_base_url(server.uri()).build();
    let models = client.list_models("sk-test").await;

    let ids: Vec<&str> = models.iter().map(|model| model.value.as_str()).collect();
    assert_eq!(ids, vec!["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"]);
}

#[tokio::test]
async fn list_models_falls_back_when_the_endpoint_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ChatClient::builder().openai_base_url(server.uri()).build();
    let models = client.list_models("sk-test").await;

    assert_eq!(models.len(), DEFAULT_MODELS.len());
    assert_eq!(models[0].value, "gpt-4o");
    assert_eq!(models.last().unwrap().value, "gemini-2.5-flash");
}

#[tokio::test]
async fn list_models_falls_back_when_nothing_usable_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "whisper-1"}, {"id": "dall-e-3"}],
        })))
        .mount(&server)
        .await;

    let client = ChatClient::builder().openai_base_url(server.uri()).build();
    let models = client.list_models("sk-test").await;

    assert_eq!(models.len(), DEFAULT_MODELS.len());
}
