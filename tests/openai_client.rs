use onda_backend::agent::{
    AgentError, GenerationClient, ImageData, OpenAICompatibleLLM, Prompt, ResponseFormat,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: &str, timeout: Duration) -> OpenAICompatibleLLM {
    OpenAICompatibleLLM::new(
        "gpt-4o".to_string(),
        base_url.to_string(),
        "sk-test".to_string(),
        Some("org-1".to_string()),
        None,
        0.7,
        500,
        timeout,
    )
    .unwrap()
}

fn json_prompt() -> Prompt {
    Prompt {
        system: "You are a world-class copywriter.".to_string(),
        user: "Write copy".to_string(),
        format: ResponseFormat::Json,
        attachment: None,
    }
}

async fn server_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("OpenAI-Organization", "org-1"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"cta\":\"Go\"}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client(&server.uri(), Duration::from_secs(5))
        .generate(&json_prompt())
        .await
        .unwrap();
    assert_eq!(raw, "{\"cta\":\"Go\"}");
}

#[tokio::test]
async fn sends_image_as_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": [
                    {"type": "text", "text": "Describe"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,aGVsbG8="}}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "<div></div>"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = Prompt {
        system: "sys".to_string(),
        user: "Describe".to_string(),
        format: ResponseFormat::Text,
        attachment: Some(ImageData {
            bytes: b"hello".to_vec(),
            mime_type: "image/png".to_string(),
        }),
    };
    let raw = client(&server.uri(), Duration::from_secs(5))
        .generate(&prompt)
        .await
        .unwrap();
    assert_eq!(raw, "<div></div>");
}

#[tokio::test]
async fn unauthorized_is_auth_error() {
    let server = server_replying(
        ResponseTemplate::new(401)
            .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
    )
    .await;

    let err = client(&server.uri(), Duration::from_secs(5))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert_eq!(err, AgentError::Auth("Incorrect API key provided".to_string()));
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let server = server_replying(ResponseTemplate::new(429).set_body_string("slow down")).await;

    let err = client(&server.uri(), Duration::from_secs(5))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert_eq!(err, AgentError::RateLimited("HTTP 429: slow down".to_string()));
}

#[tokio::test]
async fn server_error_is_service_error() {
    let server = server_replying(ResponseTemplate::new(503)).await;

    let err = client(&server.uri(), Duration::from_secs(5))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Service(_)));
}

#[tokio::test]
async fn empty_choices_is_service_error() {
    let server =
        server_replying(ResponseTemplate::new(200).set_body_json(json!({"choices": []}))).await;

    let err = client(&server.uri(), Duration::from_secs(5))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert_eq!(err, AgentError::Service("response contained no content".to_string()));
}

#[tokio::test]
async fn slow_service_hits_timeout() {
    let server = server_replying(
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(3))
            .set_body_json(json!({"choices": [{"message": {"content": "{}"}}]})),
    )
    .await;

    let err = client(&server.uri(), Duration::from_millis(200))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Network(_)));
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    let err = client("http://127.0.0.1:9", Duration::from_secs(2))
        .generate(&json_prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Network(_)));
}
