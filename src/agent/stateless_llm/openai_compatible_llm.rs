use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::stateless_llm_interface::GenerationClient;
use crate::agent::error::AgentError;
use crate::agent::prompts::{Prompt, ResponseFormat};

/// Client for any service speaking the OpenAI `/chat/completions` protocol
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    organization_id: Option<String>,
    project_id: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatSpec>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAICompatibleLLM {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: String,
        base_url: String,
        api_key: String,
        organization_id: Option<String>,
        project_id: Option<String>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Network(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}, timeout={:?}",
            model, base_url, timeout
        );

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            organization_id,
            project_id,
            temperature,
            max_tokens,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        let user_content = match &prompt.attachment {
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text { text: &prompt.user },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.to_data_url(),
                    },
                },
            ]),
            None => MessageContent::Text(&prompt.user),
        };

        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(&prompt.system),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: match prompt.format {
                ResponseFormat::Json => Some(ResponseFormatSpec {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAICompatibleLLM {
    async fn generate(&self, prompt: &Prompt) -> Result<String, AgentError> {
        let request = self.build_request(prompt);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request);
        if let Some(org) = &self.organization_id {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project_id {
            builder = builder.header("OpenAI-Project", project);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::Service(format!("unexpected response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Service("response contained no content".to_string()))?;

        debug!("Generation returned {} bytes", content.len());
        Ok(content)
    }
}

/// Map a non-success HTTP status to the matching error kind
fn classify_failure(status: StatusCode, body: &str) -> AgentError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {}: {}", status.as_u16(), body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(message),
        _ => AgentError::Service(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input_types::ImageData;
    use serde_json::json;

    fn llm() -> OpenAICompatibleLLM {
        OpenAICompatibleLLM::new(
            "gpt-4o".to_string(),
            "https://api.openai.com/v1/".to_string(),
            "sk-test".to_string(),
            None,
            None,
            0.7,
            500,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn json_prompts_request_json_object() {
        let llm = llm();
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "hello".to_string(),
            format: ResponseFormat::Json,
            attachment: None,
        };
        let body = serde_json::to_value(llm.build_request(&prompt)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hello"}
                ],
                "temperature": 0.7f32,
                "max_tokens": 500,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn attachments_become_image_parts() {
        let llm = llm();
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "what is this".to_string(),
            format: ResponseFormat::Text,
            attachment: Some(ImageData {
                bytes: b"hello".to_vec(),
                mime_type: "image/png".to_string(),
            }),
        };
        let body = serde_json::to_value(llm.build_request(&prompt)).unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(
            body["messages"][1]["content"],
            json!([
                {"type": "text", "text": "what is this"},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,aGVsbG8="}}
            ])
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(llm().base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        let body = json!({"error": {"message": "nope"}}).to_string();
        assert_eq!(
            classify_failure(StatusCode::UNAUTHORIZED, &body),
            AgentError::Auth("nope".into())
        );
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, &body),
            AgentError::RateLimited("nope".into())
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream down"),
            AgentError::Service("HTTP 502: upstream down".into())
        );
    }
}
