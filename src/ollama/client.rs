use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::{ChatRequest, ErrorBody, Message};
use crate::config::Config;

const ERROR_SNIPPET_BYTES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model not available: {0} (try `ollama pull`)")]
    ModelNotFound(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Prompt in, generated text out.
/// Implemented by `OllamaClient` for production; mock implementations used in tests.
pub trait TextGeneration {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    model: String,
    base_url: String,
}

impl OllamaClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            model: config.model.clone(),
            base_url: config.ollama_base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            model: "test-model".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGeneration for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status, &text);
            warn!(status = %status, error = %classified, "Ollama API error");
            return Err(classified);
        }

        let text = response.text().await?;

        debug!(model = %self.model, bytes = text.len(), "ollama generation complete");
        extract_text(&text)
    }
}

/// Uses `message.content` when the body carries it, the raw body otherwise.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let content = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/message/content")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });

    let text = content.unwrap_or_else(|| body.to_string());
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            let end = body.floor_char_boundary(ERROR_SNIPPET_BYTES);
            format!("HTTP {status}: {}", &body[..end])
        });

    if status == StatusCode::NOT_FOUND && message.contains("model") {
        return GenerationError::ModelNotFound(message);
    }
    GenerationError::Api {
        code: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_content() {
        let body = r#"{"model":"m","message":{"role":"assistant","content":"Paris."},"done":true}"#;
        assert_eq!(extract_text(body).unwrap(), "Paris.");
    }

    #[test]
    fn falls_back_to_raw_body_without_content_field() {
        let body = r#"{"model":"m","response":"Paris.","done":true}"#;
        assert_eq!(extract_text(body).unwrap(), body);
    }

    #[test]
    fn non_json_body_is_used_verbatim() {
        assert_eq!(extract_text("plain text answer").unwrap(), "plain text answer");
    }

    #[test]
    fn blank_content_is_empty_response() {
        let body = r#"{"message":{"role":"assistant","content":"  "}}"#;
        assert!(matches!(extract_text(body), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn classify_404_model_as_model_not_found() {
        let err = classify_status(
            StatusCode::NOT_FOUND,
            r#"{"error":"model \"llama9\" not found, try pulling it first"}"#,
        );
        assert!(matches!(err, GenerationError::ModelNotFound(ref m) if m.contains("llama9")));
    }

    #[test]
    fn classify_plain_500_keeps_snippet() {
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom") {
            GenerationError::Api { code, message } => {
                assert_eq!(code, 500);
                assert!(message.contains("boom"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }
}
