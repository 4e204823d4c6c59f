// AI Provider Service
// Implements the OpenAI-compatible chat call used by the structure classifier

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;
use thiserror::Error;

use crate::services::config_store::ConfigStore;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

/// Resolve the classification API key: environment first, then the config file.
pub fn get_api_key() -> Option<String> {
    if let Ok(key) = env::var("OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            return Some(key);
        }
    }
    let dir = ConfigStore::default_config_dir()?;
    ConfigStore::new(dir).get_api_key("openai").ok().flatten()
}

pub struct ProviderClient {
    client: Client,
    chat_url: String,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .build()
            .unwrap_or_default();

        let chat_url =
            env::var("BOOKSPLIT_AI_URL").unwrap_or_else(|_| OPENAI_DEFAULT_URL.to_string());

        Self { client, chat_url }
    }

    pub fn with_base_url(chat_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .build()
            .unwrap_or_default();

        Self {
            client,
            chat_url: chat_url.into(),
        }
    }

    /// One chat-completion round trip. `json_mode` requests a json_object
    /// response format (the structure prompt always contains "JSON").
    pub async fn call_chat(
        &self,
        model: &str,
        api_key: &str,
        system: &str,
        user: &str,
        max_tokens: i32,
        json_mode: bool,
    ) -> Result<ChatResult, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature: 0.3,
            response_format: if json_mode {
                Some(ResponseFormat {
                    r#type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .and_then(|mut c| if c.is_empty() { None } else { c.remove(0).message })
            .and_then(|m| m.content)
            .ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult {
            content,
            latency_ms: started.elapsed().as_millis() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_skips_absent_response_format() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: 16,
            temperature: 0.3,
            response_format: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn test_chat_response_parses_content() {
        let json = r#"{"choices":[{"message":{"content":"ok"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed.choices.unwrap().remove(0).message.unwrap().content;
        assert_eq!(content.as_deref(), Some("ok"));
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::ApiError {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }
}
