use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TextProvider;
use crate::errors::GatewayError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const NAME: &str = "openai";

/// Returned when the completion succeeds with empty content.
pub const NO_RESPONSE: &str = "No response.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI chat-completions adapter.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn error(message: impl Into<String>) -> GatewayError {
        GatewayError::Provider {
            provider: NAME.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        let res = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| Self::error(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            return Err(Self::error(format!(
                "HTTP {}: {}",
                status,
                res.text().await.unwrap_or_default()
            )));
        }
        let parsed: ChatResponse = res.json().await.map_err(|e| Self::error(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty());
        Ok(content.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    async fn spawn(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<(Option<String>, Value)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let log = log.clone();
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    log.lock().unwrap().push((auth, body));
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user_messages() {
        let (url, seen) = spawn(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "Done."}}]}),
        )
        .await;
        let provider = OpenAiProvider::new("sk-1", DEFAULT_MODEL).with_base_url(url);
        assert_eq!(provider.complete("sys", "do it").await.unwrap(), "Done.");

        let seen = seen.lock().unwrap();
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-1"));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "sys"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "do it"}));
    }

    #[tokio::test]
    async fn test_empty_content_maps_to_placeholder() {
        let (url, _) = spawn(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        )
        .await;
        let provider = OpenAiProvider::new("k", DEFAULT_MODEL).with_base_url(url);
        assert_eq!(provider.complete("s", "p").await.unwrap(), NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_rate_limit_is_provider_error() {
        let (url, _) = spawn(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})).await;
        let provider = OpenAiProvider::new("k", DEFAULT_MODEL).with_base_url(url);
        let err = provider.complete("s", "p").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
