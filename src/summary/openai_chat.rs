//! Minimal chat-completion client for the summarization call.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::retry::ApiCallError;

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    org_id: Option<String>,
}

impl ChatClient {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "{}/chat/completions",
            config.api_base_url.trim_end_matches('/')
        );
        info!("initialized chat client with endpoint {}", endpoint);

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
            org_id: config.org_id.clone(),
        }
    }

    /// One completion round: system instruction plus user prompt.
    pub async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, ApiCallError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(|e| {
            ApiCallError::Transient(anyhow!(e).context("chat completion request failed"))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiCallError::Transient(anyhow!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => body,
            };
            return Err(ApiCallError::from_status(
                status,
                anyhow!("chat completion failed with status {}: {}", status, message),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .context("failed to parse chat completion response")
            .map_err(ApiCallError::Permanent)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiCallError::Permanent(anyhow!("chat completion returned no choices")))?;

        debug!("chat completion returned {} chars", content.len());
        Ok(content)
    }
}
