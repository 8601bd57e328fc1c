// src/generate/openai.rs
// =============================================================================
// TextGenerator backed by an OpenAI-compatible chat completions endpoint.
//
// Works with OpenAI itself and with any server speaking the same
// /v1/chat/completions format (local model servers, gateways, ...).
// =============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompt::{render_user_prompt, SYSTEM_PROMPT};
use super::{GenerationContext, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatCompletionsGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, context: &GenerationContext, guidance: &str) -> Result<String> {
        let user_prompt = render_user_prompt(context, guidance);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!(url = %url, model = %self.model, prompt_bytes = user_prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to the completions API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completions API request failed\n\nStatus: {}\nBody: {}", status, body);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completions API response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("Completions API returned no content"))
    }
}
