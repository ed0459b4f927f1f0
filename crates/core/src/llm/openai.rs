use crate::config::Settings;
use crate::llm::error::LlmError;
use crate::llm::{decode_response, non_blank, CompletionRequest, LlmClient};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "openai";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.openai_timeout_secs))
            .build()
            .context("failed to build OpenAI http client")?;

        Ok(Self {
            http,
            api_key: settings.openai_api_key.clone(),
            base_url: settings.openai_base_url.clone(),
            model: settings.openai_model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: PROVIDER })?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.user,
                },
            ],
            max_tokens: req.max_tokens,
        };

        let res = self
            .http
            .post(self.url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let parsed: ChatCompletionResponse = decode_response(PROVIDER, res).await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse { provider: PROVIDER })?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!(
                model = %self.model,
                max_tokens = req.max_tokens,
                "OpenAI completion hit max_tokens; text is truncated"
            );
        }

        non_blank(PROVIDER, choice.message.content.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
