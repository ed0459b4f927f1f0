use crate::config::Settings;
use crate::llm::error::LlmError;
use crate::llm::{decode_response, non_blank, CompletionRequest, LlmClient};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.anthropic_timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: settings.anthropic_api_key.clone(),
            base_url: settings.anthropic_base_url.clone(),
            model: settings.anthropic_model.clone(),
        })
    }

    fn headers(api_key: &str) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| LlmError::InvalidApiKey { provider: PROVIDER })?;
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(headers)
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            match block {
                ContentBlock::Text { text } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                ContentBlock::Unknown => {
                    // Thinking and tool blocks carry no answer text.
                }
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: PROVIDER })?;

        let body = CreateMessageRequest {
            model: &self.model,
            max_tokens: req.max_tokens,
            system: Some(&req.system),
            messages: vec![Message {
                role: "user",
                content: &req.user,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(Self::headers(api_key)?)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let parsed: CreateMessageResponse = decode_response(PROVIDER, res).await?;
        if matches!(parsed.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                model = %self.model,
                max_tokens = req.max_tokens,
                "Anthropic stop_reason=max_tokens; text is truncated"
            );
        }

        non_blank(PROVIDER, Self::response_text(&parsed))
    }
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}
