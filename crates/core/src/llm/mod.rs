pub mod anthropic;
pub mod error;
pub mod openai;
pub mod prompts;

use crate::config::{LlmProviderKind, Settings};
use crate::llm::error::LlmError;
use serde::de::DeserializeOwned;
use std::sync::Arc;

// Upstream error bodies are kept for logs only; cap what we hold on to.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send one system + user exchange and return the model's free text.
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError>;
}

pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    Ok(match settings.llm_provider {
        LlmProviderKind::OpenAi => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        LlmProviderKind::Anthropic => {
            Arc::new(anthropic::AnthropicClient::from_settings(settings)?)
        }
    })
}

pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &'static str,
    res: reqwest::Response,
) -> Result<T, LlmError> {
    let status = res.status();
    let text = res
        .text()
        .await
        .map_err(|source| LlmError::Transport { provider, source })?;

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited { provider });
    }
    if !status.is_success() {
        return Err(LlmError::Http {
            provider,
            status,
            body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    serde_json::from_str::<T>(&text).map_err(|e| LlmError::Decode {
        provider,
        detail: e.to_string(),
    })
}

pub(crate) fn non_blank(provider: &'static str, text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse { provider });
    }
    Ok(text)
}
