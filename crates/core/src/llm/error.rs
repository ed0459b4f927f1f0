use reqwest::StatusCode;

/// Typed failure reasons for a completion call.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} API key is not a valid header value")]
    InvalidApiKey { provider: &'static str },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        source: reqwest::Error,
    },

    #[error("{provider} rate limited the request")]
    RateLimited { provider: &'static str },

    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {provider} response: {detail}")]
    Decode {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} returned an empty completion")]
    EmptyResponse { provider: &'static str },
}

impl LlmError {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::MissingApiKey { provider }
            | Self::InvalidApiKey { provider }
            | Self::Transport { provider, .. }
            | Self::RateLimited { provider }
            | Self::Http { provider, .. }
            | Self::Decode { provider, .. }
            | Self::EmptyResponse { provider } => provider,
        }
    }
}
