pub mod newsapi;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("news API key is not configured")]
    MissingApiKey,

    #[error("news request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("news API returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("news API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("failed to decode news response: {0}")]
    Decode(String),

    #[error("no headlines returned")]
    NoHeadlines,
}

#[async_trait::async_trait]
pub trait NewsClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Up to `max` headlines for `query`, most recent first.
    async fn headlines(&self, query: &str, max: usize) -> Result<Vec<String>, NewsError>;
}
