use crate::config::{PartialDataPolicy, Settings};
use crate::domain::recommendation::{PriceSnapshot, Recommendation, StockData};
use crate::domain::ticker::{extract_ticker, Ticker};
use crate::llm::error::LlmError;
use crate::llm::{prompts, LlmClient};
use crate::market::{MarketDataClient, MarketDataError};
use crate::news::{NewsClient, NewsError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("stock discovery failed: {0}")]
    Discovery(LlmError),

    #[error("no ticker symbol found in discovery text")]
    NoSymbol,

    #[error("market data fetch failed: {0}")]
    MarketData(MarketDataError),

    #[error("news fetch failed: {0}")]
    News(NewsError),

    #[error("stock analysis failed: {0}")]
    Analysis(LlmError),
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub discovery_max_tokens: u32,
    pub analysis_max_tokens: u32,
    pub news_max_articles: usize,
    pub partial_data: PartialDataPolicy,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            discovery_max_tokens: settings.discovery_max_tokens,
            analysis_max_tokens: settings.analysis_max_tokens,
            news_max_articles: settings.news_max_articles,
            partial_data: settings.partial_data,
        }
    }
}

/// Discovery, market data, news and analysis, run strictly in that order.
///
/// Nothing is shared between runs: every call starts the chain from scratch.
pub struct RecommendationPipeline {
    llm: Arc<dyn LlmClient>,
    market: Arc<dyn MarketDataClient>,
    news: Arc<dyn NewsClient>,
    options: PipelineOptions,
}

impl RecommendationPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        market: Arc<dyn MarketDataClient>,
        news: Arc<dyn NewsClient>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            llm,
            market,
            news,
            options,
        }
    }

    /// Wire up the production clients.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            crate::llm::client_from_settings(settings)?,
            Arc::new(crate::market::yahoo::YahooMarketData::new()?),
            Arc::new(crate::news::newsapi::NewsApiClient::from_settings(settings)?),
            PipelineOptions::from_settings(settings),
        ))
    }

    pub async fn run(&self) -> Result<Recommendation, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, provider = self.llm.name(), "discovering promising stock");

        let discovery = self
            .llm
            .complete(prompts::discovery_request(self.options.discovery_max_tokens))
            .await
            .map_err(PipelineError::Discovery)?;

        let symbol = extract_ticker(&discovery).ok_or(PipelineError::NoSymbol)?;
        tracing::info!(%run_id, %symbol, "discovered stock");

        self.analyse(run_id, symbol, discovery).await
    }

    /// Skip discovery and analyse a symbol chosen by the caller.
    pub async fn run_for_symbol(&self, symbol: Ticker) -> Result<Recommendation, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, %symbol, "analysing requested stock");

        let discovery = format!("Symbol: {symbol}\n(selected by the operator; discovery skipped)");
        self.analyse(run_id, symbol, discovery).await
    }

    async fn analyse(
        &self,
        run_id: Uuid,
        symbol: Ticker,
        discovery: String,
    ) -> Result<Recommendation, PipelineError> {
        let price = self.fetch_price(run_id, &symbol).await?;
        let headlines = self.fetch_headlines(run_id, &symbol).await?;

        let stock = StockData {
            symbol,
            price,
            headlines,
        };

        let analysis = self
            .llm
            .complete(prompts::analysis_request(
                &stock,
                self.options.analysis_max_tokens,
            ))
            .await
            .map_err(PipelineError::Analysis)?;

        tracing::info!(
            %run_id,
            symbol = %stock.symbol,
            has_price = stock.price.is_some(),
            headlines = stock.headlines.len(),
            "recommendation generated"
        );

        Ok(Recommendation {
            run_id,
            generated_at: chrono::Utc::now(),
            stock,
            discovery,
            analysis,
        })
    }

    async fn fetch_price(
        &self,
        run_id: Uuid,
        symbol: &Ticker,
    ) -> Result<Option<PriceSnapshot>, PipelineError> {
        match self.market.latest_price(symbol).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => match self.options.partial_data {
                PartialDataPolicy::Proceed => {
                    tracing::warn!(
                        %run_id,
                        %symbol,
                        source = self.market.name(),
                        error = %err,
                        "price unavailable; continuing without it"
                    );
                    Ok(None)
                }
                PartialDataPolicy::FailFast => Err(PipelineError::MarketData(err)),
            },
        }
    }

    async fn fetch_headlines(
        &self,
        run_id: Uuid,
        symbol: &Ticker,
    ) -> Result<Vec<String>, PipelineError> {
        let max = self.options.news_max_articles;
        match self.news.headlines(symbol.as_str(), max).await {
            Ok(headlines) if headlines.is_empty() => match self.options.partial_data {
                PartialDataPolicy::Proceed => Ok(headlines),
                PartialDataPolicy::FailFast => Err(PipelineError::News(NewsError::NoHeadlines)),
            },
            Ok(mut headlines) => {
                headlines.truncate(max);
                Ok(headlines)
            }
            Err(err) => match self.options.partial_data {
                PartialDataPolicy::Proceed => {
                    tracing::warn!(
                        %run_id,
                        %symbol,
                        source = self.news.name(),
                        error = %err,
                        "news unavailable; continuing without headlines"
                    );
                    Ok(Vec::new())
                }
                PartialDataPolicy::FailFast => Err(PipelineError::News(err)),
            },
        }
    }
}
