use crate::config::Settings;
use crate::news::{NewsClient, NewsError};
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const EVERYTHING_PATH: &str = "/v2/everything";
// Placeholder title NewsAPI returns for articles taken down by the publisher.
const REMOVED_TITLE: &str = "[Removed]";
const MAX_ERROR_BODY_CHARS: usize = 512;
// Removed and untitled articles are dropped after the fetch, so ask for spares.
const PAGE_SIZE_FACTOR: usize = 2;
const MAX_PAGE_SIZE: usize = 100;

/// Client for newsapi.org. The key travels in the `X-Api-Key` header so it never shows up
/// in request URLs or the error strings built from them.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.news_api_timeout_secs))
            .build()
            .context("failed to build news http client")?;

        Ok(Self {
            http,
            api_key: settings.news_api_key.clone(),
            base_url: settings.news_api_base_url.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), EVERYTHING_PATH)
    }
}

#[async_trait::async_trait]
impl NewsClient for NewsApiClient {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn headlines(&self, query: &str, max: usize) -> Result<Vec<String>, NewsError> {
        let api_key = self.api_key.as_deref().ok_or(NewsError::MissingApiKey)?;
        let page_size = max.saturating_mul(PAGE_SIZE_FACTOR).clamp(1, MAX_PAGE_SIZE);

        let res = self
            .http
            .get(self.url())
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", query.to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        let parsed = serde_json::from_str::<EverythingResponse>(&text);

        match parsed {
            Ok(body) if body.status == "error" => Err(NewsError::Api {
                code: body.code.unwrap_or_else(|| "unknown".to_string()),
                message: body.message.unwrap_or_default(),
            }),
            _ if !status.is_success() => Err(NewsError::Http {
                status,
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }),
            Ok(body) => Ok(titles(body.articles, max)),
            Err(e) => Err(NewsError::Decode(e.to_string())),
        }
    }
}

fn titles(articles: Vec<Article>, max: usize) -> Vec<String> {
    articles
        .into_iter()
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != REMOVED_TITLE)
        .take(max)
        .collect()
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, settings_with};
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn client_for(router: Router, api_key: Option<&str>) -> NewsApiClient {
        let base_url = serve(router).await;
        let mut pairs = vec![("NEWSAPI_BASE_URL", base_url)];
        if let Some(key) = api_key {
            pairs.push(("NEWSAPI_KEY", key.to_string()));
        }
        NewsApiClient::from_settings(&settings_with(&pairs)).unwrap()
    }

    #[tokio::test]
    async fn returns_first_titles_and_sends_key_in_header() {
        let router = Router::new().route(
            "/v2/everything",
            get(
                |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(
                        headers.get("x-api-key").and_then(|v| v.to_str().ok()),
                        Some("news-key")
                    );
                    assert!(!q.contains_key("apiKey"));
                    assert_eq!(q.get("q").map(String::as_str), Some("TICK"));
                    assert_eq!(q.get("sortBy").map(String::as_str), Some("publishedAt"));
                    assert_eq!(q.get("pageSize").map(String::as_str), Some("4"));
                    Json(json!({
                        "status": "ok",
                        "totalResults": 4,
                        "articles": [
                            {"title": "Company X announces partnership"},
                            {"title": "[Removed]"},
                            {"title": null},
                            {"title": "Analyst upgrades TICK to buy"},
                            {"title": "Third headline"}
                        ]
                    }))
                },
            ),
        );
        let client = client_for(router, Some("news-key")).await;

        let headlines = client.headlines("TICK", 2).await.unwrap();
        assert_eq!(
            headlines,
            vec![
                "Company X announces partnership".to_string(),
                "Analyst upgrades TICK to buy".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn removed_articles_do_not_shrink_the_headline_list() {
        let router = Router::new().route(
            "/v2/everything",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let page_size: usize = q["pageSize"].parse().unwrap();
                let articles: Vec<_> = ["[Removed]", "one", "  ", "two", "three", "four"]
                    .iter()
                    .take(page_size)
                    .map(|t| json!({"title": t}))
                    .collect();
                Json(json!({"status": "ok", "articles": articles}))
            }),
        );
        let client = client_for(router, Some("news-key")).await;

        let headlines = client.headlines("TICK", 3).await.unwrap();
        assert_eq!(headlines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn surfaces_api_error_payloads() {
        let router = Router::new().route(
            "/v2/everything",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "status": "error",
                        "code": "apiKeyInvalid",
                        "message": "Your API key is invalid or incorrect."
                    })),
                )
            }),
        );
        let client = client_for(router, Some("bad")).await;

        match client.headlines("TICK", 3).await.unwrap_err() {
            NewsError::Api { code, .. } => assert_eq!(code, "apiKeyInvalid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_failure_is_http_error() {
        let router = Router::new().route(
            "/v2/everything",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = client_for(router, Some("k")).await;

        assert!(matches!(
            client.headlines("TICK", 3).await.unwrap_err(),
            NewsError::Http { status, .. } if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = NewsApiClient::from_settings(&settings_with(&[(
            "NEWSAPI_BASE_URL",
            "http://127.0.0.1:9".to_string(),
        )]))
        .unwrap();
        assert!(matches!(
            client.headlines("TICK", 3).await.unwrap_err(),
            NewsError::MissingApiKey
        ));
    }
}
