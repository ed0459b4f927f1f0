use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use sotd_core::domain::recommendation::Recommendation;
use sotd_core::pipeline::RecommendationPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/stock", get(stock))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn render_template<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage;

async fn index() -> Response {
    render_template(&IndexPage)
}

struct RecommendationView {
    symbol: String,
    generated_at: String,
    text: String,
}

impl From<&Recommendation> for RecommendationView {
    fn from(rec: &Recommendation) -> Self {
        Self {
            symbol: rec.symbol().to_string(),
            generated_at: rec.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            text: rec.text(),
        }
    }
}

/// `None` renders the error branch.
#[derive(Template)]
#[template(path = "stock.html")]
struct StockPage {
    recommendation: Option<RecommendationView>,
}

async fn stock(State(state): State<AppState>) -> Response {
    match state.pipeline.run().await {
        Ok(rec) => render_template(&StockPage {
            recommendation: Some(RecommendationView::from(&rec)),
        }),
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "failed to generate stock recommendation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                render_template(&StockPage {
                    recommendation: None,
                }),
            )
                .into_response()
        }
    }
}
