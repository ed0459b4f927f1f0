use clap::Parser;
use anyhow::Context;
use tracing_subscriber::EnvFilter;
use sotd_core::domain::ticker::Ticker;
use sotd_core::pipeline::RecommendationPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One recommendation run from the command line, printed to stdout.
#[derive(Debug, Parser)]
#[command(name = "sotd_worker")]
struct Args {
    /// Analyse this ticker instead of asking the model to pick one.
    #[arg(long)]
    symbol: Option<Ticker>,

    /// Print the full recommendation as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sotd_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let missing = settings.missing_secrets();
    if !missing.is_empty() {
        tracing::warn!(?missing, "secrets missing; upstream calls will fail");
    }

    let pipeline = RecommendationPipeline::from_settings(&settings)?;

    let result = match args.symbol {
        Some(symbol) => pipeline.run_for_symbol(symbol).await,
        None => pipeline.run().await,
    };

    let rec = match result {
        Ok(rec) => rec,
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "recommendation run failed");
            return Err(err);
        }
    };

    tracing::info!(run_id = %rec.run_id, symbol = %rec.symbol(), "recommendation generated");

    if args.json {
        let out = serde_json::to_string_pretty(&rec).context("serialize recommendation failed")?;
        println!("{out}");
    } else {
        println!("{}", rec.text());
    }

    Ok(())
}

fn init_sentry(settings: &sotd_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbol_and_json_flags() {
        let args = Args::try_parse_from(["sotd_worker", "--symbol", "$aapl", "--json"]).unwrap();
        assert_eq!(args.symbol.as_ref().map(Ticker::as_str), Some("AAPL"));
        assert!(args.json);
    }

    #[test]
    fn rejects_invalid_symbol() {
        assert!(Args::try_parse_from(["sotd_worker", "--symbol", "TOOLONG"]).is_err());
    }

    #[test]
    fn defaults_to_discovery_and_text_output() {
        let args = Args::try_parse_from(["sotd_worker"]).unwrap();
        assert!(args.symbol.is_none());
        assert!(!args.json);
    }
}
