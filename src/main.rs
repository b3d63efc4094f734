//! Moneyball model serving
//!
//! Prediction server and command-line tools for the edge engine.

use clap::{Parser, Subcommand};
use moneyball_serving::{
    api::{start_server, AppState},
    config::Config,
    edge::EdgeEngine,
    ml::PredictionExecutor,
    model::ModelRegistry,
    odds::{OddsFormat, OddsValue},
    types::{EdgeResponse, KellyResponse},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "moneyball")]
#[command(about = "Serve sports prediction models and evaluate betting edge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load models and start the prediction server
    Serve,
    /// List the models that would be served
    Models,
    /// Evaluate edge and expected value for one bet
    Edge {
        /// Model probability (0-1)
        #[arg(short, long)]
        probability: f64,
        /// Bookmaker odds, e.g. -110, 2.5 or 5/2
        #[arg(short, long, allow_hyphen_values = true)]
        odds: String,
        /// american, decimal or fractional
        #[arg(short, long, default_value = "american")]
        format: OddsFormat,
        /// Minimum edge to recommend a bet
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Stake used for expected value
        #[arg(short, long)]
        stake: Option<f64>,
    },
    /// Fractional Kelly stake as a share of bankroll
    Kelly {
        #[arg(short, long)]
        probability: f64,
        #[arg(short, long, allow_hyphen_values = true)]
        odds: String,
        #[arg(short, long, default_value = "american")]
        format: OddsFormat,
        /// Kelly multiplier (0.25 = quarter Kelly)
        #[arg(long)]
        fraction: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)))
        .init();

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Models => list_models(config),
        Commands::Edge {
            probability,
            odds,
            format,
            threshold,
            stake,
        } => evaluate_edge(config, probability, &odds, format, threshold, stake),
        Commands::Kelly {
            probability,
            odds,
            format,
            fraction,
        } => kelly(config, probability, &odds, format, fraction),
    }
}

/// CLI odds are numeric unless they look like a fraction
fn parse_odds(raw: &str) -> OddsValue {
    match raw.trim().parse::<f64>() {
        Ok(value) => OddsValue::Number(value),
        Err(_) => OddsValue::Text(raw.to_string()),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Moneyball prediction service");

    let registry = Arc::new(ModelRegistry::new(&config.models.dir));
    let registry_clone = registry.clone();
    tokio::task::spawn_blocking(move || registry_clone.load_all()).await?;

    let executor = PredictionExecutor::new(registry, config.models.slow_prediction_ms);
    let state = Arc::new(AppState::new(executor, EdgeEngine::new(config.edge.clone())));

    start_server(state, &config.server.host, config.server.port).await
}

fn list_models(config: Config) -> anyhow::Result<()> {
    let registry = ModelRegistry::new(&config.models.dir);
    let summary = registry.load_all();

    println!(
        "{} loaded, {} skipped, {} failed from {}",
        summary.loaded,
        summary.skipped,
        summary.failed,
        config.models.dir.display()
    );
    for version in registry.list_versions() {
        if let Some(info) = registry.model_info(&version) {
            let features = if info.expected_features.is_empty() {
                "alphabetical".to_string()
            } else {
                format!("{} features", info.expected_features.len())
            };
            println!("  {:<32} {:<22} {}", info.version, info.kind, features);
        }
    }
    Ok(())
}

fn evaluate_edge(
    config: Config,
    probability: f64,
    odds: &str,
    format: OddsFormat,
    threshold: Option<f64>,
    stake: Option<f64>,
) -> anyhow::Result<()> {
    let engine = EdgeEngine::new(config.edge);
    let calculation = engine.evaluate(probability, &parse_odds(odds), format, threshold, stake)?;

    let response = EdgeResponse {
        calculation: calculation.rounded(),
        kelly_stake: None,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn kelly(
    config: Config,
    probability: f64,
    odds: &str,
    format: OddsFormat,
    fraction: Option<f64>,
) -> anyhow::Result<()> {
    let engine = EdgeEngine::new(config.edge);
    let kelly_stake = engine.kelly_stake(probability, &parse_odds(odds), format, fraction)?;

    println!("{}", serde_json::to_string_pretty(&KellyResponse { kelly_stake })?);
    Ok(())
}
