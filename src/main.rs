//! Rates CLI - Entry Point
//!
//! 1. Loads `.env` and configuration
//! 2. Queries the exchanges for the requested command
//! 3. Prints a JSON report on stdout (logs go to stderr)

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use rate_aggregator::config::{self, constants, logging, AppConfig};
use rate_aggregator::core::{
    compare_coins, ArbitrageClassifier, HistoryService, MultiExchangeAggregator, RateReport,
    Timeframe, DEFAULT_HISTORY_LIMIT,
};

#[derive(Parser)]
#[command(name = "rates", about = "Crypto rates across Binance, Coinbase and Kraken")]
struct Cli {
    /// YAML configuration file (missing file means built-in defaults)
    #[arg(long, env = "RATES_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare one pair across exchanges and flag arbitrage
    Rate {
        /// Cryptocurrency symbol (e.g., BTC)
        crypto: String,
        /// Fiat or quote symbol (e.g., USD)
        fiat: String,
        /// Exchanges to query (default: configured set)
        #[arg(short, long = "exchange")]
        exchanges: Vec<String>,
    },
    /// Compare several coins against one fiat currency
    Compare {
        /// Fiat or quote symbol (e.g., EUR)
        fiat: String,
        /// Two to ten coin symbols
        coins: Vec<String>,
    },
    /// Historical OHLC candles from Kraken
    History {
        symbol: String,
        market: String,
        /// 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w or 1M
        #[arg(short, long, default_value_t = Timeframe::OneDay)]
        timeframe: Timeframe,
        /// Number of most recent candles to return
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    logging::init_logging();

    let cli = Cli::parse();
    constants::log_configuration();

    let config = match config::load_config_or_default(&cli.config) {
        Ok(cfg) => {
            info!(
                path = %cli.config.display(),
                exchanges = ?cfg.exchanges.default,
                timeout_ms = cfg.exchanges.request_timeout_ms,
                "Configuration loaded"
            );
            cfg
        }
        Err(e) => {
            error!(error = %e, "Configuration failed");
            std::process::exit(1);
        }
    };

    let succeeded = match cli.command {
        Command::Rate {
            crypto,
            fiat,
            exchanges,
        } => run_rate(&config, &crypto, &fiat, &exchanges).await?,
        Command::Compare { fiat, coins } => run_compare(&config, &fiat, &coins).await?,
        Command::History {
            symbol,
            market,
            timeframe,
            limit,
        } => run_history(&config, &symbol, &market, timeframe, limit).await?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_rate(
    config: &AppConfig,
    crypto: &str,
    fiat: &str,
    exchanges: &[String],
) -> anyhow::Result<bool> {
    let aggregator = MultiExchangeAggregator::live(config.exchanges.clone());
    let classifier = ArbitrageClassifier::from_config(&config.arbitrage);

    let outcome = if exchanges.is_empty() {
        aggregator.aggregate_default(crypto, fiat).await
    } else {
        let names: Vec<&str> = exchanges.iter().map(String::as_str).collect();
        aggregator.aggregate_named(crypto, fiat, &names).await
    };

    let report = match &outcome {
        Ok(result) => RateReport::from_aggregate(result, &classifier),
        Err(e) => {
            error!(error = %e, "Rate request failed");
            RateReport::failure(e)
        }
    };
    println!("{}", report.to_json_pretty()?);
    Ok(report.is_success())
}

async fn run_compare(config: &AppConfig, fiat: &str, coins: &[String]) -> anyhow::Result<bool> {
    let aggregator = MultiExchangeAggregator::live(config.exchanges.clone());
    let coins: Vec<&str> = coins.iter().map(String::as_str).collect();

    match compare_coins(&aggregator, &coins, fiat).await {
        Ok(comparison) => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, "Comparison failed");
            println!("{}", RateReport::failure(&e).to_json_pretty()?);
            Ok(false)
        }
    }
}

async fn run_history(
    config: &AppConfig,
    symbol: &str,
    market: &str,
    timeframe: Timeframe,
    limit: usize,
) -> anyhow::Result<bool> {
    let service = HistoryService::live(&config.exchanges);

    match service.fetch_history(symbol, market, timeframe, limit).await {
        Ok(series) => {
            println!("{}", serde_json::to_string_pretty(&series)?);
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, "History request failed");
            println!("{}", RateReport::failure(&e).to_json_pretty()?);
            Ok(false)
        }
    }
}
