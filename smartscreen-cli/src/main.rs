//! SmartScreen CLI: trend-template stock screener.
//!
//! Commands:
//! - `screen`: screen the universe, or serve today's results from the cache
//! - `status`: report the refresh marker and the cached result set
//! - `fundamentals`: quarterly EPS and sales growth for given symbols

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use smartscreen_core::data::{CircuitBreaker, MarketDataSource, SyntheticProvider, Universe, YahooProvider};
use smartscreen_core::fundamentals::{FundamentalGrowth, FundamentalsSource};
use smartscreen_runner::{
    logging, run_screen, RefreshState, ResultCache, RunError, RunOptions, ScreenResult,
    ScreenRun, ScreenerConfig,
};

#[derive(Parser)]
#[command(
    name = "smartscreen",
    about = "SmartScreen CLI: trend-template stock screener"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./smartscreen.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the universe, or print cached results if already up to date.
    Screen {
        /// Screen even when the cache is fresh.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Tickers processed at once. Overrides the config file.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print results as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report the refresh marker and cached results.
    Status,
    /// Print quarterly EPS and sales growth.
    Fundamentals {
        /// Symbols without the market suffix (e.g., RELIANCE TCS).
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = ScreenerConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Screen {
            force,
            synthetic,
            concurrency,
            json,
        } => run_screen_cmd(config, force, synthetic, concurrency, json),
        Commands::Status => run_status(&config),
        Commands::Fundamentals { symbols } => run_fundamentals(&config, &symbols),
    }
}

fn yahoo_provider() -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    YahooProvider::new(circuit_breaker).context("failed to build HTTP client")
}

fn run_screen_cmd(
    mut config: ScreenerConfig,
    force: bool,
    synthetic: bool,
    concurrency: Option<usize>,
    json: bool,
) -> Result<()> {
    if let Some(n) = concurrency {
        config.pipeline.max_concurrency = n;
    }

    let source: Arc<dyn MarketDataSource> = if synthetic {
        tracing::warn!("using synthetic data, results are not real");
        Arc::new(SyntheticProvider::ending_today())
    } else {
        Arc::new(yahoo_provider()?)
    };

    let run = match run_screen(&config, source, RunOptions { force }) {
        Ok(run) => run,
        Err(RunError::Incomplete { summary, rows }) => {
            eprintln!(
                "Screen cut short: {} of {} ticker(s) refused. Partial results, not cached:",
                summary.refused, summary.universe
            );
            print_table(&rows);
            anyhow::bail!("screen incomplete, run again once the provider cools down");
        }
        Err(e) => return Err(e).context("screen failed"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&run.rows)?);
    } else {
        print_run(&run);
    }
    Ok(())
}

fn print_run(run: &ScreenRun) {
    let origin = if run.from_cache { "cache" } else { "fresh screen" };
    println!("As of {} ({origin})", run.as_of);
    if let Some(summary) = &run.summary {
        println!(
            "Universe: {}  Fetched: {}  Skipped: {}  Refused: {}  Passed: {}",
            summary.universe, summary.fetched, summary.skipped, summary.refused, summary.passed
        );
    }
    println!();
    print_table(&run.rows);
}

fn print_table(rows: &[ScreenResult]) {
    if rows.is_empty() {
        println!("No tickers passed the trend template.");
        return;
    }
    println!(
        "{:<16} {:>8} {:>12} {:<8} {:<12} {}",
        "Ticker", "RS", "Close", "New High", "52W History", "TradingView"
    );
    println!("{}", "-".repeat(100));
    for row in rows {
        println!(
            "{:<16} {:>8.4} {:>12.2} {:<8} {:<12} {}",
            row.ticker,
            row.relative_strength,
            row.close,
            if row.new_high { "Y" } else { "" },
            row.history_string(),
            row.chart_link,
        );
    }
}

fn run_status(config: &ScreenerConfig) -> Result<()> {
    let state = RefreshState::load(&config.state_file);
    let cache = ResultCache::new(&config.cache_file);

    println!("State file:     {}", config.state_file.display());
    println!("Refresh marker: {}", state.refresh_date);
    println!("Cache file:     {}", cache.path().display());

    if !cache.is_present() {
        println!("Cache:          absent");
        return Ok(());
    }
    match cache.load() {
        Some(rows) => println!("Cached rows:    {}", rows.len()),
        None => println!("Cache:          unreadable (will be rebuilt on next screen)"),
    }
    if let Some(meta) = cache.meta() {
        let age = chrono::Utc::now() - meta.saved_at;
        println!(
            "Saved at:       {} ({}h {}m ago)",
            meta.saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
            age.num_hours(),
            age.num_minutes() % 60
        );
    }
    Ok(())
}

fn run_fundamentals(config: &ScreenerConfig, symbols: &[String]) -> Result<()> {
    let provider = yahoo_provider()?;
    let universe = Universe::from_symbols(symbols, &config.market_suffix);
    let mut failures = 0usize;

    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>10}",
        "Ticker", "QoQ EPS", "QoQ Sales", "YoY EPS", "YoY Sales"
    );
    println!("{}", "-".repeat(60));
    for symbol in universe.symbols() {
        match provider.quarterly_income(symbol) {
            Ok(income) => {
                let growth = FundamentalGrowth::from_quarterly(&income);
                println!(
                    "{:<16} {:>10} {:>10} {:>10} {:>10}",
                    symbol,
                    fmt_pct(growth.qoq_eps),
                    fmt_pct(growth.qoq_sales),
                    fmt_pct(growth.yoy_eps),
                    fmt_pct(growth.yoy_sales),
                );
            }
            Err(e) => {
                eprintln!("Error for {symbol}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} symbol(s) failed", universe.len());
    }
    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}%"))
}
