//! tsx-analyzer: ingest TSX equity + Bank of Canada macro data into SQLite
//! and compute composite investment scores.
//!
//! Usage:
//!   tsx-analyzer ingest --all
//!   tsx-analyzer ingest --symbols RY.TO TD.TO
//!   tsx-analyzer ingest-macro
//!   tsx-analyzer analyze --all
//!   tsx-analyzer top --limit 10 --min-score 60
//!   tsx-analyzer status

mod config;
mod ingest;

use analyzer_orchestrator::StockAnalyzer;
use config::{AppConfig, TSX_SYMBOLS};
use market_data_client::{BankOfCanadaClient, YahooClient};
use market_store::MarketStore;
use std::sync::Arc;

fn flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn value_of<T: std::str::FromStr>(args: &[String], name: &str) -> Option<T> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn symbols_from_args(args: &[String]) -> Vec<String> {
    if let Some(idx) = args.iter().position(|a| a == "--symbols") {
        args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .map(|s| s.to_uppercase())
            .collect()
    } else {
        TSX_SYMBOLS.iter().map(|s| s.to_string()).collect()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tsx-analyzer ingest [--symbols A.TO B.TO | --all] [--dry-run]");
    eprintln!("  tsx-analyzer ingest-macro [--dry-run]");
    eprintln!("  tsx-analyzer analyze [--symbols A.TO B.TO | --all]");
    eprintln!("  tsx-analyzer top [--limit N] [--min-score N]");
    eprintln!("  tsx-analyzer status");
    eprintln!("  tsx-analyzer cleanup");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db PATH          SQLite database path (default: tsx_analyzer.db)");
    eprintln!("  --concurrency N    Parallel symbols (default: 4)");
    eprintln!("  --lookback N       Trading days of history to analyze (default: 252)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tsx_analyzer=info,analyzer_orchestrator=info,market_store=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().cloned() else {
        print_usage();
        std::process::exit(1);
    };

    let mut config = AppConfig::from_env();
    if let Some(db) = value_of::<String>(&args, "--db") {
        config.db_path = db;
    }
    if let Some(concurrency) = value_of(&args, "--concurrency") {
        config.concurrency = concurrency;
    }
    if let Some(lookback) = value_of(&args, "--lookback") {
        config.lookback_days = lookback;
    }
    let dry_run = flag(&args, "--dry-run");

    let store = Arc::new(MarketStore::connect(&config.database_url()).await?);

    match command.as_str() {
        "ingest" => {
            let symbols = symbols_from_args(&args);
            tracing::info!(
                "ingesting {} symbols into {} (dry_run={})",
                symbols.len(),
                config.db_path,
                dry_run
            );
            let client = Arc::new(YahooClient::new(
                config.rate_limit_delay,
                config.request_timeout,
            ));
            let outcome = ingest::ingest_symbols(
                client,
                Arc::clone(&store),
                &symbols,
                config.concurrency,
                dry_run,
            )
            .await;
            println!(
                "Ingested {} price rows across {} symbols ({} failed)",
                outcome.price_rows, outcome.symbols_updated, outcome.symbols_failed
            );
        }
        "ingest-macro" => {
            let client = BankOfCanadaClient::new(config.rate_limit_delay, config.request_timeout);
            let outcome = ingest::ingest_macro(&client, &store, dry_run).await;
            println!(
                "Ingested {} macro observations across {} series ({} failed)",
                outcome.price_rows, outcome.symbols_updated, outcome.symbols_failed
            );
        }
        "analyze" => {
            let symbols = symbols_from_args(&args);
            let analyzer = Arc::new(
                StockAnalyzer::new(Arc::clone(&store)).with_lookback(config.lookback_days),
            );
            let outcome = analyzer
                .analyze_batch(&symbols, config.concurrency, None)
                .await;

            println!(
                "Analyzed {} symbols ({} failed)\n",
                outcome.analyzed, outcome.failed
            );
            println!(
                "{:<4} {:<9} {:>5} {:>5} {:>9} {:>9} {:>7}  {}",
                "#", "SYMBOL", "SCORE", "RISK", "PRICE", "TARGET", "UPSIDE", "RECOMMENDATION"
            );
            for (i, report) in outcome.reports.iter().enumerate() {
                let r = &report.result;
                println!(
                    "{:<4} {:<9} {:>5} {:>5} {:>9.2} {:>9.2} {:>6.1}%  {}",
                    i + 1,
                    r.symbol,
                    r.total_score,
                    r.risk_score,
                    r.current_price,
                    r.target_price,
                    r.upside_potential * 100.0,
                    r.recommendation.as_str()
                );
            }
        }
        "top" => {
            let limit = value_of(&args, "--limit").unwrap_or(10usize);
            let min_score = value_of(&args, "--min-score").unwrap_or(60i64);
            let analyzer = StockAnalyzer::new(Arc::clone(&store));
            let top = analyzer.top_ranked(limit, min_score).await?;

            if top.is_empty() {
                println!("No stored analyses with total score >= {}", min_score);
            }
            for (i, ranked) in top.iter().enumerate() {
                let r = &ranked.result;
                println!(
                    "{:<4} {:<9} {:>5}  {:<16} {}",
                    i + 1,
                    r.symbol,
                    r.total_score,
                    r.recommendation.as_str(),
                    ranked.name.as_deref().unwrap_or("")
                );
            }
        }
        "status" => {
            let stats = store.database_stats().await?;
            println!("Database: {}", config.db_path);
            println!("  companies:        {}", stats.companies);
            println!("  price rows:       {}", stats.price_rows);
            println!("  fundamental rows: {}", stats.fundamental_rows);
            println!("  analysis rows:    {}", stats.analysis_rows);
            println!("  macro rows:       {}", stats.macro_rows);
        }
        "cleanup" => {
            store.cleanup_old_data(config.data_retention_days).await?;
            println!(
                "Removed analyses and logs older than {} days",
                config.data_retention_days
            );
        }
        other => {
            eprintln!("Unknown command: {}\n", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
