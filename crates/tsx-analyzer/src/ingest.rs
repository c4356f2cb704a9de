//! Ingestion driver: pulls company, fundamental and price data from Yahoo
//! Finance and macro series from the Bank of Canada, writing everything
//! through the store.

use analyzer_core::AnalysisError;
use chrono::{Duration as ChronoDuration, Utc};
use market_data_client::{BankOfCanadaClient, YahooClient};
use market_store::economic::BOC_SERIES;
use market_store::MarketStore;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Initial price backfill window when a symbol has no stored history.
const BACKFILL_YEARS: i64 = 5;
/// Macro series backfill window.
const MACRO_BACKFILL_YEARS: i64 = 10;

#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub symbols_updated: usize,
    pub symbols_failed: usize,
    pub price_rows: u64,
}

/// Updates company info, fundamentals and daily prices for each symbol.
/// Price fetches are incremental from the latest stored date.
pub async fn ingest_symbols(
    client: Arc<YahooClient>,
    store: Arc<MarketStore>,
    symbols: &[String],
    concurrency: usize,
    dry_run: bool,
) -> IngestOutcome {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for symbol in symbols {
        if client.pacer().daily_limit_reached() {
            tracing::warn!("daily rate limit reached, stopping ingestion at {}", symbol);
            break;
        }

        let client = Arc::clone(&client);
        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        let symbol = symbol.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire().await;
            let result = ingest_one(&client, &store, &symbol, dry_run).await;
            (symbol, result)
        });
    }

    let mut outcome = IngestOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((symbol, Ok(rows))) => {
                outcome.symbols_updated += 1;
                outcome.price_rows += rows;
                tracing::info!("{}: {} price rows ingested", symbol, rows);
            }
            Ok((symbol, Err(e))) => {
                outcome.symbols_failed += 1;
                tracing::warn!("ingestion failed for {}: {}", symbol, e);
            }
            Err(e) => {
                outcome.symbols_failed += 1;
                tracing::error!("ingestion task error: {}", e);
            }
        }
    }

    outcome
}

async fn ingest_one(
    client: &YahooClient,
    store: &MarketStore,
    symbol: &str,
    dry_run: bool,
) -> Result<u64, AnalysisError> {
    let today = Utc::now().date_naive();

    // Company profile and fundamentals share one quoteSummary fetch.
    match client.company(symbol).await {
        Ok(company) => {
            if !dry_run {
                store.upsert_company(&company).await?;
            }
        }
        Err(e) => tracing::warn!("no company profile for {}: {}", symbol, e),
    }

    match client.fundamentals(symbol).await {
        Ok(snapshot) => {
            if !dry_run {
                store.upsert_fundamentals(&snapshot).await?;
            }
        }
        Err(e) => tracing::warn!("no fundamentals for {}: {}", symbol, e),
    }

    let start = match store.latest_price_date(symbol).await? {
        Some(latest) => latest + ChronoDuration::days(1),
        None => today - ChronoDuration::days(BACKFILL_YEARS * 365),
    };

    if start > today {
        tracing::debug!("{} already up to date", symbol);
        return Ok(0);
    }

    // End is exclusive on the chart API, so reach one day past today.
    let result = client
        .price_history(symbol, start, today + ChronoDuration::days(1))
        .await;

    match result {
        Ok(bars) => {
            let rows = if dry_run {
                bars.len() as u64
            } else {
                store.insert_price_bars(symbol, &bars).await?
            };
            let range_start = bars.first().map(|b| b.date);
            let range_end = bars.last().map(|b| b.date);
            if !dry_run {
                store
                    .log_ingestion(symbol, "price_data", range_start, range_end, rows as i64, true, None)
                    .await?;
            }
            Ok(rows)
        }
        Err(e) => {
            if !dry_run {
                store
                    .log_ingestion(symbol, "price_data", None, None, 0, false, Some(&e.to_string()))
                    .await?;
            }
            Err(e)
        }
    }
}

/// Pulls every tracked Bank of Canada series, incrementally from the latest
/// stored observation. Sequential on purpose; the Valet API is small.
pub async fn ingest_macro(
    client: &BankOfCanadaClient,
    store: &MarketStore,
    dry_run: bool,
) -> IngestOutcome {
    let today = Utc::now().date_naive();
    let mut outcome = IngestOutcome::default();

    for series in BOC_SERIES {
        let start = match store.latest_macro_observation(series.code).await {
            Ok(Some(latest)) => latest.date + ChronoDuration::days(1),
            Ok(None) => today - ChronoDuration::days(MACRO_BACKFILL_YEARS * 365),
            Err(e) => {
                tracing::warn!("latest observation lookup failed for {}: {}", series.key, e);
                outcome.symbols_failed += 1;
                continue;
            }
        };

        if start > today {
            continue;
        }

        match client.observations(series.code, Some(start), Some(today)).await {
            Ok(observations) if observations.is_empty() => {}
            Ok(observations) => {
                if dry_run {
                    outcome.price_rows += observations.len() as u64;
                } else {
                    match store.upsert_macro_observations(series, &observations).await {
                        Ok(rows) => outcome.price_rows += rows,
                        Err(e) => {
                            tracing::warn!("failed to store {}: {}", series.key, e);
                            outcome.symbols_failed += 1;
                            continue;
                        }
                    }
                }
                outcome.symbols_updated += 1;
            }
            Err(e) => {
                tracing::warn!("failed to fetch {}: {}", series.key, e);
                outcome.symbols_failed += 1;
            }
        }
    }

    outcome
}
