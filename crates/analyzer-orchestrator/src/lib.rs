//! Per-symbol analysis pipeline: storage reads, the three engines, scoring,
//! target pricing, recommendation, and a single persistence write at the end.
//! Also the embarrassingly-parallel batch driver over many symbols.


use analyzer_core::{
    AnalysisError, AnalysisHistory, AnalysisReport, AnalysisResult, AnalysisSink, CompanyProvider,
    FundamentalsProvider, PriceHistoryProvider, RankedAnalysis,
};
use chrono::Utc;
use indicator_engine::IndicatorEngine;
use performance_engine::PerformanceEngine;
use scoring_engine::ScoringEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default price-history window: one trading year.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 252;

/// Everything the analyzer needs from storage.
pub trait AnalysisStore:
    PriceHistoryProvider
    + FundamentalsProvider
    + CompanyProvider
    + AnalysisSink
    + AnalysisHistory
    + Send
    + Sync
    + 'static
{
}

impl<T> AnalysisStore for T where
    T: PriceHistoryProvider
        + FundamentalsProvider
        + CompanyProvider
        + AnalysisSink
        + AnalysisHistory
        + Send
        + Sync
        + 'static
{
}

/// Outcome of a batch run. Per-symbol failures are counted, never fatal.
#[derive(Debug)]
pub struct BatchOutcome {
    pub analyzed: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// Successful reports, best total score first.
    pub reports: Vec<AnalysisReport>,
}

pub struct StockAnalyzer<S: AnalysisStore> {
    store: Arc<S>,
    indicator_engine: IndicatorEngine,
    performance_engine: PerformanceEngine,
    scoring_engine: ScoringEngine,
    lookback_days: u32,
}

impl<S: AnalysisStore> StockAnalyzer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            indicator_engine: IndicatorEngine::new(),
            performance_engine: PerformanceEngine::new(),
            scoring_engine: ScoringEngine::new(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Full analysis of one symbol.
    ///
    /// Requires at least one price bar; fundamentals and company metadata are
    /// optional and degrade the scores rather than failing the run. The
    /// result row is persisted exactly once, after every computation has
    /// succeeded.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!("analyzing {}", symbol);

        let bars = self.store.get_price_series(symbol, self.lookback_days).await?;
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no price data available for {}",
                symbol
            )));
        }

        let fundamentals = match self.store.get_latest_fundamentals(symbol).await {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("fundamentals lookup failed for {}: {}", symbol, e);
                None
            }
        };
        let company = match self.store.get_company(symbol).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("company lookup failed for {}: {}", symbol, e);
                None
            }
        };

        let technical = self.indicator_engine.compute(&bars)?;
        let performance = self.performance_engine.compute(&bars);

        let (fundamental_score, fundamental_breakdown) =
            self.scoring_engine.score_fundamentals(fundamentals.as_ref());
        let (technical_score, technical_breakdown) =
            self.scoring_engine.score_technicals(&technical);
        let (momentum_score, momentum_breakdown) =
            self.scoring_engine.score_momentum(performance.as_ref());
        let (risk_score, risk_breakdown) =
            self.scoring_engine
                .score_risk(&technical, performance.as_ref(), fundamentals.as_ref());

        // Sub-scores are already clamped to their maxima.
        let total_score = fundamental_score + technical_score + momentum_score;

        let pricing =
            self.scoring_engine
                .target_pricing(fundamentals.as_ref(), &technical, performance.as_ref());
        let recommendation =
            self.scoring_engine
                .recommend(total_score, risk_score, pricing.upside_potential);

        let (company_name, sector) = match &company {
            Some(c) => (
                c.name.clone().unwrap_or_else(|| symbol.to_string()),
                c.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
            ),
            None => (symbol.to_string(), "Unknown".to_string()),
        };

        let result = AnalysisResult {
            symbol: symbol.to_string(),
            analysis_date: Utc::now(),
            total_score,
            fundamental_score,
            technical_score,
            momentum_score,
            risk_score,
            recommendation,
            current_price: pricing.current_price,
            target_price: pricing.target_price,
            conservative_buy_price: pricing.conservative_buy_price,
            aggressive_buy_price: pricing.aggressive_buy_price,
            upside_potential: pricing.upside_potential,
            risk_percentage: risk_score as f64,
        };

        let report = AnalysisReport {
            result,
            company_name,
            sector,
            pricing,
            technical,
            performance,
            fundamentals,
            fundamental_breakdown,
            technical_breakdown,
            momentum_breakdown,
            risk_breakdown,
        };

        self.store.save_analysis(&report.result).await?;

        tracing::info!(
            "{}: total {} ({}), risk {}, {}",
            symbol,
            report.result.total_score,
            report.result.recommendation.as_str(),
            report.result.risk_score,
            report.company_name
        );

        Ok(report)
    }

    /// Analyzes many symbols concurrently. Symbols share no mutable state, so
    /// this is a bounded fan-out; each task gets its own analyzer over the
    /// shared store. The cancel flag is honored between symbols (best effort,
    /// already-running analyses complete).
    pub async fn analyze_batch(
        &self,
        symbols: &[String],
        concurrency: usize,
        cancel: Option<Arc<AtomicBool>>,
    ) -> BatchOutcome {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut cancelled = false;

        tracing::info!("starting batch analysis of {} symbols", symbols.len());

        for symbol in symbols {
            if cancel
                .as_ref()
                .map_or(false, |c| c.load(Ordering::Relaxed))
            {
                cancelled = true;
                tracing::warn!("batch analysis cancelled before {}", symbol);
                break;
            }

            let store = Arc::clone(&self.store);
            let lookback_days = self.lookback_days;
            let semaphore = Arc::clone(&semaphore);
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire().await;
                let analyzer = StockAnalyzer::new(store).with_lookback(lookback_days);
                let result = analyzer.analyze(&symbol).await;
                (symbol, result)
            });
        }

        let mut reports = Vec::new();
        let mut failed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(report))) => reports.push(report),
                Ok((symbol, Err(e))) => {
                    failed += 1;
                    tracing::warn!("analysis failed for {}: {}", symbol, e);
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("batch task error: {}", e);
                }
            }
        }

        reports.sort_by(|a, b| b.result.total_score.cmp(&a.result.total_score));

        tracing::info!(
            "batch complete: {} analyzed, {} failed{}",
            reports.len(),
            failed,
            if cancelled { ", cancelled" } else { "" }
        );

        BatchOutcome {
            analyzed: reports.len(),
            failed,
            cancelled,
            reports,
        }
    }

    /// Best stored analyses, filtered by a minimum total score.
    pub async fn top_ranked(
        &self,
        limit: usize,
        min_score: i64,
    ) -> Result<Vec<RankedAnalysis>, AnalysisError> {
        let all = self.store.all_latest_analyses().await?;
        Ok(all
            .into_iter()
            .filter(|r| r.result.total_score >= min_score)
            .take(limit)
            .collect())
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
