use crate::{
    AnalysisError, AnalysisResult, CompanyInfo, FundamentalSnapshot, PriceBar, RankedAnalysis,
};
use async_trait::async_trait;

/// Source of ordered daily price history.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Returns up to `lookback_days` bars ordered by date ascending; an empty
    /// vec means no data is known for the symbol.
    async fn get_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, AnalysisError>;
}

/// Source of the most recent fundamental snapshot.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn get_latest_fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<FundamentalSnapshot>, AnalysisError>;
}

/// Source of company reference data.
#[async_trait]
pub trait CompanyProvider: Send + Sync {
    async fn get_company(&self, symbol: &str) -> Result<Option<CompanyInfo>, AnalysisError>;
}

/// Destination for finished analyses. Overwrite semantics keyed by
/// (symbol, analysis_date).
#[async_trait]
pub trait AnalysisSink: Send + Sync {
    async fn save_analysis(&self, result: &AnalysisResult) -> Result<(), AnalysisError>;
}

/// Read access to previously persisted analyses.
#[async_trait]
pub trait AnalysisHistory: Send + Sync {
    async fn get_latest_analysis(
        &self,
        symbol: &str,
    ) -> Result<Option<AnalysisResult>, AnalysisError>;

    /// Latest analysis per symbol, joined with company data, ordered by
    /// total score descending.
    async fn all_latest_analyses(&self) -> Result<Vec<RankedAnalysis>, AnalysisError>;
}
