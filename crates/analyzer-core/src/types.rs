use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. Immutable once stored; unique per (symbol, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
}

/// Snapshot of company fundamentals as of a date.
///
/// Every metric is optional: absence means "unknown", which the scorers treat
/// differently from a zero value (e.g. debt_to_equity of 0.0 is a debt-free
/// balance sheet, not missing data).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub symbol: String,
    pub date: NaiveDate,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub roe: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
}

/// Company reference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub employees: Option<i64>,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// A single observation of a macroeconomic series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroObservation {
    pub series_code: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// MACD line / signal / histogram, computed only with 26 or more bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdTriple {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Technical indicators at the evaluation instant. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicatorSet {
    pub current_price: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    /// Present only with at least 200 bars; never estimated on a shorter window.
    pub sma_200: Option<f64>,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// Position of price within the bands, 0 = lower band, 1 = upper band.
    pub bb_position: f64,
    pub macd: Option<MacdTriple>,
    pub volume_ratio: f64,
    pub atr: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
    pub week_52_position: f64,
    /// Normalized regression slope over the last 20 bars, in [-1, 1].
    pub trend_strength: f64,
    pub support_level: f64,
    pub resistance_level: f64,
    /// Annualized standard deviation of daily percent changes.
    pub volatility: f64,
}

/// Trailing returns by period. A field is None when the series is too short.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PeriodReturns {
    pub one_week: Option<f64>,
    pub one_month: Option<f64>,
    pub three_month: Option<f64>,
    pub six_month: Option<f64>,
    pub one_year: Option<f64>,
}

/// Performance and risk metrics at the evaluation instant. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub returns: PeriodReturns,
    pub volatility: f64,
    /// 5th percentile of daily returns.
    pub var_95: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Worst peak-to-trough loss of cumulative return, expressed negative.
    pub max_drawdown: f64,
    pub downside_deviation: f64,
    /// 0-100 with a neutral baseline of 50.
    pub momentum_score: f64,
}

/// Investment recommendation, strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "MODERATE BUY")]
    ModerateBuy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "WEAK HOLD")]
    WeakHold,
    #[serde(rename = "CONSIDER SELLING")]
    ConsiderSelling,
    #[serde(rename = "SELL")]
    Sell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::ModerateBuy => "MODERATE BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::WeakHold => "WEAK HOLD",
            Recommendation::ConsiderSelling => "CONSIDER SELLING",
            Recommendation::Sell => "SELL",
        }
    }

    /// Ordering rank: SELL = 0 up to STRONG BUY = 6.
    pub fn rank(&self) -> u8 {
        match self {
            Recommendation::Sell => 0,
            Recommendation::ConsiderSelling => 1,
            Recommendation::WeakHold => 2,
            Recommendation::Hold => 3,
            Recommendation::ModerateBuy => 4,
            Recommendation::Buy => 5,
            Recommendation::StrongBuy => 6,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "STRONG BUY" => Some(Recommendation::StrongBuy),
            "BUY" => Some(Recommendation::Buy),
            "MODERATE BUY" => Some(Recommendation::ModerateBuy),
            "HOLD" => Some(Recommendation::Hold),
            "WEAK HOLD" => Some(Recommendation::WeakHold),
            "CONSIDER SELLING" => Some(Recommendation::ConsiderSelling),
            "SELL" => Some(Recommendation::Sell),
            _ => None,
        }
    }
}

/// The persisted analysis row, one current row per (symbol, analysis_date).
///
/// Invariant: total_score == fundamental_score + technical_score +
/// momentum_score, each sub-score already clamped to its maximum. risk_score
/// is independent of total_score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub analysis_date: DateTime<Utc>,
    pub total_score: i64,
    pub fundamental_score: i64,
    pub technical_score: i64,
    pub momentum_score: i64,
    pub risk_score: i64,
    pub recommendation: Recommendation,
    pub current_price: f64,
    pub target_price: f64,
    pub conservative_buy_price: f64,
    pub aggressive_buy_price: f64,
    pub upside_potential: f64,
    pub risk_percentage: f64,
}

/// A stored analysis joined with company reference data, for ranking views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAnalysis {
    pub result: AnalysisResult,
    pub name: Option<String>,
    pub sector: Option<String>,
}

/// Qualitative labels for the fundamental scorer, one field per factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalBreakdown {
    pub pe_status: &'static str,
    pub pb_status: &'static str,
    pub peg_status: &'static str,
    pub valuation_score: i64,
    pub roe_status: &'static str,
    pub margin_status: &'static str,
    pub growth_status: &'static str,
    pub profitability_score: i64,
    pub debt_status: &'static str,
    pub dividend_status: &'static str,
    pub payout_status: &'static str,
    pub stability_score: i64,
}

/// Qualitative labels for the technical scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalBreakdown {
    pub sma_20_status: &'static str,
    pub sma_50_status: &'static str,
    pub sma_200_status: &'static str,
    pub ma_alignment: &'static str,
    pub trend_score: i64,
    pub rsi_status: &'static str,
    pub macd_status: &'static str,
    pub volume_status: &'static str,
    pub bb_status: &'static str,
    pub momentum_score: i64,
    pub week_52_status: &'static str,
    pub position_score: i64,
}

/// Qualitative labels for the momentum/quality scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentumBreakdown {
    pub positive_periods: u32,
    pub one_month_status: &'static str,
    pub one_year_status: &'static str,
    pub performance_score: i64,
    pub sharpe_status: &'static str,
    pub sortino_status: &'static str,
    pub risk_adjusted_score: i64,
    pub drawdown_status: &'static str,
    pub drawdown_score: i64,
}

/// Point contributions of each risk component; they sum to the risk score
/// before the 100 cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskBreakdown {
    pub volatility_risk: i64,
    pub beta_risk: i64,
    pub leverage_risk: i64,
    pub technical_risk: i64,
    pub drawdown_risk: i64,
}

/// Buy levels and target derived from the score inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPricing {
    pub current_price: f64,
    pub conservative_buy_price: f64,
    pub aggressive_buy_price: f64,
    pub target_price: f64,
    pub upside_potential: f64,
    pub support_level: f64,
    pub resistance_level: f64,
}

/// The full in-memory analysis: the persisted row plus everything that was
/// derived along the way.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub company_name: String,
    pub sector: String,
    pub pricing: TargetPricing,
    pub technical: TechnicalIndicatorSet,
    pub performance: Option<PerformanceMetrics>,
    pub fundamentals: Option<FundamentalSnapshot>,
    pub fundamental_breakdown: FundamentalBreakdown,
    pub technical_breakdown: TechnicalBreakdown,
    pub momentum_breakdown: MomentumBreakdown,
    pub risk_breakdown: RiskBreakdown,
}
