pub mod fundamental;
pub mod momentum;
pub mod pricing;
pub mod recommendation;
pub mod risk;
mod tables;
pub mod technical;


use analyzer_core::{
    FundamentalBreakdown, FundamentalSnapshot, MomentumBreakdown, PerformanceMetrics,
    Recommendation, RiskBreakdown, TargetPricing, TechnicalBreakdown, TechnicalIndicatorSet,
};

/// Maximum value of each sub-score; totals are clamped here before summing.
pub const FUNDAMENTAL_MAX: i64 = 40;
pub const TECHNICAL_MAX: i64 = 30;
pub const MOMENTUM_MAX: i64 = 30;
pub const RISK_MAX: i64 = 100;

/// Table-driven scorer over fundamentals, technicals and performance metrics.
///
/// All four sub-scores are deterministic first-match threshold tables; a
/// missing input scores zero for that factor and is labeled Unknown rather
/// than being penalized.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fundamental health, 0-40.
    pub fn score_fundamentals(
        &self,
        fundamentals: Option<&FundamentalSnapshot>,
    ) -> (i64, FundamentalBreakdown) {
        fundamental::score(fundamentals)
    }

    /// Technical strength, 0-30.
    pub fn score_technicals(
        &self,
        technical: &TechnicalIndicatorSet,
    ) -> (i64, TechnicalBreakdown) {
        technical::score(technical)
    }

    /// Momentum and quality, 0-30.
    pub fn score_momentum(
        &self,
        performance: Option<&PerformanceMetrics>,
    ) -> (i64, MomentumBreakdown) {
        momentum::score(performance)
    }

    /// Risk, 0-100, higher means riskier. Independent of the total score.
    pub fn score_risk(
        &self,
        technical: &TechnicalIndicatorSet,
        performance: Option<&PerformanceMetrics>,
        fundamentals: Option<&FundamentalSnapshot>,
    ) -> (i64, RiskBreakdown) {
        risk::score(technical, performance, fundamentals)
    }

    /// Buy levels, target price and upside.
    pub fn target_pricing(
        &self,
        fundamentals: Option<&FundamentalSnapshot>,
        technical: &TechnicalIndicatorSet,
        performance: Option<&PerformanceMetrics>,
    ) -> TargetPricing {
        pricing::target_pricing(fundamentals, technical, performance)
    }

    /// Final recommendation from total score, risk score and upside.
    pub fn recommend(&self, total_score: i64, risk_score: i64, upside: f64) -> Recommendation {
        recommendation::recommend(total_score, risk_score, upside)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
