//! Risk scorer, 0-100, higher means riskier. Never blended into the total
//! score; the recommendation table reads it separately.

use analyzer_core::{FundamentalSnapshot, PerformanceMetrics, RiskBreakdown, TechnicalIndicatorSet};

use crate::RISK_MAX;

/// Assumed volatility / drawdown when no performance metrics exist, and the
/// market-neutral beta when the fundamentals do not provide one.
const DEFAULT_VOLATILITY: f64 = 0.3;
const DEFAULT_BETA: f64 = 1.0;

pub fn score(
    technical: &TechnicalIndicatorSet,
    performance: Option<&PerformanceMetrics>,
    fundamentals: Option<&FundamentalSnapshot>,
) -> (i64, RiskBreakdown) {
    // Volatility risk (0-30)
    let volatility = performance
        .map(|p| p.volatility)
        .unwrap_or(DEFAULT_VOLATILITY);
    let volatility_risk = if volatility > 0.6 {
        30
    } else if volatility > 0.4 {
        20
    } else if volatility > 0.25 {
        10
    } else {
        5
    };

    // Beta risk (0-20). A very low beta is also unusual, hence the 10.
    let beta = fundamentals.and_then(|f| f.beta).unwrap_or(DEFAULT_BETA);
    let beta_risk = if beta > 1.5 {
        20
    } else if beta > 1.2 {
        15
    } else if beta > 0.8 {
        5
    } else {
        10
    };

    // Leverage risk (0-25); unknown leverage is moderate risk, not zero.
    let leverage_risk = match fundamentals.and_then(|f| f.debt_to_equity) {
        None => 10,
        Some(d) if d > 1.5 => 25,
        Some(d) if d > 1.0 => 15,
        Some(d) if d > 0.5 => 5,
        Some(_) => 0,
    };

    // Technical extremes (0-15)
    let mut technical_risk = 0;
    let rsi = technical.rsi;
    if rsi > 80.0 || rsi < 20.0 {
        technical_risk += 8;
    } else if rsi > 70.0 || rsi < 30.0 {
        technical_risk += 4;
    }
    let bb = technical.bb_position;
    if bb > 0.9 || bb < 0.1 {
        technical_risk += 7;
    } else if bb > 0.8 || bb < 0.2 {
        technical_risk += 3;
    }

    // Drawdown risk (0-10)
    let max_drawdown = performance.map(|p| p.max_drawdown).unwrap_or(0.0);
    let drawdown_risk = if max_drawdown < -0.4 {
        10
    } else if max_drawdown < -0.3 {
        8
    } else if max_drawdown < -0.2 {
        5
    } else if max_drawdown < -0.1 {
        2
    } else {
        0
    };

    let breakdown = RiskBreakdown {
        volatility_risk,
        beta_risk,
        leverage_risk,
        technical_risk,
        drawdown_risk,
    };

    let total = (volatility_risk + beta_risk + leverage_risk + technical_risk + drawdown_risk)
        .min(RISK_MAX);

    (total, breakdown)
}
