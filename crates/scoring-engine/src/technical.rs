//! Technical strength scorer, 0-30 points: trend (15) + momentum indicators
//! (10) + 52-week position (5).

use analyzer_core::{TechnicalBreakdown, TechnicalIndicatorSet};

use crate::tables::{band, grade, Band};
use crate::TECHNICAL_MAX;

const RSI_TABLE: [Band; 4] = [
    band(40.0, 60.0, 3, "Neutral Zone"),
    band(30.0, 70.0, 2, "Normal Range"),
    band(f64::NEG_INFINITY, 30.0, 1, "Oversold"),
    band(70.0, f64::INFINITY, 0, "Overbought"),
];

const VOLUME_TABLE: [Band; 2] = [
    band(1.5, f64::INFINITY, 2, "High Volume (Strong Interest)"),
    band(1.2, f64::INFINITY, 1, "Above Average Volume"),
];

const BB_TABLE: [Band; 3] = [
    band(0.3, 0.7, 3, "Middle of Bands (Stable)"),
    band(0.1, 0.9, 2, "Normal Range"),
    band(f64::NEG_INFINITY, 0.2, 1, "Near Lower Band (Potential Bounce)"),
];

const WEEK_52_TABLE: [Band; 4] = [
    band(0.5, 0.8, 5, "Strong Position (50-80% of range)"),
    band(0.3, 0.9, 3, "Good Position"),
    band(f64::NEG_INFINITY, 0.3, 2, "Near 52-week Low (Value Opportunity)"),
    band(f64::NEG_INFINITY, f64::INFINITY, 1, "Near 52-week High (Resistance)"),
];

pub fn score(technical: &TechnicalIndicatorSet) -> (i64, TechnicalBreakdown) {
    let current = technical.current_price;

    // Trend (15 points)
    let mut trend_score = 0;

    let sma_20_status = if current > technical.sma_20 {
        trend_score += 3;
        "Above SMA20"
    } else {
        "Below SMA20"
    };

    let sma_50_status = if current > technical.sma_50 {
        trend_score += 4;
        "Above SMA50"
    } else {
        "Below SMA50"
    };

    let sma_200_status = match technical.sma_200 {
        Some(sma_200) if current > sma_200 => {
            trend_score += 5;
            "Above SMA200 (Bull Market)"
        }
        Some(_) => "Below SMA200 (Bear Market)",
        None => "Insufficient Data",
    };

    let ma_alignment = if technical.sma_20 > technical.sma_50 {
        trend_score += 3;
        "Bullish Alignment"
    } else {
        "Bearish/Neutral"
    };

    // Momentum indicators (10 points)
    let mut momentum_score = 0;

    let (rsi_points, rsi_status) = grade(Some(technical.rsi), &RSI_TABLE, "Unknown", "Unknown");
    momentum_score += rsi_points;

    let macd_status = match technical.macd {
        Some(m) if m.line > m.signal => {
            momentum_score += 2;
            "Bullish Signal"
        }
        Some(_) => "Bearish Signal",
        None => "Unavailable",
    };

    let (volume_points, volume_status) = grade(
        Some(technical.volume_ratio),
        &VOLUME_TABLE,
        "Unknown",
        "Normal Volume",
    );
    momentum_score += volume_points;

    let (bb_points, bb_status) = grade(
        Some(technical.bb_position),
        &BB_TABLE,
        "Unknown",
        "Near Upper Band (Resistance)",
    );
    momentum_score += bb_points;

    // 52-week position (5 points)
    let (position_score, week_52_status) = grade(
        Some(technical.week_52_position),
        &WEEK_52_TABLE,
        "Unknown",
        "Unknown",
    );

    let total = (trend_score + momentum_score + position_score).min(TECHNICAL_MAX);

    let breakdown = TechnicalBreakdown {
        sma_20_status,
        sma_50_status,
        sma_200_status,
        ma_alignment,
        trend_score,
        rsi_status,
        macd_status,
        volume_status,
        bb_status,
        momentum_score,
        week_52_status,
        position_score,
    };

    (total, breakdown)
}
