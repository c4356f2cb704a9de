//! Recommendation decision table, evaluated top-down, first match wins.

use analyzer_core::Recommendation;

pub fn recommend(total_score: i64, risk_score: i64, upside_potential: f64) -> Recommendation {
    if total_score >= 80 && risk_score < 40 && upside_potential > 0.15 {
        Recommendation::StrongBuy
    } else if total_score >= 70 && risk_score < 50 && upside_potential > 0.10 {
        Recommendation::Buy
    } else if total_score >= 60 && risk_score < 60 {
        Recommendation::ModerateBuy
    } else if total_score >= 50 && risk_score < 70 {
        Recommendation::Hold
    } else if total_score >= 40 {
        Recommendation::WeakHold
    } else if total_score >= 30 {
        Recommendation::ConsiderSelling
    } else {
        Recommendation::Sell
    }
}
