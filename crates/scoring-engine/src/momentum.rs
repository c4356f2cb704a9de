//! Momentum and quality scorer, 0-30 points: recent performance (15) +
//! risk-adjusted returns (8) + drawdown management (3).

use analyzer_core::{MomentumBreakdown, PerformanceMetrics};

use crate::tables::{band, grade, Band};
use crate::MOMENTUM_MAX;

const ONE_MONTH_TABLE: [Band; 2] = [
    band(0.05, f64::INFINITY, 3, "Strong"),
    band(0.0, f64::INFINITY, 1, "Positive"),
];

const ONE_YEAR_TABLE: [Band; 3] = [
    band(0.15, f64::INFINITY, 4, "Excellent"),
    band(0.05, f64::INFINITY, 2, "Good"),
    band(0.0, f64::INFINITY, 1, "Positive"),
];

const SHARPE_TABLE: [Band; 3] = [
    band(1.0, f64::INFINITY, 6, "Excellent"),
    band(0.5, f64::INFINITY, 4, "Good"),
    band(0.0, f64::INFINITY, 2, "Positive"),
];

const SORTINO_TABLE: [Band; 2] = [
    band(1.0, f64::INFINITY, 2, "Excellent"),
    band(0.5, f64::INFINITY, 1, "Good"),
];

const DRAWDOWN_TABLE: [Band; 3] = [
    band(-0.1, f64::INFINITY, 3, "Excellent (<10%)"),
    band(-0.2, f64::INFINITY, 2, "Good (<20%)"),
    band(-0.3, f64::INFINITY, 1, "Acceptable (<30%)"),
];

pub fn score(performance: Option<&PerformanceMetrics>) -> (i64, MomentumBreakdown) {
    let Some(p) = performance else {
        return (0, unknown_breakdown());
    };

    // Recent performance (15 points): 2 per positive period, plus extra
    // weight on the 1-month and 1-year windows.
    let tracked = [
        p.returns.one_week,
        p.returns.one_month,
        p.returns.three_month,
        p.returns.one_year,
    ];
    let positive_periods = tracked
        .iter()
        .filter(|r| matches!(r, Some(v) if *v > 0.0))
        .count() as u32;
    let mut performance_score = positive_periods as i64 * 2;

    let (one_month_points, one_month_status) =
        grade(p.returns.one_month, &ONE_MONTH_TABLE, "Unknown", "Negative");
    performance_score += one_month_points;

    let (one_year_points, one_year_status) =
        grade(p.returns.one_year, &ONE_YEAR_TABLE, "Unknown", "Negative");
    performance_score += one_year_points;

    // Risk-adjusted returns (8 points)
    let (sharpe_points, sharpe_status) =
        grade(Some(p.sharpe_ratio), &SHARPE_TABLE, "Unknown", "Poor");
    let (sortino_points, sortino_status) = grade(
        Some(p.sortino_ratio),
        &SORTINO_TABLE,
        "Unknown",
        "Needs Improvement",
    );
    let risk_adjusted_score = sharpe_points + sortino_points;

    // Drawdown management (3 points)
    let (drawdown_score, drawdown_status) = grade(
        Some(p.max_drawdown),
        &DRAWDOWN_TABLE,
        "Unknown",
        "High Drawdown",
    );

    let total = (performance_score + risk_adjusted_score + drawdown_score).min(MOMENTUM_MAX);

    let breakdown = MomentumBreakdown {
        positive_periods,
        one_month_status,
        one_year_status,
        performance_score,
        sharpe_status,
        sortino_status,
        risk_adjusted_score,
        drawdown_status,
        drawdown_score,
    };

    (total, breakdown)
}

fn unknown_breakdown() -> MomentumBreakdown {
    MomentumBreakdown {
        positive_periods: 0,
        one_month_status: "Unknown",
        one_year_status: "Unknown",
        performance_score: 0,
        sharpe_status: "Unknown",
        sortino_status: "Unknown",
        risk_adjusted_score: 0,
        drawdown_status: "Unknown",
        drawdown_score: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::PeriodReturns;

    fn metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            returns: PeriodReturns::default(),
            volatility: 0.2,
            var_95: -0.02,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            max_drawdown: 0.0,
            downside_deviation: 0.1,
            momentum_score: 50.0,
        }
    }

    #[test]
    fn missing_performance_scores_zero() {
        let (total, breakdown) = score(None);
        assert_eq!(total, 0);
        assert_eq!(breakdown.sharpe_status, "Unknown");
        assert_eq!(breakdown.positive_periods, 0);
    }

    #[test]
    fn positive_periods_earn_two_each() {
        let mut p = metrics();
        p.returns.one_week = Some(0.01);
        p.returns.three_month = Some(0.02);
        // Six-month returns are not part of the tracked set.
        p.returns.six_month = Some(0.5);

        let (_, b) = score(Some(&p));
        assert_eq!(b.positive_periods, 2);
        assert_eq!(b.performance_score, 4);
    }

    #[test]
    fn strong_year_and_month() {
        let mut p = metrics();
        p.returns.one_month = Some(0.08);
        p.returns.one_year = Some(0.25);

        let (_, b) = score(Some(&p));
        assert_eq!(b.one_month_status, "Strong");
        assert_eq!(b.one_year_status, "Excellent");
        // 2 positive periods * 2 + 3 + 4
        assert_eq!(b.performance_score, 11);
    }

    #[test]
    fn sharpe_and_sortino_bands() {
        let mut p = metrics();
        p.sharpe_ratio = 1.2;
        p.sortino_ratio = 0.7;
        let (_, b) = score(Some(&p));
        assert_eq!(b.sharpe_status, "Excellent");
        assert_eq!(b.sortino_status, "Good");
        assert_eq!(b.risk_adjusted_score, 7);

        p.sharpe_ratio = -0.5;
        p.sortino_ratio = -0.5;
        let (_, b) = score(Some(&p));
        assert_eq!(b.sharpe_status, "Poor");
        assert_eq!(b.risk_adjusted_score, 0);
    }

    #[test]
    fn drawdown_bands() {
        let mut p = metrics();
        p.max_drawdown = -0.05;
        let (_, b) = score(Some(&p));
        assert_eq!(b.drawdown_score, 3);

        p.max_drawdown = -0.15;
        let (_, b) = score(Some(&p));
        assert_eq!(b.drawdown_score, 2);

        p.max_drawdown = -0.5;
        let (_, b) = score(Some(&p));
        assert_eq!(b.drawdown_score, 0);
        assert_eq!(b.drawdown_status, "High Drawdown");
    }

    #[test]
    fn best_case_stays_under_cap() {
        let mut p = metrics();
        p.returns.one_week = Some(0.10);
        p.returns.one_month = Some(0.10);
        p.returns.three_month = Some(0.10);
        p.returns.one_year = Some(0.30);
        p.sharpe_ratio = 2.0;
        p.sortino_ratio = 2.0;
        p.max_drawdown = -0.02;

        let (total, b) = score(Some(&p));
        // 8 + 3 + 4 performance, 8 risk-adjusted, 3 drawdown.
        assert_eq!(b.performance_score, 15);
        assert_eq!(total, 26);
        assert!(total <= MOMENTUM_MAX);
    }
}
