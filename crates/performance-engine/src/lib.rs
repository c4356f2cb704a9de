use analyzer_core::{PerformanceMetrics, PeriodReturns, PriceBar};
use statrs::statistics::Statistics;

/// Trading-day offsets for the period returns.
const PERIOD_OFFSETS: [(Period, usize); 5] = [
    (Period::OneWeek, 5),
    (Period::OneMonth, 21),
    (Period::ThreeMonth, 63),
    (Period::SixMonth, 126),
    (Period::OneYear, 252),
];

/// Momentum weighting per period; recent performance counts more.
const MOMENTUM_WEIGHTS: [(Period, f64); 5] = [
    (Period::OneWeek, 0.3),
    (Period::OneMonth, 0.3),
    (Period::ThreeMonth, 0.2),
    (Period::SixMonth, 0.1),
    (Period::OneYear, 0.1),
];

const RISK_FREE_RATE: f64 = 0.02;
const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    OneWeek,
    OneMonth,
    ThreeMonth,
    SixMonth,
    OneYear,
}

/// Derives period returns, risk statistics and the momentum score from an
/// ordered daily price series.
pub struct PerformanceEngine;

impl PerformanceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Returns None below 10 bars; the scorers then treat the whole metric
    /// set as unknown.
    pub fn compute(&self, bars: &[PriceBar]) -> Option<PerformanceMetrics> {
        if bars.len() < 10 {
            tracing::debug!("only {} bars available, skipping performance metrics", bars.len());
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let current_price = *closes.last()?;

        let returns = Self::period_returns(&closes, current_price);

        let daily_returns: Vec<f64> = closes
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let (volatility, var_95, sharpe_ratio, max_drawdown, downside_deviation, sortino_ratio) =
            if daily_returns.len() > 10 {
                Self::risk_stats(&daily_returns)
            } else {
                // Too little history for meaningful risk statistics.
                (0.3, -0.05, 0.0, 0.0, 0.2, 0.0)
            };

        let momentum_score = Self::momentum_score(&returns);

        Some(PerformanceMetrics {
            returns,
            volatility,
            var_95,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            downside_deviation,
            momentum_score,
        })
    }

    /// A period return requires the series to be longer than the offset and a
    /// positive base price; otherwise the period stays absent.
    fn period_returns(closes: &[f64], current_price: f64) -> PeriodReturns {
        let mut returns = PeriodReturns::default();

        for (period, offset) in PERIOD_OFFSETS {
            if closes.len() > offset {
                let base = closes[closes.len() - offset - 1];
                if base > 0.0 {
                    let value = (current_price - base) / base;
                    match period {
                        Period::OneWeek => returns.one_week = Some(value),
                        Period::OneMonth => returns.one_month = Some(value),
                        Period::ThreeMonth => returns.three_month = Some(value),
                        Period::SixMonth => returns.six_month = Some(value),
                        Period::OneYear => returns.one_year = Some(value),
                    }
                }
            }
        }

        returns
    }

    fn risk_stats(daily_returns: &[f64]) -> (f64, f64, f64, f64, f64, f64) {
        let mean = daily_returns.mean();
        let volatility = daily_returns.std_dev() * TRADING_DAYS.sqrt();

        let var_95 = Self::percentile(daily_returns, 0.05);

        let excess_return = mean * TRADING_DAYS - RISK_FREE_RATE;
        let sharpe_ratio = if volatility > 0.0 {
            excess_return / volatility
        } else {
            0.0
        };

        let max_drawdown = Self::max_drawdown(daily_returns);

        let negative: Vec<f64> = daily_returns.iter().filter(|&&r| r < 0.0).copied().collect();
        let downside_deviation = if negative.len() >= 2 {
            negative.std_dev() * TRADING_DAYS.sqrt()
        } else {
            0.0
        };

        let sortino_ratio = if downside_deviation > 0.0 {
            excess_return / downside_deviation
        } else {
            0.0
        };

        (
            volatility,
            var_95,
            sharpe_ratio,
            max_drawdown,
            downside_deviation,
            sortino_ratio,
        )
    }

    /// Linear-interpolated percentile of the sample.
    fn percentile(values: &[f64], q: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let pos = q * (sorted.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        if lower == upper {
            return sorted[lower];
        }
        let weight = pos - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }

    /// Worst drop of the cumulative-return curve from its running maximum,
    /// expressed as a negative fraction.
    fn max_drawdown(daily_returns: &[f64]) -> f64 {
        let mut cumulative = 1.0;
        let mut running_max = 1.0;
        let mut max_dd = 0.0_f64;

        for r in daily_returns {
            cumulative *= 1.0 + r;
            if cumulative > running_max {
                running_max = cumulative;
            }
            if running_max > 0.0 {
                let drawdown = cumulative / running_max - 1.0;
                max_dd = max_dd.min(drawdown);
            }
        }

        max_dd
    }

    /// 0-100 momentum score: neutral baseline of 50 shifted by a weighted
    /// step function of the period returns. Missing periods contribute 0.
    fn momentum_score(returns: &PeriodReturns) -> f64 {
        let mut score = 50.0;

        for (period, weight) in MOMENTUM_WEIGHTS {
            let value = match period {
                Period::OneWeek => returns.one_week,
                Period::OneMonth => returns.one_month,
                Period::ThreeMonth => returns.three_month,
                Period::SixMonth => returns.six_month,
                Period::OneYear => returns.one_year,
            };
            let Some(r) = value else { continue };

            let contribution = if r > 0.20 {
                25.0
            } else if r > 0.10 {
                15.0
            } else if r > 0.05 {
                10.0
            } else if r > 0.0 {
                5.0
            } else if r > -0.05 {
                -5.0
            } else if r > -0.10 {
                -10.0
            } else {
                -20.0
            };

            score += contribution * weight;
        }

        score.clamp(0.0, 100.0)
    }
}

impl Default for PerformanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
