//! Target price synthesis and buy levels.

use analyzer_core::{FundamentalSnapshot, PerformanceMetrics, TargetPricing, TechnicalIndicatorSet};

/// Momentum score assumed when no performance metrics are available.
const NEUTRAL_MOMENTUM: f64 = 50.0;

/// Builds the buy levels and a target price from up to three candidate
/// estimates: a PE-implied fair value, the technical resistance, and the
/// momentum-adjusted 52-week high. The final target is kept inside
/// [price * 1.05, price * 2.0].
pub fn target_pricing(
    fundamentals: Option<&FundamentalSnapshot>,
    technical: &TechnicalIndicatorSet,
    performance: Option<&PerformanceMetrics>,
) -> TargetPricing {
    let current_price = technical.current_price;
    let support_level = technical.support_level;
    let resistance_level = technical.resistance_level;

    let conservative_buy_price = (current_price * 0.85).min(support_level);
    let aggressive_buy_price = current_price * 0.90;

    let mut candidates: Vec<f64> = Vec::new();

    // PE-implied fair value at a growth-derived fair multiple. A zero or
    // negative trailing PE makes the implied EPS meaningless, so those are
    // excluded outright.
    if let Some(f) = fundamentals {
        if let (Some(pe), Some(growth)) = (f.pe_ratio, f.earnings_growth) {
            if pe > 0.0 {
                let fair_pe = (growth * 100.0 * 0.8).clamp(10.0, 25.0);
                let estimated_eps = current_price / pe;
                candidates.push(estimated_eps * fair_pe);
            }
        }
    }

    // Technical resistance, only when it sits above the current price.
    if resistance_level > current_price {
        candidates.push(resistance_level);
    }

    // 52-week high stretched or discounted by momentum.
    if technical.week_52_high > 0.0 {
        let momentum = performance
            .map(|p| p.momentum_score)
            .unwrap_or(NEUTRAL_MOMENTUM);
        let adjusted = if momentum > 70.0 {
            technical.week_52_high * 1.1
        } else if momentum > 50.0 {
            technical.week_52_high
        } else {
            technical.week_52_high * 0.9
        };
        candidates.push(adjusted);
    }

    let raw_target = if candidates.is_empty() {
        current_price * 1.15
    } else {
        candidates.iter().sum::<f64>() / candidates.len() as f64
    };

    // At least 5% upside, at most a double.
    let target_price = (current_price * 1.05).max(raw_target.min(current_price * 2.0));

    let upside_potential = if current_price > 0.0 {
        (target_price - current_price) / current_price
    } else {
        0.0
    };

    TargetPricing {
        current_price,
        conservative_buy_price,
        aggressive_buy_price,
        target_price,
        upside_potential,
        support_level,
        resistance_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::PeriodReturns;
    use chrono::NaiveDate;

    fn technicals() -> TechnicalIndicatorSet {
        TechnicalIndicatorSet {
            current_price: 100.0,
            sma_20: 100.0,
            sma_50: 100.0,
            sma_200: None,
            rsi: 50.0,
            bb_upper: 110.0,
            bb_lower: 90.0,
            bb_position: 0.5,
            macd: None,
            volume_ratio: 1.0,
            atr: 2.0,
            week_52_high: 120.0,
            week_52_low: 80.0,
            week_52_position: 0.5,
            trend_strength: 0.0,
            support_level: 92.0,
            resistance_level: 112.0,
            volatility: 0.2,
        }
    }

    fn performance(momentum_score: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            returns: PeriodReturns::default(),
            volatility: 0.2,
            var_95: -0.02,
            sharpe_ratio: 0.5,
            sortino_ratio: 0.5,
            max_drawdown: -0.1,
            downside_deviation: 0.1,
            momentum_score,
        }
    }

    fn with_pe(pe: f64, growth: f64) -> FundamentalSnapshot {
        FundamentalSnapshot {
            symbol: "ENB.TO".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            pe_ratio: Some(pe),
            earnings_growth: Some(growth),
            ..Default::default()
        }
    }

    #[test]
    fn conservative_buy_is_the_lower_of_discount_and_support() {
        let mut t = technicals();
        t.support_level = 80.0;
        let p = target_pricing(None, &t, None);
        assert!((p.conservative_buy_price - 80.0).abs() < 1e-9);

        t.support_level = 99.0;
        let p = target_pricing(None, &t, None);
        assert!((p.conservative_buy_price - 85.0).abs() < 1e-9);
        assert!((p.aggressive_buy_price - 90.0).abs() < 1e-9);
    }

    #[test]
    fn averages_resistance_and_week_52_high() {
        // Neutral momentum (50 is not > 50): 52-week high discounted to 108;
        // resistance 112; mean 110.
        let p = target_pricing(None, &technicals(), Some(&performance(50.0)));
        assert!((p.target_price - 110.0).abs() < 1e-9);
        assert!((p.upside_potential - 0.10).abs() < 1e-9);
    }

    #[test]
    fn strong_momentum_stretches_the_high() {
        // 120 * 1.1 = 132, resistance 112; mean 122.
        let p = target_pricing(None, &technicals(), Some(&performance(80.0)));
        assert!((p.target_price - 122.0).abs() < 1e-9);
    }

    #[test]
    fn pe_candidate_joins_the_average() {
        // fair_pe = clamp(0.1 * 100 * 0.8, 10, 25) = 10; eps = 100/15;
        // candidate = 66.67. With resistance 112 and the discounted high 108
        // the mean is 95.6, pushed up to the 5% floor.
        let f = with_pe(15.0, 0.1);
        let p = target_pricing(Some(&f), &technicals(), Some(&performance(40.0)));
        assert!((p.target_price - 105.0).abs() < 1e-9);
    }

    #[test]
    fn negative_pe_is_excluded() {
        let f = with_pe(-8.0, 0.2);
        let neutral = target_pricing(None, &technicals(), Some(&performance(40.0)));
        let with_neg = target_pricing(Some(&f), &technicals(), Some(&performance(40.0)));
        assert_eq!(neutral.target_price, with_neg.target_price);
    }

    #[test]
    fn target_clamped_to_five_percent_floor_and_double_ceiling() {
        // Resistance barely above price and a deeply discounted high: floor.
        let mut t = technicals();
        t.resistance_level = 100.5;
        t.week_52_high = 101.0;
        let p = target_pricing(None, &t, Some(&performance(10.0)));
        assert!((p.target_price - 105.0).abs() < 1e-9);

        // Absurdly high resistance: ceiling at 2x.
        let mut t = technicals();
        t.resistance_level = 500.0;
        t.week_52_high = 400.0;
        let p = target_pricing(None, &t, Some(&performance(80.0)));
        assert!((p.target_price - 200.0).abs() < 1e-9);
    }

    #[test]
    fn missing_performance_defaults_to_neutral_momentum() {
        // momentum 50 => 52-week high * 0.9.
        let with_none = target_pricing(None, &technicals(), None);
        let with_neutral = target_pricing(None, &technicals(), Some(&performance(50.0)));
        assert_eq!(with_none.target_price, with_neutral.target_price);
    }
}
