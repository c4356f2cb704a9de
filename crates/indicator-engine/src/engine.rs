use analyzer_core::{AnalysisError, PriceBar, TechnicalIndicatorSet};

use crate::indicators::*;

/// Derives the full indicator set from an ordered daily price series.
///
/// Quality degrades gracefully: every rolling window truncates to the
/// available history, and below 10 bars a fixed default set is returned
/// instead of raising.
pub struct IndicatorEngine;

/// Below this many bars the engine falls back to the default indicator set.
const MIN_BARS: usize = 10;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, bars: &[PriceBar]) -> Result<TechnicalIndicatorSet, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "at least one price bar is required".to_string(),
            ));
        }

        if bars.len() < MIN_BARS {
            tracing::debug!(
                "only {} bars available, using default indicator set",
                bars.len()
            );
            return Ok(Self::default_set(bars));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        let current_price = *closes.last().unwrap_or(&0.0);
        let len = bars.len();

        let sma_20 = trailing_mean(&closes, 20);
        let sma_50 = trailing_mean(&closes, 50);
        let sma_200 = if len >= 200 {
            Some(trailing_mean(&closes, 200))
        } else {
            None
        };

        let rsi_window = 14.min(len / 3);
        let rsi = rsi(&closes, rsi_window);

        let bb_window = 20.min(len / 2);
        let bands = bollinger(&closes, bb_window);
        let bb_range = bands.upper - bands.lower;
        let bb_position = if bb_range > 0.0 {
            (current_price - bands.lower) / bb_range
        } else {
            0.5
        };

        let macd = macd(&closes);

        let volume_mean = trailing_mean(&volumes, 20.min(len));
        let volume_ratio = if volume_mean > 0.0 {
            volumes.last().unwrap_or(&0.0) / volume_mean
        } else {
            1.0
        };

        let ranges = true_ranges(bars);
        let atr = trailing_mean(&ranges, 14.min(len));

        let week_52_window = 252.min(len);
        let recent = &bars[len - week_52_window..];
        let week_52_high = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let week_52_low = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let week_52_position = if week_52_high > week_52_low {
            (current_price - week_52_low) / (week_52_high - week_52_low)
        } else {
            0.5
        };

        let trend_strength = trend_strength(&closes);
        let levels = support_resistance(bars, 50.min(len));

        let volatility = if len > 10 {
            sample_std(&percent_changes(&closes)) * (252.0_f64).sqrt()
        } else {
            0.3
        };

        Ok(TechnicalIndicatorSet {
            current_price,
            sma_20,
            sma_50,
            sma_200,
            rsi,
            bb_upper: bands.upper,
            bb_lower: bands.lower,
            bb_position,
            macd,
            volume_ratio,
            atr,
            week_52_high,
            week_52_low,
            week_52_position,
            trend_strength,
            support_level: levels.support,
            resistance_level: levels.resistance,
            volatility,
        })
    }

    /// Fixed fallback set for series shorter than 10 bars.
    fn default_set(bars: &[PriceBar]) -> TechnicalIndicatorSet {
        let current_price = bars.last().map(|b| b.close).unwrap_or(0.0);

        TechnicalIndicatorSet {
            current_price,
            sma_20: current_price,
            sma_50: current_price,
            sma_200: None,
            rsi: 50.0,
            bb_upper: current_price * 1.1,
            bb_lower: current_price * 0.9,
            bb_position: 0.5,
            macd: None,
            volume_ratio: 1.0,
            atr: current_price * 0.02,
            week_52_high: current_price,
            week_52_low: current_price,
            week_52_position: 0.5,
            trend_strength: 0.0,
            support_level: current_price * 0.95,
            resistance_level: current_price * 1.05,
            volatility: 0.3,
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: usize, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64);
        PriceBar {
            date,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            adjusted_close: close,
            volume: 1_000_000,
        }
    }

    fn flat_series(len: usize, price: f64) -> Vec<PriceBar> {
        (0..len).map(|i| bar(i, price)).collect()
    }

    fn linear_series(len: usize, start: f64, end: f64) -> Vec<PriceBar> {
        (0..len)
            .map(|i| {
                let t = i as f64 / (len - 1) as f64;
                bar(i, start + (end - start) * t)
            })
            .collect()
    }

    #[test]
    fn empty_series_is_an_error() {
        let engine = IndicatorEngine::new();
        assert!(matches!(
            engine.compute(&[]),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn short_series_returns_defaults() {
        let engine = IndicatorEngine::new();
        for len in 1..10 {
            let bars = flat_series(len, 50.0);
            let set = engine.compute(&bars).unwrap();
            assert_eq!(set.current_price, 50.0);
            assert_eq!(set.sma_20, 50.0);
            assert_eq!(set.sma_200, None);
            assert_eq!(set.rsi, 50.0);
            assert_eq!(set.bb_position, 0.5);
            assert!(set.macd.is_none());
            assert!((set.atr - 1.0).abs() < 1e-9);
            assert_eq!(set.week_52_position, 0.5);
            assert_eq!(set.trend_strength, 0.0);
            assert!((set.support_level - 47.5).abs() < 1e-9);
            assert!((set.resistance_level - 52.5).abs() < 1e-9);
            assert_eq!(set.volatility, 0.3);
        }
    }

    #[test]
    fn sma_200_present_only_with_enough_bars() {
        let engine = IndicatorEngine::new();

        let set = engine.compute(&linear_series(199, 100.0, 120.0)).unwrap();
        assert!(set.sma_200.is_none());

        let set = engine.compute(&linear_series(200, 100.0, 120.0)).unwrap();
        assert!(set.sma_200.is_some());
    }

    #[test]
    fn flat_series_is_neutral() {
        let engine = IndicatorEngine::new();
        let set = engine.compute(&flat_series(300, 50.0)).unwrap();

        assert!((set.rsi - 50.0).abs() < 1e-9);
        assert!(set.volatility.abs() < 1e-9);
        assert_eq!(set.trend_strength, 0.0);
        assert_eq!(set.bb_position, 0.5);
        assert_eq!(set.week_52_position, 0.5);
        assert_eq!(set.sma_20, 50.0);
        assert_eq!(set.sma_200, Some(50.0));
    }

    #[test]
    fn rising_series_trends_up() {
        let engine = IndicatorEngine::new();
        let set = engine.compute(&linear_series(252, 100.0, 200.0)).unwrap();

        assert!(set.current_price > set.sma_20);
        assert!(set.sma_20 > set.sma_50);
        assert!(set.sma_200.is_some());
        assert!(set.current_price > set.sma_200.unwrap());
        assert!(set.trend_strength > 0.9);
        assert!(set.rsi > 70.0);
        assert!(set.week_52_position > 0.95);
        let macd = set.macd.expect("252 bars should produce MACD");
        assert!(macd.line > macd.signal || macd.histogram >= 0.0);
    }

    #[test]
    fn macd_requires_26_bars() {
        let engine = IndicatorEngine::new();
        let set = engine.compute(&linear_series(25, 100.0, 110.0)).unwrap();
        assert!(set.macd.is_none());

        let set = engine.compute(&linear_series(26, 100.0, 110.0)).unwrap();
        assert!(set.macd.is_some());
    }

    #[test]
    fn volume_ratio_reflects_spike() {
        let engine = IndicatorEngine::new();
        let mut bars = flat_series(40, 80.0);
        bars.last_mut().unwrap().volume = 3_000_000;
        let set = engine.compute(&bars).unwrap();
        assert!(set.volume_ratio > 2.0);
    }

    #[test]
    fn bands_straddle_price_on_noisy_series() {
        let engine = IndicatorEngine::new();
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| bar(i, 100.0 + if i % 2 == 0 { 2.0 } else { -2.0 }))
            .collect();
        let set = engine.compute(&bars).unwrap();
        assert!(set.bb_upper > set.bb_lower);
        assert!(set.bb_position >= 0.0 && set.bb_position <= 1.0);
    }
}
