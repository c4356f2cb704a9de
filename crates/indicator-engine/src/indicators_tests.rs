#[cfg(test)]
mod tests {
    use crate::indicators::*;
    use analyzer_core::PriceBar;
    use chrono::NaiveDate;

    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn sample_bars() -> Vec<PriceBar> {
        let prices = vec![
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 103.0, 100.0, 102.0),
            (102.0, 104.0, 101.0, 103.0),
            (103.0, 105.0, 102.0, 104.0),
            (104.0, 106.0, 103.0, 105.0),
            (105.0, 107.0, 104.0, 106.0),
            (106.0, 108.0, 105.0, 107.0),
            (107.0, 109.0, 106.0, 108.0),
            (108.0, 110.0, 107.0, 109.0),
            (109.0, 111.0, 108.0, 110.0),
            (110.0, 112.0, 109.0, 111.0),
            (111.0, 113.0, 110.0, 112.0),
            (112.0, 114.0, 111.0, 113.0),
            (113.0, 115.0, 112.0, 114.0),
            (114.0, 116.0, 113.0, 115.0),
        ];

        prices
            .into_iter()
            .enumerate()
            .map(|(i, (open, high, low, close))| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                adjusted_close: close,
                volume: 1_000_000,
            })
            .collect()
    }

    #[test]
    fn trailing_mean_full_window() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((trailing_mean(&data, 3) - 4.0).abs() < 1e-9); // (3+4+5)/3
    }

    #[test]
    fn trailing_mean_truncates_to_available_length() {
        let data = vec![2.0, 4.0];
        assert!((trailing_mean(&data, 20) - 3.0).abs() < 1e-9);
        assert_eq!(trailing_mean(&[], 20), 0.0);
    }

    #[test]
    fn sample_std_known_value() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sample variance of this set is 32/7.
        assert!((sample_std(&data) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(sample_std(&[1.0]), 0.0);
    }

    #[test]
    fn ema_tracks_uptrend() {
        let data: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let result = ema_series(&data, 3);

        assert_eq!(result.len(), data.len());
        for w in result.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn rsi_neutral_on_flat_series() {
        let data = vec![50.0; 30];
        assert!((rsi(&data, 14) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_maxed_on_pure_uptrend() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!((rsi(&data, 14) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_bounded_on_real_prices() {
        let value = rsi(&sample_prices(), 14);
        assert!(value >= 0.0 && value <= 100.0);
    }

    #[test]
    fn rsi_short_window_is_neutral() {
        assert_eq!(rsi(&[100.0, 101.0], 1), 50.0);
        assert_eq!(rsi(&[100.0], 14), 50.0);
    }

    #[test]
    fn bollinger_ordering() {
        let bands = bollinger(&sample_prices(), 10);
        assert!(bands.upper > bands.middle);
        assert!(bands.middle > bands.lower);
    }

    #[test]
    fn bollinger_narrow_on_constant_prices() {
        let data = vec![100.0; 20];
        let bands = bollinger(&data, 10);
        assert!((bands.upper - bands.lower).abs() < 1e-9);
    }

    #[test]
    fn bollinger_small_window_uses_full_series() {
        let data = vec![10.0, 20.0, 30.0, 40.0];
        let bands = bollinger(&data, 2);
        // Window below the floor of 5: middle must be the full-series mean.
        assert!((bands.middle - 25.0).abs() < 1e-9);
    }

    #[test]
    fn macd_requires_26_closes() {
        assert!(macd(&sample_prices()).is_none());

        let data: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.5).collect();
        let triple = macd(&data).unwrap();
        assert!((triple.histogram - (triple.line - triple.signal)).abs() < 1e-9);
        // Steady uptrend: fast EMA above slow EMA.
        assert!(triple.line > 0.0);
    }

    #[test]
    fn true_range_spans_gaps() {
        let mut bars = sample_bars();
        // Gap up: previous close far below today's low.
        bars[5].low = 120.0;
        bars[5].high = 125.0;
        let ranges = true_ranges(&bars);
        assert_eq!(ranges.len(), bars.len() - 1);
        // |low - prev_close| = 120 - 105 dominates high-low = 5.
        assert!((ranges[4] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn percent_changes_skip_zero_base() {
        let changes = percent_changes(&[100.0, 110.0, 0.0, 50.0]);
        assert_eq!(changes.len(), 2);
        assert!((changes[0] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn trend_strength_on_ramp_and_flat() {
        let ramp: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        assert!(trend_strength(&ramp) > 0.9);

        let falling: Vec<f64> = (0..40).map(|i| 100.0 - i as f64).collect();
        assert!(trend_strength(&falling) < -0.9);

        assert_eq!(trend_strength(&vec![50.0; 40]), 0.0);
        assert_eq!(trend_strength(&ramp[..19]), 0.0);
    }

    #[test]
    fn support_resistance_brackets_price() {
        // A wave: peaks near 110, troughs near 90, ending at 100.
        let bars: Vec<PriceBar> = (0..50)
            .map(|i| {
                let close = 100.0 + 10.0 * ((i as f64) * 0.6).sin();
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    adjusted_close: close,
                    volume: 1_000_000,
                }
            })
            .collect();

        let current = bars.last().unwrap().close;
        let levels = support_resistance(&bars, 50);
        assert!(levels.support < current);
        assert!(levels.resistance > current);
    }

    #[test]
    fn support_resistance_defaults_below_20_bars() {
        let bars = sample_bars();
        let levels = support_resistance(&bars, 50);
        let current = bars.last().unwrap().close;
        assert!((levels.support - current * 0.95).abs() < 1e-9);
        assert!((levels.resistance - current * 1.05).abs() < 1e-9);
    }

    #[test]
    fn monotone_highs_have_no_interior_resistance() {
        // Strictly rising bars: every interior bar is below a later high, so
        // the only local max candidates sit at the (excluded) edges.
        let bars = sample_bars();
        let mut extended = bars.clone();
        for i in 15..30 {
            let close = 115.0 + (i - 14) as f64;
            extended.push(PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adjusted_close: close,
                volume: 1_000_000,
            });
        }
        let current = extended.last().unwrap().close;
        let levels = support_resistance(&extended, 50);
        assert!((levels.resistance - current * 1.05).abs() < 1e-9);
    }
}
