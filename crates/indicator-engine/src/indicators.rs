use analyzer_core::{MacdTriple, PriceBar};

/// Mean of the trailing `window` values. The window is truncated to whatever
/// is available, so short series never panic.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let w = window.min(values.len()).max(1);
    let tail = &values[values.len() - w..];
    tail.iter().sum::<f64>() / w as f64
}

/// Sample standard deviation (n-1 denominator); 0 below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Exponential moving average over the full series, seeded with the first value.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return vec![];
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    result.push(values[0]);
    for i in 1..values.len() {
        let prev = result[i - 1];
        result.push((values[i] - prev) * multiplier + prev);
    }
    result
}

/// Latest RSI over the trailing `window` price changes.
///
/// Uses simple (not Wilder-smoothed) averages of gains and losses, matching
/// a rolling-mean formulation. A window below 2 yields the neutral 50; a
/// loss-free window yields 100; a flat window yields 50.
pub fn rsi(closes: &[f64], window: usize) -> f64 {
    if window < 2 || closes.len() < 2 {
        return 50.0;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let w = window.min(deltas.len());
    let tail = &deltas[deltas.len() - w..];

    let avg_gain = tail.iter().filter(|&&d| d > 0.0).sum::<f64>() / w as f64;
    let avg_loss = tail.iter().filter(|&&d| d < 0.0).map(|d| d.abs()).sum::<f64>() / w as f64;

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Bollinger band levels at the evaluation instant.
#[derive(Debug, Clone, Copy)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Mean +/- 2 standard deviations over the trailing `window` closes.
/// Windows below 5 fall back to the full series.
pub fn bollinger(closes: &[f64], window: usize) -> BollingerBands {
    let slice = if window >= 5 && closes.len() >= window {
        &closes[closes.len() - window..]
    } else {
        closes
    };

    let middle = slice.iter().sum::<f64>() / slice.len().max(1) as f64;
    let std = sample_std(slice);

    BollingerBands {
        upper: middle + 2.0 * std,
        middle,
        lower: middle - 2.0 * std,
    }
}

/// Latest MACD triple (EMA12 - EMA26, EMA9 signal of that difference).
/// None below 26 bars.
pub fn macd(closes: &[f64]) -> Option<MacdTriple> {
    if closes.len() < 26 {
        return None;
    }

    let ema_12 = ema_series(closes, 12);
    let ema_26 = ema_series(closes, 26);
    let macd_line: Vec<f64> = ema_12
        .iter()
        .zip(ema_26.iter())
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema_series(&macd_line, 9);

    let line = *macd_line.last()?;
    let signal = *signal_line.last()?;
    Some(MacdTriple {
        line,
        signal,
        histogram: line - signal,
    })
}

/// True range series: max(high-low, |high-prev_close|, |low-prev_close|).
/// One entry per bar after the first.
pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let high_low = w[1].high - w[1].low;
            let high_close = (w[1].high - w[0].close).abs();
            let low_close = (w[1].low - w[0].close).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect()
}

/// Daily percent changes of the close series. A zero previous close
/// contributes nothing rather than dividing by zero.
pub fn percent_changes(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Least-squares slope of close against bar index over the last 20 bars,
/// normalized by (slope * n) / price range and clamped to [-1, 1].
/// 0 below 20 bars or on a degenerate range.
pub fn trend_strength(closes: &[f64]) -> f64 {
    if closes.len() < 20 {
        return 0.0;
    }

    let recent = &closes[closes.len() - 20..];
    let n = recent.len() as f64;

    let sum_x: f64 = (0..recent.len()).map(|i| i as f64).sum();
    let sum_y: f64 = recent.iter().sum();
    let sum_xy: f64 = recent.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..recent.len()).map(|i| (i as f64).powi(2)).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return 0.0;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;

    let max = recent.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = recent.iter().cloned().fold(f64::INFINITY, f64::min);
    let range = max - min;
    if range <= 0.0 {
        return 0.0;
    }

    ((slope * n) / range).clamp(-1.0, 1.0)
}

/// Support and resistance levels near the current price.
#[derive(Debug, Clone, Copy)]
pub struct PriceLevels {
    pub support: f64,
    pub resistance: f64,
}

/// Levels from 5-bar centered local extremes over the trailing `lookback`
/// bars: resistance is the nearest local high strictly above the current
/// price, support the nearest local low strictly below. Defaults to +/-5%
/// of price when no qualifying level exists or below 20 bars.
pub fn support_resistance(bars: &[PriceBar], lookback: usize) -> PriceLevels {
    let current_price = bars.last().map(|b| b.close).unwrap_or(0.0);
    let default_levels = PriceLevels {
        support: current_price * 0.95,
        resistance: current_price * 1.05,
    };

    if bars.len() < 20 {
        return default_levels;
    }

    let window = lookback.min(bars.len());
    let recent = &bars[bars.len() - window..];

    let mut local_highs: Vec<f64> = Vec::new();
    let mut local_lows: Vec<f64> = Vec::new();

    // A bar is a local extreme when it matches the max/min of its centered
    // 5-bar neighborhood; the two bars at each edge have no full neighborhood.
    for i in 2..recent.len().saturating_sub(2) {
        let highs = recent[i - 2..=i + 2].iter().map(|b| b.high);
        let lows = recent[i - 2..=i + 2].iter().map(|b| b.low);
        if recent[i].high >= highs.fold(f64::NEG_INFINITY, f64::max) {
            local_highs.push(recent[i].high);
        }
        if recent[i].low <= lows.fold(f64::INFINITY, f64::min) {
            local_lows.push(recent[i].low);
        }
    }

    let resistance = local_highs
        .iter()
        .filter(|&&h| h > current_price)
        .copied()
        .reduce(f64::min)
        .unwrap_or(default_levels.resistance);

    let support = local_lows
        .iter()
        .filter(|&&l| l < current_price)
        .copied()
        .reduce(f64::max)
        .unwrap_or(default_levels.support);

    PriceLevels {
        support,
        resistance,
    }
}
