//! Yahoo Finance client: daily bars via the chart API, fundamentals and
//! company profile via the quoteSummary API.

use analyzer_core::{AnalysisError, CompanyInfo, FundamentalSnapshot, PriceBar};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::time::Duration;

use crate::pacer::RequestPacer;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "tsx-analyzer/1.0";
const CACHE_TTL_SECS: i64 = 300;
const MAX_RETRIES: u32 = 3;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Rate-limited Yahoo Finance client.
///
/// Fundamentals and the company profile come from the same quoteSummary
/// response, so it is cached for a few minutes and both accessors share one
/// fetch.
pub struct YahooClient {
    client: reqwest::Client,
    pacer: RequestPacer,
    summary_cache: DashMap<String, CacheEntry<SummaryModules>>,
}

impl YahooClient {
    pub fn new(request_delay: Duration, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            pacer: RequestPacer::new(request_delay),
            summary_cache: DashMap::new(),
        }
    }

    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Send a request with pacing and automatic 429 backoff.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        if self.pacer.daily_limit_reached() {
            return Err(AnalysisError::Api(
                "daily rate limit reached, skipping request".to_string(),
            ));
        }

        let request = builder
            .build()
            .map_err(|e| AnalysisError::Api(e.to_string()))?;

        for attempt in 0..MAX_RETRIES {
            self.pacer.acquire().await;
            let req = request
                .try_clone()
                .ok_or_else(|| AnalysisError::Api("cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req)
                .await
                .map_err(|e| AnalysisError::Api(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!("Yahoo 429 rate limited (attempt {}/{})", attempt + 1, MAX_RETRIES);
            self.pacer.backoff().await;
            if self.pacer.daily_limit_reached() {
                break;
            }
        }

        Err(AnalysisError::Api(format!(
            "rate limited by Yahoo after {} retries",
            MAX_RETRIES
        )))
    }

    /// Daily bars for the date range, oldest first. Rows with gaps in the
    /// OHLCV arrays are skipped.
    pub async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, AnalysisError> {
        let midnight = NaiveTime::MIN;
        let period1 = start.and_time(midnight).and_utc().timestamp();
        let period2 = end.and_time(midnight).and_utc().timestamp();

        let url = format!("{}/v8/finance/chart/{}", BASE_URL, symbol);
        let response = self
            .send(self.client.get(&url).query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Api(e.to_string()))?;

        let data = chart
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| AnalysisError::Api(format!("no chart data for {}", symbol)))?;

        Ok(bars_from_chart(&data))
    }

    async fn quote_summary(&self, symbol: &str) -> Result<SummaryModules, AnalysisError> {
        let cache_key = symbol.to_uppercase();
        if let Some(entry) = self.summary_cache.get(&cache_key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < CACHE_TTL_SECS {
                return Ok(entry.data.clone());
            }
        }

        let url = format!("{}/v10/finance/quoteSummary/{}", BASE_URL, symbol);
        let response = self
            .send(self.client.get(&url).query(&[(
                "modules",
                "summaryDetail,financialData,defaultKeyStatistics,assetProfile,price",
            )]))
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let summary: SummaryResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Api(e.to_string()))?;

        let modules = summary
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| AnalysisError::Api(format!("no quote summary for {}", symbol)))?;

        self.summary_cache.insert(
            cache_key,
            CacheEntry {
                data: modules.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(modules)
    }

    /// Latest fundamentals, stamped with today's date.
    pub async fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<FundamentalSnapshot, AnalysisError> {
        let modules = self.quote_summary(symbol).await?;
        Ok(snapshot_from_modules(
            symbol,
            Utc::now().date_naive(),
            &modules,
        ))
    }

    pub async fn company(&self, symbol: &str) -> Result<CompanyInfo, AnalysisError> {
        let modules = self.quote_summary(symbol).await?;
        Ok(company_from_modules(symbol, &modules))
    }
}

// --- response shapes ---

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<SummaryModules>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct SummaryModules {
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialData>,
    #[serde(rename = "defaultKeyStatistics", default)]
    key_statistics: Option<KeyStatistics>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
}

/// Yahoo wraps every numeric metric as {"raw": ..., "fmt": "..."}.
#[derive(Debug, Clone, Deserialize, Default)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default)]
    trailing_pe: Option<RawValue>,
    #[serde(default)]
    forward_pe: Option<RawValue>,
    #[serde(default)]
    dividend_yield: Option<RawValue>,
    #[serde(default)]
    payout_ratio: Option<RawValue>,
    #[serde(default)]
    beta: Option<RawValue>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    debt_to_equity: Option<RawValue>,
    #[serde(default)]
    return_on_equity: Option<RawValue>,
    #[serde(default)]
    profit_margins: Option<RawValue>,
    #[serde(default)]
    revenue_growth: Option<RawValue>,
    #[serde(default)]
    earnings_growth: Option<RawValue>,
    #[serde(default)]
    current_ratio: Option<RawValue>,
    #[serde(default)]
    quick_ratio: Option<RawValue>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default)]
    peg_ratio: Option<RawValue>,
    #[serde(default)]
    price_to_book: Option<RawValue>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    long_business_summary: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    full_time_employees: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    market_cap: Option<RawValue>,
}

pub(crate) fn bars_from_chart(data: &ChartData) -> Vec<PriceBar> {
    let Some(quote) = data.indicators.quote.first() else {
        return Vec::new();
    };
    let adjclose = data.indicators.adjclose.first();

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let (open, high, low, close, volume) = match (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        ) {
            (Some(o), Some(h), Some(l), Some(c), Some(v)) => (o, h, l, c, v),
            // Halted or partial rows come back as nulls.
            _ => continue,
        };

        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        let adjusted_close = adjclose
            .and_then(|a| a.adjclose.get(i).copied().flatten())
            .unwrap_or(close);

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        });
    }

    bars
}

pub(crate) fn snapshot_from_modules(
    symbol: &str,
    date: NaiveDate,
    modules: &SummaryModules,
) -> FundamentalSnapshot {
    let detail = modules.summary_detail.clone().unwrap_or_default();
    let financial = modules.financial_data.clone().unwrap_or_default();
    let stats = modules.key_statistics.clone().unwrap_or_default();

    FundamentalSnapshot {
        symbol: symbol.to_string(),
        date,
        pe_ratio: raw(&detail.trailing_pe),
        forward_pe: raw(&detail.forward_pe),
        peg_ratio: raw(&stats.peg_ratio),
        price_to_book: raw(&stats.price_to_book),
        // Yahoo reports debt-to-equity as a percentage; the scoring tables
        // expect a ratio.
        debt_to_equity: raw(&financial.debt_to_equity).map(|v| v / 100.0),
        roe: raw(&financial.return_on_equity),
        profit_margin: raw(&financial.profit_margins),
        revenue_growth: raw(&financial.revenue_growth),
        earnings_growth: raw(&financial.earnings_growth),
        dividend_yield: raw(&detail.dividend_yield),
        payout_ratio: raw(&detail.payout_ratio),
        beta: raw(&detail.beta),
        current_ratio: raw(&financial.current_ratio),
        quick_ratio: raw(&financial.quick_ratio),
    }
}

pub(crate) fn company_from_modules(symbol: &str, modules: &SummaryModules) -> CompanyInfo {
    let profile = modules.asset_profile.clone().unwrap_or_default();
    let price = modules.price.clone().unwrap_or_default();

    CompanyInfo {
        symbol: symbol.to_string(),
        name: price.long_name.or(price.short_name),
        sector: profile.sector,
        industry: profile.industry,
        market_cap: raw(&price.market_cap),
        employees: profile.full_time_employees,
        description: profile.long_business_summary,
        website: profile.website,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_rows_with_nulls_are_skipped() {
        let json = r#"{
            "timestamp": [1717372800, 1717459200, 1717545600],
            "indicators": {
                "quote": [{
                    "open": [100.0, null, 102.0],
                    "high": [101.0, 101.5, 103.0],
                    "low": [99.0, 100.0, 101.0],
                    "close": [100.5, 101.0, 102.5],
                    "volume": [1000000, 900000, 1100000]
                }],
                "adjclose": [{"adjclose": [99.8, 100.3, null]}]
            }
        }"#;
        let data: ChartData = serde_json::from_str(json).unwrap();
        let bars = bars_from_chart(&data);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[0].adjusted_close, 99.8);
        // Missing adjclose falls back to the close.
        assert_eq!(bars[1].close, 102.5);
        assert_eq!(bars[1].adjusted_close, 102.5);
        assert_eq!(bars[1].volume, 1_100_000);
    }

    #[test]
    fn empty_chart_yields_no_bars() {
        let json = r#"{"timestamp": [], "indicators": {"quote": [{}]}}"#;
        let data: ChartData = serde_json::from_str(json).unwrap();
        assert!(bars_from_chart(&data).is_empty());
    }

    #[test]
    fn summary_maps_to_snapshot_and_company() {
        let json = r#"{
            "summaryDetail": {
                "trailingPE": {"raw": 12.4, "fmt": "12.40"},
                "dividendYield": {"raw": 0.041, "fmt": "4.10%"},
                "payoutRatio": {"raw": 0.45},
                "beta": {"raw": 0.9}
            },
            "financialData": {
                "debtToEquity": {"raw": 58.3},
                "returnOnEquity": {"raw": 0.145},
                "profitMargins": {"raw": 0.31},
                "revenueGrowth": {"raw": 0.06},
                "currentRatio": {}
            },
            "defaultKeyStatistics": {
                "pegRatio": {"raw": 1.2},
                "priceToBook": {"raw": 1.8}
            },
            "assetProfile": {
                "sector": "Financial Services",
                "industry": "Banks - Diversified",
                "website": "https://www.rbc.com",
                "fullTimeEmployees": 94000
            },
            "price": {
                "longName": "Royal Bank of Canada",
                "marketCap": {"raw": 200000000000.0}
            }
        }"#;
        let modules: SummaryModules = serde_json::from_str(json).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let snapshot = snapshot_from_modules("RY.TO", date, &modules);
        assert_eq!(snapshot.pe_ratio, Some(12.4));
        // Percent from Yahoo, ratio in the snapshot.
        assert!((snapshot.debt_to_equity.unwrap() - 0.583).abs() < 1e-12);
        assert_eq!(snapshot.roe, Some(0.145));
        assert_eq!(snapshot.dividend_yield, Some(0.041));
        // Present module with an empty value object stays unknown.
        assert_eq!(snapshot.current_ratio, None);
        assert_eq!(snapshot.earnings_growth, None);

        let company = company_from_modules("RY.TO", &modules);
        assert_eq!(company.name.as_deref(), Some("Royal Bank of Canada"));
        assert_eq!(company.sector.as_deref(), Some("Financial Services"));
        assert_eq!(company.employees, Some(94000));
    }

    #[test]
    fn missing_modules_yield_empty_snapshot() {
        let modules = SummaryModules::default();
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let snapshot = snapshot_from_modules("X.TO", date, &modules);
        assert_eq!(snapshot.pe_ratio, None);
        assert_eq!(snapshot.beta, None);
    }
}
