//! SQLite persistence for the analyzer: companies, daily prices,
//! fundamentals, analysis results, macro series, settings and the
//! ingestion log.

pub mod economic;


use analyzer_core::{
    AnalysisError, AnalysisHistory, AnalysisResult, AnalysisSink, CompanyInfo, CompanyProvider,
    FundamentalSnapshot, FundamentalsProvider, PriceBar, PriceHistoryProvider, RankedAnalysis,
    Recommendation,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Wraps the SQLite pool and owns the schema.
#[derive(Clone)]
pub struct MarketStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> AnalysisError {
    AnalysisError::Database(e.to_string())
}

impl MarketStore {
    /// Open (or create) the database and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, AnalysisError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_err)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, AnalysisError> {
        Self::connect("sqlite::memory:").await
    }

    async fn init_schema(&self) -> Result<(), AnalysisError> {
        // WAL allows concurrent batch writers against a file database.
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let schema = include_str!("schema.sql");
        // sqlx executes one statement at a time.
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
            }
        }

        tracing::debug!("database schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // --- companies ---

    pub async fn upsert_company(&self, company: &CompanyInfo) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT OR REPLACE INTO companies \
             (symbol, name, sector, industry, market_cap, employees, description, website, is_active, last_updated) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&company.symbol)
        .bind(&company.name)
        .bind(&company.sector)
        .bind(&company.industry)
        .bind(company.market_cap)
        .bind(company.employees)
        .bind(&company.description)
        .bind(&company.website)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    pub async fn company(&self, symbol: &str) -> Result<Option<CompanyInfo>, AnalysisError> {
        let row = sqlx::query(
            "SELECT symbol, name, sector, industry, market_cap, employees, description, website \
             FROM companies WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| company_from_row(&r)).transpose()
    }

    /// Active companies ordered by market cap descending.
    pub async fn all_companies(&self) -> Result<Vec<CompanyInfo>, AnalysisError> {
        let rows = sqlx::query(
            "SELECT symbol, name, sector, industry, market_cap, employees, description, website \
             FROM companies WHERE is_active = 1 ORDER BY market_cap DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(company_from_row).collect()
    }

    // --- daily prices ---

    /// Upserts a batch of bars; duplicates on (symbol, date) are replaced.
    pub async fn insert_price_bars(
        &self,
        symbol: &str,
        bars: &[PriceBar],
    ) -> Result<u64, AnalysisError> {
        let mut inserted = 0u64;
        for bar in bars {
            sqlx::query(
                "INSERT OR REPLACE INTO daily_prices \
                 (symbol, date, open, high, low, close, adj_close, volume) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(symbol)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.adjusted_close)
            .bind(bar.volume)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// The most recent `lookback_days` bars, ordered ascending for analysis.
    pub async fn price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, AnalysisError> {
        let rows = sqlx::query(
            "SELECT date, open, high, low, close, adj_close, volume \
             FROM daily_prices WHERE symbol = ? ORDER BY date DESC LIMIT ?",
        )
        .bind(symbol)
        .bind(lookback_days as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut bars: Vec<PriceBar> = rows.iter().map(bar_from_row).collect::<Result<_, _>>()?;
        bars.reverse();
        Ok(bars)
    }

    pub async fn latest_price_date(
        &self,
        symbol: &str,
    ) -> Result<Option<NaiveDate>, AnalysisError> {
        let row = sqlx::query("SELECT MAX(date) AS latest FROM daily_prices WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        row.try_get::<Option<NaiveDate>, _>("latest").map_err(db_err)
    }

    // --- fundamentals ---

    pub async fn upsert_fundamentals(
        &self,
        snapshot: &FundamentalSnapshot,
    ) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT OR REPLACE INTO fundamentals \
             (symbol, date, pe_ratio, forward_pe, peg_ratio, price_to_book, debt_to_equity, roe, \
              profit_margin, revenue_growth, earnings_growth, dividend_yield, payout_ratio, beta, \
              current_ratio, quick_ratio) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&snapshot.symbol)
        .bind(snapshot.date)
        .bind(snapshot.pe_ratio)
        .bind(snapshot.forward_pe)
        .bind(snapshot.peg_ratio)
        .bind(snapshot.price_to_book)
        .bind(snapshot.debt_to_equity)
        .bind(snapshot.roe)
        .bind(snapshot.profit_margin)
        .bind(snapshot.revenue_growth)
        .bind(snapshot.earnings_growth)
        .bind(snapshot.dividend_yield)
        .bind(snapshot.payout_ratio)
        .bind(snapshot.beta)
        .bind(snapshot.current_ratio)
        .bind(snapshot.quick_ratio)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    pub async fn latest_fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<FundamentalSnapshot>, AnalysisError> {
        let row = sqlx::query(
            "SELECT symbol, date, pe_ratio, forward_pe, peg_ratio, price_to_book, debt_to_equity, \
                    roe, profit_margin, revenue_growth, earnings_growth, dividend_yield, \
                    payout_ratio, beta, current_ratio, quick_ratio \
             FROM fundamentals WHERE symbol = ? ORDER BY date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| fundamentals_from_row(&r)).transpose()
    }

    // --- analysis results ---

    pub async fn save_analysis_result(&self, result: &AnalysisResult) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT OR REPLACE INTO analysis_results \
             (symbol, analysis_date, total_score, fundamental_score, technical_score, \
              momentum_score, risk_score, recommendation, current_price, target_price, \
              conservative_buy_price, aggressive_buy_price, upside_potential, risk_percentage) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&result.symbol)
        .bind(result.analysis_date)
        .bind(result.total_score)
        .bind(result.fundamental_score)
        .bind(result.technical_score)
        .bind(result.momentum_score)
        .bind(result.risk_score)
        .bind(result.recommendation.as_str())
        .bind(result.current_price)
        .bind(result.target_price)
        .bind(result.conservative_buy_price)
        .bind(result.aggressive_buy_price)
        .bind(result.upside_potential)
        .bind(result.risk_percentage)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        tracing::info!(
            "saved analysis for {}: total score {}",
            result.symbol,
            result.total_score
        );
        Ok(())
    }

    pub async fn latest_analysis(
        &self,
        symbol: &str,
    ) -> Result<Option<AnalysisResult>, AnalysisError> {
        let row = sqlx::query(
            "SELECT * FROM analysis_results WHERE symbol = ? \
             ORDER BY analysis_date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| analysis_from_row(&r)).transpose()
    }

    /// Latest analysis per symbol joined with company data, best score first.
    pub async fn all_latest(&self) -> Result<Vec<RankedAnalysis>, AnalysisError> {
        let rows = sqlx::query(
            "SELECT a.*, c.name, c.sector \
             FROM analysis_results a \
             LEFT JOIN companies c ON a.symbol = c.symbol \
             WHERE a.analysis_date = (\
                 SELECT MAX(analysis_date) FROM analysis_results a2 WHERE a2.symbol = a.symbol\
             ) \
             AND (c.is_active IS NULL OR c.is_active = 1) \
             ORDER BY a.total_score DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|r| {
                Ok(RankedAnalysis {
                    result: analysis_from_row(r)?,
                    name: r.try_get("name").map_err(db_err)?,
                    sector: r.try_get("sector").map_err(db_err)?,
                })
            })
            .collect()
    }

    // --- settings / maintenance ---

    pub async fn setting(&self, key: &str) -> Result<Option<String>, AnalysisError> {
        let row = sqlx::query("SELECT value FROM system_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT OR REPLACE INTO system_settings (key, value, updated_at) VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log_ingestion(
        &self,
        symbol: &str,
        data_type: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        records: i64,
        success: bool,
        error_message: Option<&str>,
    ) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT INTO ingestion_log \
             (symbol, data_type, start_date, end_date, records_inserted, success, error_message) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(symbol)
        .bind(data_type)
        .bind(start_date)
        .bind(end_date)
        .bind(records)
        .bind(success)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn database_stats(&self) -> Result<StoreStats, AnalysisError> {
        let count = |table: &'static str| async move {
            let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
            row.try_get::<i64, _>("n").map_err(db_err)
        };

        Ok(StoreStats {
            companies: count("companies").await?,
            price_rows: count("daily_prices").await?,
            fundamental_rows: count("fundamentals").await?,
            analysis_rows: count("analysis_results").await?,
            macro_rows: count("macro_observations").await?,
        })
    }

    /// Drops analysis results and ingestion log entries older than the
    /// retention window. Price history is kept.
    pub async fn cleanup_old_data(&self, days_to_keep: i64) -> Result<(), AnalysisError> {
        let cutoff: DateTime<Utc> = Utc::now() - Duration::days(days_to_keep);

        sqlx::query("DELETE FROM analysis_results WHERE analysis_date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        sqlx::query("DELETE FROM ingestion_log WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        tracing::info!("cleaned up data older than {} days", days_to_keep);
        Ok(())
    }
}

/// Row counts for the status command.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub companies: i64,
    pub price_rows: i64,
    pub fundamental_rows: i64,
    pub analysis_rows: i64,
    pub macro_rows: i64,
}

fn bar_from_row(row: &SqliteRow) -> Result<PriceBar, AnalysisError> {
    Ok(PriceBar {
        date: row.try_get("date").map_err(db_err)?,
        open: row.try_get("open").map_err(db_err)?,
        high: row.try_get("high").map_err(db_err)?,
        low: row.try_get("low").map_err(db_err)?,
        close: row.try_get("close").map_err(db_err)?,
        adjusted_close: row.try_get("adj_close").map_err(db_err)?,
        volume: row.try_get("volume").map_err(db_err)?,
    })
}

fn company_from_row(row: &SqliteRow) -> Result<CompanyInfo, AnalysisError> {
    Ok(CompanyInfo {
        symbol: row.try_get("symbol").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        sector: row.try_get("sector").map_err(db_err)?,
        industry: row.try_get("industry").map_err(db_err)?,
        market_cap: row.try_get("market_cap").map_err(db_err)?,
        employees: row.try_get("employees").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        website: row.try_get("website").map_err(db_err)?,
    })
}

fn fundamentals_from_row(row: &SqliteRow) -> Result<FundamentalSnapshot, AnalysisError> {
    Ok(FundamentalSnapshot {
        symbol: row.try_get("symbol").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        pe_ratio: row.try_get("pe_ratio").map_err(db_err)?,
        forward_pe: row.try_get("forward_pe").map_err(db_err)?,
        peg_ratio: row.try_get("peg_ratio").map_err(db_err)?,
        price_to_book: row.try_get("price_to_book").map_err(db_err)?,
        debt_to_equity: row.try_get("debt_to_equity").map_err(db_err)?,
        roe: row.try_get("roe").map_err(db_err)?,
        profit_margin: row.try_get("profit_margin").map_err(db_err)?,
        revenue_growth: row.try_get("revenue_growth").map_err(db_err)?,
        earnings_growth: row.try_get("earnings_growth").map_err(db_err)?,
        dividend_yield: row.try_get("dividend_yield").map_err(db_err)?,
        payout_ratio: row.try_get("payout_ratio").map_err(db_err)?,
        beta: row.try_get("beta").map_err(db_err)?,
        current_ratio: row.try_get("current_ratio").map_err(db_err)?,
        quick_ratio: row.try_get("quick_ratio").map_err(db_err)?,
    })
}

fn analysis_from_row(row: &SqliteRow) -> Result<AnalysisResult, AnalysisError> {
    let label: String = row.try_get("recommendation").map_err(db_err)?;
    let recommendation = Recommendation::from_label(&label)
        .ok_or_else(|| AnalysisError::InvalidData(format!("unknown recommendation '{label}'")))?;

    Ok(AnalysisResult {
        symbol: row.try_get("symbol").map_err(db_err)?,
        analysis_date: row.try_get("analysis_date").map_err(db_err)?,
        total_score: row.try_get("total_score").map_err(db_err)?,
        fundamental_score: row.try_get("fundamental_score").map_err(db_err)?,
        technical_score: row.try_get("technical_score").map_err(db_err)?,
        momentum_score: row.try_get("momentum_score").map_err(db_err)?,
        risk_score: row.try_get("risk_score").map_err(db_err)?,
        recommendation,
        current_price: row.try_get("current_price").map_err(db_err)?,
        target_price: row.try_get("target_price").map_err(db_err)?,
        conservative_buy_price: row.try_get("conservative_buy_price").map_err(db_err)?,
        aggressive_buy_price: row.try_get("aggressive_buy_price").map_err(db_err)?,
        upside_potential: row.try_get("upside_potential").map_err(db_err)?,
        risk_percentage: row.try_get("risk_percentage").map_err(db_err)?,
    })
}

#[async_trait]
impl PriceHistoryProvider for MarketStore {
    async fn get_price_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, AnalysisError> {
        self.price_series(symbol, lookback_days).await
    }
}

#[async_trait]
impl FundamentalsProvider for MarketStore {
    async fn get_latest_fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Option<FundamentalSnapshot>, AnalysisError> {
        self.latest_fundamentals(symbol).await
    }
}

#[async_trait]
impl CompanyProvider for MarketStore {
    async fn get_company(&self, symbol: &str) -> Result<Option<CompanyInfo>, AnalysisError> {
        self.company(symbol).await
    }
}

#[async_trait]
impl AnalysisSink for MarketStore {
    async fn save_analysis(&self, result: &AnalysisResult) -> Result<(), AnalysisError> {
        self.save_analysis_result(result).await
    }
}

#[async_trait]
impl AnalysisHistory for MarketStore {
    async fn get_latest_analysis(
        &self,
        symbol: &str,
    ) -> Result<Option<AnalysisResult>, AnalysisError> {
        self.latest_analysis(symbol).await
    }

    async fn all_latest_analyses(&self) -> Result<Vec<RankedAnalysis>, AnalysisError> {
        self.all_latest().await
    }
}
