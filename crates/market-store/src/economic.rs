//! Bank of Canada macro series: the registry of tracked Valet series and the
//! storage operations for their observations.

use analyzer_core::{AnalysisError, MacroObservation};
use chrono::NaiveDate;
use sqlx::Row;

use crate::{db_err, MarketStore};

/// A tracked Bank of Canada Valet series.
#[derive(Debug, Clone, Copy)]
pub struct MacroSeries {
    /// Short internal key, e.g. "overnight_rate".
    pub key: &'static str,
    /// Valet series code, e.g. "V39079".
    pub code: &'static str,
    pub label: &'static str,
    pub category: &'static str,
}

/// The economic indicators ingested alongside equity data.
pub const BOC_SERIES: &[MacroSeries] = &[
    // Interest rates
    MacroSeries { key: "overnight_rate", code: "V39079", label: "Bank rate", category: "rates" },
    MacroSeries { key: "prime_rate", code: "V80691311", label: "Prime lending rate", category: "rates" },
    MacroSeries { key: "gov_bond_2yr", code: "V122484", label: "2-year GoC bond yield", category: "rates" },
    MacroSeries { key: "gov_bond_5yr", code: "V122487", label: "5-year GoC bond yield", category: "rates" },
    MacroSeries { key: "gov_bond_10yr", code: "V122490", label: "10-year GoC bond yield", category: "rates" },
    MacroSeries { key: "gov_bond_30yr", code: "V122493", label: "30-year GoC bond yield", category: "rates" },
    // Exchange rates
    MacroSeries { key: "cad_usd", code: "FXUSDCAD", label: "USD/CAD exchange rate", category: "fx" },
    MacroSeries { key: "cad_eur", code: "FXEURCAD", label: "EUR/CAD exchange rate", category: "fx" },
    MacroSeries { key: "cad_gbp", code: "FXGBPCAD", label: "GBP/CAD exchange rate", category: "fx" },
    MacroSeries { key: "cad_jpy", code: "FXJPYCAD", label: "JPY/CAD exchange rate", category: "fx" },
    // Economy
    MacroSeries { key: "cpi_total", code: "V41690973", label: "Consumer price index", category: "economy" },
    MacroSeries { key: "cpi_core", code: "V41690914", label: "Core CPI", category: "economy" },
    MacroSeries { key: "unemployment_rate", code: "V2062812", label: "Unemployment rate", category: "economy" },
    MacroSeries { key: "housing_starts", code: "V735394", label: "Housing starts", category: "housing" },
    MacroSeries { key: "house_price_index", code: "V735426", label: "New housing price index", category: "housing" },
];

pub fn series_by_key(key: &str) -> Option<&'static MacroSeries> {
    BOC_SERIES.iter().find(|s| s.key == key)
}

impl MarketStore {
    /// Upserts a batch of observations and refreshes the series metadata row.
    pub async fn upsert_macro_observations(
        &self,
        series: &MacroSeries,
        observations: &[MacroObservation],
    ) -> Result<u64, AnalysisError> {
        let mut inserted = 0u64;
        let mut latest: Option<NaiveDate> = None;

        for obs in observations {
            sqlx::query(
                "INSERT OR REPLACE INTO macro_observations (series_code, date, value) \
                 VALUES (?, ?, ?)",
            )
            .bind(&obs.series_code)
            .bind(obs.date)
            .bind(obs.value)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            inserted += 1;
            latest = Some(latest.map_or(obs.date, |d: NaiveDate| d.max(obs.date)));
        }

        sqlx::query(
            "INSERT OR REPLACE INTO macro_series \
             (series_code, series_key, label, category, last_observation) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(series.code)
        .bind(series.key)
        .bind(series.label)
        .bind(series.category)
        .bind(latest)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(inserted)
    }

    /// Observations for a series, oldest first.
    pub async fn macro_series_observations(
        &self,
        series_code: &str,
        limit: u32,
    ) -> Result<Vec<MacroObservation>, AnalysisError> {
        let rows = sqlx::query(
            "SELECT series_code, date, value FROM macro_observations \
             WHERE series_code = ? ORDER BY date DESC LIMIT ?",
        )
        .bind(series_code)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut observations: Vec<MacroObservation> = rows
            .iter()
            .map(|r| {
                Ok(MacroObservation {
                    series_code: r.try_get("series_code").map_err(db_err)?,
                    date: r.try_get("date").map_err(db_err)?,
                    value: r.try_get("value").map_err(db_err)?,
                })
            })
            .collect::<Result<_, AnalysisError>>()?;
        observations.reverse();
        Ok(observations)
    }

    pub async fn latest_macro_observation(
        &self,
        series_code: &str,
    ) -> Result<Option<MacroObservation>, AnalysisError> {
        let mut observations = self.macro_series_observations(series_code, 1).await?;
        Ok(observations.pop())
    }
}
