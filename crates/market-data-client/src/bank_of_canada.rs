//! Bank of Canada Valet API client for macroeconomic series.

use analyzer_core::{AnalysisError, MacroObservation};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use crate::pacer::RequestPacer;

const BASE_URL: &str = "https://www.bankofcanada.ca/valet";
const USER_AGENT: &str = "tsx-analyzer/1.0";

/// Client for `GET /valet/observations/{series}/json`.
pub struct BankOfCanadaClient {
    client: reqwest::Client,
    pacer: RequestPacer,
    base_url: String,
}

impl BankOfCanadaClient {
    pub fn new(request_delay: Duration, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            pacer: RequestPacer::new(request_delay),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Observations for one series, oldest first. Non-numeric observations
    /// (suspended or placeholder values) are dropped.
    pub async fn observations(
        &self,
        series_code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<MacroObservation>, AnalysisError> {
        self.pacer.acquire().await;

        let url = format!("{}/observations/{}/json", self.base_url, series_code);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }

        tracing::info!("fetching Bank of Canada series {}", series_code);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AnalysisError::Api(e.to_string()))?;

        if response.status().as_u16() == 429 {
            self.pacer.backoff().await;
            return Err(AnalysisError::Api(
                "rate limited by Bank of Canada Valet API".to_string(),
            ));
        }

        if !response.status().is_success() {
            return Err(AnalysisError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let payload: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Api(e.to_string()))?;

        let observations = observations_from_payload(series_code, &payload.observations);
        tracing::info!(
            "retrieved {} observations for {}",
            observations.len(),
            series_code
        );
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Each observation object holds the date under "d" and the value under the
/// series code, as {"v": "5.00"} with the number encoded as a string.
fn observations_from_payload(
    series_code: &str,
    observations: &[serde_json::Map<String, serde_json::Value>],
) -> Vec<MacroObservation> {
    let mut parsed: Vec<MacroObservation> = observations
        .iter()
        .filter_map(|obs| {
            let date = obs
                .get("d")
                .and_then(|v| v.as_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())?;
            let value = obs
                .get(series_code)
                .and_then(|v| v.get("v"))
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<f64>().ok())?;

            Some(MacroObservation {
                series_code: series_code.to_string(),
                date,
                value,
            })
        })
        .collect();

    parsed.sort_by_key(|o| o.date);
    parsed
}
