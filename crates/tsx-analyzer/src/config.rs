//! Runtime configuration from environment variables plus the built-in TSX
//! symbol universe.

use std::str::FromStr;
use std::time::Duration;

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    /// Trading days of history pulled for each analysis.
    pub lookback_days: u32,
    pub rate_limit_delay: Duration,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub data_retention_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("TSX_ANALYZER_DB")
                .unwrap_or_else(|_| "tsx_analyzer.db".to_string()),
            lookback_days: env_parse("ANALYSIS_PERIOD", 252),
            rate_limit_delay: Duration::from_secs_f64(env_parse("RATE_LIMIT_DELAY", 1.0)),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT", 30)),
            concurrency: env_parse("CONCURRENCY", 4),
            data_retention_days: env_parse("DATA_RETENTION_DAYS", 365),
        }
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.db_path)
    }
}

/// TSX Composite large caps tracked by default.
pub const TSX_SYMBOLS: &[&str] = &[
    // Financials
    "RY.TO", "TD.TO", "BNS.TO", "BMO.TO", "CM.TO", "NA.TO", "MFC.TO", "SLF.TO", "IFC.TO",
    "FFH.TO",
    // Technology
    "SHOP.TO", "CSU.TO", "TRI.TO", "OTEX.TO", "LSPD.TO",
    // Energy
    "CNQ.TO", "SU.TO", "IMO.TO", "CVE.TO", "TRP.TO", "TOU.TO",
    // Infrastructure & transportation
    "ENB.TO", "CNR.TO", "CP.TO", "WCN.TO", "PPL.TO",
    // Mining & materials
    "ABX.TO", "AEM.TO", "WPM.TO", "FNV.TO", "NTR.TO", "CCO.TO",
    // Consumer & retail
    "L.TO", "ATD.TO", "DOL.TO", "CTC.TO",
    // Telecommunications
    "BCE.TO", "T.TO",
    // Utilities
    "FTS.TO", "EMA.TO", "H.TO",
    // Industrials
    "WSP.TO", "STN.TO", "TIH.TO", "CAE.TO", "MGA.TO",
];
