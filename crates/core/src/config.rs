//! Configuration structures for the replay engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Quantity;

/// Main configuration for a replay run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Historical data configuration.
    pub data: DataConfig,
    /// Execution configuration.
    pub execution: ExecutionConfig,
}

impl ReplayConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Historical data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one `<TICKER>.csv` file per instrument.
    pub csv_dir: String,
    /// Instruments subscribed at startup.
    pub tickers: Vec<String>,
    /// Inclusive replay window start (`YYYY-MM-DD`), if bounded.
    pub start_date: Option<String>,
    /// Inclusive replay window end (`YYYY-MM-DD`), if bounded.
    pub end_date: Option<String>,
    /// Track per-bar adjusted-close returns.
    pub calc_adj_returns: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: "data".to_string(),
            tickers: Vec::new(),
            start_date: None,
            end_date: None,
            calc_adj_returns: false,
        }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Exchange name stamped on simulated fills.
    pub exchange: String,
    /// Order quantity used when a signal carries no sizing hint.
    pub base_quantity: Quantity,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            exchange: "ARCA".to_string(),
            base_quantity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplayConfig::default();
        assert_eq!(config.execution.exchange, "ARCA");
        assert_eq!(config.execution.base_quantity, 100);
        assert!(config.data.tickers.is_empty());
        assert!(!config.data.calc_adj_returns);
    }

    #[test]
    fn test_json_round_trip() {
        let raw = r#"{
            "data": {
                "csv_dir": "/tmp/prices",
                "tickers": ["SPY", "AGG"],
                "start_date": "2017-01-03",
                "end_date": null,
                "calc_adj_returns": true
            },
            "execution": {
                "exchange": "SIM",
                "base_quantity": 50
            }
        }"#;
        let config: ReplayConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.data.tickers, vec!["SPY", "AGG"]);
        assert_eq!(config.data.start_date.as_deref(), Some("2017-01-03"));
        assert_eq!(config.execution.base_quantity, 50);
    }
}
