//! Serializable watch configuration.
//!
//! A TOML file selects the region to scan, the polling cadence, the master
//! seed, and the per-region watchlists. Every field has a default, so an
//! empty file is a valid configuration that scans the built-in US list.
//!
//! ```toml
//! region = "CN"
//! poll_interval_secs = 20
//! seed = 7
//!
//! [[watchlist.US]]
//! symbol = "AAPL"
//! name = "Apple"
//! sector = "Technology"
//! fair_value = 190.0
//! roic = 45.0            # optional; synthesized when absent
//! debt_to_ebitda = 0.6   # optional
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use valuelens_core::{Region, VolumeStatus};

/// Default polling cadence of the market-data collaborator.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;

/// Default environment variable holding the quote-provider token.
pub const DEFAULT_API_KEY_ENV: &str = "FINNHUB_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One tracked instrument.
///
/// `fair_value` is the slowly-changing valuation estimate. The remaining
/// readings are optional; any that are missing are synthesized per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub fair_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_to_ebitda: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_status: Option<VolumeStatus>,
}

impl WatchEntry {
    pub fn new(symbol: &str, name: &str, sector: &str, fair_value: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            fair_value,
            roic: None,
            debt_to_ebitda: None,
            rsi: None,
            volume_status: None,
        }
    }
}

/// Per-region watchlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watchlists {
    #[serde(rename = "US")]
    pub us: Vec<WatchEntry>,
    #[serde(rename = "CN")]
    pub cn: Vec<WatchEntry>,
}

impl Watchlists {
    pub fn for_region(&self, region: Region) -> &[WatchEntry] {
        match region {
            Region::US => &self.us,
            Region::CN => &self.cn,
        }
    }
}

impl Default for Watchlists {
    fn default() -> Self {
        Self {
            us: default_us(),
            cn: default_cn(),
        }
    }
}

/// Top-level configuration for scans and polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub region: Region,
    pub poll_interval_secs: u64,
    /// Master seed for implied-volatility draws and mock data.
    pub seed: u64,
    /// Name of the environment variable holding the provider token.
    pub api_key_env: String,
    pub watchlist: Watchlists,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            region: Region::US,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            seed: 42,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            watchlist: Watchlists::default(),
        }
    }
}

impl WatchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: WatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be > 0".into()));
        }
        for region in [Region::US, Region::CN] {
            let mut seen = HashSet::new();
            for entry in self.watchlist.for_region(region) {
                if !seen.insert(entry.symbol.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate symbol '{}' in {region} watchlist",
                        entry.symbol
                    )));
                }
                validate_entry(entry)?;
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[WatchEntry] {
        self.watchlist.for_region(self.region)
    }
}

fn validate_entry(entry: &WatchEntry) -> Result<(), ConfigError> {
    let invalid = |what: &str| {
        ConfigError::Invalid(format!("{}: {what}", entry.symbol))
    };

    if entry.symbol.trim().is_empty() {
        return Err(ConfigError::Invalid("watch entry with empty symbol".into()));
    }
    if !(entry.fair_value.is_finite() && entry.fair_value > 0.0) {
        return Err(invalid("fair_value must be > 0"));
    }
    if entry.roic.is_some_and(|v| !v.is_finite()) {
        return Err(invalid("roic must be finite"));
    }
    if entry.debt_to_ebitda.is_some_and(|v| !v.is_finite()) {
        return Err(invalid("debt_to_ebitda must be finite"));
    }
    if entry.rsi.is_some_and(|v| !(0.0..=100.0).contains(&v)) {
        return Err(invalid("rsi must be within [0, 100]"));
    }
    Ok(())
}

/// Built-in US large-cap watchlist.
pub fn default_us() -> Vec<WatchEntry> {
    vec![
        WatchEntry::new("NVDA", "NVIDIA", "Technology", 720.0),
        WatchEntry::new("MSFT", "Microsoft", "Technology", 410.0),
        WatchEntry::new("AAPL", "Apple", "Technology", 190.0),
        WatchEntry::new("TSLA", "Tesla", "Consumer", 110.0),
        WatchEntry::new("AMD", "Advanced Micro Devices", "Technology", 150.0),
        WatchEntry::new("GOOGL", "Alphabet", "Communication", 200.0),
        WatchEntry::new("META", "Meta Platforms", "Communication", 450.0),
        WatchEntry::new("AMZN", "Amazon", "Consumer", 180.0),
    ]
}

/// Built-in China A-share watchlist.
pub fn default_cn() -> Vec<WatchEntry> {
    vec![
        WatchEntry::new("600519", "Kweichow Moutai", "Consumer", 1500.0),
        WatchEntry::new("600036", "China Merchants Bank", "Financials", 38.0),
        WatchEntry::new("601318", "Ping An Insurance", "Financials", 55.0),
        WatchEntry::new("300750", "CATL", "Industrials", 180.0),
        WatchEntry::new("000858", "Wuliangye Yibin", "Consumer", 140.0),
        WatchEntry::new("601888", "China Tourism Group Duty Free", "Consumer", 85.0),
        WatchEntry::new("600276", "Jiangsu Hengrui Medicine", "Healthcare", 45.0),
        WatchEntry::new("002594", "BYD", "Consumer", 260.0),
    ]
}
