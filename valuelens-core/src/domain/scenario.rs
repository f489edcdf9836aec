use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
    Volatile,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Neutral => "Neutral",
            Trend::Volatile => "Volatile",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Extreme,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => f.write_str("High"),
            RiskLevel::Extreme => f.write_str("Extreme"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedStrategy {
    pub name: String,
    pub desc: String,
    pub risk_level: RiskLevel,
}

/// Five-day, one-standard-deviation price band with a derivatives play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionScenario {
    /// Synthetic implied volatility, percent.
    pub iv: f64,
    pub put_call_ratio: f64,
    pub prediction_trend: Trend,
    pub target_price_low: f64,
    pub target_price_high: f64,
    /// Coverage of the band, percent.
    pub probability: f64,
    pub recommended_strategy: RecommendedStrategy,
}

impl OptionScenario {
    pub fn band_width(&self) -> f64 {
        self.target_price_high - self.target_price_low
    }
}
