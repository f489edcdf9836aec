use serde::{Deserialize, Serialize};
use std::fmt;

/// Position-building stage of the staged entry/exit plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Stay flat; no order to work.
    Wait,
    /// First small tranche.
    Scout,
    /// Core tranche.
    Main,
    /// Remaining capital once the price has stabilized.
    Tail,
    /// Reduce or close the position.
    Exit,
}

impl Stage {
    pub fn is_exit(self) -> bool {
        self == Stage::Exit
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Wait => "Wait",
            Stage::Scout => "Scout",
            Stage::Main => "Main",
            Stage::Tail => "Tail",
            Stage::Exit => "Exit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub stage: Stage,
    pub allocation: String,
    pub desc: String,
}

/// Identifies which classifier rule produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    FundamentalsFail,
    DeepValue,
    ScoutEntry,
    Watch,
    Bubble,
    Trim,
    Hold,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::FundamentalsFail => "fundamentals_fail",
            RuleId::DeepValue => "deep_value",
            RuleId::ScoutEntry => "scout_entry",
            RuleId::Watch => "watch",
            RuleId::Bubble => "bubble",
            RuleId::Trim => "trim",
            RuleId::Hold => "hold",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative verdict with a staged plan and a resting limit price.
///
/// `stink_bid_price` is zero exactly when the plan exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WisdomVerdict {
    pub rule: RuleId,
    pub sentiment: String,
    pub quote: String,
    pub analysis: String,
    pub strategy: String,
    pub execution: Execution,
    pub stink_bid_price: f64,
}
