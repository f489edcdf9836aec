//! Moat gate: the business-quality bar.
//!
//! Passes when capital efficiency is high enough and leverage low enough:
//! `roic >= 15` and `debt_to_ebitda <= 3`, both bounds inclusive.

use serde::{Deserialize, Serialize};

use crate::domain::StockMetrics;

/// Minimum return on invested capital, percent.
pub const MIN_ROIC: f64 = 15.0;

/// Maximum debt/EBITDA ratio.
pub const MAX_DEBT_TO_EBITDA: f64 = 3.0;

/// Which half of the gate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoatFailure {
    LowRoic,
    HighLeverage,
}

/// Outcome of the moat gate for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoatReport {
    pub roic_passes: bool,
    pub leverage_passes: bool,
}

impl MoatReport {
    pub fn check(metrics: &StockMetrics) -> Self {
        Self {
            roic_passes: metrics.roic() >= MIN_ROIC,
            leverage_passes: metrics.debt_to_ebitda() <= MAX_DEBT_TO_EBITDA,
        }
    }

    pub fn passes(&self) -> bool {
        self.roic_passes && self.leverage_passes
    }

    pub fn failures(&self) -> Vec<MoatFailure> {
        let mut out = Vec::with_capacity(2);
        if !self.roic_passes {
            out.push(MoatFailure::LowRoic);
        }
        if !self.leverage_passes {
            out.push(MoatFailure::HighLeverage);
        }
        out
    }
}

/// True iff the instrument clears the quality bar.
pub fn is_quality(metrics: &StockMetrics) -> bool {
    MoatReport::check(metrics).passes()
}
