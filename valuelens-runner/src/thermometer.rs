//! Market thermometer: aggregate mood of a scanned universe.

use serde::{Deserialize, Serialize};
use std::fmt;
use valuelens_core::Evaluation;

pub const PANIC_MARGIN: f64 = 10.0;
pub const GREED_MARGIN: f64 = -10.0;

/// Gauge bounds. The pointer never pins to either end.
pub const POINTER_MIN: f64 = 5.0;
pub const POINTER_MAX: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    /// Broad discount to fair value.
    Panic,
    Balanced,
    /// Modest premium.
    Expensive,
    /// Broad premium.
    Greed,
}

impl Mood {
    pub fn from_average(average_margin: f64) -> Self {
        if average_margin > PANIC_MARGIN {
            Mood::Panic
        } else if average_margin < GREED_MARGIN {
            Mood::Greed
        } else if average_margin < 0.0 {
            Mood::Expensive
        } else {
            Mood::Balanced
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Panic => write!(f, "Panic"),
            Mood::Balanced => write!(f, "Balanced"),
            Mood::Expensive => write!(f, "Expensive"),
            Mood::Greed => write!(f, "Greed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketThermometer {
    pub average_margin: f64,
    pub mood: Mood,
    /// Gauge position in `[5, 95]`; low is fearful, high is greedy.
    pub pointer: f64,
    pub instruments: usize,
}

impl MarketThermometer {
    pub fn from_margins(margins: &[f64]) -> Self {
        let average_margin = if margins.is_empty() {
            0.0
        } else {
            margins.iter().sum::<f64>() / margins.len() as f64
        };
        Self {
            average_margin,
            mood: Mood::from_average(average_margin),
            pointer: (50.0 - average_margin * 1.5).clamp(POINTER_MIN, POINTER_MAX),
            instruments: margins.len(),
        }
    }

    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        let margins: Vec<f64> = evaluations.iter().map(Evaluation::margin_of_safety).collect();
        Self::from_margins(&margins)
    }
}
