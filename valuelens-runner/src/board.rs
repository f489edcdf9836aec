//! Opportunity and risk board.
//!
//! Opportunities are instruments trading below fair value, deepest discount
//! first. Risks trade above it, richest premium first. An instrument exactly
//! at fair value appears on neither side.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use valuelens_core::Evaluation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub symbol: String,
    pub name: String,
    pub margin_of_safety: f64,
    pub strategy: String,
}

impl BoardEntry {
    fn from_evaluation(e: &Evaluation) -> Self {
        Self {
            symbol: e.symbol().to_string(),
            name: e.metrics.name().to_string(),
            margin_of_safety: e.margin_of_safety(),
            strategy: e.verdict.strategy.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub opportunities: Vec<BoardEntry>,
    pub risks: Vec<BoardEntry>,
}

impl Board {
    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        let mut opportunities: Vec<BoardEntry> = evaluations
            .iter()
            .filter(|e| e.margin_of_safety() > 0.0)
            .map(BoardEntry::from_evaluation)
            .collect();
        let mut risks: Vec<BoardEntry> = evaluations
            .iter()
            .filter(|e| e.margin_of_safety() < 0.0)
            .map(BoardEntry::from_evaluation)
            .collect();

        // Stable sorts: ties keep watchlist order.
        opportunities.sort_by(|a, b| {
            b.margin_of_safety
                .partial_cmp(&a.margin_of_safety)
                .unwrap_or(Ordering::Equal)
        });
        risks.sort_by(|a, b| {
            a.margin_of_safety
                .partial_cmp(&b.margin_of_safety)
                .unwrap_or(Ordering::Equal)
        });

        Self {
            opportunities,
            risks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuelens_core::{evaluate_record, QuoteRecord, Region, VolumeStatus};

    fn eval(symbol: &str, price: f64) -> Evaluation {
        evaluate_record(
            QuoteRecord {
                symbol: symbol.into(),
                name: symbol.into(),
                sector: "Test".into(),
                region: Region::US,
                current_price: price,
                fair_value: 100.0,
                roic: 20.0,
                debt_to_ebitda: 1.0,
                rsi: 50.0,
                volume_status: VolumeStatus::Normal,
            },
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn splits_and_orders_by_margin() {
        let evals = vec![
            eval("A", 90.0),
            eval("B", 60.0),
            eval("C", 110.0),
            eval("D", 100.0),
            eval("E", 150.0),
        ];
        let board = Board::from_evaluations(&evals);
        let opp: Vec<&str> = board.opportunities.iter().map(|e| e.symbol.as_str()).collect();
        let risk: Vec<&str> = board.risks.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(opp, vec!["B", "A"]);
        assert_eq!(risk, vec!["E", "C"]);
    }

    #[test]
    fn empty_input_empty_board() {
        assert_eq!(Board::from_evaluations(&[]), Board::default());
    }
}
