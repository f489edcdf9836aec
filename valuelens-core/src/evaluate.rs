//! Per-instrument evaluation: metrics in, verdict and scenario out.

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::domain::{OptionScenario, QuoteRecord, StockMetrics, WisdomVerdict};
use crate::error::CoreError;
use crate::moat::MoatReport;
use crate::options::estimate;

/// Everything the engine derives from one `StockMetrics` in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: StockMetrics,
    pub moat: MoatReport,
    pub verdict: WisdomVerdict,
    pub scenario: OptionScenario,
}

impl Evaluation {
    pub fn symbol(&self) -> &str {
        self.metrics.symbol()
    }

    pub fn margin_of_safety(&self) -> f64 {
        self.metrics.margin_of_safety()
    }
}

/// Run the gate, classifier, and estimator over one instrument.
///
/// `iv_draw` must already have been taken from the caller's volatility
/// source; the same inputs always produce the same evaluation.
pub fn evaluate(metrics: StockMetrics, iv_draw: f64) -> Result<Evaluation, CoreError> {
    let moat = MoatReport::check(&metrics);
    let verdict = classify(&metrics);
    let scenario = estimate(&metrics, iv_draw)?;
    Ok(Evaluation {
        metrics,
        moat,
        verdict,
        scenario,
    })
}

/// Assemble and evaluate in one step.
pub fn evaluate_record(record: QuoteRecord, iv_draw: f64) -> Result<Evaluation, CoreError> {
    evaluate(StockMetrics::assemble(record)?, iv_draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::fixtures::record;
    use crate::domain::{RuleId, Trend};

    #[test]
    fn pipeline_combines_all_components() {
        let mut r = record(65.0, 100.0);
        r.roic = 18.0;
        r.debt_to_ebitda = 2.0;
        r.rsi = 20.0;
        let e = evaluate_record(r, 0.0).unwrap();
        assert!(e.moat.passes());
        assert_eq!(e.verdict.rule, RuleId::ScoutEntry);
        assert_eq!(e.scenario.prediction_trend, Trend::Bullish);
        assert_eq!(e.symbol(), "TEST");
        assert!((e.margin_of_safety() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_record_never_reaches_the_rules() {
        let r = record(-1.0, 100.0);
        let err = evaluate_record(r, 0.5).unwrap_err();
        assert_eq!(err.field(), "current_price");
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let r = record(92.0, 100.0);
        let a = evaluate_record(r.clone(), 0.31).unwrap();
        let b = evaluate_record(r, 0.31).unwrap();
        assert_eq!(a, b);
    }
}
