//! End-to-end scenarios: record in, verdict and option scenario out.

use valuelens_core::{
    evaluate_record, matching_rule, FixedDraw, QuoteRecord, Region, RngHierarchy, RuleId, Stage,
    StockMetrics, Trend, VolatilitySource, VolumeStatus,
};

fn quote(current_price: f64, fair_value: f64, roic: f64, debt: f64, rsi: f64) -> QuoteRecord {
    QuoteRecord {
        symbol: "600519".into(),
        name: "Kweichow Moutai".into(),
        sector: "Consumer".into(),
        region: Region::CN,
        current_price,
        fair_value,
        roic,
        debt_to_ebitda: debt,
        rsi,
        volume_status: VolumeStatus::High,
    }
}

fn metrics(current_price: f64, fair_value: f64, roic: f64, debt: f64, rsi: f64) -> StockMetrics {
    StockMetrics::assemble(quote(current_price, fair_value, roic, debt, rsi)).unwrap()
}

#[test]
fn quality_pass_deep_value() {
    let e = evaluate_record(quote(50.0, 100.0, 20.0, 1.5, 25.0), 0.1).unwrap();
    assert_eq!(e.margin_of_safety(), 50.0);
    assert_eq!(e.verdict.strategy, "Aggressive buy");
    assert_eq!(e.verdict.execution.stage, Stage::Tail);
    assert_eq!(e.verdict.execution.allocation, "50%");
}

#[test]
fn quality_pass_scout_tier() {
    let e = evaluate_record(quote(65.0, 100.0, 18.0, 2.0, 20.0), 0.1).unwrap();
    assert!((e.margin_of_safety() - 35.0).abs() < 1e-9);
    assert_eq!(e.verdict.strategy, "Scale-in");
    assert_eq!(e.verdict.execution.stage, Stage::Scout);
}

#[test]
fn quality_fail_beats_deep_value() {
    let e = evaluate_record(quote(50.0, 100.0, 8.0, 4.0, 50.0), 0.1).unwrap();
    assert_eq!(e.margin_of_safety(), 50.0);
    assert!(!e.moat.passes());
    assert_eq!(e.verdict.rule, RuleId::FundamentalsFail);
    assert_eq!(e.verdict.strategy, "Avoid");
}

#[test]
fn bubble_clears_out() {
    let e = evaluate_record(quote(130.0, 100.0, 20.0, 1.0, 50.0), 0.1).unwrap();
    assert_eq!(e.margin_of_safety(), -30.0);
    assert_eq!(e.verdict.strategy, "Clear out");
    assert_eq!(e.verdict.stink_bid_price, 0.0);
}

#[test]
fn closed_boundaries() {
    assert_eq!(matching_rule(&metrics(50.0, 100.0, 20.0, 1.0, 10.0)), RuleId::DeepValue);
    assert_eq!(matching_rule(&metrics(70.0, 100.0, 20.0, 1.0, 30.0)), RuleId::Watch);
    assert_eq!(matching_rule(&metrics(120.0, 100.0, 20.0, 1.0, 50.0)), RuleId::Trim);
    assert_eq!(matching_rule(&metrics(95.0, 100.0, 20.0, 1.0, 50.0)), RuleId::Hold);
    assert_eq!(matching_rule(&metrics(50.0, 100.0, 15.0, 3.0, 50.0)), RuleId::DeepValue);
}

#[test]
fn option_estimator_at_floor_iv() {
    let e = evaluate_record(quote(100.0, 120.0, 20.0, 1.0, 20.0), 0.0).unwrap();
    let s = &e.scenario;
    assert_eq!(s.iv, 15.0);
    assert_eq!(s.prediction_trend, Trend::Bullish);
    assert_eq!(s.put_call_ratio, 0.6);
    let vol_move = 100.0 * 0.15 * (5.0_f64 / 365.0).sqrt();
    assert!((s.target_price_low - (100.0 - vol_move)).abs() < 1e-9);
    assert!((s.target_price_high - (100.0 + vol_move)).abs() < 1e-9);
}

#[test]
fn seeded_source_reproduces_a_scan() {
    let source = RngHierarchy::new(2024);
    let symbols = ["NVDA", "MSFT", "AAPL", "TSLA"];

    let run = |source: &dyn VolatilitySource| -> Vec<f64> {
        symbols
            .iter()
            .map(|sym| {
                let draw = source.iv_draw(5, sym);
                evaluate_record(quote(100.0, 110.0, 20.0, 1.0, 50.0), draw)
                    .unwrap()
                    .scenario
                    .iv
            })
            .collect()
    };

    assert_eq!(run(&source), run(&source));
    assert!(run(&FixedDraw(0.0)).iter().all(|iv| *iv == 15.0));
}
