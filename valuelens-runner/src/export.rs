//! Report export: JSON, CSV, and Markdown.
//!
//! - **JSON**: the full `CycleReport`, schema-versioned
//! - **CSV**: one verdict row per instrument for spreadsheets
//! - **Markdown**: a short human-readable summary of the cycle
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cycle::{CycleReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &CycleReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize CycleReport to JSON")
}

/// Deserialize a `CycleReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<CycleReport> {
    let report: CycleReport =
        serde_json::from_str(json).context("failed to deserialize CycleReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per evaluated instrument.
///
/// Columns: symbol, region, price, fair_value, margin_of_safety, quality,
/// rule, strategy, stage, allocation, stink_bid, iv, trend, target_low,
/// target_high, option_strategy, risk_level
pub fn export_verdicts_csv(report: &CycleReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "region",
        "price",
        "fair_value",
        "margin_of_safety",
        "quality",
        "rule",
        "strategy",
        "stage",
        "allocation",
        "stink_bid",
        "iv",
        "trend",
        "target_low",
        "target_high",
        "option_strategy",
        "risk_level",
    ])?;

    for e in &report.evaluations {
        let m = &e.metrics;
        let v = &e.verdict;
        let s = &e.scenario;
        wtr.write_record([
            m.symbol(),
            &m.region().to_string(),
            &format!("{:.2}", m.current_price()),
            &format!("{:.2}", m.fair_value()),
            &format!("{:.2}", m.margin_of_safety()),
            if e.moat.passes() { "pass" } else { "fail" },
            v.rule.as_str(),
            &v.strategy,
            &v.execution.stage.to_string(),
            &v.execution.allocation,
            &format!("{:.2}", v.stink_bid_price),
            &format!("{:.1}", s.iv),
            &s.prediction_trend.to_string(),
            &format!("{:.2}", s.target_price_low),
            &format!("{:.2}", s.target_price_high),
            &s.recommended_strategy.name,
            &s.recommended_strategy.risk_level.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown summary ───────────────────────────────────────────────

pub fn generate_summary(report: &CycleReport) -> String {
    let mut md = String::with_capacity(1024);
    let t = &report.thermometer;

    md.push_str(&format!(
        "# {} scan, cycle {}\n\n",
        report.region, report.cycle
    ));
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Generated | {} |\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("| Instruments | {} |\n", t.instruments));
    md.push_str(&format!("| Average margin | {:.1}% |\n", t.average_margin));
    md.push_str(&format!("| Mood | {} ({:.0}/100) |\n", t.mood, t.pointer));
    if report.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Opportunities\n\n");
    if report.board.opportunities.is_empty() {
        md.push_str("None.\n");
    }
    for b in &report.board.opportunities {
        md.push_str(&format!(
            "- **{}** {} {:+.1}% {}\n",
            b.symbol, b.name, b.margin_of_safety, b.strategy
        ));
    }

    md.push_str("\n## Risks\n\n");
    if report.board.risks.is_empty() {
        md.push_str("None.\n");
    }
    for b in &report.board.risks {
        md.push_str(&format!(
            "- **{}** {} {:+.1}% {}\n",
            b.symbol, b.name, b.margin_of_safety, b.strategy
        ));
    }

    if !report.skipped.is_empty() {
        md.push_str("\n## Skipped\n\n");
        for s in &report.skipped {
            md.push_str(&format!("- {}: {}\n", s.symbol, s.reason));
        }
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

pub fn cycle_dir(output_dir: &Path, cycle: u64) -> PathBuf {
    output_dir.join(format!("cycle-{cycle:06}"))
}

/// Save the artifact set for one cycle under `output_dir/cycle-NNNNNN/`:
/// - `report.json`: the full `CycleReport`
/// - `verdicts.csv`: one row per instrument
/// - `summary.md`: board and thermometer
///
/// Returns the path to the created directory.
pub fn save_report(report: &CycleReport, output_dir: &Path) -> Result<PathBuf> {
    let dir = cycle_dir(output_dir, report.cycle);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create report dir: {}", dir.display()))?;

    std::fs::write(dir.join("report.json"), export_json(report)?)?;
    std::fs::write(dir.join("verdicts.csv"), export_verdicts_csv(report)?)?;
    std::fs::write(dir.join("summary.md"), generate_summary(report))?;

    Ok(dir)
}

/// Load a `CycleReport` from a cycle directory's report.json.
pub fn load_report(dir: &Path) -> Result<CycleReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::evaluate_records;
    use valuelens_core::{FixedDraw, QuoteRecord, Region, VolumeStatus};

    fn rec(symbol: &str, price: f64) -> QuoteRecord {
        QuoteRecord {
            symbol: symbol.into(),
            name: format!("{symbol} Corp"),
            sector: "Test".into(),
            region: Region::US,
            current_price: price,
            fair_value: 100.0,
            roic: 20.0,
            debt_to_ebitda: 1.0,
            rsi: 50.0,
            volume_status: VolumeStatus::Normal,
        }
    }

    fn report() -> CycleReport {
        evaluate_records(
            Region::US,
            7,
            vec![rec("CHEAP", 45.0), rec("RICH", 130.0)],
            &FixedDraw(0.5),
        )
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_instrument() {
        let csv = export_verdicts_csv(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("symbol,region,price,fair_value,margin_of_safety"));
        assert!(lines[1].starts_with("CHEAP,US,45.00,100.00,55.00,pass,deep_value,"));
        assert!(lines[2].contains(",bubble,"));
    }

    #[test]
    fn json_round_trip_keeps_evaluations() {
        let r = report();
        let back = import_json(&export_json(&r).unwrap()).unwrap();
        assert_eq!(back.evaluations, r.evaluations);
        assert_eq!(back.cycle, 7);
    }

    #[test]
    fn json_round_trip_is_exact_for_derived_prices() {
        let records = (0..200)
            .map(|i| rec(&format!("S{i:03}"), 40.0 + i as f64 * 0.37))
            .collect();
        let r = evaluate_records(Region::US, 1, records, &FixedDraw(0.37)).unwrap();
        let back = import_json(&export_json(&r).unwrap()).unwrap();
        for (a, b) in back.evaluations.iter().zip(&r.evaluations) {
            assert_eq!(
                a.verdict.stink_bid_price.to_bits(),
                b.verdict.stink_bid_price.to_bits(),
                "{}",
                a.symbol()
            );
            assert_eq!(
                a.scenario.target_price_low.to_bits(),
                b.scenario.target_price_low.to_bits()
            );
            assert_eq!(
                a.scenario.target_price_high.to_bits(),
                b.scenario.target_price_high.to_bits()
            );
        }
        assert_eq!(back.evaluations, r.evaluations);
        assert_eq!(back.thermometer, r.thermometer);
    }

    #[test]
    fn future_schema_version_rejected() {
        let mut r = report();
        r.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&r).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn summary_lists_board() {
        let md = generate_summary(&report());
        assert!(md.contains("# US scan, cycle 7"));
        assert!(md.contains("**CHEAP**"));
        assert!(md.contains("**RICH**"));
        assert!(!md.contains("SYNTHETIC"));
    }

    #[test]
    fn cycle_dir_is_zero_padded() {
        assert_eq!(
            cycle_dir(Path::new("out"), 12),
            Path::new("out").join("cycle-000012")
        );
    }
}
