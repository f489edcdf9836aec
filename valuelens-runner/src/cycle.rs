//! Evaluation cycle: feed snapshot in, report out.
//!
//! One cycle loads quotes for a region, assembles metrics, takes one
//! implied-volatility draw per instrument from the injected source, and
//! evaluates the universe on the rayon pool. Results keep watchlist order, so
//! a parallel run is identical to a sequential one.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use valuelens_core::{evaluate, Evaluation, QuoteRecord, Region, StockMetrics, VolatilitySource};

use crate::board::Board;
use crate::feed::{FeedSnapshot, FetchFailure, MarketFeed};
use crate::provider::DataSource;
use crate::thermometer::MarketThermometer;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("no instruments to evaluate for region {0}")]
    EmptyUniverse(Region),
}

/// An instrument left out of a cycle, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skipped {
    pub symbol: String,
    pub reason: String,
}

/// Everything one evaluation cycle produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub cycle: u64,
    pub region: Region,
    pub generated_at: DateTime<Utc>,
    pub evaluations: Vec<Evaluation>,
    /// Dropped by the feed or rejected by the assembler.
    pub skipped: Vec<Skipped>,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
    pub thermometer: MarketThermometer,
    pub board: Board,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl CycleReport {
    pub fn evaluation(&self, symbol: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.symbol() == symbol)
    }
}

/// Load a snapshot from `feed` and evaluate it.
pub fn run_cycle(
    feed: &MarketFeed,
    vol: &dyn VolatilitySource,
    region: Region,
    cycle: u64,
) -> Result<CycleReport, CycleError> {
    let snapshot = feed.load(region, cycle);
    evaluate_snapshot(snapshot, vol)
}

/// Evaluate an already-loaded snapshot.
pub fn evaluate_snapshot(
    snapshot: FeedSnapshot,
    vol: &dyn VolatilitySource,
) -> Result<CycleReport, CycleError> {
    let FeedSnapshot {
        region,
        cycle,
        records,
        sources,
        has_synthetic,
        failures,
    } = snapshot;

    let mut skipped: Vec<Skipped> = failures
        .into_iter()
        .map(|FetchFailure { symbol, reason }| Skipped { symbol, reason })
        .collect();

    let mut universe = Vec::with_capacity(records.len());
    for record in records {
        let symbol = record.symbol.clone();
        match StockMetrics::assemble(record) {
            Ok(metrics) => universe.push(metrics),
            Err(e) => {
                warn!(%symbol, error = %e, "rejected quote record");
                skipped.push(Skipped {
                    symbol,
                    reason: e.to_string(),
                });
            }
        }
    }

    if universe.is_empty() {
        return Err(CycleError::EmptyUniverse(region));
    }

    // Draw before evaluating: the draw for a symbol never depends on pool scheduling.
    let draws: Vec<f64> = universe
        .iter()
        .map(|m| vol.iv_draw(cycle, m.symbol()))
        .collect();

    let results: Vec<Result<Evaluation, (String, String)>> = universe
        .into_par_iter()
        .zip(draws.into_par_iter())
        .map(|(metrics, draw)| {
            let symbol = metrics.symbol().to_string();
            evaluate(metrics, draw).map_err(|e| (symbol, e.to_string()))
        })
        .collect();

    let mut evaluations = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(evaluation) => {
                debug!(
                    symbol = evaluation.symbol(),
                    rule = %evaluation.verdict.rule,
                    margin = evaluation.margin_of_safety(),
                    "evaluated"
                );
                evaluations.push(evaluation);
            }
            Err((symbol, reason)) => {
                warn!(%symbol, %reason, "evaluation failed");
                skipped.push(Skipped { symbol, reason });
            }
        }
    }

    if evaluations.is_empty() {
        return Err(CycleError::EmptyUniverse(region));
    }

    let thermometer = MarketThermometer::from_evaluations(&evaluations);
    let board = Board::from_evaluations(&evaluations);

    info!(
        cycle,
        %region,
        evaluated = evaluations.len(),
        skipped = skipped.len(),
        mood = %thermometer.mood,
        avg_margin = thermometer.average_margin,
        "cycle complete"
    );

    Ok(CycleReport {
        schema_version: SCHEMA_VERSION,
        cycle,
        region,
        generated_at: Utc::now(),
        evaluations,
        skipped,
        sources,
        has_synthetic,
        thermometer,
        board,
    })
}

/// Evaluate records directly, without a feed. Records are taken as live.
pub fn evaluate_records(
    region: Region,
    cycle: u64,
    records: Vec<QuoteRecord>,
    vol: &dyn VolatilitySource,
) -> Result<CycleReport, CycleError> {
    let sources = records
        .iter()
        .map(|r| (r.symbol.clone(), DataSource::Live))
        .collect();
    evaluate_snapshot(
        FeedSnapshot {
            region,
            cycle,
            records,
            sources,
            has_synthetic: false,
            failures: Vec::new(),
        },
        vol,
    )
}
