//! Market feed and fallback policy.
//!
//! Resolves the watchlist of a region into quote records for one cycle:
//! 1. CN region → always synthetic (no free live source)
//! 2. US region with a provider, online → live price per symbol;
//!    symbols whose fetch fails are dropped with a warning
//! 3. Every live fetch failed, no provider, or offline → whole list synthetic
//!
//! Live prices are enriched with configured or synthesized fundamentals.
//! Synthetic records are tagged so reports can flag them.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use valuelens_core::{QuoteRecord, Region, RngHierarchy};

use crate::config::{WatchEntry, Watchlists};
use crate::provider::{DataSource, FeedError, QuoteProvider};
use crate::synthetic;

/// One symbol whose live fetch failed this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub symbol: String,
    pub reason: String,
}

/// Quote records for one region and cycle, with provenance.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub region: Region,
    pub cycle: u64,
    /// In watchlist order.
    pub records: Vec<QuoteRecord>,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
    pub failures: Vec<FetchFailure>,
}

pub struct MarketFeed {
    watchlists: Watchlists,
    provider: Option<Arc<dyn QuoteProvider>>,
    hierarchy: RngHierarchy,
    offline: bool,
}

impl MarketFeed {
    pub fn new(
        watchlists: Watchlists,
        provider: Option<Arc<dyn QuoteProvider>>,
        hierarchy: RngHierarchy,
    ) -> Self {
        Self {
            watchlists,
            provider,
            hierarchy,
            offline: false,
        }
    }

    /// Never touch the network; every record is synthetic.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn watchlist(&self, region: Region) -> &[WatchEntry] {
        self.watchlists.for_region(region)
    }

    pub fn load(&self, region: Region, cycle: u64) -> FeedSnapshot {
        let entries = self.watchlists.for_region(region);

        let provider = match (&self.provider, region, self.offline) {
            (Some(p), Region::US, false) if p.is_available() => Some(&**p),
            _ => None,
        };

        if let Some(provider) = provider {
            let snapshot = self.load_live(provider, entries, region, cycle);
            if !snapshot.records.is_empty() {
                return snapshot;
            }
            warn!(
                provider = provider.name(),
                failed = snapshot.failures.len(),
                "every live fetch failed; falling back to synthetic data"
            );
            let mut fallback = self.load_synthetic(entries, region, cycle);
            fallback.failures = snapshot.failures;
            return fallback;
        }

        self.load_synthetic(entries, region, cycle)
    }

    fn load_live(
        &self,
        provider: &dyn QuoteProvider,
        entries: &[WatchEntry],
        region: Region,
        cycle: u64,
    ) -> FeedSnapshot {
        // Per-symbol fetches are independent; collect preserves watchlist order.
        let fetched: Vec<(&WatchEntry, Result<f64, FeedError>)> = entries
            .par_iter()
            .map(|entry| {
                let price = provider.fetch(&entry.symbol).and_then(|q| {
                    if q.current_price.is_finite() && q.current_price > 0.0 {
                        Ok(q.current_price)
                    } else {
                        Err(FeedError::NoPrice {
                            symbol: entry.symbol.clone(),
                        })
                    }
                });
                (entry, price)
            })
            .collect();

        let mut records = Vec::with_capacity(entries.len());
        let mut sources = BTreeMap::new();
        let mut failures = Vec::new();

        for (entry, result) in fetched {
            match result {
                Ok(price) => {
                    records.push(synthetic::live_record(
                        entry,
                        region,
                        price,
                        &self.hierarchy,
                        cycle,
                    ));
                    sources.insert(entry.symbol.clone(), DataSource::Live);
                }
                Err(e) => {
                    warn!(
                        symbol = %entry.symbol,
                        error = %e,
                        "quote fetch failed; dropping symbol"
                    );
                    failures.push(FetchFailure {
                        symbol: entry.symbol.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            provider = provider.name(),
            live = records.len(),
            dropped = failures.len(),
            cycle,
            "loaded live quotes"
        );

        FeedSnapshot {
            region,
            cycle,
            records,
            sources,
            has_synthetic: false,
            failures,
        }
    }

    fn load_synthetic(&self, entries: &[WatchEntry], region: Region, cycle: u64) -> FeedSnapshot {
        let records: Vec<QuoteRecord> = entries
            .iter()
            .map(|entry| synthetic::synthetic_record(entry, region, &self.hierarchy, cycle))
            .collect();
        let sources = entries
            .iter()
            .map(|entry| (entry.symbol.clone(), DataSource::Synthetic))
            .collect();

        info!(%region, count = records.len(), cycle, "generated synthetic quotes");

        FeedSnapshot {
            region,
            cycle,
            has_synthetic: !records.is_empty(),
            records,
            sources,
            failures: Vec::new(),
        }
    }
}
