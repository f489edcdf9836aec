//! Mock-data synthesis.
//!
//! Builds quote records when no live price is available, and fills in any
//! fundamentals a watch entry does not configure. Every draw comes from the
//! mock-data stream of the RNG hierarchy for `(cycle, symbol)`, so a seeded
//! scan reproduces exactly. Records produced here are tagged
//! `DataSource::Synthetic` by the feed.

use rand::rngs::StdRng;
use rand::Rng;
use valuelens_core::{QuoteRecord, Region, RngHierarchy, Stream, VolumeStatus};

use crate::config::WatchEntry;

/// Price multipliers: a cheap regime and an expensive one, chosen 50/50.
pub const CHEAP_BIAS: f64 = 0.8;
pub const RICH_BIAS: f64 = 1.1;

/// Half-width of the percentage noise applied on top of the bias.
pub const NOISE_PCT: f64 = 1.25;

/// Share of synthesized instruments that get quality fundamentals.
pub const QUALITY_SHARE: f64 = 0.7;

/// Share of synthesized instruments trading on high volume.
pub const HIGH_VOLUME_SHARE: f64 = 0.3;

/// Margin above which a synthesized RSI is drawn from the oversold band.
const DISCOUNT_MARGIN: f64 = 20.0;

/// Draw a price around the entry's fair value.
pub fn synthesize_price(entry: &WatchEntry, rng: &mut StdRng) -> f64 {
    let noise: f64 = rng.gen_range(-NOISE_PCT..NOISE_PCT);
    let bias = if rng.gen_bool(0.5) { CHEAP_BIAS } else { RICH_BIAS };
    entry.fair_value * bias * (1.0 + noise / 100.0)
}

/// Build a record for `entry` at `current_price`, synthesizing any
/// fundamentals the entry leaves unset.
pub fn enrich(
    entry: &WatchEntry,
    region: Region,
    current_price: f64,
    rng: &mut StdRng,
) -> QuoteRecord {
    let roic = entry.roic.unwrap_or_else(|| {
        if rng.gen_bool(QUALITY_SHARE) {
            15.0 + rng.gen::<f64>() * 10.0
        } else {
            5.0 + rng.gen::<f64>() * 8.0
        }
    });

    let debt_to_ebitda = entry.debt_to_ebitda.unwrap_or_else(|| {
        if rng.gen_bool(QUALITY_SHARE) {
            1.0 + rng.gen::<f64>() * 1.5
        } else {
            3.5 + rng.gen::<f64>() * 2.0
        }
    });

    let rsi = entry.rsi.unwrap_or_else(|| {
        let margin = (entry.fair_value - current_price) / entry.fair_value * 100.0;
        if margin > DISCOUNT_MARGIN {
            25.0 + rng.gen::<f64>() * 15.0
        } else {
            45.0 + rng.gen::<f64>() * 30.0
        }
    });

    let volume_status = entry.volume_status.unwrap_or_else(|| {
        if rng.gen_bool(HIGH_VOLUME_SHARE) {
            VolumeStatus::High
        } else {
            VolumeStatus::Normal
        }
    });

    QuoteRecord {
        symbol: entry.symbol.clone(),
        name: entry.name.clone(),
        sector: entry.sector.clone(),
        region,
        current_price,
        fair_value: entry.fair_value,
        roic,
        debt_to_ebitda,
        rsi,
        volume_status,
    }
}

/// Fully synthetic record: price and unset fundamentals both drawn.
pub fn synthetic_record(
    entry: &WatchEntry,
    region: Region,
    hierarchy: &RngHierarchy,
    cycle: u64,
) -> QuoteRecord {
    let mut rng = hierarchy.rng_for(Stream::MockData, cycle, &entry.symbol);
    let price = synthesize_price(entry, &mut rng);
    enrich(entry, region, price, &mut rng)
}

/// Record for a live price, with unset fundamentals drawn.
pub fn live_record(
    entry: &WatchEntry,
    region: Region,
    current_price: f64,
    hierarchy: &RngHierarchy,
    cycle: u64,
) -> QuoteRecord {
    let mut rng = hierarchy.rng_for(Stream::MockData, cycle, &entry.symbol);
    enrich(entry, region, current_price, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuelens_core::StockMetrics;

    fn entry() -> WatchEntry {
        WatchEntry::new("NVDA", "NVIDIA", "Technology", 720.0)
    }

    #[test]
    fn synthetic_record_is_reproducible() {
        let h = RngHierarchy::new(42);
        let a = synthetic_record(&entry(), Region::US, &h, 3);
        let b = synthetic_record(&entry(), Region::US, &h, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn cycles_differ() {
        let h = RngHierarchy::new(42);
        let a = synthetic_record(&entry(), Region::US, &h, 0);
        let b = synthetic_record(&entry(), Region::US, &h, 1);
        assert_ne!(a.current_price, b.current_price);
    }

    #[test]
    fn price_lies_in_one_of_the_two_regimes() {
        let h = RngHierarchy::new(7);
        let fv = entry().fair_value;
        for cycle in 0..200 {
            let r = synthetic_record(&entry(), Region::US, &h, cycle);
            let cheap = fv * CHEAP_BIAS;
            let rich = fv * RICH_BIAS;
            let within = |center: f64| {
                let lo = center * (1.0 - NOISE_PCT / 100.0);
                let hi = center * (1.0 + NOISE_PCT / 100.0);
                r.current_price >= lo && r.current_price <= hi
            };
            assert!(within(cheap) || within(rich), "price {} off-regime", r.current_price);
        }
    }

    #[test]
    fn synthesized_fundamentals_stay_in_bands() {
        let h = RngHierarchy::new(11);
        for cycle in 0..200 {
            let r = synthetic_record(&entry(), Region::US, &h, cycle);
            assert!((5.0..25.0).contains(&r.roic), "roic {}", r.roic);
            assert!((1.0..5.5).contains(&r.debt_to_ebitda), "debt {}", r.debt_to_ebitda);
            assert!((25.0..75.0).contains(&r.rsi), "rsi {}", r.rsi);
            assert_ne!(r.volume_status, VolumeStatus::Low);
        }
    }

    #[test]
    fn discounted_price_draws_oversold_rsi() {
        let mut rng = RngHierarchy::new(1).rng_for(Stream::MockData, 0, "NVDA");
        // 720 * 0.75 = 540, margin 25%.
        let r = enrich(&entry(), Region::US, 540.0, &mut rng);
        assert!((25.0..40.0).contains(&r.rsi));
    }

    #[test]
    fn configured_fundamentals_are_kept() {
        let mut e = entry();
        e.roic = Some(40.0);
        e.debt_to_ebitda = Some(0.2);
        e.rsi = Some(61.0);
        e.volume_status = Some(VolumeStatus::Low);
        let r = live_record(&e, Region::US, 700.0, &RngHierarchy::new(5), 0);
        assert_eq!(r.current_price, 700.0);
        assert_eq!(r.roic, 40.0);
        assert_eq!(r.debt_to_ebitda, 0.2);
        assert_eq!(r.rsi, 61.0);
        assert_eq!(r.volume_status, VolumeStatus::Low);
    }

    #[test]
    fn synthetic_records_always_assemble() {
        let h = RngHierarchy::new(99);
        for e in crate::config::default_cn() {
            let r = synthetic_record(&e, Region::CN, &h, 0);
            assert!(StockMetrics::assemble(r).is_ok());
        }
    }
}
