//! Fixed-cadence polling loop.
//!
//! Runs one cycle per tick. The cycle counter feeds the RNG hierarchy, so
//! consecutive cycles draw different numbers while the whole sequence stays
//! reproducible from the master seed. A failed cycle is logged and polling
//! carries on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use valuelens_core::{Region, VolatilitySource};

use crate::cycle::{run_cycle, CycleReport};
use crate::feed::MarketFeed;

/// Granularity of the stop-flag check while waiting between cycles.
const STOP_CHECK: Duration = Duration::from_millis(100);

pub struct Poller<'a> {
    feed: &'a MarketFeed,
    vol: &'a dyn VolatilitySource,
    region: Region,
    interval: Duration,
    max_cycles: Option<u64>,
    stop: Arc<AtomicBool>,
}

impl<'a> Poller<'a> {
    pub fn new(
        feed: &'a MarketFeed,
        vol: &'a dyn VolatilitySource,
        region: Region,
        interval: Duration,
    ) -> Self {
        Self {
            feed,
            vol,
            region,
            interval,
            max_cycles: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop after `cycles` cycles instead of running until stopped.
    pub fn max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Flag that ends the loop once set. Checked between cycles.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run until stopped or `max_cycles` is reached. Returns the number of
    /// cycles attempted.
    pub fn run<F>(&self, mut on_report: F) -> u64
    where
        F: FnMut(&CycleReport),
    {
        let mut cycle = 0u64;
        loop {
            if self.stopped() || self.max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }

            let started = Instant::now();
            match run_cycle(self.feed, self.vol, self.region, cycle) {
                Ok(report) => on_report(&report),
                Err(e) => error!(cycle, error = %e, "cycle failed"),
            }
            cycle += 1;

            if self.max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }
            self.wait(self.interval.saturating_sub(started.elapsed()));
        }

        info!(cycles = cycle, region = %self.region, "polling stopped");
        cycle
    }

    fn wait(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(STOP_CHECK.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Watchlists;
    use valuelens_core::RngHierarchy;

    fn feed() -> MarketFeed {
        MarketFeed::new(Watchlists::default(), None, RngHierarchy::new(42))
    }

    #[test]
    fn runs_the_requested_number_of_cycles() {
        let feed = feed();
        let vol = RngHierarchy::new(42);
        let poller = Poller::new(&feed, &vol, Region::US, Duration::ZERO).max_cycles(3);
        let mut seen = Vec::new();
        let ran = poller.run(|r| seen.push(r.cycle));
        assert_eq!(ran, 3);
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn stop_flag_ends_the_loop() {
        let feed = feed();
        let vol = RngHierarchy::new(42);
        let poller = Poller::new(&feed, &vol, Region::CN, Duration::from_secs(3600));
        let stop = poller.stop_handle();
        let ran = poller.run(|_| stop.store(true, Ordering::Relaxed));
        assert_eq!(ran, 1);
    }

    #[test]
    fn failed_cycles_do_not_stop_polling() {
        let empty = Watchlists {
            us: vec![],
            cn: vec![],
        };
        let feed = MarketFeed::new(empty, None, RngHierarchy::new(1));
        let vol = RngHierarchy::new(1);
        let poller = Poller::new(&feed, &vol, Region::US, Duration::ZERO).max_cycles(2);
        let mut reports = 0;
        assert_eq!(poller.run(|_| reports += 1), 2);
        assert_eq!(reports, 0);
    }

    #[test]
    fn consecutive_cycles_differ() {
        let feed = feed();
        let vol = RngHierarchy::new(42);
        let poller = Poller::new(&feed, &vol, Region::CN, Duration::ZERO).max_cycles(2);
        let mut prices = Vec::new();
        poller.run(|r| prices.push(r.evaluations[0].metrics.current_price()));
        assert_ne!(prices[0], prices[1]);
    }
}
