//! ValueLens CLI: single-instrument evaluation, scans, and polling.
//!
//! Commands:
//! - `evaluate`: assemble and evaluate one instrument from flags
//! - `scan`: run one evaluation cycle over a region's watchlist
//! - `watch`: poll the watchlist on a fixed cadence

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use valuelens_core::{
    evaluate_record, Evaluation, QuoteRecord, Region, RngHierarchy, VolatilitySource,
    VolumeStatus,
};
use valuelens_runner::{
    run_cycle, save_report, CircuitBreaker, CycleReport, FinnhubProvider, MarketFeed, Poller,
    QuoteProvider, WatchConfig,
};

#[derive(Parser)]
#[command(
    name = "valuelens",
    about = "ValueLens CLI — margin-of-safety verdicts and option scenarios"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG overrides.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum RegionArg {
    Us,
    Cn,
}

impl From<RegionArg> for Region {
    fn from(r: RegionArg) -> Self {
        match r {
            RegionArg::Us => Region::US,
            RegionArg::Cn => Region::CN,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum VolumeArg {
    Low,
    Normal,
    High,
}

impl From<VolumeArg> for VolumeStatus {
    fn from(v: VolumeArg) -> Self {
        match v {
            VolumeArg::Low => VolumeStatus::Low,
            VolumeArg::Normal => VolumeStatus::Normal,
            VolumeArg::High => VolumeStatus::High,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one instrument from explicit readings.
    Evaluate {
        #[arg(long)]
        symbol: String,

        /// Current market price.
        #[arg(long)]
        price: f64,

        #[arg(long)]
        fair_value: f64,

        /// Return on invested capital, percent.
        #[arg(long)]
        roic: f64,

        #[arg(long)]
        debt_to_ebitda: f64,

        #[arg(long)]
        rsi: f64,

        #[arg(long, value_enum, default_value_t = VolumeArg::Normal)]
        volume: VolumeArg,

        #[arg(long, value_enum, default_value_t = RegionArg::Us)]
        region: RegionArg,

        /// Uniform [0, 1) draw behind the implied volatility. Drawn from --seed when absent.
        #[arg(long, value_parser = parse_iv_draw)]
        iv_draw: Option<f64>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print the evaluation as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run one evaluation cycle over a watchlist.
    Scan {
        /// Path to a TOML watch config. Built-in watchlists when absent.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        region: Option<RegionArg>,

        /// Master seed. Overrides the config.
        #[arg(long)]
        seed: Option<u64>,

        /// Offline mode: synthetic data only, no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Directory for report artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Poll the watchlist on a fixed cadence.
    Watch {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        region: Option<RegionArg>,

        /// Seconds between cycles. Overrides the config.
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many cycles.
        #[arg(long)]
        cycles: Option<u64>,

        #[arg(long, default_value_t = false)]
        offline: bool,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.log_format {
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };
    logging::init_logging(&cli.log_level, format);

    match cli.command {
        Commands::Evaluate {
            symbol,
            price,
            fair_value,
            roic,
            debt_to_ebitda,
            rsi,
            volume,
            region,
            iv_draw,
            seed,
            json,
        } => {
            let record = QuoteRecord {
                name: symbol.clone(),
                symbol,
                sector: String::new(),
                region: region.into(),
                current_price: price,
                fair_value,
                roic,
                debt_to_ebitda,
                rsi,
                volume_status: volume.into(),
            };
            run_evaluate(record, iv_draw, seed, json)
        }
        Commands::Scan {
            config,
            region,
            seed,
            offline,
            output_dir,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(region) = region {
                config.region = region.into();
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            run_scan(&config, offline, output_dir.as_deref())
        }
        Commands::Watch {
            config,
            region,
            interval,
            cycles,
            offline,
            output_dir,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(region) = region {
                config.region = region.into();
            }
            if let Some(interval) = interval {
                config.poll_interval_secs = interval;
            }
            config.validate()?;
            run_watch(&config, cycles, offline, output_dir)
        }
    }
}

fn parse_iv_draw(s: &str) -> std::result::Result<f64, String> {
    let draw: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if (0.0..1.0).contains(&draw) {
        Ok(draw)
    } else {
        Err(format!("{draw} is outside [0, 1)"))
    }
}

fn load_config(path: Option<&Path>) -> Result<WatchConfig> {
    match path {
        Some(p) => WatchConfig::from_file(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(WatchConfig::default()),
    }
}

fn run_evaluate(record: QuoteRecord, iv_draw: Option<f64>, seed: u64, json: bool) -> Result<()> {
    let draw = iv_draw.unwrap_or_else(|| RngHierarchy::new(seed).iv_draw(0, &record.symbol));
    let evaluation = evaluate_record(record, draw).context("invalid instrument readings")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }
    Ok(())
}

/// Live provider for US scans when a token is configured.
fn build_feed(config: &WatchConfig, offline: bool) -> MarketFeed {
    let provider: Option<Arc<dyn QuoteProvider>> = if offline || config.region == Region::CN {
        None
    } else {
        let breaker = Arc::new(CircuitBreaker::for_quotes());
        match FinnhubProvider::from_env(&config.api_key_env, breaker) {
            Ok(p) => Some(Arc::new(p) as Arc<dyn QuoteProvider>),
            Err(e) => {
                warn!(error = %e, "no live quote provider; using synthetic data");
                None
            }
        }
    };

    MarketFeed::new(
        config.watchlist.clone(),
        provider,
        RngHierarchy::new(config.seed),
    )
    .offline(offline)
}

fn run_scan(config: &WatchConfig, offline: bool, output_dir: Option<&Path>) -> Result<()> {
    let feed = build_feed(config, offline);
    let vol = RngHierarchy::new(config.seed);
    let report = run_cycle(&feed, &vol, config.region, 0)?;

    print_report(&report);
    if let Some(dir) = output_dir {
        let path = save_report(&report, dir)?;
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn run_watch(
    config: &WatchConfig,
    cycles: Option<u64>,
    offline: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let feed = build_feed(config, offline);
    let vol = RngHierarchy::new(config.seed);
    let mut poller = Poller::new(
        &feed,
        &vol,
        config.region,
        Duration::from_secs(config.poll_interval_secs),
    );
    if let Some(n) = cycles {
        poller = poller.max_cycles(n);
    }

    let ran = poller.run(|report| {
        print_report(report);
        if let Some(dir) = &output_dir {
            match save_report(report, dir) {
                Ok(path) => println!("Report saved to: {}", path.display()),
                Err(e) => warn!(cycle = report.cycle, error = %e, "failed to save report"),
            }
        }
    });

    println!("Polling finished after {ran} cycle(s).");
    Ok(())
}

fn print_evaluation(e: &Evaluation) {
    let m = &e.metrics;
    let v = &e.verdict;
    let s = &e.scenario;

    println!();
    println!("=== {} ({}) ===", m.symbol(), m.region());
    println!(
        "Price:          {:.2}  (fair value {:.2})",
        m.current_price(),
        m.fair_value()
    );
    println!("Margin:         {:+.2}%", m.margin_of_safety());
    println!(
        "Quality:        {}  (ROIC {:.1}%, debt/EBITDA {:.1}x)",
        if e.moat.passes() { "pass" } else { "fail" },
        m.roic(),
        m.debt_to_ebitda()
    );
    println!();
    println!("Verdict:        {}  [{}]", v.strategy, v.rule);
    println!("Sentiment:      {}", v.sentiment);
    println!("Quote:          \"{}\"", v.quote);
    println!("Analysis:       {}", v.analysis);
    println!(
        "Execution:      {} / {}  {}",
        v.execution.stage, v.execution.allocation, v.execution.desc
    );
    if v.stink_bid_price > 0.0 {
        println!("Stink bid:      {:.2}", v.stink_bid_price);
    }
    println!();
    println!(
        "Options:        IV {:.1}%, P/C {:.2}, {}",
        s.iv, s.put_call_ratio, s.prediction_trend
    );
    println!(
        "5-day band:     {:.2} .. {:.2}  ({:.1}%)",
        s.target_price_low, s.target_price_high, s.probability
    );
    println!(
        "Play:           {} ({} risk) {}",
        s.recommended_strategy.name, s.recommended_strategy.risk_level, s.recommended_strategy.desc
    );
}

fn print_report(report: &CycleReport) {
    let t = &report.thermometer;
    println!();
    println!(
        "=== {} cycle {} · {} instruments{} ===",
        report.region,
        report.cycle,
        t.instruments,
        if report.has_synthetic { " · SYNTHETIC" } else { "" }
    );
    println!(
        "Thermometer:    {}  avg margin {:+.1}%  gauge {:.0}/100",
        t.mood, t.average_margin, t.pointer
    );
    println!();
    println!(
        "{:<8} {:>10} {:>10} {:>8}  {:<16} {:<6} {:>6}",
        "Symbol", "Price", "Fair", "Margin", "Strategy", "Stage", "IV"
    );
    for e in &report.evaluations {
        println!(
            "{:<8} {:>10.2} {:>10.2} {:>7.1}%  {:<16} {:<6} {:>5.1}%",
            e.symbol(),
            e.metrics.current_price(),
            e.metrics.fair_value(),
            e.margin_of_safety(),
            e.verdict.strategy,
            e.verdict.execution.stage.to_string(),
            e.scenario.iv
        );
    }
    for s in &report.skipped {
        println!("skipped {}: {}", s.symbol, s.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate_args(iv_draw: &str) -> Vec<String> {
        [
            "valuelens", "evaluate", "--symbol", "X", "--price", "50", "--fair-value", "100",
            "--roic", "20", "--debt-to-ebitda", "1", "--rsi", "40", "--iv-draw", iv_draw,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn iv_draw_accepts_unit_interval() {
        for ok in ["0", "0.5", "0.999"] {
            let cli = Cli::try_parse_from(evaluate_args(ok)).unwrap();
            match cli.command {
                Commands::Evaluate { iv_draw, .. } => assert!(iv_draw.is_some()),
                _ => panic!("expected evaluate"),
            }
        }
    }

    #[test]
    fn iv_draw_outside_unit_interval_is_rejected() {
        for bad in ["1", "5", "-0.1", "NaN", "abc"] {
            assert!(Cli::try_parse_from(evaluate_args(bad)).is_err(), "{bad}");
        }
    }
}
