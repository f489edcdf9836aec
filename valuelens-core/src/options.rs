//! Option scenario estimator.
//!
//! Maps one uniform draw in `[0, 1)` to a synthetic implied volatility in
//! `[15, 60)`, picks a trend and a spread strategy from RSI and IV, and
//! projects a one-standard-deviation price band over a fixed five-day
//! horizon: `price * (iv / 100) * sqrt(5 / 365)` either side of the price.
//!
//! This is a heuristic projection, not an option-pricing model. The draw is
//! always supplied by the caller; nothing in here touches an RNG.

use crate::domain::{OptionScenario, RecommendedStrategy, RiskLevel, StockMetrics, Trend};
use crate::error::{require_positive, CoreError};

pub const IV_FLOOR: f64 = 15.0;
pub const IV_SPAN: f64 = 45.0;
pub const HORIZON_DAYS: f64 = 5.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Share of a normal distribution within one standard deviation, percent.
pub const ONE_SIGMA_PROBABILITY: f64 = 68.2;

pub const OVERSOLD_RSI: f64 = 35.0;
pub const OVERBOUGHT_RSI: f64 = 70.0;
pub const VOLATILE_IV: f64 = 40.0;
pub const EXTREME_IV: f64 = 50.0;

/// `15 + draw * 45`.
pub fn implied_volatility(iv_draw: f64) -> f64 {
    IV_FLOOR + iv_draw * IV_SPAN
}

/// One-sigma move over the projection horizon.
pub fn volatility_move(price: f64, iv: f64) -> f64 {
    price * (iv / 100.0) * (HORIZON_DAYS / DAYS_PER_YEAR).sqrt()
}

struct Play {
    trend: Trend,
    name: &'static str,
    desc: &'static str,
    put_call_ratio: f64,
}

const BULL_CALL_SPREAD: Play = Play {
    trend: Trend::Bullish,
    name: "Bull Call Spread",
    desc: "Deeply oversold; expect a technical rebound within 5 days. Buy the near-month in-the-money call, sell an out-of-the-money call.",
    put_call_ratio: 0.6,
};

const BEAR_PUT_SPREAD: Play = Play {
    trend: Trend::Bearish,
    name: "Bear Put Spread",
    desc: "Momentum is exhausted; expect a pullback within 5 days. Buy the near-month in-the-money put, sell an out-of-the-money put.",
    put_call_ratio: 1.4,
};

const LONG_STRADDLE: Play = Play {
    trend: Trend::Volatile,
    name: "Long Straddle",
    desc: "IV is running hot and a breakout is close. Profits from a large move in either direction.",
    put_call_ratio: 1.0,
};

const IRON_CONDOR: Play = Play {
    trend: Trend::Neutral,
    name: "Iron Condor",
    desc: "Expect sideways chop; collect time value.",
    put_call_ratio: 0.9,
};

fn select_play(rsi: f64, iv: f64) -> &'static Play {
    if rsi < OVERSOLD_RSI {
        &BULL_CALL_SPREAD
    } else if rsi > OVERBOUGHT_RSI {
        &BEAR_PUT_SPREAD
    } else if iv > VOLATILE_IV {
        &LONG_STRADDLE
    } else {
        &IRON_CONDOR
    }
}

/// Estimate the five-day option scenario for one instrument.
///
/// `iv_draw` is expected in `[0, 1)`; fails only when the current price is
/// not positive.
pub fn estimate(metrics: &StockMetrics, iv_draw: f64) -> Result<OptionScenario, CoreError> {
    let price = require_positive("current_price", metrics.current_price())?;

    let iv = implied_volatility(iv_draw);
    let play = select_play(metrics.rsi(), iv);
    let risk_level = if iv > EXTREME_IV {
        RiskLevel::Extreme
    } else {
        RiskLevel::High
    };
    let vol_move = volatility_move(price, iv);

    Ok(OptionScenario {
        iv,
        put_call_ratio: play.put_call_ratio,
        prediction_trend: play.trend,
        target_price_low: price - vol_move,
        target_price_high: price + vol_move,
        probability: ONE_SIGMA_PROBABILITY,
        recommended_strategy: RecommendedStrategy {
            name: play.name.to_string(),
            desc: play.desc.to_string(),
            risk_level,
        },
    })
}
