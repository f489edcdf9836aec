//! Strategy classifier: priority-ordered decision list.
//!
//! `RULES` is evaluated top to bottom and the first rule whose predicate
//! holds decides the verdict. Predicates read only a `RuleInput` (margin of
//! safety, RSI, moat report), so the precedence can be tested on exact
//! boundary values without building full metrics records.
//!
//! The last rule matches unconditionally, which makes `classify` total.
//! Narrative copy lives in [`narrative`] and carries no decision logic.

pub mod narrative;

use std::fmt;

use crate::domain::{Execution, RuleId, Stage, StockMetrics, WisdomVerdict};
use crate::moat::MoatReport;

/// Resting limit buy placed this far below the current price.
pub const STINK_BID_DISCOUNT: f64 = 0.95;

/// Margin of safety at or above which the deep-value rule fires.
pub const DEEP_VALUE_MARGIN: f64 = 50.0;
/// Margin of safety at or above which the instrument is in the strike zone.
pub const STRIKE_ZONE_MARGIN: f64 = 30.0;
/// RSI strictly below this marks the strike zone as oversold.
pub const OVERSOLD_RSI: f64 = 30.0;
/// Margin of safety strictly below this is a bubble.
pub const BUBBLE_MARGIN: f64 = -20.0;
/// Margin of safety strictly below this means the cushion is gone.
pub const THIN_MARGIN: f64 = 5.0;

/// The readings the decision list looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInput {
    pub margin_of_safety: f64,
    pub rsi: f64,
    pub moat: MoatReport,
}

impl RuleInput {
    pub fn from_metrics(metrics: &StockMetrics) -> Self {
        Self {
            margin_of_safety: metrics.margin_of_safety(),
            rsi: metrics.rsi(),
            moat: MoatReport::check(metrics),
        }
    }
}

/// Static part of a rule's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub strategy: &'static str,
    pub stage: Stage,
    pub allocation: &'static str,
}

impl Outcome {
    /// Exiting plans never keep a resting buy order.
    pub fn keeps_stink_bid(&self) -> bool {
        !self.stage.is_exit()
    }
}

/// One entry of the decision list.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: RuleId,
    pub applies: fn(&RuleInput) -> bool,
    pub outcome: Outcome,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::FundamentalsFail,
        applies: |i| !i.moat.passes(),
        outcome: Outcome {
            strategy: "Avoid",
            stage: Stage::Wait,
            allocation: "0%",
        },
    },
    Rule {
        id: RuleId::DeepValue,
        applies: |i| i.margin_of_safety >= DEEP_VALUE_MARGIN,
        outcome: Outcome {
            strategy: "Aggressive buy",
            stage: Stage::Tail,
            allocation: "50%",
        },
    },
    Rule {
        id: RuleId::ScoutEntry,
        applies: |i| i.margin_of_safety >= STRIKE_ZONE_MARGIN && i.rsi < OVERSOLD_RSI,
        outcome: Outcome {
            strategy: "Scale-in",
            stage: Stage::Scout,
            allocation: "20%",
        },
    },
    Rule {
        id: RuleId::Watch,
        applies: |i| i.margin_of_safety >= STRIKE_ZONE_MARGIN,
        outcome: Outcome {
            strategy: "Ready/Watch",
            stage: Stage::Wait,
            allocation: "limit order pending",
        },
    },
    Rule {
        id: RuleId::Bubble,
        applies: |i| i.margin_of_safety < BUBBLE_MARGIN,
        outcome: Outcome {
            strategy: "Clear out",
            stage: Stage::Exit,
            allocation: "100% sell",
        },
    },
    Rule {
        id: RuleId::Trim,
        applies: |i| i.margin_of_safety < THIN_MARGIN,
        outcome: Outcome {
            strategy: "Trim",
            stage: Stage::Exit,
            allocation: "sell",
        },
    },
    Rule {
        id: RuleId::Hold,
        applies: |_| true,
        outcome: Outcome {
            strategy: "Hold",
            stage: Stage::Wait,
            allocation: "0%",
        },
    },
];

/// First rule in `RULES` whose predicate holds.
pub fn first_match(input: &RuleInput) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(input))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// The rule that decides this instrument's verdict.
pub fn matching_rule(metrics: &StockMetrics) -> RuleId {
    first_match(&RuleInput::from_metrics(metrics)).id
}

/// Classify an instrument into a verdict.
pub fn classify(metrics: &StockMetrics) -> WisdomVerdict {
    let input = RuleInput::from_metrics(metrics);
    let rule = first_match(&input);

    let stink_bid_price = if rule.outcome.keeps_stink_bid() {
        metrics.current_price() * STINK_BID_DISCOUNT
    } else {
        0.0
    };

    tracing::debug!(
        symbol = %metrics.symbol(),
        margin = input.margin_of_safety,
        rsi = input.rsi,
        rule = %rule.id,
        "classified"
    );

    let copy = narrative::for_rule(rule.id, metrics, &input.moat, stink_bid_price);

    WisdomVerdict {
        rule: rule.id,
        sentiment: copy.sentiment,
        quote: copy.quote,
        analysis: copy.analysis,
        strategy: rule.outcome.strategy.to_string(),
        execution: Execution {
            stage: rule.outcome.stage,
            allocation: rule.outcome.allocation.to_string(),
            desc: copy.desc,
        },
        stink_bid_price,
    }
}
