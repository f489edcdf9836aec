//! Narrative copy attached to each classifier rule.
//!
//! Pure templates: they read metric values for display only and never
//! influence which rule fires.

use crate::domain::{RuleId, StockMetrics};
use crate::moat::{MoatFailure, MoatReport, MAX_DEBT_TO_EBITDA, MIN_ROIC};

/// Text fields of a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub sentiment: String,
    pub quote: String,
    pub analysis: String,
    pub desc: String,
}

impl Narrative {
    fn new(sentiment: &str, quote: &str, analysis: String, desc: String) -> Self {
        Self {
            sentiment: sentiment.to_string(),
            quote: quote.to_string(),
            analysis,
            desc,
        }
    }
}

pub fn for_rule(
    rule: RuleId,
    metrics: &StockMetrics,
    moat: &MoatReport,
    stink_bid_price: f64,
) -> Narrative {
    match rule {
        RuleId::FundamentalsFail => Narrative::new(
            "Fundamentals fail",
            "Buying cheap junk is cigar-butt investing. We want the crown in distress, not the butt.",
            format!(
                "Moat breached: {}. Do not touch it even if it looks cheap.",
                moat_breaches(metrics, moat)
            ),
            "Business quality did not pass the screen.".to_string(),
        ),
        RuleId::DeepValue => Narrative::new(
            "A gift (Deep value)",
            "Be greedy when others are fearful. Mr. Market is selling a dollar for fifty cents.",
            format!(
                "Abyss zone: fear has pushed the price {:.1}% below intrinsic value. This is the moment a defensive investor waits for.",
                metrics.margin_of_safety()
            ),
            "Margin of safety is very thick; commit the remaining capital once the price stabilizes."
                .to_string(),
        ),
        RuleId::ScoutEntry => Narrative::new(
            "Prey in range (Sniper)",
            "Do not catch a falling knife. Wait for the hourly chart to settle; an oversold RSI is the first signal.",
            format!(
                "Strike zone: price is below 0.7x intrinsic value and RSI {:.1} shows a deeply oversold tape.",
                metrics.rsi()
            ),
            "RSI below 30 inside the strike zone. Send the scouts in.".to_string(),
        ),
        RuleId::Watch => Narrative::new(
            "Watch zone",
            "Patience is a virtue. The prey is in sight but not yet in the best firing position.",
            format!(
                "A {:.1}% margin of safety is on the table, but RSI {:.1} is not oversold yet.",
                metrics.margin_of_safety(),
                metrics.rsi()
            ),
            format!("Rest a stink bid at ${stink_bid_price:.2}."),
        ),
        RuleId::Bubble => Narrative::new(
            "Irrational exuberance (Bubble)",
            "Counting money on the road to hell is still speculation.",
            format!(
                "Price is {:.1}% above value. The only support left is the greater-fool theory.",
                -metrics.margin_of_safety()
            ),
            "Find the next prey.".to_string(),
        ),
        RuleId::Trim => Narrative::new(
            "Risk building (Risky)",
            "Price is what you pay, value is what you get. Right now the two have converged.",
            format!(
                "Price has returned to intrinsic value; the margin of safety is down to {:.1}%.",
                metrics.margin_of_safety()
            ),
            "Stop buying and start taking profits.".to_string(),
        ),
        RuleId::Hold => Narrative::new(
            "Average",
            "Boredom is a virtue. If nothing is obviously cheap, do nothing.",
            format!(
                "Fairly priced, but a {:.1}% margin of safety is short of the 30% strike zone.",
                metrics.margin_of_safety()
            ),
            "Wait for a better price.".to_string(),
        ),
    }
}

fn moat_breaches(metrics: &StockMetrics, moat: &MoatReport) -> String {
    let parts: Vec<String> = moat
        .failures()
        .into_iter()
        .map(|failure| match failure {
            MoatFailure::LowRoic => format!(
                "ROIC {:.1}% is below the {MIN_ROIC:.0}% floor",
                metrics.roic()
            ),
            MoatFailure::HighLeverage => format!(
                "debt/EBITDA {:.1}x exceeds the {MAX_DEBT_TO_EBITDA:.1}x ceiling",
                metrics.debt_to_ebitda()
            ),
        })
        .collect();

    if parts.is_empty() {
        // Only reachable if a caller pairs this rule with a passing report.
        format!(
            "ROIC {:.1}%, debt/EBITDA {:.1}x",
            metrics.roic(),
            metrics.debt_to_ebitda()
        )
    } else {
        parts.join("; ")
    }
}
