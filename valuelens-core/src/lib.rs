//! ValueLens Core: metrics, moat gate, strategy classifier, option scenarios.
//!
//! This crate is the decision engine:
//! - Metrics assembler (validated `StockMetrics` with a derived margin of safety)
//! - Moat gate (ROIC and leverage quality bar)
//! - Strategy classifier (priority-ordered rule table producing a `WisdomVerdict`)
//! - Option scenario estimator (five-day one-sigma band from an injected IV draw)
//! - Deterministic RNG hierarchy that supplies those draws
//!
//! Everything here is pure and synchronous. No I/O, no global RNG, no shared
//! mutable state; instruments can be evaluated in parallel freely.

pub mod classifier;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod moat;
pub mod options;
pub mod rng;

pub use classifier::{classify, matching_rule};
pub use domain::{
    Execution, OptionScenario, QuoteRecord, RecommendedStrategy, Region, RiskLevel, RuleId,
    Stage, StockMetrics, Trend, VolumeStatus, WisdomVerdict,
};
pub use error::CoreError;
pub use evaluate::{evaluate, evaluate_record, Evaluation};
pub use moat::{is_quality, MoatFailure, MoatReport};
pub use options::estimate;
pub use rng::{FixedDraw, RngHierarchy, Stream, VolatilitySource};
