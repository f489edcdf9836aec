//! Domain types for the valuation engine

pub mod metrics;
pub mod scenario;
pub mod verdict;

pub use metrics::{QuoteRecord, Region, StockMetrics, VolumeStatus};
pub use scenario::{OptionScenario, RecommendedStrategy, RiskLevel, Trend};
pub use verdict::{Execution, RuleId, Stage, WisdomVerdict};

