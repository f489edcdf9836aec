//! Per-instrument metrics record and its assembler.
//!
//! A `StockMetrics` is built fresh every evaluation cycle from a `QuoteRecord`
//! and is immutable afterwards. The margin of safety is derived on every
//! read from `(fair_value, current_price)` and never stored.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::{require_positive, CoreError};

/// Market the instrument trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    US,
    CN,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::US => write!(f, "US"),
            Region::CN => write!(f, "CN"),
        }
    }
}

/// Coarse traded-volume reading relative to the instrument's norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeStatus {
    Low,
    Normal,
    High,
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeStatus::Low => write!(f, "Low"),
            VolumeStatus::Normal => write!(f, "Normal"),
            VolumeStatus::High => write!(f, "High"),
        }
    }
}

/// Raw per-symbol input as handed over by the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub region: Region,
    pub current_price: f64,
    pub fair_value: f64,
    /// Return on invested capital, percent.
    pub roic: f64,
    pub debt_to_ebitda: f64,
    pub rsi: f64,
    pub volume_status: VolumeStatus,
}

/// Validated metrics for one instrument in one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "QuoteRecord")]
pub struct StockMetrics {
    symbol: String,
    name: String,
    sector: String,
    region: Region,
    current_price: f64,
    fair_value: f64,
    roic: f64,
    debt_to_ebitda: f64,
    rsi: f64,
    volume_status: VolumeStatus,
}

impl StockMetrics {
    /// Metrics Assembler: validate a quote record and build the metrics.
    ///
    /// Fails with `InvalidInput` when either price is not a finite positive
    /// number, or when RSI falls outside `[0, 100]`.
    pub fn assemble(record: QuoteRecord) -> Result<Self, CoreError> {
        let current_price = require_positive("current_price", record.current_price)?;
        let fair_value = require_positive("fair_value", record.fair_value)?;
        if !(0.0..=100.0).contains(&record.rsi) {
            return Err(CoreError::invalid("rsi", record.rsi, "must be within [0, 100]"));
        }
        if !record.roic.is_finite() {
            return Err(CoreError::invalid("roic", record.roic, "must be finite"));
        }
        if !record.debt_to_ebitda.is_finite() {
            return Err(CoreError::invalid(
                "debt_to_ebitda",
                record.debt_to_ebitda,
                "must be finite",
            ));
        }

        Ok(Self {
            symbol: record.symbol,
            name: record.name,
            sector: record.sector,
            region: record.region,
            current_price,
            fair_value,
            roic: record.roic,
            debt_to_ebitda: record.debt_to_ebitda,
            rsi: record.rsi,
            volume_status: record.volume_status,
        })
    }

    /// `(fair_value - current_price) / fair_value * 100`.
    ///
    /// Negative when the price is above fair value.
    pub fn margin_of_safety(&self) -> f64 {
        (self.fair_value - self.current_price) / self.fair_value * 100.0
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn fair_value(&self) -> f64 {
        self.fair_value
    }

    pub fn roic(&self) -> f64 {
        self.roic
    }

    pub fn debt_to_ebitda(&self) -> f64 {
        self.debt_to_ebitda
    }

    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    pub fn volume_status(&self) -> VolumeStatus {
        self.volume_status
    }

    /// Back to the collaborator's record shape.
    pub fn to_record(&self) -> QuoteRecord {
        QuoteRecord {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            sector: self.sector.clone(),
            region: self.region,
            current_price: self.current_price,
            fair_value: self.fair_value,
            roic: self.roic,
            debt_to_ebitda: self.debt_to_ebitda,
            rsi: self.rsi,
            volume_status: self.volume_status,
        }
    }
}

impl TryFrom<QuoteRecord> for StockMetrics {
    type Error = CoreError;

    fn try_from(record: QuoteRecord) -> Result<Self, Self::Error> {
        Self::assemble(record)
    }
}

// Reports carry the derived margin alongside its inputs.
impl Serialize for StockMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StockMetrics", 11)?;
        s.serialize_field("symbol", &self.symbol)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("sector", &self.sector)?;
        s.serialize_field("region", &self.region)?;
        s.serialize_field("current_price", &self.current_price)?;
        s.serialize_field("fair_value", &self.fair_value)?;
        s.serialize_field("margin_of_safety", &self.margin_of_safety())?;
        s.serialize_field("roic", &self.roic)?;
        s.serialize_field("debt_to_ebitda", &self.debt_to_ebitda)?;
        s.serialize_field("rsi", &self.rsi)?;
        s.serialize_field("volume_status", &self.volume_status)?;
        s.end()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Quote record with quality fundamentals and a neutral RSI.
    pub fn record(current_price: f64, fair_value: f64) -> QuoteRecord {
        QuoteRecord {
            symbol: "TEST".into(),
            name: "Test Corp".into(),
            sector: "Technology".into(),
            region: Region::US,
            current_price,
            fair_value,
            roic: 20.0,
            debt_to_ebitda: 1.5,
            rsi: 50.0,
            volume_status: VolumeStatus::Normal,
        }
    }

    pub fn metrics(
        current_price: f64,
        fair_value: f64,
        roic: f64,
        debt: f64,
        rsi: f64,
    ) -> StockMetrics {
        let mut r = record(current_price, fair_value);
        r.roic = roic;
        r.debt_to_ebitda = debt;
        r.rsi = rsi;
        StockMetrics::assemble(r).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn margin_of_safety_formula() {
        let m = StockMetrics::assemble(record(50.0, 100.0)).unwrap();
        assert_eq!(m.margin_of_safety(), 50.0);

        let m = StockMetrics::assemble(record(130.0, 100.0)).unwrap();
        assert!((m.margin_of_safety() - (-30.0)).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_prices() {
        assert!(StockMetrics::assemble(record(0.0, 100.0)).is_err());
        assert!(StockMetrics::assemble(record(-5.0, 100.0)).is_err());

        let err = StockMetrics::assemble(record(50.0, 0.0)).unwrap_err();
        assert_eq!(err.field(), "fair_value");
    }

    #[test]
    fn rejects_rsi_out_of_range() {
        let mut r = record(50.0, 100.0);
        r.rsi = 100.5;
        assert_eq!(StockMetrics::assemble(r).unwrap_err().field(), "rsi");

        let mut r = record(50.0, 100.0);
        r.rsi = f64::NAN;
        assert!(StockMetrics::assemble(r).is_err());
    }

    #[test]
    fn rsi_bounds_inclusive() {
        let mut r = record(50.0, 100.0);
        r.rsi = 0.0;
        assert!(StockMetrics::assemble(r.clone()).is_ok());
        r.rsi = 100.0;
        assert!(StockMetrics::assemble(r).is_ok());
    }

    #[test]
    fn serializes_derived_margin() {
        let m = StockMetrics::assemble(record(65.0, 100.0)).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert!((json["margin_of_safety"].as_f64().unwrap() - 35.0).abs() < 1e-9);
        assert_eq!(json["region"], "US");
    }

    #[test]
    fn deserialization_goes_through_assembler() {
        let ok = r#"{"symbol":"AAPL","name":"Apple","sector":"Technology","region":"US",
            "current_price":175.3,"fair_value":190.0,"roic":30.0,"debt_to_ebitda":0.8,
            "rsi":41.0,"volume_status":"High","margin_of_safety":999.0}"#;
        let m: StockMetrics = serde_json::from_str(ok).unwrap();
        // A stale margin in the payload is ignored; it is always recomputed.
        assert!((m.margin_of_safety() - (190.0 - 175.3) / 190.0 * 100.0).abs() < 1e-9);

        let bad = ok.replace("\"current_price\":175.3", "\"current_price\":0.0");
        assert!(serde_json::from_str::<StockMetrics>(&bad).is_err());
    }

    #[test]
    fn record_round_trips_through_metrics() {
        let r = record(88.0, 120.0);
        let m = StockMetrics::assemble(r.clone()).unwrap();
        assert_eq!(m.to_record(), r);
    }
}
