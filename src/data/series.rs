//! Normalized Daily Return Series
//!
//! One instrument's history as per-day relative changes, keyed and ordered by date.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One trading day's normalized change for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    /// (close - prev_close) / prev_close
    pub close_return: f64,
    /// (high - close) / close
    pub high_return: f64,
    /// (low - close) / close
    pub low_return: f64,
    /// (volume - prev_volume) / prev_volume
    pub volume_return: f64,
}

impl ReturnRecord {
    /// Derive a record from today's bar and yesterday's close/volume.
    ///
    /// Returns `None` unless the previous close, previous volume and current
    /// close are all strictly positive.
    pub fn derive(
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        prev_close: f64,
        prev_volume: f64,
    ) -> Option<Self> {
        if !(prev_close > 0.0 && close > 0.0 && prev_volume > 0.0) {
            return None;
        }

        Some(Self {
            close_return: (close - prev_close) / prev_close,
            high_return: (high - close) / close,
            low_return: (low - close) / close,
            volume_return: (volume - prev_volume) / prev_volume,
        })
    }
}

/// Date-ordered return history for one instrument
#[derive(Debug, Clone, Default)]
pub struct InstrumentSeries {
    code: String,
    records: BTreeMap<String, ReturnRecord>,
}

impl InstrumentSeries {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            records: BTreeMap::new(),
        }
    }

    /// Build from already computed records (later duplicates win)
    pub fn from_records<I, D>(code: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = (D, ReturnRecord)>,
        D: Into<String>,
    {
        let mut series = Self::new(code);
        for (date, record) in records {
            series.insert(date, record);
        }
        series
    }

    pub fn insert(&mut self, date: impl Into<String>, record: ReturnRecord) {
        self.records.insert(date.into(), record);
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: &str) -> Option<&ReturnRecord> {
        self.records.get(date)
    }

    /// Dates in ascending order
    pub fn dates(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReturnRecord)> {
        self.records.iter()
    }

    /// Enough history to fill one observation window and still step once
    pub fn is_admissible(&self, scope: usize) -> bool {
        self.len() > scope
    }
}

/// Every admitted series plus the split between target and auxiliary codes
#[derive(Debug, Clone, Default)]
pub struct Universe {
    series: HashMap<String, Arc<InstrumentSeries>>,
    targets: Vec<String>,
    auxiliaries: Vec<String>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an admitted series under the roles it was requested for
    pub fn admit(&mut self, series: InstrumentSeries, is_target: bool, is_auxiliary: bool) {
        let code = series.code().to_string();
        if is_target && !self.targets.contains(&code) {
            self.targets.push(code.clone());
        }
        if is_auxiliary && !self.auxiliaries.contains(&code) {
            self.auxiliaries.push(code.clone());
        }
        self.series.insert(code, Arc::new(series));
    }

    pub fn get(&self, code: &str) -> Option<Arc<InstrumentSeries>> {
        self.series.get(code).cloned()
    }

    /// Admitted codes episodes are drawn from, in configuration order
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Admitted auxiliary codes
    pub fn auxiliaries(&self) -> &[String] {
        &self.auxiliaries
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_exact_ratios() {
        let record = ReturnRecord::derive(110.0, 95.0, 100.0, 1500.0, 80.0, 1000.0).unwrap();

        assert_eq!(record.close_return, (100.0 - 80.0) / 80.0);
        assert_eq!(record.high_return, (110.0 - 100.0) / 100.0);
        assert_eq!(record.low_return, (95.0 - 100.0) / 100.0);
        assert_eq!(record.volume_return, (1500.0 - 1000.0) / 1000.0);
    }

    #[test]
    fn test_derive_requires_positive_history() {
        assert!(ReturnRecord::derive(1.0, 1.0, 1.0, 10.0, 0.0, 10.0).is_none());
        assert!(ReturnRecord::derive(1.0, 1.0, 1.0, 10.0, 1.0, 0.0).is_none());
        assert!(ReturnRecord::derive(1.0, 1.0, 0.0, 10.0, 1.0, 10.0).is_none());
        assert!(ReturnRecord::derive(1.0, 1.0, 1.0, 0.0, 1.0, 10.0).is_some());
    }

    #[test]
    fn test_series_is_date_ordered() {
        let record = ReturnRecord::derive(1.0, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap();
        let series = InstrumentSeries::from_records(
            "7203",
            vec![("2020-01-03", record), ("2020-01-01", record), ("2020-01-02", record)],
        );

        assert_eq!(series.dates(), vec!["2020-01-01", "2020-01-02", "2020-01-03"]);
        assert!(series.is_admissible(2));
        assert!(!series.is_admissible(3));
    }

    #[test]
    fn test_universe_keeps_roles_apart() {
        let mut universe = Universe::new();
        universe.admit(InstrumentSeries::new("7203"), true, false);
        universe.admit(InstrumentSeries::new("N225"), false, true);

        assert_eq!(universe.targets(), ["7203".to_string()]);
        assert_eq!(universe.auxiliaries(), ["N225".to_string()]);
        assert_eq!(universe.len(), 2);
        assert!(universe.get("N225").is_some());
    }
}
