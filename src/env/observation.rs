//! Observation Encoding
//!
//! The agent sees two tensors: a position triple `[budget, size, position]`
//! and a trailing window of `(close_return, volume_return)` pairs, most
//! recent day first.

use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use crate::data::InstrumentSeries;
use crate::error::{GymError, Result};

/// Number of scalar position features
pub const NUM_SCALARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// `[budget, size, position]`
    pub scalars: [f64; NUM_SCALARS],
    /// `[close_return, volume_return]` per day, most recent first
    pub window: Vec<[f64; 2]>,
}

impl Observation {
    /// Mean lot value, 1.0 when flat
    pub fn budget(&self) -> f64 {
        self.scalars[0]
    }

    /// log100 of the lot count
    pub fn size(&self) -> f64 {
        self.scalars[1]
    }

    /// 1.0 when net long, 0.0 otherwise (short and flat look the same)
    pub fn position(&self) -> f64 {
        self.scalars[2]
    }

    pub fn close_returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().map(|pair| pair[0])
    }

    pub fn volume_returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().map(|pair| pair[1])
    }

    /// Flatten for a model: scalars, then closes, then volumes
    pub fn features(&self) -> Vec<f32> {
        let mut features = Vec::with_capacity(NUM_SCALARS + 2 * self.window.len());
        features.extend(self.scalars.iter().map(|v| *v as f32));
        features.extend(self.close_returns().map(|v| v as f32));
        features.extend(self.volume_returns().map(|v| v as f32));
        features
    }
}

/// Box bounds of the windowed part of the observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationSpace {
    pub low: f64,
    pub high: f64,
    /// `scope * (auxiliaries + 1)`
    pub window_dim: usize,
    pub scalar_dim: usize,
}

impl ObservationSpace {
    pub fn new(scope: usize, num_auxiliaries: usize) -> Self {
        Self {
            low: -1.0,
            high: 1.0,
            window_dim: scope * (num_auxiliaries + 1),
            scalar_dim: NUM_SCALARS,
        }
    }
}

/// Encode ledger state plus the `scope` days ending at `end_index`.
///
/// Fails instead of padding when the window reaches before the first date.
pub fn encode(
    ledger: &Ledger,
    series: &InstrumentSeries,
    dates: &[String],
    end_index: usize,
    scope: usize,
) -> Result<Observation> {
    let budget = ledger.mean().unwrap_or(1.0);
    let size = (ledger.len().max(1) as f64).log(100.0);
    let position = if ledger.sum() > 0.0 { 1.0 } else { 0.0 };

    let out_of_range = || GymError::WindowOutOfRange {
        instrument: series.code().to_string(),
        end_index,
        scope,
        available: dates.len(),
    };

    let mut window = Vec::with_capacity(scope);
    for offset in 0..scope {
        let record = end_index
            .checked_sub(offset)
            .and_then(|index| dates.get(index))
            .and_then(|date| series.get(date))
            .ok_or_else(out_of_range)?;
        window.push([record.close_return, record.volume_return]);
    }

    Ok(Observation {
        scalars: [budget, size, position],
        window,
    })
}
