//! Position Ledger
//!
//! Open exposure is a list of signed unit lots. Each lot starts at `±1.0` and
//! is compounded by the daily close move, so `|lot| - 1` is its unrealized
//! return. All lots share a sign; opening the other side closes them first.

use super::action::Action;

/// Realized result of closing the book to flip sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseOut {
    /// Realized reward (averaged per lot in cumulative mode)
    pub reward: f64,
    /// Number of lots that were closed
    pub lots: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    lots: Vec<f64>,
    cumulative_reward: bool,
    allow_accumulation: bool,
}

impl Ledger {
    pub fn new(cumulative_reward: bool, allow_accumulation: bool) -> Self {
        Self {
            lots: Vec::new(),
            cumulative_reward,
            allow_accumulation,
        }
    }

    pub fn lots(&self) -> &[f64] {
        &self.lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.lots.iter().sum()
    }

    /// Mean lot value, `None` when flat
    pub fn mean(&self) -> Option<f64> {
        if self.lots.is_empty() {
            None
        } else {
            Some(self.sum() / self.lots.len() as f64)
        }
    }

    /// Net direction from the sign of the lot sum
    pub fn direction(&self) -> Option<Action> {
        let sum = self.sum();
        if sum > 0.0 {
            Some(Action::Long)
        } else if sum < 0.0 {
            Some(Action::Short)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lots.clear();
    }

    /// Take the requested side.
    ///
    /// Returns the close-out when the book was on the other side. A
    /// same-side request adds a lot only with accumulation enabled.
    pub fn open(&mut self, action: Action) -> Option<CloseOut> {
        match self.direction() {
            Some(held) if held == action => {
                if self.allow_accumulation {
                    self.lots.push(action.unit_lot());
                }
                None
            }
            Some(_) => {
                let close_out = CloseOut {
                    reward: self.close_out_reward(action),
                    lots: self.lots.len(),
                };
                self.lots.clear();
                self.lots.push(action.unit_lot());
                Some(close_out)
            }
            None => {
                self.lots.push(action.unit_lot());
                None
            }
        }
    }

    /// Reward for closing every lot in order to go `target`.
    ///
    /// Short book closed to go long: `-(b + 1)` per lot (b < -1 is a gain).
    /// Long book closed to go short: `b - 1` per lot (b > 1 is a gain).
    pub fn close_out_reward(&self, target: Action) -> f64 {
        let total: f64 = match target {
            Action::Long => self.lots.iter().map(|b| -(b + 1.0)).sum(),
            Action::Short => self.lots.iter().map(|b| b - 1.0).sum(),
        };
        self.normalize(total)
    }

    /// Compound every lot by one day's close move, in the book's direction
    pub fn apply_daily_move(&mut self, close_return: f64, penalty: f64) {
        let sign = if self.sum() < 0.0 { -1.0 } else { 1.0 };
        for lot in &mut self.lots {
            *lot *= penalty * (1.0 + close_return * sign);
        }
    }

    /// Realize everything at episode end and clear the book
    pub fn settle_final(&mut self) -> f64 {
        let sign = if self.sum() > 0.0 { 1.0 } else { -1.0 };
        let total: f64 = self.lots.iter().map(|b| b * sign - 1.0).sum();
        let reward = self.normalize(total);
        self.lots.clear();
        reward
    }

    fn normalize(&self, total: f64) -> f64 {
        if self.cumulative_reward {
            total / self.lots.len().max(1) as f64
        } else {
            total
        }
    }
}
