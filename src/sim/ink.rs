//! Ink budget
//!
//! Ink only goes down when a stroke extension is committed, and only comes
//! back through refunds or a reset. It is never negative and never above
//! `max`.

use serde::{Deserialize, Serialize};

use crate::consts::{INK_CONSUMPTION_RATE, INK_MAX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkBudget {
    pub current: f32,
    pub max: f32,
    /// Ink spent per unit of stroke length
    pub consumption_rate: f32,
}

impl Default for InkBudget {
    fn default() -> Self {
        Self::new(INK_MAX, INK_CONSUMPTION_RATE)
    }
}

impl InkBudget {
    /// Full budget of `max` ink
    pub fn new(max: f32, consumption_rate: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            consumption_rate,
        }
    }

    /// Cost of a stroke of the given length
    #[inline]
    pub fn cost_of(&self, length: f32) -> f32 {
        length * self.consumption_rate
    }

    /// Subtract `cost` if affordable; leaves the budget untouched otherwise
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if cost < 0.0 || cost > self.current {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Add ink back, capped at `max`; returns the amount actually added
    pub fn refund(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    /// Refill to `max`
    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Change the ceiling and refill (used when a level starts)
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.max;
    }

    #[inline]
    pub fn has_ink(&self) -> bool {
        self.current > 0.0
    }

    /// Remaining ink as a fraction of `max`, in `[0, 1]`
    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}
