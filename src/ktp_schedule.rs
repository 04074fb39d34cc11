// Fixed-vs-random group selection shared by the TVLA patterns.
//
// Each draw picks group 1 ("random") with probability equal to its share of
// the remaining budget, so a campaign of exactly `max_traces` draws lands on
// the planned split no matter how the draws interleave. Once both budgets are
// spent the choice degrades to a fair coin and budgets stay at zero.

use serde::{Deserialize, Serialize};

use crate::ktp_error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Group 1: varying plaintext.
    Random,
    /// Group 2: constant reference plaintext.
    Fixed,
}

/// Relative sizes of the two groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSplit {
    pub random: u32,
    pub fixed: u32,
}

impl Default for GroupSplit {
    fn default() -> Self {
        Self { random: 1, fixed: 1 }
    }
}

impl GroupSplit {
    /// Group-1 share of `max_traces`, rounded down.
    pub fn random_budget(&self, max_traces: usize) -> Result<usize, ConfigError> {
        let den = self.random as u128 + self.fixed as u128;
        if den == 0 {
            return Err(ConfigError::EmptySplit { random: self.random, fixed: self.fixed });
        }
        Ok((max_traces as u128 * self.random as u128 / den) as usize)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupScheduler {
    random_left: usize,
    fixed_left: usize,
}

impl GroupScheduler {
    pub fn new(max_traces: usize, split: GroupSplit) -> Result<Self, ConfigError> {
        let random_left = split.random_budget(max_traces)?;
        Ok(Self { random_left, fixed_left: max_traces - random_left })
    }

    /// (group 1, group 2) budgets still to draw.
    pub fn remaining(&self) -> (usize, usize) {
        (self.random_left, self.fixed_left)
    }

    pub fn is_exhausted(&self) -> bool {
        self.random_left == 0 && self.fixed_left == 0
    }

    /// Select a group for a uniform draw `r` in [0, 1) and charge its budget.
    pub fn select(&mut self, r: f64) -> Group {
        let total = self.random_left + self.fixed_left;
        let cutoff = if total == 0 {
            0.5
        } else {
            self.random_left as f64 / total as f64
        };

        if r < cutoff {
            self.random_left = self.random_left.saturating_sub(1);
            Group::Random
        } else {
            self.fixed_left = self.fixed_left.saturating_sub(1);
            Group::Fixed
        }
    }
}
