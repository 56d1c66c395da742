//! Success counting over a d100 pool
//!
//! Per die, evaluated independently and summed:
//! - face >= crit high: +3 successes (critical success)
//! - face <= crit low: -1 success (critical failure)
//! - otherwise face >= threshold: +1 success
//!
//! The total may go negative. Clamping is left to callers.

use serde::{Deserialize, Serialize};

/// Critical bands of a d100 pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritRange {
    /// Faces at or above this are critical successes
    pub high: u32,
    /// Faces at or below this are critical failures
    pub low: u32,
}

impl Default for CritRange {
    fn default() -> Self {
        CritRange { high: 95, low: 5 }
    }
}

impl CritRange {
    /// Default bands with a custom critical-success threshold
    pub fn with_high(high: u32) -> Self {
        CritRange {
            high,
            ..Self::default()
        }
    }
}

/// Net result of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuccessTally {
    pub successes: i32,
    pub crit_successes: u32,
    pub crit_fails: u32,
}

impl SuccessTally {
    /// Whether the tally meets a KU threshold
    pub fn meets(&self, ku: i32) -> bool {
        self.successes >= ku
    }
}

/// Count successes of `rolls` against a per-die `threshold`
pub fn count_successes(rolls: &[u32], threshold: i32, crit: CritRange) -> SuccessTally {
    rolls.iter().fold(SuccessTally::default(), |mut tally, &face| {
        if face >= crit.high {
            tally.successes += 3;
            tally.crit_successes += 1;
        } else if face <= crit.low {
            tally.successes -= 1;
            tally.crit_fails += 1;
        } else if i64::from(face) >= i64::from(threshold) {
            tally.successes += 1;
        }
        tally
    })
}
