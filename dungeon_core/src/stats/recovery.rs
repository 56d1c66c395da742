//! Recovery time estimates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole minutes until a resource is refilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTime {
    /// The resource does not regenerate
    Never,
    Minutes(u64),
}

impl RecoveryTime {
    /// Split into whole hours and leftover minutes
    pub fn hours_minutes(&self) -> Option<(u64, u64)> {
        match self {
            RecoveryTime::Never => None,
            RecoveryTime::Minutes(m) => Some((m / 60, m % 60)),
        }
    }
}

impl fmt::Display for RecoveryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hours_minutes() {
            None => f.write_str("never"),
            Some((0, m)) => write!(f, "{}m", m),
            Some((h, m)) => write!(f, "{}h {}m", h, m),
        }
    }
}

/// Which pool a recovery estimate describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryResource {
    #[default]
    Mana,
    Grace,
    DragonPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryInfo {
    /// From empty to full
    pub to_full: RecoveryTime,
    /// From the current value to full
    pub to_rest: RecoveryTime,
}

impl Default for RecoveryInfo {
    fn default() -> Self {
        RecoveryInfo {
            to_full: RecoveryTime::Never,
            to_rest: RecoveryTime::Never,
        }
    }
}
