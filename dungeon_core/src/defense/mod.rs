//! Defense system - attack difficulty, defense threshold and resistances

mod difficulty;
mod resistance;

pub use difficulty::{passive_dc, range_penalty, target_ku, Matchup, RangeBand};
pub use resistance::{apply_damage, base_resist_percent, mitigate, DamageApplication, Mitigation};
