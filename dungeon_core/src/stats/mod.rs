//! Stats - derivation formulas and the derived snapshot

pub mod derive;
mod recovery;
mod snapshot;

pub use derive::{
    bone_ku, critical_threshold, dice_pool, magic_resist_percent, magic_stats,
    physical_resist_percent, MagicStats,
};
pub use recovery::{RecoveryInfo, RecoveryResource, RecoveryTime};
pub use snapshot::{recompute, DerivedSnapshot};
