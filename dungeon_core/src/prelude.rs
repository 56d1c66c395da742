//! Prelude module for convenient imports
//!
//! ```rust
//! use dungeon_core::prelude::*;
//! ```

// Core types
pub use crate::entity::{paths, Entity, EntityDelta, ItemUpdate, Resource};
pub use crate::error::{EngineError, EngineResult, ResourceKind};
pub use crate::stats::{recompute, DerivedSnapshot};
pub use crate::types::{Attribute, Conditions, Cover, DamageType, EntityId, ItemId, Size};

// Dice
pub use crate::dice::{CritRange, DiceFormula, DiceRoller, FixedRoller, RngRoller};

// Combat
pub use crate::combat::{
    resolve_check, resolve_save, roll_attack_damage, roll_initiative, AttackContext,
    AttackOutcome, AttackRequest, CheckRequest, Combatant, DefenseMode, Verdict,
};
pub use crate::defense::{apply_damage, mitigate, DamageApplication};

// Items & equipment
pub use crate::equipment::{link_equipment, plan_toggle_equip, EquipmentSummary};
pub use crate::item::{use_item, Item, ItemKind, WeaponData};

// Time
pub use crate::regen::{rest, ElapsedTime};

// Config
pub use crate::config::{default_rules, RulesConfig};
