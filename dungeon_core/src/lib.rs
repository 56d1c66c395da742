//! dungeon_core - Combat resolution and stat derivation for the Dungeon & Stone ruleset
//!
//! This library provides:
//! - Entity: authoritative character/monster data, mutated only through EntityDelta
//! - DerivedSnapshot: every derived stat, rebuilt on demand by `recompute`
//! - Dice: d100 success pools and damage formulas behind an injectable roller
//! - AttackRequest: single-target attack resolution, one step at a time
//! - Equipment linking, resistances, regeneration and item use

pub mod combat;
pub mod config;
pub mod defense;
pub mod dice;
pub mod entity;
pub mod equipment;
pub mod error;
pub mod item;
pub mod prelude;
pub mod regen;
pub mod stats;
pub mod types;

// Re-export core types for convenience
pub use combat::{AttackContext, AttackOutcome, AttackRequest, Combatant, DefenseMode, Verdict};
pub use config::{default_rules, load_rules, RulesConfig};
pub use dice::{DiceFormula, DiceRoller, RngRoller};
pub use entity::{Entity, EntityDelta};
pub use error::{EngineError, EngineResult};
pub use item::{Item, ItemKind};
pub use stats::{recompute, DerivedSnapshot};
pub use types::{Attribute, DamageType, EntityId, ItemId};
