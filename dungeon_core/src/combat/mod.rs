//! Combat resolution - attacks, damage rolls, checks and saves

mod attack;
mod checks;
mod damage;
mod pool;
mod result;

pub use attack::{
    AttackContext, AttackRequest, Combatant, DifficultyComputed, Idle, PoolComputed, Rolled,
};
pub use checks::{
    resolve_check, resolve_save, roll_initiative, CheckOutcome, CheckRequest, Degree, Initiative,
    SaveOutcome, SaveResult,
};
pub use damage::{attribute_bonus, roll_attack_damage, weapon_damage_formula, DamageRoll};
pub use pool::{modified_pool, spell_pool, weapon_pool};
pub use result::{AttackOutcome, DefenseMode, RollOutcome, Verdict};
