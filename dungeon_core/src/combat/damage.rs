//! Damage rolls for resolved attacks

use super::result::AttackOutcome;
use crate::dice::{DiceFormula, DiceRoller, FormulaRoll};
use crate::item::{AttackType, Grip, Item, ItemKind, WeaponData};
use crate::stats::{derive::POINTS_PER_DIE, DerivedSnapshot};
use crate::types::{Attribute, DamageType};
use serde::{Deserialize, Serialize};

/// Die added per success beyond the first
const BONUS_DIE: u32 = 4;

/// Flat damage bonus from the wielder's attributes
pub fn attribute_bonus(stats: &DerivedSnapshot, weapon: &WeaponData) -> i64 {
    if weapon.attack_type == AttackType::Ranged {
        return 0;
    }
    let stat = if !weapon.scaling.is_physical() {
        stats.stat(weapon.scaling)
    } else if weapon.tags.light {
        stats
            .stat(Attribute::Strength)
            .max(stats.stat(Attribute::Agility))
    } else {
        stats.stat(Attribute::Strength)
    };
    (stat.max(0.0) / POINTS_PER_DIE).floor() as i64
}

/// Full damage formula for a weapon hit with `successes`
///
/// Versatile weapons held two-handed use their versatile formula.
pub fn weapon_damage_formula(
    stats: &DerivedSnapshot,
    weapon: &WeaponData,
    successes: i32,
) -> DiceFormula {
    let mut formula = match (&weapon.damage_versatile, weapon.grip) {
        (Some(versatile), Grip::TwoHanded) if weapon.tags.versatile => versatile.clone(),
        _ => weapon.damage.clone(),
    };
    formula.push_flat(attribute_bonus(stats, weapon));
    formula.push_dice((successes - 1).max(0) as u32, BONUS_DIE);
    formula
}

/// Rolled damage before resistances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub formula: String,
    pub roll: FormulaRoll,
    pub damage_type: DamageType,
    /// `floor(max(0, total) * multiplier)`
    pub amount: f64,
}

/// Roll damage for an attack that landed
///
/// Returns `None` when the outcome deals no damage or the item has no damage
/// formula.
pub fn roll_attack_damage(
    attacker_stats: &DerivedSnapshot,
    item: &Item,
    outcome: &AttackOutcome,
    roller: &mut impl DiceRoller,
) -> Option<DamageRoll> {
    if !outcome.deals_damage() {
        return None;
    }
    let (formula, damage_type) = match &item.kind {
        ItemKind::Weapon(weapon) => (
            weapon_damage_formula(attacker_stats, weapon, outcome.damage_successes),
            weapon.damage_type,
        ),
        ItemKind::Spell(spell) => (spell.damage.clone()?, spell.damage_type),
        _ => return None,
    };

    let roll = formula.roll(roller);
    let amount = (roll.total.max(0) as f64 * outcome.damage_multiplier).floor();
    tracing::debug!(item = %item.id, formula = %formula, total = roll.total, amount, "damage rolled");
    Some(DamageRoll {
        formula: formula.to_string(),
        roll,
        damage_type,
        amount,
    })
}
