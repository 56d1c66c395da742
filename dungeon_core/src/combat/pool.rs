//! Attack pool sizes

use crate::entity::Proficiencies;
use crate::item::{AttackType, WeaponData};
use crate::stats::{dice_pool, DerivedSnapshot};
use crate::types::Attribute;

/// Pool for a weapon attack
///
/// - thrown with a throwable weapon: the throwing proficiency alone
/// - ranged: the scaling stat alone
/// - non-physical scaling: best of the stat and the proficiency
/// - light: best of strength, agility and the proficiency
/// - otherwise: best of agility (agility scaling) or strength, and the proficiency
pub fn weapon_pool(
    stats: &DerivedSnapshot,
    proficiencies: &Proficiencies,
    weapon: &WeaponData,
    thrown: bool,
) -> u32 {
    let thrown = thrown || weapon.attack_type == AttackType::Thrown;
    if thrown && weapon.tags.throwable {
        return dice_pool(proficiencies.throwing);
    }

    let scaling = stats.stat(weapon.scaling);
    if weapon.attack_type == AttackType::Ranged {
        return dice_pool(scaling);
    }

    let proficiency = proficiencies.get(weapon.proficiency);
    if !weapon.scaling.is_physical() {
        return dice_pool(scaling.max(proficiency));
    }

    let strength = stats.stat(Attribute::Strength);
    let agility = stats.stat(Attribute::Agility);
    if weapon.tags.light {
        return dice_pool(strength.max(agility).max(proficiency));
    }
    let primary = if weapon.scaling == Attribute::Agility {
        agility
    } else {
        strength
    };
    dice_pool(primary.max(proficiency))
}

/// Pool for a check-style roll: `max(1, floor(sum / 13)) + modifier`, never below 1
pub fn modified_pool(stat_total: f64, mod_pool: i32) -> u32 {
    let base = dice_pool(stat_total) as i32;
    (base + mod_pool).max(1) as u32
}

/// Pool for an attack spell
pub fn spell_pool(stats: &DerivedSnapshot, attribute: Attribute, mod_pool: i32) -> u32 {
    modified_pool(stats.stat(attribute), mod_pool)
}
