//! Resistance - multiplicative stacking of base and specific resistance
//!
//! Formula:
//! - p1 = clamp(base / 100, 0, 1), p2 = clamp(specific / 100, 0, 1)
//! - total = 1 - (1 - p1) * (1 - p2)
//! - final = max(0, floor(amount * (1 - total)))
//!
//! Pure damage forces the base leg to 0; the specific leg still applies.

use crate::config::RulesConfig;
use crate::entity::{paths, Entity, EntityDelta, SubAttributes};
use crate::stats::{magic_resist_percent, physical_resist_percent};
use crate::types::{num, DamageType};
use serde::{Deserialize, Serialize};

/// Damage left after resistance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mitigation {
    pub final_damage: f64,
    /// `amount - final_damage`
    pub reduced: f64,
    /// Combined resistance in percent
    pub total_resist_percent: f64,
}

/// Reduce `amount` by a base and a specific resistance percentage
pub fn mitigate(
    amount: f64,
    damage_type: DamageType,
    base_resist_percent: f64,
    specific_resist_percent: f64,
) -> Mitigation {
    let amount = num(amount).max(0.0);
    let base = if damage_type == DamageType::Pure {
        0.0
    } else {
        num(base_resist_percent)
    };
    let p1 = (base / 100.0).clamp(0.0, 1.0);
    let p2 = (num(specific_resist_percent) / 100.0).clamp(0.0, 1.0);
    let total = 1.0 - (1.0 - p1) * (1.0 - p2);

    let final_damage = (amount * (1.0 - total)).floor().max(0.0);
    Mitigation {
        final_damage,
        reduced: amount - final_damage,
        total_resist_percent: total * 100.0,
    }
}

/// Base resistance leg for a damage type
///
/// Magic types use magic resistance; everything else uses bone density plus
/// flat physical resistance. Pure damage has no base leg.
pub fn base_resist_percent(damage_type: DamageType, sub: &SubAttributes, rules: &RulesConfig) -> f64 {
    if damage_type == DamageType::Pure {
        0.0
    } else if rules.is_magic(damage_type) {
        magic_resist_percent(sub.magic_resistance)
    } else {
        physical_resist_percent(sub.bone_density, sub.physical_resistance)
    }
}

/// Damage dealt to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageApplication {
    pub damage_type: DamageType,
    pub raw_amount: f64,
    pub mitigation: Mitigation,
    pub hp_before: f64,
    pub hp_after: f64,
    pub is_killing_blow: bool,
    pub delta: EntityDelta,
}

impl DamageApplication {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{:.0} damage taken", self.mitigation.final_damage)];
        if self.mitigation.reduced > 0.0 {
            parts.push(format!("{:.0} resisted", self.mitigation.reduced));
        }
        if self.is_killing_blow {
            parts.push("FATAL".to_string());
        }
        parts.join(", ")
    }
}

/// Mitigate `amount` against `entity` and build the HP delta
pub fn apply_damage(
    entity: &Entity,
    amount: f64,
    damage_type: DamageType,
    rules: &RulesConfig,
) -> DamageApplication {
    let base = base_resist_percent(damage_type, &entity.sub, rules);
    let specific = entity.resistances.get(damage_type);
    let mitigation = mitigate(amount, damage_type, base, specific);

    let hp_before = entity.resources.hp.value;
    let hp_after = (hp_before - mitigation.final_damage).max(0.0);
    let is_killing_blow = hp_before > 0.0 && hp_after <= 0.0;

    tracing::debug!(
        entity = %entity.id,
        ?damage_type,
        raw = amount,
        dealt = mitigation.final_damage,
        hp_after,
        "damage applied"
    );

    DamageApplication {
        damage_type,
        raw_amount: num(amount),
        mitigation,
        hp_before,
        hp_after,
        is_killing_blow,
        delta: EntityDelta::new().with(paths::HP, hp_after),
    }
}
