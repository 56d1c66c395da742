//! DerivedSnapshot - every derived value of an entity, recomputed on demand

use super::derive::{self, MagicStats, ThreatInputs};
use super::recovery::{RecoveryInfo, RecoveryResource};
use crate::config::RulesConfig;
use crate::entity::{paths, Attributes, Entity, EntityDelta, SubAttributes};
use crate::equipment::{link_equipment, EquipmentLimits, EquipmentSummary};
use crate::item::ItemKind;
use crate::types::{Attribute, MagicTradition};
use serde::{Deserialize, Serialize};

/// Derived state of one entity at one point in time
///
/// Never stored on the entity. Callers rebuild it with [`recompute`] after
/// every mutation they care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSnapshot {
    // === Resources ===
    pub hp_max: f64,
    pub mana_max: f64,
    pub dp_max: f64,
    pub gp_max: f64,
    /// XP needed for the next level; `None` at the last level
    pub xp_max: Option<u64>,

    // === Movement & load ===
    pub speed: f64,
    pub encumbrance_max: f64,
    pub encumbrance_value: f64,
    pub encumbrance_pct: f64,

    // === Defense ===
    pub physical_resist: f64,
    pub magic_resist: f64,
    pub defense_pool_max: u32,
    pub bone_ku: i32,

    // === Offense ===
    pub crit_threshold: u32,
    pub magic: MagicStats,

    // === Magic ===
    pub tradition: MagicTradition,
    pub essence_slots_max: u32,
    pub recovery: RecoveryInfo,
    pub recovery_resource: RecoveryResource,

    /// Encounter ranking weight; always 0 for monsters
    pub threat_level: f64,

    pub equipment: EquipmentSummary,
    /// Primary attributes after equipment modifiers
    pub attributes: Attributes,
    /// Sub-attributes after equipment modifiers
    pub effective: SubAttributes,
}

impl DerivedSnapshot {
    /// Effective value of any attribute
    pub fn stat(&self, attr: Attribute) -> f64 {
        match attr {
            Attribute::Physique => self.attributes.physique,
            Attribute::Spirit => self.attributes.spirit,
            other => self.effective.get(other).unwrap_or(0.0),
        }
    }

    pub fn is_divine(&self) -> bool {
        self.tradition.is_divine()
    }

    pub fn is_arcane(&self) -> bool {
        self.tradition.is_arcane()
    }
}

/// Essence slots: none for divine and pure arcane casters, one per level otherwise
fn essence_slots(tradition: MagicTradition, level: u32) -> u32 {
    match tradition {
        MagicTradition::Divine | MagicTradition::Arcane => 0,
        MagicTradition::None | MagicTradition::Necromantic => level,
    }
}

/// Rebuild every derived value of `entity`
pub fn recompute(entity: &Entity, rules: &RulesConfig) -> DerivedSnapshot {
    let tradition = entity.tradition();
    let level = entity.resources.level.max(1);
    let essence_slots_max = essence_slots(tradition, level);

    let limits = EquipmentLimits {
        ring_slots: rules.equipment.ring_slots,
        essence_slots: essence_slots_max,
        contract_slots: rules.equipment.contract_slots,
    };
    let equipment = link_equipment(&entity.items, &limits);

    // Equipment modifiers
    let mut attributes = entity.attributes;
    let mut sub = entity.sub;
    sub.agility -= equipment.armor_penalty;
    for essence in equipment
        .slots
        .essences
        .iter()
        .filter_map(|id| entity.item(id))
        .filter_map(|item| item.as_essence())
    {
        let Some(bonus) = &essence.passive_bonus else {
            continue;
        };
        match bonus.attribute {
            Attribute::Physique => attributes.physique += bonus.value,
            Attribute::Spirit => attributes.spirit += bonus.value,
            other => {
                if let Some(value) = sub.get_mut(other) {
                    *value += bonus.value;
                }
            }
        }
    }

    if tradition.is_divine() {
        sub.divine_power = sub.divine_power.max(1.0);
    }
    let draconic = entity
        .items
        .iter()
        .any(|item| matches!(item.kind, ItemKind::Lineage(ref l) if l.draconic));
    if draconic {
        sub.dragon_power = sub.dragon_power.max(1.0);
    }

    let endurance = derive::endurance(sub.stamina, attributes.body);
    let hp_max = derive::max_hp(endurance, sub.bone_density);
    let mana_max = derive::max_mana(sub.soul_power);
    let dp_max = derive::max_dragon_power(sub.soul_power, sub.dragon_power);
    let gp_max = if tradition.is_divine() {
        derive::max_grace(sub.divine_power, sub.soul_power)
    } else {
        0.0
    };

    let size = rules.sizes.get(entity.size);
    let encumbrance_max = derive::encumbrance_max(sub.strength, sub.bone_density);
    let encumbrance_value = equipment.total_weight;

    let threat_level = if entity.is_character() {
        derive::threat_level(&ThreatInputs {
            height: sub.height,
            weight: sub.weight,
            size_weight: size.threat_weight,
            bone_density: sub.bone_density,
            presence: sub.presence,
            willpower: sub.willpower,
            item_level: equipment.total_item_level,
        })
    } else {
        0.0
    };

    let magic_power = if tradition.is_divine() {
        sub.divine_power
    } else {
        sub.soul_power
    };

    let resources = &entity.resources;
    let (recovery_resource, recovery) = if sub.dragon_power > 0.0 && dp_max > 0.0 {
        (
            RecoveryResource::DragonPower,
            derive::recovery_time(sub.dragon_power, resources.dp.value, dp_max),
        )
    } else if tradition.is_divine() {
        (
            RecoveryResource::Grace,
            derive::recovery_time(
                sub.spirit_recovery * 0.5 + sub.divine_power,
                resources.gp.value,
                gp_max,
            ),
        )
    } else {
        (
            RecoveryResource::Mana,
            derive::recovery_time(sub.spirit_recovery, resources.mana.value, mana_max),
        )
    };

    let snapshot = DerivedSnapshot {
        hp_max,
        mana_max,
        dp_max,
        gp_max,
        xp_max: derive::xp_threshold(level, rules),
        speed: derive::speed(sub.agility, attributes.speed_bonus),
        encumbrance_max,
        encumbrance_value,
        encumbrance_pct: derive::encumbrance_pct(encumbrance_value, encumbrance_max),
        physical_resist: derive::physical_resist_percent(sub.bone_density, sub.physical_resistance),
        magic_resist: derive::magic_resist_percent(sub.magic_resistance),
        defense_pool_max: derive::defense_pool_max(sub.agility, size.pool_mult),
        bone_ku: derive::bone_ku(sub.bone_density),
        crit_threshold: derive::critical_threshold(sub.flexibility),
        magic: derive::magic_stats(sub.cognition, sub.mana_sense, magic_power),
        tradition,
        essence_slots_max,
        recovery,
        recovery_resource,
        threat_level,
        equipment,
        attributes,
        effective: sub,
    };

    tracing::debug!(
        entity = %entity.id,
        hp_max = snapshot.hp_max,
        mana_max = snapshot.mana_max,
        speed = snapshot.speed,
        "recomputed derived stats"
    );
    snapshot
}

impl Entity {
    /// Delta writing recomputed maxima and pulling current values under them
    pub fn clamp_to(&self, snapshot: &DerivedSnapshot) -> EntityDelta {
        let res = &self.resources;
        let mut delta = EntityDelta::new()
            .with(paths::HP_MAX, snapshot.hp_max)
            .with(paths::MANA_MAX, snapshot.mana_max)
            .with(paths::DP_MAX, snapshot.dp_max)
            .with(paths::GP_MAX, snapshot.gp_max)
            .with(
                paths::DEFENSE_POOL_MAX,
                f64::from(snapshot.defense_pool_max),
            );
        if let Some(xp_max) = snapshot.xp_max {
            delta.set(paths::XP_MAX, xp_max as f64);
        }

        let pools = [
            (paths::HP, res.hp.value, snapshot.hp_max),
            (paths::MANA, res.mana.value, snapshot.mana_max),
            (paths::DP, res.dp.value, snapshot.dp_max),
            (paths::GP, res.gp.value, snapshot.gp_max),
        ];
        for (path, value, max) in pools {
            if value > max {
                delta.set(path, max);
            }
        }
        delta
    }
}
