//! Entities - characters and monsters as the engine sees them
//!
//! An [`Entity`] holds only authoritative data: raw attributes, resources,
//! combat state and owned items. Everything derived from them lives in a
//! [`DerivedSnapshot`](crate::stats::DerivedSnapshot) built by
//! [`recompute`](crate::stats::recompute).

mod delta;
mod progression;
mod resources;

pub use delta::{paths, EntityDelta, ItemUpdate};
pub use progression::{add_experience, rank_threats, LevelUp, ThreatEntry};
pub use resources::{CombatState, Resource, Resources, MAX_FATE};

use crate::config::MAX_LEVEL;
use crate::error::{EngineError, EngineResult};
use crate::item::{Item, ItemKind, RoleData};
use crate::types::{num, Attribute, DamageType, EntityId, ItemId, MagicTradition, Proficiency, Rank, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Character,
    Monster {
        #[serde(default)]
        rank: Rank,
        #[serde(default = "default_drop_chance")]
        drop_chance: f64,
    },
}

fn default_drop_chance() -> f64 {
    0.22
}

/// Primary attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "default_primary")]
    pub physique: f64,
    #[serde(default = "default_primary")]
    pub spirit: f64,
    /// Stands in for stamina when stamina is unset
    #[serde(default)]
    pub body: f64,
    #[serde(default)]
    pub speed_bonus: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Attributes {
            physique: default_primary(),
            spirit: default_primary(),
            body: 0.0,
            speed_bonus: 0.0,
        }
    }
}

fn default_primary() -> f64 {
    10.0
}

/// Raw sub-attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubAttributes {
    // === Body ===
    pub strength: f64,
    pub agility: f64,
    pub stamina: f64,
    pub precision: f64,
    pub throwing: f64,
    pub flexibility: f64,
    pub bone_density: f64,
    pub natural_regeneration: f64,
    pub perception: f64,
    pub vision: f64,
    pub physical_resistance: f64,
    pub magic_resistance: f64,
    pub height: f64,
    pub weight: f64,

    // === Mind ===
    pub intuition: f64,
    pub cognition: f64,
    pub willpower: f64,
    pub presence: f64,
    pub fortitude: f64,
    pub metabolism: f64,

    // === Spirit ===
    pub mana_sense: f64,
    pub soul_power: f64,
    pub spirit_recovery: f64,
    pub divine_power: f64,
    pub dragon_power: f64,
}

impl Default for SubAttributes {
    fn default() -> Self {
        SubAttributes {
            strength: 0.0,
            agility: 0.0,
            stamina: 0.0,
            precision: 0.0,
            throwing: 0.0,
            flexibility: 0.0,
            bone_density: 0.0,
            natural_regeneration: 0.0,
            perception: 0.0,
            vision: 0.0,
            physical_resistance: 0.0,
            magic_resistance: 10.0,
            height: 0.0,
            weight: 0.0,
            intuition: 0.0,
            cognition: 0.0,
            willpower: 0.0,
            presence: 0.0,
            fortitude: 0.0,
            metabolism: 0.0,
            mana_sense: 0.0,
            soul_power: 0.0,
            spirit_recovery: 0.0,
            divine_power: 0.0,
            dragon_power: 0.0,
        }
    }
}

impl SubAttributes {
    /// Mutable access by attribute; `None` for the primary attributes
    pub fn get_mut(&mut self, attr: Attribute) -> Option<&mut f64> {
        let field = match attr {
            Attribute::Physique | Attribute::Spirit => return None,
            Attribute::Strength => &mut self.strength,
            Attribute::Agility => &mut self.agility,
            Attribute::Stamina => &mut self.stamina,
            Attribute::Precision => &mut self.precision,
            Attribute::Throwing => &mut self.throwing,
            Attribute::Flexibility => &mut self.flexibility,
            Attribute::BoneDensity => &mut self.bone_density,
            Attribute::NaturalRegeneration => &mut self.natural_regeneration,
            Attribute::Perception => &mut self.perception,
            Attribute::Vision => &mut self.vision,
            Attribute::PhysicalResistance => &mut self.physical_resistance,
            Attribute::MagicResistance => &mut self.magic_resistance,
            Attribute::Intuition => &mut self.intuition,
            Attribute::Cognition => &mut self.cognition,
            Attribute::Willpower => &mut self.willpower,
            Attribute::Presence => &mut self.presence,
            Attribute::Fortitude => &mut self.fortitude,
            Attribute::Metabolism => &mut self.metabolism,
            Attribute::ManaSense => &mut self.mana_sense,
            Attribute::SoulPower => &mut self.soul_power,
            Attribute::SpiritRecovery => &mut self.spirit_recovery,
            Attribute::DivinePower => &mut self.divine_power,
            Attribute::DragonPower => &mut self.dragon_power,
            Attribute::Height => &mut self.height,
            Attribute::Weight => &mut self.weight,
        };
        Some(field)
    }

    /// Value of a sub-attribute; `None` for the primary attributes
    pub fn get(&self, attr: Attribute) -> Option<f64> {
        let mut copy = *self;
        copy.get_mut(attr).map(|v| num(*v))
    }

    /// Builder-style setter; primary attributes are ignored
    pub fn with(mut self, attr: Attribute, value: f64) -> Self {
        if let Some(field) = self.get_mut(attr) {
            *field = value;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Proficiencies {
    pub bladed: f64,
    pub blunt: f64,
    pub polearm: f64,
    pub axes: f64,
    pub unarmed: f64,
    pub throwing: f64,
}

impl Proficiencies {
    pub fn get(&self, proficiency: Proficiency) -> f64 {
        num(match proficiency {
            Proficiency::Bladed => self.bladed,
            Proficiency::Blunt => self.blunt,
            Proficiency::Polearm => self.polearm,
            Proficiency::Axes => self.axes,
            Proficiency::Unarmed => self.unarmed,
        })
    }
}

/// Flat resistance percentage per damage type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecificResistances(pub BTreeMap<DamageType, f64>);

impl SpecificResistances {
    pub fn get(&self, damage_type: DamageType) -> f64 {
        self.0.get(&damage_type).copied().map(num).unwrap_or(0.0)
    }

    pub fn set(&mut self, damage_type: DamageType, percent: f64) {
        self.0.insert(damage_type, percent);
    }
}

/// A character or monster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub sub: SubAttributes,
    #[serde(default)]
    pub proficiencies: Proficiencies,
    #[serde(default)]
    pub resistances: SpecificResistances,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub combat: CombatState,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Entity {
            id: id.into(),
            name: name.into(),
            kind: EntityKind::Character,
            size: Size::default(),
            attributes: Attributes::default(),
            sub: SubAttributes::default(),
            proficiencies: Proficiencies::default(),
            resistances: SpecificResistances::default(),
            resources: Resources::default(),
            combat: CombatState::default(),
            items: Vec::new(),
        }
    }

    pub fn monster(id: impl Into<EntityId>, name: impl Into<String>, rank: Rank) -> Self {
        Entity {
            kind: EntityKind::Monster {
                rank,
                drop_chance: default_drop_chance(),
            },
            ..Self::new(id, name)
        }
    }

    pub fn with_sub(mut self, attr: Attribute, value: f64) -> Self {
        self.sub = self.sub.with(attr, value);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn is_character(&self) -> bool {
        self.kind == EntityKind::Character
    }

    /// Raw value of any attribute, before equipment modifiers
    pub fn stat(&self, attr: Attribute) -> f64 {
        match attr {
            Attribute::Physique => num(self.attributes.physique),
            Attribute::Spirit => num(self.attributes.spirit),
            other => self.sub.get(other).unwrap_or(0.0),
        }
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    pub fn role(&self) -> Option<&RoleData> {
        self.items.iter().find_map(Item::as_role)
    }

    /// Magic tradition granted by the role item
    pub fn tradition(&self) -> MagicTradition {
        self.role().map(|r| r.tradition).unwrap_or_default()
    }

    /// Refuse a second role or lineage
    pub fn check_unique_item(&self, item: &Item) -> EngineResult<()> {
        let kind = match item.kind {
            ItemKind::Role(_) | ItemKind::Lineage(_) => item.kind.name(),
            _ => return Ok(()),
        };
        if self.items.iter().any(|owned| owned.kind.name() == kind) {
            return Err(EngineError::DuplicateUnique(kind));
        }
        Ok(())
    }

    /// Take ownership of an item after the uniqueness check
    pub fn add_item(&mut self, item: Item) -> EngineResult<()> {
        self.check_unique_item(&item)?;
        self.items.push(item);
        Ok(())
    }

    /// Delta clearing accumulated depletion, for the start of this entity's turn
    pub fn reset_defense_penalty(&self) -> EntityDelta {
        EntityDelta::new().with(paths::DEFENSE_PENALTY, 0.0)
    }

    /// Apply a delta, clamping every value into its valid range
    ///
    /// Maxima are written before current values so a single delta can raise
    /// a cap and fill it.
    pub fn apply_delta(&mut self, delta: &EntityDelta) {
        let (maxima, values): (Vec<_>, Vec<_>) = delta
            .fields
            .iter()
            .partition(|(path, _)| path.ends_with(".max"));
        for (path, value) in maxima.into_iter().chain(values) {
            self.apply_field(path, *value);
        }

        for update in &delta.items {
            let Some(item) = self.items.iter_mut().find(|i| i.id == update.item_id) else {
                tracing::warn!(entity = %self.id, item = %update.item_id, "update for unknown item skipped");
                continue;
            };
            if let Some(status) = update.equip_status {
                item.equip_status = status;
            }
            if let Some(quantity) = update.quantity {
                item.quantity = quantity;
            }
            match &mut item.kind {
                ItemKind::Weapon(weapon) => {
                    if let Some(grip) = update.grip {
                        weapon.grip = grip;
                    }
                }
                ItemKind::Essence(essence) => {
                    if let Some(on_cooldown) = update.on_cooldown {
                        essence.on_cooldown = on_cooldown;
                    }
                }
                ItemKind::Contract(contract) => {
                    if let Some(on_cooldown) = update.on_cooldown {
                        contract.on_cooldown = on_cooldown;
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            entity = %self.id,
            fields = delta.fields.len(),
            items = delta.items.len(),
            "applied delta"
        );
    }

    fn apply_field(&mut self, path: &str, value: f64) {
        let res = &mut self.resources;
        let combat = &mut self.combat;
        match path {
            paths::HP => res.hp.set_value(value),
            paths::HP_MAX => res.hp.set_max(value),
            paths::MANA => res.mana.set_value(value),
            paths::MANA_MAX => res.mana.set_max(value),
            paths::DP => res.dp.set_value(value),
            paths::DP_MAX => res.dp.set_max(value),
            paths::GP => res.gp.set_value(value),
            paths::GP_MAX => res.gp.set_max(value),
            paths::FATE => res.fate.value = num(value).clamp(0.0, MAX_FATE),
            paths::XP => res.xp.value = num(value).max(0.0),
            paths::XP_MAX => res.xp.max = num(value).max(0.0),
            paths::LEVEL => {
                res.level = (num(value).floor() as i64).clamp(1, i64::from(MAX_LEVEL)) as u32
            }
            paths::ACTIONS => combat.actions.set_value(value),
            paths::REACTIONS => combat.reactions.set_value(value),
            paths::DEFENSE_POOL => combat.defense_pool.set_value(value),
            paths::DEFENSE_POOL_MAX => combat.defense_pool.set_max(value),
            paths::DEFENSE_PENALTY => combat.defense_penalty = num(value).max(0.0) as i32,
            other => {
                tracing::warn!(entity = %self.id, path = other, "unknown delta path skipped")
            }
        }
    }
}
