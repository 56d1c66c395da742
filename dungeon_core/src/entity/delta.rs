//! Partial updates returned by engine operations
//!
//! The engine never writes entities itself. It returns an [`EntityDelta`]
//! and the store applies it, or [`Entity::apply_delta`](super::Entity::apply_delta)
//! does in tests and simulations.

use crate::item::{EquipStatus, Grip};
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field paths understood by the entity store
pub mod paths {
    pub const HP: &str = "resources.hp.value";
    pub const HP_MAX: &str = "resources.hp.max";
    pub const MANA: &str = "resources.mana.value";
    pub const MANA_MAX: &str = "resources.mana.max";
    pub const DP: &str = "resources.dp.value";
    pub const DP_MAX: &str = "resources.dp.max";
    pub const GP: &str = "resources.gp.value";
    pub const GP_MAX: &str = "resources.gp.max";
    pub const FATE: &str = "resources.fate.value";
    pub const XP: &str = "resources.xp.value";
    pub const XP_MAX: &str = "resources.xp.max";
    pub const LEVEL: &str = "resources.level";
    pub const ACTIONS: &str = "combat.actions.value";
    pub const REACTIONS: &str = "combat.reactions.value";
    pub const DEFENSE_POOL: &str = "combat.defense_pool.value";
    pub const DEFENSE_POOL_MAX: &str = "combat.defense_pool.max";
    pub const DEFENSE_PENALTY: &str = "combat.defense_penalty";
}

/// Change to one owned item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equip_status: Option<EquipStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grip: Option<Grip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_cooldown: Option<bool>,
}

impl ItemUpdate {
    pub fn new(item_id: ItemId) -> Self {
        ItemUpdate {
            item_id,
            equip_status: None,
            grip: None,
            quantity: None,
            on_cooldown: None,
        }
    }

    pub fn status(mut self, status: EquipStatus) -> Self {
        self.equip_status = Some(status);
        self
    }

    pub fn grip(mut self, grip: Grip) -> Self {
        self.grip = Some(grip);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn cooldown(mut self, on_cooldown: bool) -> Self {
        self.on_cooldown = Some(on_cooldown);
        self
    }

    /// Overlay the fields set in `other`
    fn merge(&mut self, other: ItemUpdate) {
        self.equip_status = other.equip_status.or(self.equip_status);
        self.grip = other.grip.or(self.grip);
        self.quantity = other.quantity.or(self.quantity);
        self.on_cooldown = other.on_cooldown.or(self.on_cooldown);
    }
}

/// Flat `path -> value` map plus item updates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityDelta {
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemUpdate>,
}

impl EntityDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: &str, value: f64) {
        self.fields.insert(path.to_string(), value);
    }

    pub fn with(mut self, path: &str, value: f64) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<f64> {
        self.fields.get(path).copied()
    }

    /// Add an item update, merging with an earlier one for the same item
    pub fn push_item(&mut self, update: ItemUpdate) {
        match self.items.iter_mut().find(|u| u.item_id == update.item_id) {
            Some(existing) => existing.merge(update),
            None => self.items.push(update),
        }
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&ItemUpdate> {
        self.items.iter().find(|u| &u.item_id == item_id)
    }

    /// Fold `other` into this delta; its values win
    pub fn merge(&mut self, other: EntityDelta) {
        self.fields.extend(other.fields);
        for update in other.items {
            self.push_item(update);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.items.is_empty()
    }
}
