//! Items - one shared base with a tagged payload per item kind

mod gear;
mod magic;
mod usage;
mod weapon;

pub use gear::{ArmorData, ArmorSlot, ConsumableData, ContainerData};
pub use magic::{
    ContractData, EssenceData, KnowledgeData, LineageData, PassiveBonus, RoleData, SaveSpec,
    SpellData, SpellRoll,
};
pub use usage::{use_item, Cost, ItemUse, Restored};
pub use weapon::{AttackType, Grip, WeaponData, WeaponTags};

use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Where an owned item currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipStatus {
    #[default]
    Stored,
    Carried,
    Equipped,
}

/// An owned item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub equip_status: EquipStatus,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Weight of a single unit
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub item_level: f64,
    #[serde(default)]
    pub description: String,
    pub kind: ItemKind,
}

fn default_quantity() -> u32 {
    1
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(WeaponData),
    Armor(ArmorData),
    Consumable(ConsumableData),
    Container(ContainerData),
    Loot,
    Essence(EssenceData),
    Spell(SpellData),
    Blessing,
    Lineage(LineageData),
    Role(RoleData),
    Contract(ContractData),
    Knowledge(KnowledgeData),
    Dragonword,
    Feature,
}

impl ItemKind {
    /// Tag name as it appears in serialized data
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon(_) => "weapon",
            ItemKind::Armor(_) => "armor",
            ItemKind::Consumable(_) => "consumable",
            ItemKind::Container(_) => "container",
            ItemKind::Loot => "loot",
            ItemKind::Essence(_) => "essence",
            ItemKind::Spell(_) => "spell",
            ItemKind::Blessing => "blessing",
            ItemKind::Lineage(_) => "lineage",
            ItemKind::Role(_) => "role",
            ItemKind::Contract(_) => "contract",
            ItemKind::Knowledge(_) => "knowledge",
            ItemKind::Dragonword => "dragonword",
            ItemKind::Feature => "feature",
        }
    }
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: ItemKind) -> Self {
        Item {
            id: id.into(),
            name: name.into(),
            equip_status: EquipStatus::default(),
            quantity: default_quantity(),
            weight: 0.0,
            price: 0.0,
            item_level: 0.0,
            description: String::new(),
            kind,
        }
    }

    pub fn equipped(mut self) -> Self {
        self.equip_status = EquipStatus::Equipped;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_item_level(mut self, item_level: f64) -> Self {
        self.item_level = item_level;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_equipped(&self) -> bool {
        self.equip_status == EquipStatus::Equipped
    }

    /// Weight this item adds to the load
    ///
    /// Containers report their own total; a zero quantity still counts once.
    pub fn carried_weight(&self) -> f64 {
        if let ItemKind::Container(ContainerData {
            total_weight: Some(total),
        }) = self.kind
        {
            return crate::types::num(total);
        }
        crate::types::num(self.weight) * f64::from(self.quantity.max(1))
    }

    pub fn as_weapon(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_armor(&self) -> Option<&ArmorData> {
        match &self.kind {
            ItemKind::Armor(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_spell(&self) -> Option<&SpellData> {
        match &self.kind {
            ItemKind::Spell(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_essence(&self) -> Option<&EssenceData> {
        match &self.kind {
            ItemKind::Essence(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&RoleData> {
        match &self.kind {
            ItemKind::Role(data) => Some(data),
            _ => None,
        }
    }
}
