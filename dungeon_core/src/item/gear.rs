use crate::dice::DiceFormula;
use serde::{Deserialize, Serialize};

/// Body slot an armor piece occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorSlot {
    Head,
    #[default]
    Body,
    Arms,
    Hands,
    Legs,
    Feet,
    Neck,
    Belt,
    Cloak,
    Ring,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorData {
    pub slot: ArmorSlot,
    /// Extra slots a set piece occupies
    pub covers_slots: Vec<ArmorSlot>,
    /// Ring slots made unusable while worn
    pub rings_blocked: u32,
    /// Added to the wearer's KU
    pub armor_value: i32,
    /// Subtracted from the wearer's agility while equipped
    pub armor_penalty: f64,
    pub is_shield: bool,
}

impl ArmorData {
    /// Whether this piece occupies `slot`
    pub fn occupies(&self, slot: ArmorSlot) -> bool {
        !self.is_shield && (self.slot == slot || self.covers_slots.contains(&slot))
    }
}

/// Single-use item; every restore formula is optional
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumableData {
    pub healing: Option<DiceFormula>,
    pub mana_restore: Option<DiceFormula>,
    pub gp_restore: Option<DiceFormula>,
    pub dp_restore: Option<DiceFormula>,
    pub damage: Option<DiceFormula>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerData {
    /// Weight of the container with its contents, replacing its own weight
    pub total_weight: Option<f64>,
}
