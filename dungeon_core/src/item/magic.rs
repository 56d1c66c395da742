use crate::dice::DiceFormula;
use crate::types::{Attribute, DamageType, MagicTradition, Rank};
use serde::{Deserialize, Serialize};

/// Attribute bonus granted while an essence is equipped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassiveBonus {
    pub attribute: Attribute,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EssenceData {
    pub rank: Rank,
    pub mana_cost: f64,
    pub on_cooldown: bool,
    pub passive_bonus: Option<PassiveBonus>,
}

/// How a spell resolves against its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellRoll {
    /// Utility or buff, nothing to roll
    #[default]
    None,
    Save,
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveSpec {
    pub attribute: Attribute,
    /// Fixed save DC; `None` uses the caster's magic DC
    #[serde(default)]
    pub dc: Option<i32>,
    #[serde(default = "default_save_ku")]
    pub ku: i32,
    /// A strong save avoids the damage entirely
    #[serde(default)]
    pub avoidable: bool,
}

fn default_save_ku() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellData {
    #[serde(default)]
    pub rank: Rank,
    #[serde(default = "default_spell_mana")]
    pub mana_cost: f64,
    #[serde(default)]
    pub damage: Option<DiceFormula>,
    #[serde(default = "default_spell_damage_type")]
    pub damage_type: DamageType,
    #[serde(default)]
    pub roll: SpellRoll,
    #[serde(default)]
    pub save: Option<SaveSpec>,
    #[serde(default = "default_attack_attribute")]
    pub attack_attribute: Attribute,
    /// Area spells graze targets they narrowly miss
    #[serde(default)]
    pub area: bool,
}

impl Default for SpellData {
    fn default() -> Self {
        SpellData {
            rank: Rank::default(),
            mana_cost: default_spell_mana(),
            damage: None,
            damage_type: default_spell_damage_type(),
            roll: SpellRoll::default(),
            save: None,
            attack_attribute: default_attack_attribute(),
            area: false,
        }
    }
}

fn default_spell_mana() -> f64 {
    10.0
}
fn default_spell_damage_type() -> DamageType {
    DamageType::Fire
}
fn default_attack_attribute() -> Attribute {
    Attribute::Cognition
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleData {
    pub rank: Rank,
    pub tradition: MagicTradition,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageData {
    /// Awakens the dragon power stat
    pub draconic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractData {
    pub spirit_cost: f64,
    pub on_cooldown: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeData {
    /// Added to the stat sum of checks and spell attacks that draw on it
    pub value: f64,
}
