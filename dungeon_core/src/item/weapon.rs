use crate::dice::DiceFormula;
use crate::types::{Attribute, DamageType, Proficiency};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    #[default]
    Melee,
    Ranged,
    Thrown,
}

/// How a wielded weapon is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Grip {
    #[default]
    #[serde(rename = "1h")]
    OneHanded,
    #[serde(rename = "2h")]
    TwoHanded,
    #[serde(rename = "offhand")]
    OffHand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTags {
    /// Pool from the best of strength, agility and proficiency
    pub light: bool,
    /// Can be thrown with the throwing proficiency
    pub throwable: bool,
    pub two_handed: bool,
    /// Switches to the versatile formula when held two-handed
    pub versatile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponData {
    #[serde(default = "default_damage")]
    pub damage: DiceFormula,
    #[serde(default)]
    pub damage_versatile: Option<DiceFormula>,
    #[serde(default = "default_damage_type")]
    pub damage_type: DamageType,
    /// Types the wielder may choose from; empty means `damage_type` only
    #[serde(default)]
    pub available_types: Vec<DamageType>,
    #[serde(default)]
    pub attack_type: AttackType,
    #[serde(default)]
    pub proficiency: Proficiency,
    #[serde(default = "default_scaling")]
    pub scaling: Attribute,
    /// Range step in grid cells
    #[serde(default = "default_range")]
    pub range: f64,
    /// Hard range limit in grid cells
    #[serde(default)]
    pub max_range: Option<f64>,
    #[serde(default)]
    pub tags: WeaponTags,
    #[serde(default)]
    pub grip: Grip,
}

impl Default for WeaponData {
    fn default() -> Self {
        WeaponData {
            damage: default_damage(),
            damage_versatile: None,
            damage_type: default_damage_type(),
            available_types: Vec::new(),
            attack_type: AttackType::default(),
            proficiency: Proficiency::default(),
            scaling: default_scaling(),
            range: default_range(),
            max_range: None,
            tags: WeaponTags::default(),
            grip: Grip::default(),
        }
    }
}

impl WeaponData {
    /// Damage types offered when rolling damage
    pub fn damage_types(&self) -> Vec<DamageType> {
        if self.available_types.is_empty() {
            vec![self.damage_type]
        } else {
            self.available_types.clone()
        }
    }
}

fn default_damage() -> DiceFormula {
    DiceFormula::dice(1, 8)
}
fn default_damage_type() -> DamageType {
    DamageType::Slashing
}
fn default_scaling() -> Attribute {
    Attribute::Strength
}
fn default_range() -> f64 {
    1.0
}
