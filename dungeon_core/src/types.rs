//! Core types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coerce a raw numeric input into a usable value.
///
/// Non-finite values (`NaN`, `±inf`) collapse to 0 so they never reach a
/// logarithm or a floor.
pub fn num(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(value, "non-finite stat input coerced to 0");
        0.0
    }
}

/// Identifier for an owned item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for an entity (character or monster)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Damage types known to the ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Slashing,
    Blunt,
    Piercing,
    Poison,
    Acid,
    Fire,
    Cold,
    Lightning,
    Light,
    Dark,
    Psychic,
    /// Bypasses base resistance entirely
    Pure,
}

impl DamageType {
    /// Get all damage types
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Slashing,
            DamageType::Blunt,
            DamageType::Piercing,
            DamageType::Poison,
            DamageType::Acid,
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Lightning,
            DamageType::Light,
            DamageType::Dark,
            DamageType::Psychic,
            DamageType::Pure,
        ]
    }

    /// Damage types mitigated by magic resistance in the default ruleset
    pub fn default_magic() -> Vec<DamageType> {
        vec![
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Lightning,
            DamageType::Light,
            DamageType::Dark,
            DamageType::Psychic,
            DamageType::Acid,
            DamageType::Poison,
        ]
    }
}

/// Creature size category
///
/// Unknown size strings deserialize as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Giant,
    Colossal,
}

impl Size {
    /// Parse a size key, falling back to `Medium`
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "tiny" => Size::Tiny,
            "small" => Size::Small,
            "medium" | "" => Size::Medium,
            "large" => Size::Large,
            "giant" => Size::Giant,
            "colossal" | "monstrous" => Size::Colossal,
            other => {
                tracing::warn!(size = other, "unknown size, using medium");
                Size::Medium
            }
        }
    }
}

impl From<String> for Size {
    fn from(s: String) -> Self {
        Size::parse(&s)
    }
}

/// Every numeric attribute an entity carries
///
/// `Physique` and `Spirit` are primary attributes; the rest are sub-attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Physique,
    Spirit,
    Strength,
    Agility,
    Stamina,
    Precision,
    Throwing,
    Flexibility,
    BoneDensity,
    NaturalRegeneration,
    Perception,
    Vision,
    PhysicalResistance,
    MagicResistance,
    Intuition,
    Cognition,
    Willpower,
    Presence,
    Fortitude,
    Metabolism,
    ManaSense,
    SoulPower,
    SpiritRecovery,
    DivinePower,
    DragonPower,
    Height,
    Weight,
}

impl Attribute {
    /// Strength and agility drive physical melee pools; everything else is "special" scaling
    pub fn is_physical(self) -> bool {
        matches!(self, Attribute::Strength | Attribute::Agility)
    }
}

/// Rank of a monster, role, spell or essence; 1 is the strongest, 9 the weakest
///
/// Out-of-range values are clamped into `[1, 9]` on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    pub fn new(value: i64) -> Self {
        Rank(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank(Self::MAX)
    }
}

impl From<i64> for Rank {
    fn from(value: i64) -> Self {
        Rank::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

/// Weapon proficiency categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    #[default]
    Bladed,
    Blunt,
    Polearm,
    Axes,
    Unarmed,
}

/// Cover state of a defender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cover {
    #[default]
    None,
    Partial,
    Good,
    /// Fully behind an obstacle with its own KU
    Full,
}

/// Combat conditions affecting attack difficulty and defense thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    pub prone: bool,
    pub blinded: bool,
    pub invisible: bool,
    pub stunned: bool,
    pub paralyzed: bool,
    pub flanked: bool,
    pub grappled: bool,
}

/// Magic tradition granted by a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicTradition {
    #[default]
    None,
    Arcane,
    /// Arcane, but keeps essence slots
    Necromantic,
    Divine,
}

impl MagicTradition {
    pub fn is_divine(self) -> bool {
        self == MagicTradition::Divine
    }

    pub fn is_arcane(self) -> bool {
        matches!(self, MagicTradition::Arcane | MagicTradition::Necromantic)
    }
}
