//! Ruleset tables
//!
//! Size table, damage type groups, condition modifiers and XP thresholds.
//! Callers load one `RulesConfig` at startup and pass it around explicitly.

use super::ConfigError;
use crate::types::{DamageType, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// XP needed to leave levels 1 through 10; level 11 never levels up
pub const XP_TABLE: [u64; 10] = [6, 30, 150, 300, 600, 1200, 2500, 5000, 10000, 15000];

/// Highest reachable level
pub const MAX_LEVEL: u32 = 11;

/// Complete tunable ruleset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub sizes: SizeTable,
    #[serde(default)]
    pub damage: DamageConstants,
    #[serde(default)]
    pub defense: DefenseConstants,
    #[serde(default)]
    pub regen: RegenConstants,
    #[serde(default)]
    pub progression: ProgressionConstants,
    #[serde(default)]
    pub equipment: EquipmentConstants,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            sizes: SizeTable::default(),
            damage: DamageConstants::default(),
            defense: DefenseConstants::default(),
            regen: RegenConstants::default(),
            progression: ProgressionConstants::default(),
            equipment: EquipmentConstants::default(),
        }
    }
}

impl RulesConfig {
    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defense.depletion_divisor <= 0.0 {
            return Err(ConfigError::ValidationError(
                "defense.depletion_divisor must be positive".to_string(),
            ));
        }
        if self.defense.grid_distance <= 0.0 {
            return Err(ConfigError::ValidationError(
                "defense.grid_distance must be positive".to_string(),
            ));
        }
        if self.progression.max_level == 0 {
            return Err(ConfigError::ValidationError(
                "progression.max_level must be at least 1".to_string(),
            ));
        }
        if self.progression.xp_table.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::ValidationError(
                "progression.xp_table must be non-decreasing".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a damage type is mitigated by magic resistance
    pub fn is_magic(&self, damage_type: DamageType) -> bool {
        self.damage.magic_types.contains(&damage_type)
    }
}

/// Size modifiers for one size category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeEntry {
    /// Additive modifier to the passive-defense DC
    pub dc_mod: f64,
    /// Multiplier applied to the defense pool
    pub pool_mult: f64,
    /// Weight used by the threat estimate
    pub threat_weight: f64,
}

impl SizeEntry {
    const fn new(dc_mod: f64, pool_mult: f64, threat_weight: f64) -> Self {
        SizeEntry {
            dc_mod,
            pool_mult,
            threat_weight,
        }
    }
}

/// Per-size modifier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    #[serde(default = "default_tiny")]
    pub tiny: SizeEntry,
    #[serde(default = "default_small")]
    pub small: SizeEntry,
    #[serde(default = "default_medium")]
    pub medium: SizeEntry,
    #[serde(default = "default_large")]
    pub large: SizeEntry,
    #[serde(default = "default_giant")]
    pub giant: SizeEntry,
    #[serde(default = "default_colossal")]
    pub colossal: SizeEntry,
}

impl Default for SizeTable {
    fn default() -> Self {
        SizeTable {
            tiny: default_tiny(),
            small: default_small(),
            medium: default_medium(),
            large: default_large(),
            giant: default_giant(),
            colossal: default_colossal(),
        }
    }
}

impl SizeTable {
    pub fn get(&self, size: Size) -> &SizeEntry {
        match size {
            Size::Tiny => &self.tiny,
            Size::Small => &self.small,
            Size::Medium => &self.medium,
            Size::Large => &self.large,
            Size::Giant => &self.giant,
            Size::Colossal => &self.colossal,
        }
    }
}

fn default_tiny() -> SizeEntry {
    SizeEntry::new(20.0, 0.5, 1.0)
}
fn default_small() -> SizeEntry {
    SizeEntry::new(10.0, 0.75, 2.0)
}
fn default_medium() -> SizeEntry {
    SizeEntry::new(0.0, 1.0, 3.0)
}
fn default_large() -> SizeEntry {
    SizeEntry::new(-10.0, 1.25, 4.0)
}
fn default_giant() -> SizeEntry {
    SizeEntry::new(-20.0, 1.5, 5.0)
}
fn default_colossal() -> SizeEntry {
    SizeEntry::new(-30.0, 2.0, 6.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConstants {
    /// Damage types whose base resistance leg is magic resistance
    #[serde(default = "DamageType::default_magic")]
    pub magic_types: Vec<DamageType>,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            magic_types: DamageType::default_magic(),
        }
    }
}

/// Attack difficulty and defense threshold modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseConstants {
    /// Per-die threshold used by opposed rolls, full cover, checks and initiative
    #[serde(default = "default_base_dc")]
    pub base_dc: i32,
    /// DC weight of the agility contest: `base + weight * (def - atk) / (def + atk)`
    #[serde(default = "default_agility_weight")]
    pub agility_weight: f64,
    #[serde(default = "default_partial_cover_dc")]
    pub partial_cover_dc: f64,
    #[serde(default = "default_good_cover_dc")]
    pub good_cover_dc: f64,
    #[serde(default = "default_attacker_prone_dc")]
    pub attacker_prone_dc: f64,
    #[serde(default = "default_attacker_blinded_dc")]
    pub attacker_blinded_dc: f64,
    #[serde(default = "default_target_invisible_dc")]
    pub target_invisible_dc: f64,
    /// DC added per range step beyond effective range
    #[serde(default = "default_range_step_dc")]
    pub range_step_dc: f64,
    /// Vision points per extra effective range cell
    #[serde(default = "default_vision_per_cell")]
    pub vision_per_cell: f64,
    /// Meters per grid cell
    #[serde(default = "default_grid_distance")]
    pub grid_distance: f64,
    /// Max range in cells when a weapon does not set one
    #[serde(default = "default_max_range")]
    pub default_max_range: f64,
    #[serde(default = "default_flanked_ku")]
    pub flanked_ku: i32,
    #[serde(default = "default_prone_ku")]
    pub prone_ku: i32,
    #[serde(default = "default_stunned_ku")]
    pub stunned_ku: i32,
    #[serde(default = "default_grappled_ku")]
    pub grappled_ku: i32,
    #[serde(default = "default_paralyzed_ku")]
    pub paralyzed_ku: i32,
    /// `depletion = max(1, ceil(successes / divisor))`
    #[serde(default = "default_depletion_divisor")]
    pub depletion_divisor: f64,
    /// Area attacks that miss by at most this many successes still graze
    #[serde(default = "default_area_graze_margin")]
    pub area_graze_margin: i32,
}

impl Default for DefenseConstants {
    fn default() -> Self {
        DefenseConstants {
            base_dc: default_base_dc(),
            agility_weight: default_agility_weight(),
            partial_cover_dc: default_partial_cover_dc(),
            good_cover_dc: default_good_cover_dc(),
            attacker_prone_dc: default_attacker_prone_dc(),
            attacker_blinded_dc: default_attacker_blinded_dc(),
            target_invisible_dc: default_target_invisible_dc(),
            range_step_dc: default_range_step_dc(),
            vision_per_cell: default_vision_per_cell(),
            grid_distance: default_grid_distance(),
            default_max_range: default_max_range(),
            flanked_ku: default_flanked_ku(),
            prone_ku: default_prone_ku(),
            stunned_ku: default_stunned_ku(),
            grappled_ku: default_grappled_ku(),
            paralyzed_ku: default_paralyzed_ku(),
            depletion_divisor: default_depletion_divisor(),
            area_graze_margin: default_area_graze_margin(),
        }
    }
}

fn default_base_dc() -> i32 {
    50
}
fn default_agility_weight() -> f64 {
    40.0
}
fn default_partial_cover_dc() -> f64 {
    10.0
}
fn default_good_cover_dc() -> f64 {
    20.0
}
fn default_attacker_prone_dc() -> f64 {
    10.0
}
fn default_attacker_blinded_dc() -> f64 {
    25.0
}
fn default_target_invisible_dc() -> f64 {
    25.0
}
fn default_range_step_dc() -> f64 {
    10.0
}
fn default_vision_per_cell() -> f64 {
    10.0
}
fn default_grid_distance() -> f64 {
    2.0
}
fn default_max_range() -> f64 {
    100.0
}
fn default_flanked_ku() -> i32 {
    -2
}
fn default_prone_ku() -> i32 {
    -2
}
fn default_stunned_ku() -> i32 {
    -2
}
fn default_grappled_ku() -> i32 {
    -1
}
fn default_paralyzed_ku() -> i32 {
    -2
}
fn default_depletion_divisor() -> f64 {
    3.0
}
fn default_area_graze_margin() -> i32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenConstants {
    /// Fraction of the regeneration stat restored per minute
    #[serde(default = "default_regen_rate")]
    pub rate_per_minute: f64,
    /// Rest length that resets ability cooldowns
    #[serde(default = "default_cooldown_reset_minutes")]
    pub cooldown_reset_minutes: f64,
    #[serde(default = "default_seconds_per_round")]
    pub seconds_per_round: f64,
}

impl Default for RegenConstants {
    fn default() -> Self {
        RegenConstants {
            rate_per_minute: default_regen_rate(),
            cooldown_reset_minutes: default_cooldown_reset_minutes(),
            seconds_per_round: default_seconds_per_round(),
        }
    }
}

fn default_regen_rate() -> f64 {
    0.5
}
fn default_cooldown_reset_minutes() -> f64 {
    5.0
}
fn default_seconds_per_round() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConstants {
    /// XP needed to leave level `index + 1`
    #[serde(default = "default_xp_table")]
    pub xp_table: Vec<u64>,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl Default for ProgressionConstants {
    fn default() -> Self {
        ProgressionConstants {
            xp_table: default_xp_table(),
            max_level: default_max_level(),
        }
    }
}

impl ProgressionConstants {
    /// XP threshold for a level, `None` meaning the level never advances
    pub fn threshold(&self, level: u32) -> Option<u64> {
        threshold_from(&self.xp_table, level)
    }
}

/// Look up `level` (1-based) in a threshold table
pub(crate) fn threshold_from(table: &[u64], level: u32) -> Option<u64> {
    if level == 0 {
        return None;
    }
    table.get(level as usize - 1).copied()
}

fn default_xp_table() -> Vec<u64> {
    XP_TABLE.to_vec()
}
fn default_max_level() -> u32 {
    MAX_LEVEL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentConstants {
    /// Ring slots before gloves block any
    #[serde(default = "default_ring_slots")]
    pub ring_slots: u32,
    /// Simultaneously active contracts
    #[serde(default = "default_contract_slots")]
    pub contract_slots: u32,
}

impl Default for EquipmentConstants {
    fn default() -> Self {
        EquipmentConstants {
            ring_slots: default_ring_slots(),
            contract_slots: default_contract_slots(),
        }
    }
}

fn default_ring_slots() -> u32 {
    10
}
fn default_contract_slots() -> u32 {
    1
}

/// Parse a ruleset from TOML and validate it
pub fn parse_rules(content: &str) -> Result<RulesConfig, ConfigError> {
    let rules: RulesConfig = super::parse_toml(content)?;
    rules.validate()?;
    Ok(rules)
}

/// Load a ruleset from a TOML file and validate it
pub fn load_rules(path: &Path) -> Result<RulesConfig, ConfigError> {
    let rules: RulesConfig = super::load_toml(path)?;
    rules.validate()?;
    tracing::info!(path = %path.display(), "loaded ruleset");
    Ok(rules)
}

/// Get the bundled default ruleset
pub fn default_rules() -> RulesConfig {
    let toml = include_str!("../../config/rules.toml");
    parse_rules(toml).unwrap_or_else(|err| {
        tracing::warn!(%err, "bundled ruleset failed to parse, using built-in defaults");
        RulesConfig::default()
    })
}
