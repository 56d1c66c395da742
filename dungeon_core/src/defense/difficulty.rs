//! Passive defense - attack DC and target KU

use crate::config::RulesConfig;
use crate::entity::Entity;
use crate::error::{EngineError, EngineResult};
use crate::item::WeaponData;
use crate::stats::DerivedSnapshot;
use crate::types::{num, Cover};
use serde::{Deserialize, Serialize};

/// Distance data for a ranged or thrown attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    /// Distance to the target in meters
    pub distance: f64,
    /// Range step in grid cells
    pub range_cells: f64,
    /// Hard limit in grid cells; the ruleset default when unset
    pub max_range_cells: Option<f64>,
    /// Attacker's vision
    pub vision: f64,
}

impl RangeBand {
    pub fn for_weapon(weapon: &WeaponData, distance: f64, vision: f64) -> Self {
        RangeBand {
            distance,
            range_cells: weapon.range,
            max_range_cells: weapon.max_range,
            vision,
        }
    }
}

/// DC added for shooting beyond effective range, or `OutOfRange`
pub fn range_penalty(band: &RangeBand, rules: &RulesConfig) -> EngineResult<f64> {
    let defense = &rules.defense;
    let distance = num(band.distance).max(0.0);
    let max_cells = band
        .max_range_cells
        .map(num)
        .unwrap_or(defense.default_max_range);
    let max = max_cells * defense.grid_distance;
    if distance > max {
        return Err(EngineError::OutOfRange { distance, max });
    }

    let vision_cells = (num(band.vision) / defense.vision_per_cell).floor();
    let effective = (num(band.range_cells) + vision_cells) * defense.grid_distance;
    if effective <= 0.0 || distance <= effective {
        return Ok(0.0);
    }
    Ok(defense.range_step_dc * (distance / effective).floor())
}

/// Both sides of a passive attack
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub attacker: &'a Entity,
    pub attacker_stats: &'a DerivedSnapshot,
    pub defender: &'a Entity,
    pub defender_stats: &'a DerivedSnapshot,
}

/// Per-die DC of an attack against a passive defender, in `[0, 100]`
///
/// `range` is required for ranged and thrown attacks and `None` in melee.
pub fn passive_dc(
    matchup: &Matchup<'_>,
    range: Option<&RangeBand>,
    manual_modifier: f64,
    rules: &RulesConfig,
) -> EngineResult<i32> {
    let defense = &rules.defense;
    let target = &matchup.defender.combat;
    let attacker_conditions = &matchup.attacker.combat.conditions;

    let atk_agi = matchup.attacker_stats.effective.agility.max(0.0);
    let def_agi = if target.conditions.stunned || target.conditions.paralyzed {
        0.0
    } else {
        matchup.defender_stats.effective.agility.max(0.0)
    };

    let mut dc = f64::from(defense.base_dc)
        + defense.agility_weight * (def_agi - atk_agi) / (def_agi + atk_agi + 0.01);
    dc += rules.sizes.get(matchup.defender.size).dc_mod;
    dc += match target.cover {
        Cover::Partial => defense.partial_cover_dc,
        Cover::Good => defense.good_cover_dc,
        Cover::None | Cover::Full => 0.0,
    };
    if attacker_conditions.prone {
        dc += defense.attacker_prone_dc;
    }
    if attacker_conditions.blinded {
        dc += defense.attacker_blinded_dc;
    }
    if target.conditions.invisible {
        dc += defense.target_invisible_dc;
    }
    dc += num(manual_modifier) + num(target.dc_modifier);
    if let Some(band) = range {
        dc += range_penalty(band, rules)?;
    }

    let dc = dc.clamp(0.0, 100.0).floor() as i32;
    tracing::trace!(attacker = %matchup.attacker.id, defender = %matchup.defender.id, dc, "passive dc");
    Ok(dc)
}

/// Successes an attack needs to land, never below 0
pub fn target_ku(
    defender: &Entity,
    defender_stats: &DerivedSnapshot,
    manual_modifier: i32,
    rules: &RulesConfig,
) -> i32 {
    let defense = &rules.defense;
    let combat = &defender.combat;
    let conditions = &combat.conditions;

    let mut ku = defender_stats.bone_ku + defender_stats.equipment.armor_value;
    if combat.shield_raised {
        ku += combat.shield_bonus;
    }
    let modifiers = [
        (conditions.flanked, defense.flanked_ku),
        (conditions.prone, defense.prone_ku),
        (conditions.stunned, defense.stunned_ku),
        (conditions.grappled, defense.grappled_ku),
        (conditions.paralyzed, defense.paralyzed_ku),
    ];
    ku += modifiers
        .iter()
        .filter(|(active, _)| *active)
        .map(|(_, modifier)| modifier)
        .sum::<i32>();
    ku += manual_modifier + combat.ku_modifier - combat.defense_penalty;
    ku.max(0)
}
