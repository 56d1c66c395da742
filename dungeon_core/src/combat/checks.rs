//! Initiative, skill checks and saving throws

use super::pool::modified_pool;
use super::result::RollOutcome;
use crate::config::RulesConfig;
use crate::dice::{CritRange, DiceRoller};
use crate::item::SaveSpec;
use crate::stats::{dice_pool, DerivedSnapshot};
use crate::types::num;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiative {
    pub successes: i32,
    /// `agility / 100`, breaks ties between equal success counts
    pub tie_breaker: f64,
    /// Never below 0
    pub total: f64,
    pub roll: RollOutcome,
}

/// Roll initiative from agility
pub fn roll_initiative(
    agility: f64,
    roller: &mut impl DiceRoller,
    rules: &RulesConfig,
) -> Initiative {
    let agility = num(agility).max(0.0);
    let faces = roller.roll_pool(dice_pool(agility));
    let roll = RollOutcome::count(faces, rules.defense.base_dc, CritRange::default());
    let tie_breaker = agility / 100.0;
    let total = (f64::from(roll.successes) + tie_breaker).max(0.0);
    Initiative {
        successes: roll.successes,
        tie_breaker,
        total,
        roll,
    }
}

/// Degree of success of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degree {
    Failure,
    Success,
    /// Two or more over the KU
    Excellent,
    /// Five or more over the KU
    Legendary,
}

impl Degree {
    pub fn of(successes: i32, ku: i32) -> Self {
        if successes >= ku + 5 {
            Degree::Legendary
        } else if successes >= ku + 2 {
            Degree::Excellent
        } else if successes >= ku {
            Degree::Success
        } else {
            Degree::Failure
        }
    }
}

/// A skill check built from up to three stat values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckRequest {
    pub base: f64,
    pub secondary: f64,
    pub knowledge: f64,
    pub mod_pool: i32,
    pub dc: i32,
    pub mod_dc: i32,
    pub ku: i32,
    pub mod_ku: i32,
    pub crit: CritRange,
}

impl Default for CheckRequest {
    fn default() -> Self {
        CheckRequest {
            base: 0.0,
            secondary: 0.0,
            knowledge: 0.0,
            mod_pool: 0,
            dc: 50,
            mod_dc: 0,
            ku: 1,
            mod_ku: 0,
            crit: CritRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub pool: u32,
    pub dc: i32,
    pub ku: i32,
    pub roll: RollOutcome,
    pub degree: Degree,
    pub passed: bool,
}

pub fn resolve_check(request: &CheckRequest, roller: &mut impl DiceRoller) -> CheckOutcome {
    let total = num(request.base) + num(request.secondary) + num(request.knowledge);
    let pool = modified_pool(total, request.mod_pool);
    let dc = request.dc.saturating_add(request.mod_dc).clamp(0, 100);
    let ku = request.ku.saturating_add(request.mod_ku).max(0);

    let roll = RollOutcome::count(roller.roll_pool(pool), dc, request.crit);
    let degree = Degree::of(roll.successes, ku);
    tracing::debug!(pool, dc, ku, successes = roll.successes, ?degree, "check resolved");
    CheckOutcome {
        pool,
        dc,
        ku,
        roll,
        degree,
        passed: degree != Degree::Failure,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveResult {
    /// No damage; only for avoidable saves
    Evaded,
    /// Beat the KU, half damage
    Resisted,
    /// Met the KU exactly, half damage
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub pool: u32,
    pub dc: i32,
    pub ku: i32,
    pub roll: RollOutcome,
    pub result: SaveResult,
    /// Damage after the save
    pub damage: f64,
}

/// Roll a saving throw against a spell
///
/// The save DC falls back to `caster_dc` when the spell sets none.
pub fn resolve_save(
    target: &DerivedSnapshot,
    save: &SaveSpec,
    caster_dc: i32,
    damage: f64,
    roller: &mut impl DiceRoller,
) -> SaveOutcome {
    let pool = dice_pool(target.stat(save.attribute));
    let dc = save.dc.unwrap_or(caster_dc).clamp(0, 100);
    let ku = save.ku.max(0);
    let roll = RollOutcome::count(roller.roll_pool(pool), dc, CritRange::default());

    let successes = roll.successes;
    let damage = num(damage).max(0.0);
    let (result, damage) = if save.avoidable && successes >= ku + 3 {
        (SaveResult::Evaded, 0.0)
    } else if successes > ku {
        (SaveResult::Resisted, (damage / 2.0).floor())
    } else if successes == ku {
        (SaveResult::Partial, (damage / 2.0).floor())
    } else {
        (SaveResult::Failed, damage)
    };

    tracing::debug!(pool, dc, ku, successes, ?result, damage, "save resolved");
    SaveOutcome {
        pool,
        dc,
        ku,
        roll,
        result,
        damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRoller;
    use crate::entity::Entity;
    use crate::stats::recompute;
    use crate::types::Attribute;

    #[test]
    fn test_initiative() {
        let rules = RulesConfig::default();
        let mut roller = FixedRoller::new(vec![60, 40, 96, 10, 80]);
        // pool 5 from agility 65: 1 + 0 + 3 + 0 + 1
        let initiative = roll_initiative(65.0, &mut roller, &rules);
        assert_eq!(initiative.successes, 5);
        assert!((initiative.tie_breaker - 0.65).abs() < f64::EPSILON);
        assert!((initiative.total - 5.65).abs() < 1e-9);
    }

    #[test]
    fn test_initiative_floors_at_zero() {
        let rules = RulesConfig::default();
        let mut roller = FixedRoller::new(vec![1]);
        let initiative = roll_initiative(10.0, &mut roller, &rules);
        assert_eq!(initiative.successes, -1);
        assert!(initiative.total.abs() < f64::EPSILON);
    }

    #[test]
    fn test_degrees() {
        assert_eq!(Degree::of(0, 1), Degree::Failure);
        assert_eq!(Degree::of(1, 1), Degree::Success);
        assert_eq!(Degree::of(3, 1), Degree::Excellent);
        assert_eq!(Degree::of(6, 1), Degree::Legendary);
    }

    #[test]
    fn test_check_pool_and_modifiers() {
        let request = CheckRequest {
            base: 20.0,
            secondary: 10.0,
            knowledge: 9.0,
            mod_pool: 1,
            mod_dc: 10,
            ..CheckRequest::default()
        };
        let mut roller = FixedRoller::new(vec![60, 55, 70, 20]);
        let outcome = resolve_check(&request, &mut roller);
        // floor(39 / 13) + 1
        assert_eq!(outcome.pool, 4);
        assert_eq!(outcome.dc, 60);
        assert_eq!(outcome.roll.successes, 2);
        assert_eq!(outcome.degree, Degree::Success);
        assert!(outcome.passed);
    }

    #[test]
    fn test_check_minimum_pool() {
        let request = CheckRequest {
            mod_pool: -3,
            ..CheckRequest::default()
        };
        let mut roller = FixedRoller::new(vec![20]);
        let outcome = resolve_check(&request, &mut roller);
        assert_eq!(outcome.pool, 1);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_check_modifiers_saturate() {
        let request = CheckRequest {
            dc: i32::MAX,
            mod_dc: 5,
            ku: i32::MIN,
            mod_ku: -5,
            ..CheckRequest::default()
        };
        let mut roller = FixedRoller::new(vec![20]);
        let outcome = resolve_check(&request, &mut roller);
        assert_eq!(outcome.dc, 100);
        assert_eq!(outcome.ku, 0);
    }

    fn target() -> DerivedSnapshot {
        let entity = Entity::new("t", "Target").with_sub(Attribute::Fortitude, 39.0);
        recompute(&entity, &RulesConfig::default())
    }

    fn save(avoidable: bool) -> SaveSpec {
        SaveSpec {
            attribute: Attribute::Fortitude,
            dc: None,
            ku: 1,
            avoidable,
        }
    }

    #[test]
    fn test_save_results() {
        let target = target();
        let mut evade = FixedRoller::new(vec![96, 70, 70]);
        let outcome = resolve_save(&target, &save(true), 60, 20.0, &mut evade);
        assert_eq!(outcome.pool, 3);
        assert_eq!(outcome.dc, 60);
        assert_eq!(outcome.result, SaveResult::Evaded);
        assert!(outcome.damage.abs() < f64::EPSILON);

        let mut strong = FixedRoller::new(vec![96, 70, 70]);
        let outcome = resolve_save(&target, &save(false), 60, 21.0, &mut strong);
        assert_eq!(outcome.result, SaveResult::Resisted);
        assert!((outcome.damage - 10.0).abs() < f64::EPSILON);

        let mut even = FixedRoller::new(vec![70, 20, 20]);
        let outcome = resolve_save(&target, &save(true), 60, 21.0, &mut even);
        assert_eq!(outcome.result, SaveResult::Partial);
        assert!((outcome.damage - 10.0).abs() < f64::EPSILON);

        let mut weak = FixedRoller::new(vec![20, 20, 20]);
        let outcome = resolve_save(&target, &save(true), 60, 21.0, &mut weak);
        assert_eq!(outcome.result, SaveResult::Failed);
        assert!((outcome.damage - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fixed_save_dc_wins() {
        let target = target();
        let spec = SaveSpec {
            dc: Some(30),
            ..save(false)
        };
        let mut roller = FixedRoller::new(vec![35, 20, 20]);
        let outcome = resolve_save(&target, &spec, 80, 10.0, &mut roller);
        assert_eq!(outcome.dc, 30);
        assert_eq!(outcome.result, SaveResult::Partial);
    }
}
