//! Stat derivation formulas
//!
//! Pure functions over primitive inputs. Every input passes through [`num`]
//! first, and every logarithm argument is clamped so it never drops below 1.

use super::recovery::{RecoveryInfo, RecoveryTime};
use crate::config::RulesConfig;
use crate::types::num;
use serde::{Deserialize, Serialize};

/// Stat points per pool die
pub const POINTS_PER_DIE: f64 = 13.0;
/// Default critical-success face
pub const CRIT_HIGH: u32 = 95;
/// Critical-failure face
pub const CRIT_LOW: u32 = 5;
/// Flexibility never lowers the critical face below this
pub const CRIT_FLOOR: u32 = 65;
/// Flexibility needed to lower the critical face by one
pub const FLEXIBILITY_PER_CRIT_STEP: f64 = 50.0;
/// No base resistance goes beyond this percentage
pub const RESIST_CAP: f64 = 90.0;
const PHYSICAL_RESIST_COEFFICIENT: f64 = 20.0;
const MAGIC_RESIST_COEFFICIENT: f64 = 15.0;

/// `floor(endurance * (1 + bone_density / 100))`
pub fn max_hp(endurance: f64, bone_density: f64) -> f64 {
    (num(endurance) * (1.0 + num(bone_density) / 100.0)).floor()
}

/// `floor(soul_power * 1.5)`
pub fn max_mana(soul_power: f64) -> f64 {
    (num(soul_power) * 1.5).floor()
}

/// Dragon power pool, zero unless the dragon stat is positive
pub fn max_dragon_power(soul_power: f64, dragon_power: f64) -> f64 {
    let dragon = num(dragon_power);
    if dragon <= 0.0 {
        return 0.0;
    }
    (num(soul_power) * 0.5 + dragon * 1.5).floor()
}

/// Grace pool of a divine caster
pub fn max_grace(divine_power: f64, soul_power: f64) -> f64 {
    (num(divine_power) * 1.5 + num(soul_power) * 0.75).floor()
}

/// HP source stat: stamina, or twice the body attribute when stamina is unset
pub fn endurance(stamina: f64, body: f64) -> f64 {
    let stamina = num(stamina);
    if stamina == 0.0 {
        num(body) * 2.0
    } else {
        stamina
    }
}

fn log_resist(coefficient: f64, stat: f64) -> f64 {
    let stat = num(stat).max(0.0);
    (coefficient * (1.0 + stat / 10.0).ln()).floor().min(RESIST_CAP)
}

/// Base physical resistance in percent, `[0, 90]`
pub fn physical_resist_percent(bone_density: f64, flat_resist: f64) -> f64 {
    log_resist(
        PHYSICAL_RESIST_COEFFICIENT,
        num(bone_density) + num(flat_resist),
    )
}

/// Base magic resistance in percent, `[0, 90]`
pub fn magic_resist_percent(magic_resist: f64) -> f64 {
    log_resist(MAGIC_RESIST_COEFFICIENT, magic_resist)
}

/// Pool size for a stat; never below one die
pub fn dice_pool(stat: f64) -> u32 {
    (num(stat) / POINTS_PER_DIE).floor().max(1.0) as u32
}

/// Face at or above which a die is a critical success
pub fn critical_threshold(flexibility: f64) -> u32 {
    let steps = (num(flexibility) / FLEXIBILITY_PER_CRIT_STEP).floor();
    (f64::from(CRIT_HIGH) - steps).max(f64::from(CRIT_FLOOR)) as u32
}

/// Defense threshold contributed by bone density alone
pub fn bone_ku(bone_density: f64) -> i32 {
    let bone = num(bone_density);
    if bone <= 20.0 {
        2
    } else if bone < 35.0 {
        3
    } else if bone < 55.0 {
        4
    } else if bone < 80.0 {
        5
    } else {
        (5.0 + (bone - 70.0) / 30.0).floor() as i32
    }
}

/// Spellcasting difficulty and threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MagicStats {
    pub dc: i32,
    pub ku: i32,
}

/// Spell DC and KU from `cognition + mana_sense + power`
///
/// `power` is soul power for arcane casters and divine power for divine ones.
pub fn magic_stats(cognition: f64, mana_sense: f64, power: f64) -> MagicStats {
    let total = (num(cognition) + num(mana_sense) + num(power)).max(0.0);
    let primary = 15.0 * (1.0 + total / 100.0).ln();
    let secondary = 12.0 * (1.0 + (1.0 + total / 400.0).ln()).ln();
    let dc = (50.0 + primary + secondary).min(90.0).floor() as i32;
    let ku = ((total / 53.0).floor() as i32).max(1);
    MagicStats { dc, ku }
}

/// Movement in meters per turn
pub fn speed(agility: f64, bonus: f64) -> f64 {
    10.0 + (num(agility) / 5.0).floor() + num(bonus)
}

/// XP needed to leave `level` under `rules`; `None` for the last level or an unknown one
pub fn xp_threshold(level: u32, rules: &RulesConfig) -> Option<u64> {
    rules.progression.threshold(level)
}

/// Time to refill a resource at a regeneration rate
pub fn recovery_time(rate: f64, current: f64, max: f64) -> RecoveryInfo {
    let (rate, current, max) = (num(rate), num(current), num(max));
    if rate <= 0.0 || max <= 0.0 {
        return RecoveryInfo {
            to_full: RecoveryTime::Never,
            to_rest: RecoveryTime::Never,
        };
    }
    let per_minute = rate * 0.5;
    RecoveryInfo {
        to_full: RecoveryTime::Minutes((max / per_minute).ceil() as u64),
        to_rest: RecoveryTime::Minutes(((max - current).max(0.0) / per_minute).ceil() as u64),
    }
}

/// Carry capacity
pub fn encumbrance_max(strength: f64, bone_density: f64) -> f64 {
    (num(strength) * 5.0 + num(bone_density) * 2.0 + 20.0).floor()
}

/// Carried weight as a percentage of capacity, capped at 100
pub fn encumbrance_pct(weight: f64, max: f64) -> f64 {
    let (weight, max) = (num(weight), num(max));
    if max <= 0.0 {
        return if weight > 0.0 { 100.0 } else { 0.0 };
    }
    (weight / max * 100.0).round().min(100.0)
}

/// Dice available to the active defense pool
pub fn defense_pool_max(agility: f64, pool_mult: f64) -> u32 {
    (num(agility) / POINTS_PER_DIE * num(pool_mult))
        .floor()
        .max(1.0) as u32
}

/// Inputs of the encounter threat estimate
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatInputs {
    pub height: f64,
    pub weight: f64,
    pub size_weight: f64,
    pub bone_density: f64,
    pub presence: f64,
    pub willpower: f64,
    pub item_level: f64,
}

/// Threat level used to rank combatants at the start of an encounter
pub fn threat_level(inputs: &ThreatInputs) -> f64 {
    (num(inputs.height) / 10.0
        + num(inputs.size_weight) * 50.0
        + num(inputs.weight) / 10.0
        + num(inputs.bone_density)
        + num(inputs.presence)
        + num(inputs.willpower)
        + num(inputs.item_level) / 100.0)
        .floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_hp() {
        assert!((max_hp(20.0, 50.0) - 30.0).abs() < f64::EPSILON);
        assert!((max_hp(15.0, 10.0) - 16.0).abs() < f64::EPSILON);
        assert!((max_hp(f64::NAN, 50.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resource_maxima() {
        assert!((max_mana(21.0) - 31.0).abs() < f64::EPSILON);
        assert!((max_dragon_power(20.0, 0.0)).abs() < f64::EPSILON);
        assert!((max_dragon_power(20.0, 10.0) - 25.0).abs() < f64::EPSILON);
        assert!((max_grace(10.0, 10.0) - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_endurance_fallback() {
        assert!((endurance(0.0, 12.0) - 24.0).abs() < f64::EPSILON);
        assert!((endurance(30.0, 12.0) - 30.0).abs() < f64::EPSILON);
        assert!((endurance(f64::NAN, 5.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_physical_resist() {
        // floor(20 * ln 6) = floor(35.83)
        assert!((physical_resist_percent(50.0, 0.0) - 35.0).abs() < f64::EPSILON);
        assert!((physical_resist_percent(-50.0, -50.0)).abs() < f64::EPSILON);
        assert!((physical_resist_percent(1e12, 0.0) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_magic_resist() {
        // floor(15 * ln 2) = floor(10.39)
        assert!((magic_resist_percent(10.0) - 10.0).abs() < f64::EPSILON);
        assert!((magic_resist_percent(-5.0)).abs() < f64::EPSILON);
        assert!((magic_resist_percent(1e12) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dice_pool() {
        assert_eq!(dice_pool(65.0), 5);
        assert_eq!(dice_pool(5.0), 1);
        assert_eq!(dice_pool(0.0), 1);
        assert_eq!(dice_pool(-40.0), 1);
        assert_eq!(dice_pool(f64::NAN), 1);
        assert_eq!(dice_pool(26.0), 2);
    }

    #[test]
    fn test_critical_threshold() {
        assert_eq!(critical_threshold(0.0), 95);
        assert_eq!(critical_threshold(49.0), 95);
        assert_eq!(critical_threshold(100.0), 93);
        assert_eq!(critical_threshold(5000.0), 65);
    }

    #[test]
    fn test_bone_ku_steps() {
        assert_eq!(bone_ku(-10.0), 2);
        assert_eq!(bone_ku(20.0), 2);
        assert_eq!(bone_ku(34.0), 3);
        assert_eq!(bone_ku(54.0), 4);
        assert_eq!(bone_ku(79.0), 5);
        assert_eq!(bone_ku(80.0), 5);
        assert_eq!(bone_ku(100.0), 6);
        assert_eq!(bone_ku(130.0), 7);
    }

    #[test]
    fn test_magic_stats() {
        assert_eq!(magic_stats(0.0, 0.0, 0.0), MagicStats { dc: 50, ku: 1 });
        // S = 300: 50 + 20.79 + 5.33
        assert_eq!(
            magic_stats(100.0, 100.0, 100.0),
            MagicStats { dc: 76, ku: 5 }
        );
        assert_eq!(magic_stats(1e9, 0.0, 0.0).dc, 90);
    }

    #[test]
    fn test_speed() {
        assert!((speed(23.0, 2.0) - 16.0).abs() < f64::EPSILON);
        assert!((speed(0.0, 0.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_xp_threshold() {
        let rules = RulesConfig::default();
        assert_eq!(xp_threshold(1, &rules), Some(6));
        assert_eq!(xp_threshold(5, &rules), Some(600));
        assert_eq!(xp_threshold(11, &rules), None);
    }

    #[test]
    fn test_xp_threshold_follows_ruleset() {
        let mut rules = RulesConfig::default();
        rules.progression.xp_table = vec![10, 20];
        assert_eq!(xp_threshold(1, &rules), Some(10));
        assert_eq!(xp_threshold(2, &rules), Some(20));
        assert_eq!(xp_threshold(3, &rules), None);
    }

    #[test]
    fn test_recovery_time() {
        let info = recovery_time(10.0, 5.0, 20.0);
        assert_eq!(info.to_full, RecoveryTime::Minutes(4));
        assert_eq!(info.to_rest, RecoveryTime::Minutes(3));

        let info = recovery_time(3.0, 0.0, 10.0);
        // 10 / 1.5 = 6.67 rounds up
        assert_eq!(info.to_full, RecoveryTime::Minutes(7));

        let info = recovery_time(0.0, 5.0, 20.0);
        assert_eq!(info.to_full, RecoveryTime::Never);
        assert_eq!(info.to_rest, RecoveryTime::Never);

        let info = recovery_time(4.0, 30.0, 20.0);
        assert_eq!(info.to_rest, RecoveryTime::Minutes(0));
    }

    #[test]
    fn test_encumbrance() {
        assert!((encumbrance_max(10.0, 5.0) - 80.0).abs() < f64::EPSILON);
        assert!((encumbrance_pct(40.0, 80.0) - 50.0).abs() < f64::EPSILON);
        assert!((encumbrance_pct(400.0, 80.0) - 100.0).abs() < f64::EPSILON);
        assert!((encumbrance_pct(0.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_defense_pool_max() {
        assert_eq!(defense_pool_max(26.0, 1.0), 2);
        assert_eq!(defense_pool_max(52.0, 1.5), 6);
        assert_eq!(defense_pool_max(5.0, 0.5), 1);
    }

    #[test]
    fn test_threat_level() {
        let inputs = ThreatInputs {
            height: 180.0,
            weight: 80.0,
            size_weight: 3.0,
            bone_density: 20.0,
            presence: 10.0,
            willpower: 5.0,
            item_level: 250.0,
        };
        // 18 + 150 + 8 + 20 + 10 + 5 + 2.5
        assert!((threat_level(&inputs) - 213.0).abs() < f64::EPSILON);
    }
}
