//! Property tests for the numeric core, plus the worked rule examples

use dungeon_core::config::RulesConfig;
use dungeon_core::defense::{mitigate, passive_dc, Matchup};
use dungeon_core::dice::{count_successes, CritRange, DiceFormula, DiceRoller, RngRoller};
use dungeon_core::entity::{paths, Entity, EntityDelta};
use dungeon_core::equipment::{link_equipment, EquipmentLimits};
use dungeon_core::item::{ArmorData, ArmorSlot, Item, ItemKind, WeaponData};
use dungeon_core::regen::regen_amount;
use dungeon_core::stats::{
    critical_threshold, derive::recovery_time, dice_pool, magic_resist_percent,
    physical_resist_percent, recompute, RecoveryTime,
};
use dungeon_core::types::{Attribute, DamageType};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// === Worked examples ===

#[test]
fn test_scenario_bone_density_resist() {
    assert!((physical_resist_percent(50.0, 0.0) - 35.0).abs() < f64::EPSILON);
}

#[test]
fn test_scenario_dice_pool() {
    assert_eq!(dice_pool(65.0), 5);
    assert_eq!(dice_pool(5.0), 1);
}

#[test]
fn test_scenario_success_count() {
    let tally = count_successes(&[97, 50, 3], 50, CritRange::with_high(95));
    assert_eq!(tally.successes, 3);
    assert_eq!(tally.crit_successes, 1);
    assert_eq!(tally.crit_fails, 1);
}

#[test]
fn test_scenario_mitigation() {
    let result = mitigate(100.0, DamageType::Fire, 35.0, 20.0);
    assert!((result.final_damage - 52.0).abs() < f64::EPSILON);
    assert!((result.reduced - 48.0).abs() < f64::EPSILON);
}

#[test]
fn test_scenario_recovery_time() {
    let info = recovery_time(10.0, 5.0, 20.0);
    assert_eq!(info.to_full, RecoveryTime::Minutes(4));
    assert_eq!(info.to_rest, RecoveryTime::Minutes(3));
}

#[test]
fn test_seeded_roller_is_reproducible() {
    let mut a = RngRoller::new(ChaCha8Rng::seed_from_u64(7));
    let mut b = RngRoller::new(ChaCha8Rng::seed_from_u64(7));
    let faces = a.roll_pool(20);
    assert_eq!(faces, b.roll_pool(20));
    assert!(faces.iter().all(|face| (1..=100).contains(face)));
}

fn armor(id: &str, slot: ArmorSlot) -> Item {
    Item::new(
        id,
        id,
        ItemKind::Armor(ArmorData {
            slot,
            ..ArmorData::default()
        }),
    )
    .equipped()
}

// === Properties ===

proptest! {
    #[test]
    fn prop_successes_bounded(faces in prop::collection::vec(1u32..=100, 1..20), dc in 0i32..=100) {
        let n = faces.len() as i32;
        let tally = count_successes(&faces, dc, CritRange::default());
        prop_assert_eq!(&tally, &count_successes(&faces, dc, CritRange::default()));
        prop_assert!(tally.successes >= -n);
        prop_assert!(tally.successes <= 3 * n);
        prop_assert!(tally.crit_successes + tally.crit_fails <= faces.len() as u32);
    }

    #[test]
    fn prop_dice_pool_at_least_one_and_monotonic(a in -100.0f64..1000.0, b in -100.0f64..1000.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(dice_pool(low) >= 1);
        prop_assert!(dice_pool(low) <= dice_pool(high));
    }

    #[test]
    fn prop_crit_threshold_follows_flexibility(flexibility in -500.0f64..5000.0) {
        let threshold = critical_threshold(flexibility);
        let expected = (95.0 - (flexibility / 50.0).floor()).max(65.0);
        prop_assert!(threshold >= 65);
        prop_assert!((f64::from(threshold) - expected).abs() < f64::EPSILON);
        if flexibility >= 0.0 {
            prop_assert!(threshold <= 95);
        }
    }

    #[test]
    fn prop_resistances_capped(bone in -100.0f64..10_000.0, flat in -100.0f64..10_000.0) {
        let physical = physical_resist_percent(bone, flat);
        let magic = magic_resist_percent(flat);
        prop_assert!((0.0..=90.0).contains(&physical));
        prop_assert!((0.0..=90.0).contains(&magic));
    }

    #[test]
    fn prop_physical_resist_monotonic(a in -100.0f64..10_000.0, b in -100.0f64..10_000.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(physical_resist_percent(low, 0.0) <= physical_resist_percent(high, 0.0));
    }

    #[test]
    fn prop_mitigation_never_amplifies(
        amount in 0.0f64..10_000.0,
        base in -50.0f64..150.0,
        specific in -50.0f64..150.0,
    ) {
        let result = mitigate(amount, DamageType::Slashing, base, specific);
        prop_assert!(result.final_damage >= 0.0);
        prop_assert!(result.final_damage <= amount.floor());
        prop_assert!((result.final_damage + result.reduced - amount).abs() < 1e-6);
    }

    #[test]
    fn prop_pure_damage_ignores_base(amount in 0.0f64..1000.0, base in 0.0f64..90.0) {
        let pure = mitigate(amount, DamageType::Pure, base, 0.0);
        prop_assert!((pure.final_damage - amount.floor()).abs() < f64::EPSILON);
    }

    #[test]
    fn prop_passive_dc_in_range(
        atk in -50.0f64..500.0,
        def in -50.0f64..500.0,
        manual in -300.0f64..300.0,
        prone in any::<bool>(),
        invisible in any::<bool>(),
    ) {
        let rules = RulesConfig::default();
        let mut attacker = Entity::new("a", "A").with_sub(Attribute::Agility, atk);
        attacker.combat.conditions.prone = prone;
        let mut defender = Entity::new("d", "D").with_sub(Attribute::Agility, def);
        defender.combat.conditions.invisible = invisible;
        let (a, d) = (recompute(&attacker, &rules), recompute(&defender, &rules));
        let matchup = Matchup {
            attacker: &attacker,
            attacker_stats: &a,
            defender: &defender,
            defender_stats: &d,
        };
        let dc = passive_dc(&matchup, None, manual, &rules).unwrap_or(-1);
        prop_assert!((0..=100).contains(&dc));
    }

    #[test]
    fn prop_regen_never_negative(rate in -20.0f64..50.0, minutes in 0.0f64..600.0) {
        let rules = RulesConfig::default();
        let amount = regen_amount(rate, minutes, &rules);
        prop_assert!(amount >= 0.0);
        if rate > 0.0 && minutes >= 1.0 {
            prop_assert!(amount >= 1.0);
        }
    }

    #[test]
    fn prop_hp_stays_in_bounds(max in 0.0f64..500.0, value in -1000.0f64..1000.0) {
        let mut entity = Entity::new("e", "E");
        entity.apply_delta(&EntityDelta::new().with(paths::HP_MAX, max).with(paths::HP, value));
        prop_assert!(entity.resources.hp.value >= 0.0);
        prop_assert!(entity.resources.hp.value <= entity.resources.hp.max);
    }

    #[test]
    fn prop_formula_total_matches_terms(count in 1u32..6, sides in 1u32..20, flat in -10i64..10, seed in any::<u64>()) {
        let mut formula = DiceFormula::dice(count, sides);
        formula.push_flat(flat);
        let mut roller = RngRoller::new(ChaCha8Rng::seed_from_u64(seed));
        let roll = formula.roll(&mut roller);
        prop_assert_eq!(roll.total, roll.terms.iter().sum::<i64>());
        prop_assert_eq!(roll.faces.len(), count as usize);
        prop_assert!(roll.faces.iter().all(|&face| face >= 1 && face <= sides));
    }

    #[test]
    fn prop_linking_is_idempotent(rings in 0usize..14, helmets in 0usize..3) {
        let mut items: Vec<Item> = (0..rings)
            .map(|i| armor(&format!("ring{}", i), ArmorSlot::Ring))
            .collect();
        items.extend((0..helmets).map(|i| armor(&format!("helm{}", i), ArmorSlot::Head)));
        items.push(Item::new("sword", "Sword", ItemKind::Weapon(WeaponData::default())).equipped());
        let limits = EquipmentLimits {
            ring_slots: 10,
            essence_slots: 1,
            contract_slots: 1,
        };
        let first = link_equipment(&items, &limits);
        let second = link_equipment(&items, &limits);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.slots.rings.len() <= 10);
    }
}
