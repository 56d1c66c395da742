//! Attack resolution pipeline
//!
//! A single-target attack moves through
//! `Idle -> PoolComputed -> DifficultyComputed -> Rolled -> Resolved`.
//! Each step consumes the request and returns the next state, so a step
//! cannot be skipped or repeated.
//!
//! ```ignore
//! let outcome = AttackRequest::new(attacker, &sword_id, &[defender], ctx, &rules)?
//!     .compute_pool()
//!     .compute_difficulty(DefenseMode::Passive)?
//!     .roll(&mut roller)
//!     .resolve();
//! ```

use super::pool::{spell_pool, weapon_pool};
use super::result::{AttackOutcome, DefenseMode, RollOutcome, Verdict};
use crate::config::RulesConfig;
use crate::defense::{passive_dc, range_penalty, target_ku, Matchup, RangeBand};
use crate::dice::{CritRange, DiceRoller};
use crate::entity::Entity;
use crate::error::{EngineError, EngineResult};
use crate::item::{AttackType, Item, ItemKind, SpellData, SpellRoll, WeaponData};
use crate::stats::{dice_pool, derive::CRIT_LOW, DerivedSnapshot};
use crate::types::{Cover, ItemId};

/// An entity with its current derived stats
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub entity: &'a Entity,
    pub stats: &'a DerivedSnapshot,
}

impl<'a> Combatant<'a> {
    pub fn new(entity: &'a Entity, stats: &'a DerivedSnapshot) -> Self {
        Combatant { entity, stats }
    }

    fn crit(&self) -> CritRange {
        CritRange {
            high: self.stats.crit_threshold,
            low: CRIT_LOW,
        }
    }
}

/// Situational inputs of one attack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackContext {
    /// Distance to the target in meters
    pub distance: f64,
    /// Throw a throwable melee weapon
    pub thrown: bool,
    /// Extra pool dice
    pub mod_pool: i32,
    /// Added to the passive DC
    pub dc_modifier: f64,
    /// Added to the target KU
    pub ku_modifier: i32,
}

#[derive(Debug, Clone, Copy)]
enum AttackSource<'a> {
    Weapon(&'a WeaponData),
    Spell(&'a SpellData),
}

impl AttackSource<'_> {
    fn is_area(&self) -> bool {
        matches!(self, AttackSource::Spell(spell) if spell.area)
    }

    /// Ranged and thrown weapon attacks are range checked
    fn range_band(&self, ctx: &AttackContext, vision: f64) -> Option<RangeBand> {
        match self {
            AttackSource::Weapon(weapon)
                if ctx.thrown || weapon.attack_type != AttackType::Melee =>
            {
                Some(RangeBand::for_weapon(weapon, ctx.distance, vision))
            }
            _ => None,
        }
    }
}

/// Targets validated, nothing computed yet
#[derive(Debug, Clone, Copy)]
pub struct Idle;

#[derive(Debug, Clone, Copy)]
pub struct PoolComputed {
    pool: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DifficultyComputed {
    pool: u32,
    mode: DefenseMode,
    dc: i32,
    ku: i32,
    cover_ku: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Rolled {
    difficulty: DifficultyComputed,
    attack: RollOutcome,
    defense: Option<RollOutcome>,
}

/// A single-target attack in state `S`
#[derive(Debug, Clone)]
pub struct AttackRequest<'a, S> {
    attacker: Combatant<'a>,
    defender: Combatant<'a>,
    item: &'a Item,
    source: AttackSource<'a>,
    ctx: AttackContext,
    rules: &'a RulesConfig,
    state: S,
}

impl<'a, S> AttackRequest<'a, S> {
    fn advance<T>(self, state: T) -> AttackRequest<'a, T> {
        AttackRequest {
            attacker: self.attacker,
            defender: self.defender,
            item: self.item,
            source: self.source,
            ctx: self.ctx,
            rules: self.rules,
            state,
        }
    }

    pub fn attacker(&self) -> &Entity {
        self.attacker.entity
    }

    pub fn defender(&self) -> &Entity {
        self.defender.entity
    }
}

impl<'a> AttackRequest<'a, Idle> {
    /// Validate the attack before anything is computed
    ///
    /// Fails with `NoTarget` or `TooManyTargets` unless exactly one target is
    /// given, and with `ItemNotFound`, `NotAWeapon` or `NotASpell` unless the
    /// item is a weapon or an attack spell owned by the attacker.
    pub fn new(
        attacker: Combatant<'a>,
        item_id: &ItemId,
        targets: &[Combatant<'a>],
        ctx: AttackContext,
        rules: &'a RulesConfig,
    ) -> EngineResult<Self> {
        let defender = match targets {
            [] => return Err(EngineError::NoTarget),
            [single] => *single,
            many => return Err(EngineError::TooManyTargets(many.len())),
        };

        let item = attacker
            .entity
            .item(item_id)
            .ok_or_else(|| EngineError::ItemNotFound(item_id.clone()))?;
        let source = match &item.kind {
            ItemKind::Weapon(weapon) => AttackSource::Weapon(weapon),
            ItemKind::Spell(spell) if spell.roll == SpellRoll::Attack => AttackSource::Spell(spell),
            ItemKind::Spell(_) => return Err(EngineError::NotASpell(item_id.clone())),
            _ => return Err(EngineError::NotAWeapon(item_id.clone())),
        };

        tracing::debug!(
            attacker = %attacker.entity.id,
            defender = %defender.entity.id,
            item = %item.id,
            "attack declared"
        );

        Ok(AttackRequest {
            attacker,
            defender,
            item,
            source,
            ctx,
            rules,
            state: Idle,
        })
    }

    pub fn compute_pool(self) -> AttackRequest<'a, PoolComputed> {
        let attacker = self.attacker;
        let pool = match self.source {
            AttackSource::Weapon(weapon) => {
                let base = weapon_pool(
                    attacker.stats,
                    &attacker.entity.proficiencies,
                    weapon,
                    self.ctx.thrown,
                );
                (base as i32 + self.ctx.mod_pool).max(1) as u32
            }
            AttackSource::Spell(spell) => {
                spell_pool(attacker.stats, spell.attack_attribute, self.ctx.mod_pool)
            }
        };
        self.advance(PoolComputed { pool })
    }
}

impl<'a> AttackRequest<'a, PoolComputed> {
    pub fn pool(&self) -> u32 {
        self.state.pool
    }

    /// Work out DC and thresholds for `mode`
    ///
    /// Ranged and thrown attacks beyond max range fail with `OutOfRange` in
    /// every mode.
    pub fn compute_difficulty(
        self,
        mode: DefenseMode,
    ) -> EngineResult<AttackRequest<'a, DifficultyComputed>> {
        let rules = self.rules;
        let band = self
            .source
            .range_band(&self.ctx, self.attacker.stats.effective.vision);

        let ku = target_ku(
            self.defender.entity,
            self.defender.stats,
            self.ctx.ku_modifier,
            rules,
        );
        let matchup = Matchup {
            attacker: self.attacker.entity,
            attacker_stats: self.attacker.stats,
            defender: self.defender.entity,
            defender_stats: self.defender.stats,
        };

        let (dc, cover_ku) = match mode {
            DefenseMode::Passive => {
                let dc = passive_dc(&matchup, band.as_ref(), self.ctx.dc_modifier, rules)?;
                (dc, None)
            }
            DefenseMode::Opposed | DefenseMode::FullCover => {
                if let Some(band) = &band {
                    range_penalty(band, rules)?;
                }
                let cover_ku = (mode == DefenseMode::FullCover)
                    .then(|| self.defender.entity.combat.cover_ku.max(0));
                (rules.defense.base_dc, cover_ku)
            }
        };

        tracing::debug!(pool = self.state.pool, ?mode, dc, ku, ?cover_ku, "attack difficulty");
        let pool = self.state.pool;
        Ok(self.advance(DifficultyComputed {
            pool,
            mode,
            dc,
            ku,
            cover_ku,
        }))
    }
}

impl<'a> AttackRequest<'a, DifficultyComputed> {
    pub fn dc(&self) -> i32 {
        self.state.dc
    }

    pub fn target_ku(&self) -> i32 {
        self.state.ku
    }

    /// Roll the attacker's pool, and the defender's in opposed mode
    pub fn roll(self, roller: &mut impl DiceRoller) -> AttackRequest<'a, Rolled> {
        let difficulty = self.state;
        let faces = roller.roll_pool(difficulty.pool);
        let attack = RollOutcome::count(faces, difficulty.dc, self.attacker.crit());

        let defense = (difficulty.mode == DefenseMode::Opposed).then(|| {
            let pool = dice_pool(self.defender.stats.effective.agility);
            let faces = roller.roll_pool(pool);
            RollOutcome::count(faces, self.rules.defense.base_dc, self.defender.crit())
        });

        self.advance(Rolled {
            difficulty,
            attack,
            defense,
        })
    }
}

impl<'a> AttackRequest<'a, Rolled> {
    pub fn attack_roll(&self) -> &RollOutcome {
        &self.state.attack
    }

    /// Compare successes with the thresholds of the chosen mode
    pub fn resolve(self) -> AttackOutcome {
        let defense = &self.rules.defense;
        let Rolled {
            difficulty,
            attack,
            defense: defense_roll,
        } = self.state;
        let successes = attack.successes;
        let ku = difficulty.ku;
        let area = self.source.is_area();
        let graze = |remaining: i32| area && ku - remaining <= defense.area_graze_margin;
        let deplete = |remaining: i32| {
            if remaining > 0 {
                (f64::from(remaining) / defense.depletion_divisor).ceil().max(1.0) as i32
            } else {
                0
            }
        };

        let mut resolved = Resolution::default();
        match difficulty.mode {
            DefenseMode::Passive => {
                resolved.net = successes;
                let cover = &self.defender.entity.combat;
                if successes >= ku {
                    resolved.land(Verdict::Hit, successes, 1.0);
                } else if cover.cover == Cover::Full
                    && successes > 0
                    && successes >= cover.cover_ku
                {
                    resolved.verdict = Verdict::PartialHit;
                    resolved.cover_hit = true;
                    resolved.cover_successes = successes;
                } else if graze(successes) {
                    resolved.land(Verdict::PartialHit, successes.max(0), 0.5);
                }
                if !resolved.cover_hit {
                    resolved.depletion = deplete(successes);
                }
            }
            DefenseMode::Opposed => {
                let defended = defense_roll.as_ref().map_or(0, |d| d.successes);
                resolved.net = (successes - defended).max(0);
                if successes > defended {
                    resolved.land(Verdict::Hit, resolved.net, 1.0);
                } else {
                    resolved.verdict = Verdict::FullBlock;
                }
            }
            DefenseMode::FullCover => {
                let cover_ku = difficulty.cover_ku.unwrap_or(0);
                let remaining = successes - cover_ku;
                resolved.net = remaining;
                resolved.cover_successes = successes.min(cover_ku).max(0);
                resolved.cover_hit = resolved.cover_successes > 0;
                if successes < cover_ku {
                    resolved.verdict = Verdict::FullBlock;
                } else if remaining >= ku {
                    resolved.land(Verdict::Hit, remaining, 1.0);
                } else if graze(remaining) {
                    resolved.land(Verdict::PartialHit, remaining.max(0), 0.5);
                } else {
                    resolved.verdict = Verdict::PartialHit;
                }
                resolved.depletion = deplete(remaining);
            }
        }

        let outcome = AttackOutcome {
            attacker_id: self.attacker.entity.id.clone(),
            defender_id: self.defender.entity.id.clone(),
            item_id: self.item.id.clone(),
            mode: difficulty.mode,
            verdict: resolved.verdict,
            hit: resolved.verdict == Verdict::Hit,
            pool: difficulty.pool,
            crit_threshold: self.attacker.stats.crit_threshold,
            dc: difficulty.dc,
            target_ku: ku,
            cover_ku: difficulty.cover_ku,
            attack,
            defense: defense_roll,
            net_successes: resolved.net,
            damage_successes: resolved.damage_successes,
            cover_damage_successes: resolved.cover_successes,
            cover_hit: resolved.cover_hit,
            depletion: resolved.depletion,
            damage_multiplier: resolved.multiplier,
        };

        tracing::info!(
            attacker = %outcome.attacker_id,
            defender = %outcome.defender_id,
            verdict = ?outcome.verdict,
            successes = outcome.attack.successes,
            ku = outcome.target_ku,
            depletion = outcome.depletion,
            "attack resolved"
        );
        outcome
    }
}

struct Resolution {
    verdict: Verdict,
    net: i32,
    damage_successes: i32,
    cover_successes: i32,
    cover_hit: bool,
    depletion: i32,
    multiplier: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            verdict: Verdict::Miss,
            net: 0,
            damage_successes: 0,
            cover_successes: 0,
            cover_hit: false,
            depletion: 0,
            multiplier: 0.0,
        }
    }
}

impl Resolution {
    fn land(&mut self, verdict: Verdict, damage_successes: i32, multiplier: f64) {
        self.verdict = verdict;
        self.damage_successes = damage_successes;
        self.multiplier = multiplier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRoller;
    use crate::item::ArmorData;
    use crate::stats::recompute;
    use crate::types::Attribute;

    struct Fixture {
        attacker: Entity,
        defender: Entity,
        rules: RulesConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let sword = Item::new("sword", "Sword", ItemKind::Weapon(WeaponData::default()));
            let bow = Item::new(
                "bow",
                "Longbow",
                ItemKind::Weapon(WeaponData {
                    attack_type: AttackType::Ranged,
                    scaling: Attribute::Agility,
                    range: 10.0,
                    max_range: Some(30.0),
                    ..WeaponData::default()
                }),
            );
            let firebolt = Item::new(
                "firebolt",
                "Firebolt",
                ItemKind::Spell(SpellData {
                    roll: SpellRoll::Attack,
                    attack_attribute: Attribute::Cognition,
                    area: true,
                    ..SpellData::default()
                }),
            );
            let ward = Item::new("ward", "Ward", ItemKind::Spell(SpellData::default()));
            let attacker = Entity::new("a", "Attacker")
                .with_sub(Attribute::Strength, 39.0)
                .with_sub(Attribute::Agility, 26.0)
                .with_sub(Attribute::Cognition, 52.0)
                .with_item(sword)
                .with_item(bow)
                .with_item(firebolt)
                .with_item(ward)
                .with_item(Item::new("rock", "Rock", ItemKind::Loot));
            // bone 50 gives KU 4
            let defender = Entity::new("d", "Defender")
                .with_sub(Attribute::Agility, 26.0)
                .with_sub(Attribute::BoneDensity, 50.0);
            Fixture {
                attacker,
                defender,
                rules: RulesConfig::default(),
            }
        }

        fn attack(
            &self,
            item: &str,
            mode: DefenseMode,
            ctx: AttackContext,
            faces: &[u32],
        ) -> EngineResult<AttackOutcome> {
            let a = recompute(&self.attacker, &self.rules);
            let d = recompute(&self.defender, &self.rules);
            let attacker = Combatant::new(&self.attacker, &a);
            let defender = Combatant::new(&self.defender, &d);
            let mut roller = FixedRoller::new(faces.to_vec());
            Ok(
                AttackRequest::new(attacker, &ItemId::from(item), &[defender], ctx, &self.rules)?
                    .compute_pool()
                    .compute_difficulty(mode)?
                    .roll(&mut roller)
                    .resolve(),
            )
        }
    }

    #[test]
    fn test_preconditions() {
        let fx = Fixture::new();
        let rules = &fx.rules;
        let a = recompute(&fx.attacker, rules);
        let d = recompute(&fx.defender, rules);
        let attacker = Combatant::new(&fx.attacker, &a);
        let defender = Combatant::new(&fx.defender, &d);
        let ctx = AttackContext::default;

        let err = AttackRequest::new(attacker, &"sword".into(), &[], ctx(), rules).unwrap_err();
        assert_eq!(err, EngineError::NoTarget);
        let err = AttackRequest::new(attacker, &"sword".into(), &[defender, defender], ctx(), rules)
            .unwrap_err();
        assert_eq!(err, EngineError::TooManyTargets(2));
        let err = AttackRequest::new(attacker, &"axe".into(), &[defender], ctx(), rules).unwrap_err();
        assert_eq!(err, EngineError::ItemNotFound("axe".into()));
        let err = AttackRequest::new(attacker, &"rock".into(), &[defender], ctx(), rules).unwrap_err();
        assert_eq!(err, EngineError::NotAWeapon("rock".into()));
        let err = AttackRequest::new(attacker, &"ward".into(), &[defender], ctx(), rules).unwrap_err();
        assert_eq!(err, EngineError::NotASpell("ward".into()));
    }

    #[test]
    fn test_passive_hit() {
        let fx = Fixture::new();
        // pool 3 at DC 50: crit + 1 + 1 = 5 vs KU 4
        let outcome = fx
            .attack("sword", DefenseMode::Passive, AttackContext::default(), &[96, 60, 51])
            .unwrap();
        assert_eq!(outcome.pool, 3);
        assert_eq!(outcome.dc, 50);
        assert_eq!(outcome.target_ku, 4);
        assert_eq!(outcome.verdict, Verdict::Hit);
        assert!(outcome.hit);
        assert_eq!(outcome.damage_successes, 5);
        assert_eq!(outcome.depletion, 2);
        assert!((outcome.damage_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_passive_miss_still_depletes() {
        let fx = Fixture::new();
        let outcome = fx
            .attack("sword", DefenseMode::Passive, AttackContext::default(), &[60, 20, 20])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Miss);
        assert_eq!(outcome.damage_successes, 0);
        assert_eq!(outcome.depletion, 1);
        assert!(!outcome.deals_damage());

        let outcome = fx
            .attack("sword", DefenseMode::Passive, AttackContext::default(), &[2, 20, 20])
            .unwrap();
        assert_eq!(outcome.attack.successes, -1);
        assert_eq!(outcome.depletion, 0);
    }

    #[test]
    fn test_passive_cover_absorbs_miss() {
        let mut fx = Fixture::new();
        fx.defender.combat.cover = Cover::Full;
        fx.defender.combat.cover_ku = 2;
        let outcome = fx
            .attack("sword", DefenseMode::Passive, AttackContext::default(), &[60, 60, 20])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::PartialHit);
        assert!(outcome.cover_hit);
        assert_eq!(outcome.cover_damage_successes, 2);
        assert_eq!(outcome.depletion, 0);
        assert!(!outcome.deals_damage());
    }

    #[test]
    fn test_opposed_ties_favor_defender() {
        let fx = Fixture::new();
        // attacker pool 3, defender pool 2
        let outcome = fx
            .attack("sword", DefenseMode::Opposed, AttackContext::default(), &[60, 60, 20, 70, 70])
            .unwrap();
        assert_eq!(outcome.defense.as_ref().map(|d| d.successes), Some(2));
        assert_eq!(outcome.verdict, Verdict::FullBlock);
        assert_eq!(outcome.depletion, 0);

        let outcome = fx
            .attack("sword", DefenseMode::Opposed, AttackContext::default(), &[60, 60, 60, 70, 20])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Hit);
        assert_eq!(outcome.net_successes, 2);
        assert_eq!(outcome.damage_successes, 2);
    }

    #[test]
    fn test_full_cover_must_break_first() {
        let mut fx = Fixture::new();
        fx.defender.combat.cover = Cover::Full;
        fx.defender.combat.cover_ku = 3;

        let outcome = fx
            .attack("sword", DefenseMode::FullCover, AttackContext::default(), &[60, 60, 20])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::FullBlock);
        assert_eq!(outcome.cover_ku, Some(3));
        assert_eq!(outcome.cover_damage_successes, 2);

        // 9 successes: 3 break the cover, 6 remain against KU 4
        let outcome = fx
            .attack("sword", DefenseMode::FullCover, AttackContext::default(), &[96, 96, 96])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Hit);
        assert_eq!(outcome.net_successes, 6);
        assert_eq!(outcome.damage_successes, 6);
        assert_eq!(outcome.depletion, 2);

        // 5 successes: cover breaks, 2 remain short of KU 4
        let outcome = fx
            .attack("sword", DefenseMode::FullCover, AttackContext::default(), &[96, 60, 60])
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::PartialHit);
        assert!(!outcome.deals_damage());
        assert_eq!(outcome.depletion, 1);
    }

    #[test]
    fn test_area_spell_grazes() {
        let fx = Fixture::new();
        // pool 4 from cognition 52, 2 successes vs KU 4
        let outcome = fx
            .attack("firebolt", DefenseMode::Passive, AttackContext::default(), &[60, 60, 20, 20])
            .unwrap();
        assert_eq!(outcome.pool, 4);
        assert_eq!(outcome.verdict, Verdict::PartialHit);
        assert!(!outcome.cover_hit);
        assert!((outcome.damage_multiplier - 0.5).abs() < f64::EPSILON);
        assert_eq!(outcome.damage_successes, 2);
    }

    #[test]
    fn test_ranged_out_of_range() {
        let fx = Fixture::new();
        let ctx = AttackContext {
            distance: 80.0,
            ..AttackContext::default()
        };
        let err = fx
            .attack("bow", DefenseMode::Passive, ctx.clone(), &[50])
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::OutOfRange {
                distance: 80.0,
                max: 60.0
            }
        );
        assert!(fx.attack("bow", DefenseMode::Opposed, ctx, &[50]).is_err());
    }

    #[test]
    fn test_ranged_steps_raise_dc() {
        let fx = Fixture::new();
        let ctx = AttackContext {
            distance: 45.0,
            ..AttackContext::default()
        };
        // effective 10 cells = 20 m, floor(45 / 20) = 2 steps
        let outcome = fx
            .attack("bow", DefenseMode::Passive, ctx, &[75, 60])
            .unwrap();
        assert_eq!(outcome.dc, 70);
        assert_eq!(outcome.attack.successes, 1);
    }

    #[test]
    fn test_mod_pool_and_ku_modifier() {
        let fx = Fixture::new();
        let ctx = AttackContext {
            mod_pool: 2,
            ku_modifier: -1,
            ..AttackContext::default()
        };
        let outcome = fx
            .attack("sword", DefenseMode::Passive, ctx, &[60, 60, 60, 20, 20])
            .unwrap();
        assert_eq!(outcome.pool, 5);
        assert_eq!(outcome.target_ku, 3);
        assert_eq!(outcome.verdict, Verdict::Hit);
    }

    #[test]
    fn test_armor_raises_ku() {
        let mut fx = Fixture::new();
        fx.defender.items.push(
            Item::new(
                "plate",
                "Plate",
                ItemKind::Armor(ArmorData {
                    armor_value: 3,
                    ..ArmorData::default()
                }),
            )
            .equipped(),
        );
        let outcome = fx
            .attack("sword", DefenseMode::Passive, AttackContext::default(), &[96, 60, 51])
            .unwrap();
        assert_eq!(outcome.target_ku, 7);
        assert_eq!(outcome.verdict, Verdict::Miss);
    }
}
