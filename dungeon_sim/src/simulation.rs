//! Two-fighter duel loop
//!
//! Initiative is rolled once. Each turn the attacker clears its own defense
//! penalty, attacks with its chosen weapon, and the hit is mitigated and
//! applied to the defender. The duel ends at the first knockout or after
//! `max_rounds`.

use dungeon_core::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterSetup {
    pub entity: Entity,
    pub weapon: ItemId,
    /// How this fighter defends when attacked
    #[serde(default)]
    pub defense: DefenseMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelSetup {
    pub fighters: [FighterSetup; 2],
    /// Meters between the fighters
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundEvent {
    pub round: u32,
    pub attacker: EntityId,
    pub defender: EntityId,
    pub verdict: Verdict,
    pub summary: String,
    pub damage: f64,
    pub defender_hp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuelReport {
    /// `None` when both fighters stood after the last round
    pub winner: Option<EntityId>,
    pub rounds: u32,
    pub events: Vec<RoundEvent>,
}

impl DuelReport {
    pub fn render_text(&self) -> String {
        let mut lines: Vec<String> = self
            .events
            .iter()
            .map(|e| {
                format!(
                    "[round {}] {} -> {}: {} ({} damage, {} HP left)",
                    e.round, e.attacker, e.defender, e.summary, e.damage, e.defender_hp
                )
            })
            .collect();
        lines.push(match &self.winner {
            Some(winner) => format!("{} wins after {} rounds", winner, self.rounds),
            None => format!("Draw after {} rounds", self.rounds),
        });
        lines.join("\n")
    }
}

/// Run a duel to the first knockout
pub fn run_duel(
    setup: DuelSetup,
    rules: &RulesConfig,
    roller: &mut impl DiceRoller,
    max_rounds: u32,
) -> EngineResult<DuelReport> {
    let DuelSetup {
        mut fighters,
        distance,
    } = setup;

    let mut order = [0usize, 1];
    let initiative: Vec<f64> = fighters
        .iter()
        .map(|f| {
            let stats = recompute(&f.entity, rules);
            roll_initiative(stats.effective.agility, roller, rules).total
        })
        .collect();
    if initiative[1] > initiative[0] {
        order.swap(0, 1);
    }
    tracing::info!(
        first = %fighters[order[0]].entity.id,
        second = %fighters[order[1]].entity.id,
        "initiative rolled"
    );

    let mut events = Vec::new();
    let mut rounds = 0;
    'duel: for round in 1..=max_rounds {
        rounds = round;
        for &attacker_idx in &order {
            let defender_idx = 1 - attacker_idx;
            let event = take_turn(
                &mut fighters,
                attacker_idx,
                defender_idx,
                round,
                distance,
                rules,
                roller,
            )?;
            let knocked_out = event.defender_hp <= 0.0;
            events.push(event);
            if knocked_out {
                break 'duel;
            }
        }
    }

    let winner = fighters
        .iter()
        .position(|f| f.entity.resources.hp.value <= 0.0)
        .map(|loser| fighters[1 - loser].entity.id.clone());
    tracing::info!(winner = ?winner, rounds, "duel finished");
    Ok(DuelReport {
        winner,
        rounds,
        events,
    })
}

fn take_turn(
    fighters: &mut [FighterSetup; 2],
    attacker_idx: usize,
    defender_idx: usize,
    round: u32,
    distance: f64,
    rules: &RulesConfig,
    roller: &mut impl DiceRoller,
) -> EngineResult<RoundEvent> {
    let reset = fighters[attacker_idx].entity.reset_defense_penalty();
    fighters[attacker_idx].entity.apply_delta(&reset);

    let (attacker, defender) = (&fighters[attacker_idx], &fighters[defender_idx]);
    let attacker_stats = recompute(&attacker.entity, rules);
    let defender_stats = recompute(&defender.entity, rules);
    let ctx = AttackContext {
        distance,
        ..AttackContext::default()
    };

    let outcome = AttackRequest::new(
        Combatant::new(&attacker.entity, &attacker_stats),
        &attacker.weapon,
        &[Combatant::new(&defender.entity, &defender_stats)],
        ctx,
        rules,
    )?
    .compute_pool()
    .compute_difficulty(defender.defense)?
    .roll(roller)
    .resolve();

    let item = attacker
        .entity
        .item(&attacker.weapon)
        .ok_or_else(|| EngineError::ItemNotFound(attacker.weapon.clone()))?;
    let hit = roll_attack_damage(&attacker_stats, item, &outcome, roller)
        .map(|damage| apply_damage(&defender.entity, damage.amount, damage.damage_type, rules));

    let defender = &mut fighters[defender_idx].entity;
    let damage = match &hit {
        Some(hit) => {
            defender.apply_delta(&hit.delta);
            hit.mitigation.final_damage
        }
        None => 0.0,
    };
    let depletion = outcome.defender_delta(defender);
    defender.apply_delta(&depletion);

    Ok(RoundEvent {
        round,
        attacker: outcome.attacker_id.clone(),
        defender: outcome.defender_id.clone(),
        verdict: outcome.verdict,
        summary: outcome.summary(),
        damage,
        defender_hp: defender.resources.hp.value,
    })
}
