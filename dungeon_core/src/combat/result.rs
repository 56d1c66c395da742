//! Outcomes of rolls and attacks
//!
//! Plain data for the presentation layer. Nothing here is ever stored on an
//! entity.

use crate::dice::{count_successes, CritRange};
use crate::entity::{paths, Entity, EntityDelta};
use crate::types::{EntityId, ItemId};
use serde::{Deserialize, Serialize};

/// One counted pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub successes: i32,
    pub crit_successes: u32,
    pub crit_fails: u32,
    /// Per-die threshold the pool was counted against
    pub dc: i32,
    pub crit: CritRange,
    pub raw_results: Vec<u32>,
}

impl RollOutcome {
    /// Count `faces` against `dc`
    pub fn count(faces: Vec<u32>, dc: i32, crit: CritRange) -> Self {
        let tally = count_successes(&faces, dc, crit);
        RollOutcome {
            successes: tally.successes,
            crit_successes: tally.crit_successes,
            crit_fails: tally.crit_fails,
            dc,
            crit,
            raw_results: faces,
        }
    }

    pub fn pool(&self) -> usize {
        self.raw_results.len()
    }
}

/// How the defender resists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseMode {
    /// Successes against the defender's KU at a computed DC
    #[default]
    Passive,
    /// Defender rolls an agility pool; the attacker must win strictly
    Opposed,
    /// Successes must first break the cover's KU
    FullCover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Hit,
    /// Cover took the blow, or an area attack grazed
    PartialHit,
    Miss,
    /// Dodged, or the cover held
    FullBlock,
}

/// Resolved attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attacker_id: EntityId,
    pub defender_id: EntityId,
    pub item_id: ItemId,

    // === Verdict ===
    pub mode: DefenseMode,
    pub verdict: Verdict,
    pub hit: bool,

    // === Difficulty ===
    pub pool: u32,
    pub crit_threshold: u32,
    pub dc: i32,
    pub target_ku: i32,
    /// KU of the obstacle in full cover
    pub cover_ku: Option<i32>,

    // === Rolls ===
    pub attack: RollOutcome,
    /// Defender's pool in opposed mode
    pub defense: Option<RollOutcome>,

    // === Effects ===
    /// Successes measured against the target KU
    pub net_successes: i32,
    /// Successes feeding the damage formula; 0 when the target is untouched
    pub damage_successes: i32,
    /// Successes absorbed by cover
    pub cover_damage_successes: i32,
    pub cover_hit: bool,
    /// Added to the defender's defense penalty
    pub depletion: i32,
    /// Scale applied to rolled damage
    pub damage_multiplier: f64,
}

impl AttackOutcome {
    /// Defense-penalty delta for the defender
    ///
    /// Reads the penalty from the defender passed in, so the caller must hand
    /// over the defender as it is when the delta is applied.
    pub fn defender_delta(&self, defender: &Entity) -> EntityDelta {
        if self.depletion <= 0 {
            return EntityDelta::new();
        }
        let penalty = defender.combat.defense_penalty.max(0) + self.depletion;
        EntityDelta::new().with(paths::DEFENSE_PENALTY, f64::from(penalty))
    }

    /// Whether damage should be rolled against the defender
    pub fn deals_damage(&self) -> bool {
        self.damage_multiplier > 0.0
    }

    pub fn summary(&self) -> String {
        let verdict = match self.verdict {
            Verdict::Hit => "Hit",
            Verdict::PartialHit if self.cover_hit => "Cover hit",
            Verdict::PartialHit => "Graze",
            Verdict::Miss => "Miss",
            Verdict::FullBlock => "Blocked",
        };
        let mut parts = vec![format!(
            "{}: {} successes vs KU {} (DC {})",
            verdict, self.attack.successes, self.target_ku, self.dc
        )];
        if let Some(defense) = &self.defense {
            parts.push(format!("defender rolled {}", defense.successes));
        }
        if let Some(cover_ku) = self.cover_ku {
            parts.push(format!("cover KU {}", cover_ku));
        }
        if self.depletion > 0 {
            parts.push(format!("depletion {}", self.depletion));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(depletion: i32) -> AttackOutcome {
        AttackOutcome {
            attacker_id: "a".into(),
            defender_id: "d".into(),
            item_id: "sword".into(),
            mode: DefenseMode::Passive,
            verdict: Verdict::Miss,
            hit: false,
            pool: 2,
            crit_threshold: 95,
            dc: 50,
            target_ku: 3,
            cover_ku: None,
            attack: RollOutcome::count(vec![60, 10], 50, CritRange::default()),
            defense: None,
            net_successes: 1,
            damage_successes: 0,
            cover_damage_successes: 0,
            cover_hit: false,
            depletion,
            damage_multiplier: 0.0,
        }
    }

    #[test]
    fn test_roll_outcome_counts() {
        let roll = RollOutcome::count(vec![97, 50, 3], 50, CritRange::default());
        assert_eq!(roll.successes, 3);
        assert_eq!(roll.crit_successes, 1);
        assert_eq!(roll.crit_fails, 1);
        assert_eq!(roll.pool(), 3);
    }

    #[test]
    fn test_defender_delta_reads_current_penalty() {
        let resolved = outcome(2);
        let mut defender = Entity::new("d", "Defender");
        defender.combat.defense_penalty = 3;
        let delta = resolved.defender_delta(&defender);
        assert_eq!(delta.get(paths::DEFENSE_PENALTY), Some(5.0));

        let fresh = Entity::new("d", "Defender");
        assert_eq!(resolved.defender_delta(&fresh).get(paths::DEFENSE_PENALTY), Some(2.0));
        assert!(outcome(0).defender_delta(&defender).is_empty());
    }

    #[test]
    fn test_summary() {
        let summary = outcome(1).summary();
        assert!(summary.starts_with("Miss: 1 successes vs KU 3"));
        assert!(summary.contains("depletion 1"));
    }
}
