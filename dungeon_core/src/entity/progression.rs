//! Experience and encounter ranking

use super::{paths, Entity, EntityDelta};
use crate::config::{RulesConfig, MAX_LEVEL};
use crate::stats::DerivedSnapshot;
use crate::types::{num, EntityId};
use serde::{Deserialize, Serialize};

/// Result of granting experience
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelUp {
    pub delta: EntityDelta,
    pub levels_gained: u32,
    pub level: u32,
    /// XP left over after the last level crossed
    pub xp: f64,
}

/// Grant `amount` XP, carrying the surplus over every threshold crossed
///
/// Leveling stops at the configured max level (never beyond 11) or when the
/// table has no threshold for the current level.
pub fn add_experience(entity: &Entity, amount: f64, rules: &RulesConfig) -> LevelUp {
    let amount = num(amount);
    let mut level = entity.resources.level.max(1);
    let mut xp = num(entity.resources.xp.value);
    if amount == 0.0 {
        return LevelUp {
            level,
            xp,
            ..LevelUp::default()
        };
    }

    let progression = &rules.progression;
    let max_level = progression.max_level.min(MAX_LEVEL);
    let start = level;
    xp = (xp + amount).max(0.0);

    while level < max_level {
        let threshold = match progression.threshold(level) {
            Some(t) if t > 0 => t as f64,
            _ => break,
        };
        if xp < threshold {
            break;
        }
        xp -= threshold;
        level += 1;
    }

    let mut delta = EntityDelta::new()
        .with(paths::XP, xp)
        .with(paths::LEVEL, f64::from(level));
    if let Some(threshold) = progression.threshold(level) {
        delta.set(paths::XP_MAX, threshold as f64);
    }

    let levels_gained = level.saturating_sub(start);
    if levels_gained > 0 {
        tracing::info!(entity = %entity.id, level, levels_gained, "level up");
    }

    LevelUp {
        delta,
        levels_gained,
        level,
        xp,
    }
}

/// One row of the encounter threat ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub entity_id: EntityId,
    pub name: String,
    pub threat: f64,
}

/// Rank combatants by threat, highest first; ties keep their input order
pub fn rank_threats(combatants: &[(&Entity, &DerivedSnapshot)]) -> Vec<ThreatEntry> {
    let mut ranking: Vec<ThreatEntry> = combatants
        .iter()
        .map(|(entity, snapshot)| ThreatEntry {
            entity_id: entity.id.clone(),
            name: entity.name.clone(),
            threat: snapshot.threat_level,
        })
        .collect();
    ranking.sort_by(|a, b| b.threat.total_cmp(&a.threat));
    ranking
}
