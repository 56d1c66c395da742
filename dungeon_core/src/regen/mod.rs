//! Regeneration over elapsed time
//!
//! Every pool heals `floor(rate * minutes * 0.5)`, at least 1 once a full
//! minute has passed with a positive rate. Resting long enough also clears
//! essence and contract cooldowns.

use crate::config::RulesConfig;
use crate::entity::{paths, Entity, EntityDelta, ItemUpdate, Resource};
use crate::error::{EngineError, EngineResult};
use crate::item::ItemKind;
use crate::stats::DerivedSnapshot;
use crate::types::num;
use serde::{Deserialize, Serialize};

/// Amount one pool regenerates over `minutes`
pub fn regen_amount(rate: f64, minutes: f64, rules: &RulesConfig) -> f64 {
    let (rate, minutes) = (num(rate), num(minutes));
    let amount = (rate * minutes * rules.regen.rate_per_minute).floor();
    if rate > 0.0 && minutes >= 1.0 {
        amount.max(1.0)
    } else {
        amount.max(0.0)
    }
}

/// Whether a rest of `minutes` clears ability cooldowns
pub fn resets_cooldowns(minutes: f64, rules: &RulesConfig) -> bool {
    num(minutes) >= rules.regen.cooldown_reset_minutes
}

/// Time that passed, in any unit the table uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum ElapsedTime {
    Seconds(f64),
    Rounds(u32),
    Minutes(f64),
    Hours(f64),
}

impl ElapsedTime {
    pub fn minutes(&self, rules: &RulesConfig) -> f64 {
        let minutes = match *self {
            ElapsedTime::Seconds(s) => num(s) / 60.0,
            ElapsedTime::Rounds(r) => f64::from(r) * rules.regen.seconds_per_round / 60.0,
            ElapsedTime::Minutes(m) => num(m),
            ElapsedTime::Hours(h) => num(h) * 60.0,
        };
        minutes.max(0.0)
    }
}

/// Per-minute rates of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegenRates {
    pub hp: f64,
    /// Refills grace instead of mana for divine casters
    pub mana: f64,
    pub dp: f64,
}

impl RegenRates {
    pub fn of(stats: &DerivedSnapshot) -> Self {
        let sub = &stats.effective;
        let mana = if stats.is_divine() {
            sub.spirit_recovery * 0.5 + sub.divine_power
        } else {
            sub.spirit_recovery
        };
        RegenRates {
            hp: num(sub.natural_regeneration),
            mana: num(mana),
            dp: num(sub.dragon_power),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestOutcome {
    pub minutes: f64,
    pub hp_restored: f64,
    pub mana_restored: f64,
    pub gp_restored: f64,
    pub dp_restored: f64,
    pub cooldowns_reset: bool,
    pub delta: EntityDelta,
}

impl RestOutcome {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("Rested {} min", self.minutes)];
        let pools = [
            ("HP", self.hp_restored),
            ("mana", self.mana_restored),
            ("grace", self.gp_restored),
            ("DP", self.dp_restored),
        ];
        for (name, amount) in pools {
            if amount > 0.0 {
                parts.push(format!("+{} {}", amount, name));
            }
        }
        if self.cooldowns_reset {
            parts.push("cooldowns reset".to_string());
        }
        parts.join(", ")
    }
}

/// Restore `pool` by up to `amount`, capped at `max`
fn heal(delta: &mut EntityDelta, path: &str, pool: &Resource, max: f64, amount: f64) -> f64 {
    let restored = amount.min((max - pool.value).max(0.0));
    if restored > 0.0 {
        delta.set(path, pool.value + restored);
    }
    restored
}

/// Regenerate `entity` over `elapsed`
///
/// Fails with `NoRegeneration` when neither health nor mana recover at all.
pub fn rest(
    entity: &Entity,
    stats: &DerivedSnapshot,
    elapsed: ElapsedTime,
    rules: &RulesConfig,
) -> EngineResult<RestOutcome> {
    let rates = RegenRates::of(stats);
    if rates.hp <= 0.0 && rates.mana <= 0.0 {
        return Err(EngineError::NoRegeneration);
    }

    let minutes = elapsed.minutes(rules);
    let res = &entity.resources;
    let mut delta = EntityDelta::new();

    let hp_restored = heal(
        &mut delta,
        paths::HP,
        &res.hp,
        stats.hp_max,
        regen_amount(rates.hp, minutes, rules),
    );
    let spirit = regen_amount(rates.mana, minutes, rules);
    let (mana_restored, gp_restored) = if stats.is_divine() {
        (0.0, heal(&mut delta, paths::GP, &res.gp, stats.gp_max, spirit))
    } else {
        (heal(&mut delta, paths::MANA, &res.mana, stats.mana_max, spirit), 0.0)
    };
    let dp_restored = heal(
        &mut delta,
        paths::DP,
        &res.dp,
        stats.dp_max,
        regen_amount(rates.dp, minutes, rules),
    );

    let cooldowns_reset = resets_cooldowns(minutes, rules);
    if cooldowns_reset {
        for item in &entity.items {
            let on_cooldown = match &item.kind {
                ItemKind::Essence(essence) => essence.on_cooldown,
                ItemKind::Contract(contract) => contract.on_cooldown,
                _ => false,
            };
            if on_cooldown {
                delta.push_item(ItemUpdate::new(item.id.clone()).cooldown(false));
            }
        }
    }

    tracing::info!(
        entity = %entity.id,
        minutes,
        hp_restored,
        mana_restored,
        gp_restored,
        dp_restored,
        cooldowns_reset,
        "rest"
    );
    Ok(RestOutcome {
        minutes,
        hp_restored,
        mana_restored,
        gp_restored,
        dp_restored,
        cooldowns_reset,
        delta,
    })
}
