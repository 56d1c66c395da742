//! Spendable pools and per-encounter combat state

use crate::types::{num, Conditions, Cover};
use serde::{Deserialize, Serialize};

/// A current/maximum pair
///
/// `value` is kept inside `[0, max]` by [`Resource::set_value`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub max: f64,
}

impl Resource {
    pub const fn new(value: f64, max: f64) -> Self {
        Resource { value, max }
    }

    /// Full pool of `max`
    pub const fn full(max: f64) -> Self {
        Resource { value: max, max }
    }

    /// Set the current value, clamped into `[0, max]`
    pub fn set_value(&mut self, value: f64) {
        self.value = num(value).clamp(0.0, self.max.max(0.0));
    }

    /// Set the maximum and pull the current value under it
    pub fn set_max(&mut self, max: f64) {
        self.max = num(max).max(0.0);
        self.set_value(self.value);
    }

    /// Amount missing to full
    pub fn missing(&self) -> f64 {
        (self.max - self.value).max(0.0)
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }
}

/// Fate points are capped at three
pub const MAX_FATE: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default = "default_hp")]
    pub hp: Resource,
    #[serde(default = "default_mana")]
    pub mana: Resource,
    /// Dragon power
    #[serde(default)]
    pub dp: Resource,
    /// Grace of divine casters
    #[serde(default)]
    pub gp: Resource,
    #[serde(default = "default_fate")]
    pub fate: Resource,
    #[serde(default = "default_xp")]
    pub xp: Resource,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub currency: f64,
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            hp: default_hp(),
            mana: default_mana(),
            dp: Resource::default(),
            gp: Resource::default(),
            fate: default_fate(),
            xp: default_xp(),
            level: default_level(),
            currency: 0.0,
        }
    }
}

fn default_hp() -> Resource {
    Resource::full(10.0)
}
fn default_mana() -> Resource {
    Resource::full(10.0)
}
fn default_fate() -> Resource {
    Resource::new(0.0, MAX_FATE)
}
fn default_xp() -> Resource {
    Resource::new(0.0, 6.0)
}
fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    // === Action economy ===
    #[serde(default = "default_actions")]
    pub actions: Resource,
    #[serde(default = "default_reactions")]
    pub reactions: Resource,
    #[serde(default)]
    pub defense_pool: Resource,

    // === Defense ===
    /// Accumulated depletion, cleared at the start of the entity's turn
    #[serde(default)]
    pub defense_penalty: i32,
    #[serde(default)]
    pub shield_raised: bool,
    #[serde(default)]
    pub shield_bonus: i32,
    #[serde(default)]
    pub cover: Cover,
    /// KU of the obstacle when in full cover
    #[serde(default)]
    pub cover_ku: i32,

    // === Manual adjustments ===
    /// Added to the DC of attacks against this entity
    #[serde(default)]
    pub dc_modifier: f64,
    /// Added to this entity's KU
    #[serde(default)]
    pub ku_modifier: i32,

    #[serde(default)]
    pub conditions: Conditions,
}

impl Default for CombatState {
    fn default() -> Self {
        CombatState {
            actions: default_actions(),
            reactions: default_reactions(),
            defense_pool: Resource::default(),
            defense_penalty: 0,
            shield_raised: false,
            shield_bonus: 0,
            cover: Cover::default(),
            cover_ku: 0,
            dc_modifier: 0.0,
            ku_modifier: 0,
            conditions: Conditions::default(),
        }
    }
}

fn default_actions() -> Resource {
    Resource::full(2.0)
}
fn default_reactions() -> Resource {
    Resource::full(1.0)
}
