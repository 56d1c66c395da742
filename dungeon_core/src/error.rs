//! Rejected operations
//!
//! Every variant is a precondition failure: the operation did not run and no
//! state was changed. Bad numeric data never surfaces here; it is repaired
//! where it is read.

use crate::dice::FormulaError;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// A resource an operation can spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Hp,
    Mana,
    DragonPower,
    Grace,
    Actions,
    Reactions,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Hp => "HP",
            ResourceKind::Mana => "mana",
            ResourceKind::DragonPower => "DP",
            ResourceKind::Grace => "GP",
            ResourceKind::Actions => "actions",
            ResourceKind::Reactions => "reactions",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("no target selected")]
    NoTarget,
    #[error("single-target attack needs exactly one target, got {0}")]
    TooManyTargets(usize),
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("item {0} is not a weapon")]
    NotAWeapon(ItemId),
    #[error("item {0} is not an attack spell")]
    NotASpell(ItemId),
    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: ResourceKind,
        required: f64,
        available: f64,
    },
    #[error("target out of range: {distance:.1}m away, max {max:.1}m")]
    OutOfRange { distance: f64, max: f64 },
    #[error("hands are occupied by a two-handed weapon")]
    HandsOccupied,
    #[error("{kind} slots are full ({max})")]
    SlotsFull { kind: &'static str, max: u32 },
    #[error("entity already has a {0}")]
    DuplicateUnique(&'static str),
    #[error("entity has no regeneration")]
    NoRegeneration,
    #[error("item {0} is used up")]
    OutOfStock(ItemId),
    #[error("item {0} cannot be used right now")]
    NotUsable(ItemId),
    #[error("invalid dice formula: {0}")]
    InvalidFormula(#[from] FormulaError),
}
