//! Using owned items: drinking consumables, casting, activating essences

use super::{ConsumableData, ItemKind};
use crate::dice::{DiceFormula, DiceRoller, FormulaRoll};
use crate::entity::{paths, Entity, EntityDelta, ItemUpdate, Resource};
use crate::error::{EngineError, EngineResult, ResourceKind};
use crate::stats::DerivedSnapshot;
use crate::types::{num, ItemId};
use serde::{Deserialize, Serialize};

/// Amounts actually restored, after clamping to the maxima
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Restored {
    pub hp: f64,
    pub mana: f64,
    pub gp: f64,
    pub dp: f64,
}

impl Restored {
    pub fn is_empty(&self) -> bool {
        self.hp <= 0.0 && self.mana <= 0.0 && self.gp <= 0.0 && self.dp <= 0.0
    }
}

/// Resource paid to use an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub resource: ResourceKind,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUse {
    pub item_id: ItemId,
    pub delta: EntityDelta,
    pub restored: Restored,
    /// Damage rolled by a thrown or splash consumable
    pub damage: Option<FormulaRoll>,
    pub spent: Option<Cost>,
}

/// Use `item_id` from `entity`'s inventory
///
/// - consumables roll every restore formula, clamp to the maxima and lose
///   one from their stack (`OutOfStock` at zero)
/// - spells and essences pay their mana cost, grace for divine casters
///   (`InsufficientResource` when short); essences then go on cooldown
/// - an essence already on cooldown, or any other kind, is `NotUsable`
pub fn use_item(
    entity: &Entity,
    stats: &DerivedSnapshot,
    item_id: &ItemId,
    roller: &mut impl DiceRoller,
) -> EngineResult<ItemUse> {
    let item = entity
        .item(item_id)
        .ok_or_else(|| EngineError::ItemNotFound(item_id.clone()))?;

    let mut usage = ItemUse {
        item_id: item_id.clone(),
        delta: EntityDelta::new(),
        restored: Restored::default(),
        damage: None,
        spent: None,
    };

    match &item.kind {
        ItemKind::Consumable(consumable) => {
            if item.quantity == 0 {
                return Err(EngineError::OutOfStock(item_id.clone()));
            }
            consume(entity, stats, consumable, roller, &mut usage);
            usage
                .delta
                .push_item(ItemUpdate::new(item_id.clone()).quantity(item.quantity - 1));
        }
        ItemKind::Spell(spell) => {
            usage.spent = Some(pay(entity, stats, spell.mana_cost, &mut usage.delta)?);
        }
        ItemKind::Essence(essence) => {
            if essence.on_cooldown {
                return Err(EngineError::NotUsable(item_id.clone()));
            }
            usage.spent = Some(pay(entity, stats, essence.mana_cost, &mut usage.delta)?);
            usage
                .delta
                .push_item(ItemUpdate::new(item_id.clone()).cooldown(true));
        }
        _ => return Err(EngineError::NotUsable(item_id.clone())),
    }

    tracing::info!(
        entity = %entity.id,
        item = %item.id,
        kind = item.kind.name(),
        restored = ?usage.restored,
        "item used"
    );
    Ok(usage)
}

fn consume(
    entity: &Entity,
    stats: &DerivedSnapshot,
    consumable: &ConsumableData,
    roller: &mut impl DiceRoller,
    usage: &mut ItemUse,
) {
    let res = &entity.resources;
    let pools = [
        (&consumable.healing, paths::HP, &res.hp, stats.hp_max),
        (&consumable.mana_restore, paths::MANA, &res.mana, stats.mana_max),
        (&consumable.gp_restore, paths::GP, &res.gp, stats.gp_max),
        (&consumable.dp_restore, paths::DP, &res.dp, stats.dp_max),
    ];
    let mut amounts = [0.0; 4];
    for (slot, (formula, path, pool, max)) in pools.into_iter().enumerate() {
        if let Some(formula) = formula {
            amounts[slot] = restore(formula, path, pool, max, roller, &mut usage.delta);
        }
    }
    let [hp, mana, gp, dp] = amounts;
    usage.restored = Restored { hp, mana, gp, dp };
    usage.damage = consumable.damage.as_ref().map(|formula| formula.roll(roller));
}

fn restore(
    formula: &DiceFormula,
    path: &str,
    pool: &Resource,
    max: f64,
    roller: &mut impl DiceRoller,
    delta: &mut EntityDelta,
) -> f64 {
    let rolled = formula.roll(roller).total.max(0) as f64;
    let restored = rolled.min((num(max) - pool.value).max(0.0));
    if restored > 0.0 {
        delta.set(path, pool.value + restored);
    }
    restored
}

/// Spend mana, or grace for divine casters
fn pay(
    entity: &Entity,
    stats: &DerivedSnapshot,
    cost: f64,
    delta: &mut EntityDelta,
) -> EngineResult<Cost> {
    let cost = num(cost).max(0.0);
    let (resource, path, pool) = if stats.is_divine() {
        (ResourceKind::Grace, paths::GP, &entity.resources.gp)
    } else {
        (ResourceKind::Mana, paths::MANA, &entity.resources.mana)
    };
    if cost > 0.0 {
        if pool.value < cost {
            return Err(EngineError::InsufficientResource {
                resource,
                required: cost,
                available: pool.value,
            });
        }
        delta.set(path, pool.value - cost);
    }
    Ok(Cost {
        resource,
        amount: cost,
    })
}
