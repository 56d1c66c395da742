//! Slot bindings and load totals rebuilt from the owned item list

use crate::item::{ArmorSlot, Grip, Item, ItemKind};
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Item ids bound to each equipment slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquipmentSlots {
    pub main_hand: Option<ItemId>,
    pub off_hand: Option<ItemId>,
    pub head: Option<ItemId>,
    pub body: Option<ItemId>,
    pub arms: Option<ItemId>,
    pub hands: Option<ItemId>,
    pub legs: Option<ItemId>,
    pub feet: Option<ItemId>,
    pub neck: Option<ItemId>,
    pub belt: Option<ItemId>,
    pub cloak: Option<ItemId>,
    pub rings: Vec<ItemId>,
    pub essences: Vec<ItemId>,
    pub contracts: Vec<ItemId>,
}

impl EquipmentSlots {
    /// Single-occupant slot for an armor slot; rings have none
    fn armor_slot_mut(&mut self, slot: ArmorSlot) -> Option<&mut Option<ItemId>> {
        match slot {
            ArmorSlot::Head => Some(&mut self.head),
            ArmorSlot::Body => Some(&mut self.body),
            ArmorSlot::Arms => Some(&mut self.arms),
            ArmorSlot::Hands => Some(&mut self.hands),
            ArmorSlot::Legs => Some(&mut self.legs),
            ArmorSlot::Feet => Some(&mut self.feet),
            ArmorSlot::Neck => Some(&mut self.neck),
            ArmorSlot::Belt => Some(&mut self.belt),
            ArmorSlot::Cloak => Some(&mut self.cloak),
            ArmorSlot::Ring => None,
        }
    }

    /// Item bound to an armor slot
    pub fn armor_slot(&self, slot: ArmorSlot) -> Option<&ItemId> {
        match slot {
            ArmorSlot::Head => self.head.as_ref(),
            ArmorSlot::Body => self.body.as_ref(),
            ArmorSlot::Arms => self.arms.as_ref(),
            ArmorSlot::Hands => self.hands.as_ref(),
            ArmorSlot::Legs => self.legs.as_ref(),
            ArmorSlot::Feet => self.feet.as_ref(),
            ArmorSlot::Neck => self.neck.as_ref(),
            ArmorSlot::Belt => self.belt.as_ref(),
            ArmorSlot::Cloak => self.cloak.as_ref(),
            ArmorSlot::Ring => None,
        }
    }
}

/// Capacity of the bounded slot arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquipmentLimits {
    pub ring_slots: u32,
    pub essence_slots: u32,
    pub contract_slots: u32,
}

/// Everything the linker derives from the owned items
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EquipmentSummary {
    pub slots: EquipmentSlots,
    /// Weight of every owned item, equipped or not
    pub total_weight: f64,
    /// Sum of item levels of equipped items
    pub total_item_level: f64,
    pub equipped_count: u32,
    /// Ring slots blocked by worn armor
    pub blocked_rings: u32,
    pub ring_slots_max: u32,
    pub essence_slots_max: u32,
    pub contract_slots_max: u32,
    /// Agility lost to equipped armor
    pub armor_penalty: f64,
    /// Armor value of the first equipped non-shield armor
    pub armor_value: i32,
}

/// Rebuild slot bindings and totals from scratch
///
/// Starts from empty bindings on every call, so unchanged input always yields
/// an identical summary.
pub fn link_equipment(items: &[Item], limits: &EquipmentLimits) -> EquipmentSummary {
    let mut summary = EquipmentSummary {
        essence_slots_max: limits.essence_slots,
        contract_slots_max: limits.contract_slots,
        ..EquipmentSummary::default()
    };
    let mut armor_value = None;

    for item in items {
        summary.total_weight += item.carried_weight();
        if !item.is_equipped() {
            continue;
        }

        if item.item_level > 0.0 {
            summary.total_item_level += item.item_level;
            summary.equipped_count += 1;
        }

        let slots = &mut summary.slots;
        match &item.kind {
            ItemKind::Weapon(weapon) => {
                if weapon.grip == Grip::OffHand {
                    slots.off_hand = Some(item.id.clone());
                } else {
                    slots.main_hand = Some(item.id.clone());
                }
                if weapon.grip == Grip::TwoHanded {
                    slots.off_hand = Some(item.id.clone());
                }
            }
            ItemKind::Armor(armor) => {
                summary.blocked_rings += armor.rings_blocked;
                summary.armor_penalty += armor.armor_penalty.abs();
                if armor.is_shield {
                    slots.off_hand = Some(item.id.clone());
                } else if armor.slot == ArmorSlot::Ring {
                    slots.rings.push(item.id.clone());
                } else {
                    armor_value.get_or_insert(armor.armor_value);
                    for slot in std::iter::once(&armor.slot).chain(&armor.covers_slots) {
                        if let Some(bound) = slots.armor_slot_mut(*slot) {
                            *bound = Some(item.id.clone());
                        }
                    }
                }
            }
            ItemKind::Essence(_) => slots.essences.push(item.id.clone()),
            ItemKind::Contract(_) => slots.contracts.push(item.id.clone()),
            _ => {}
        }
    }

    summary.ring_slots_max = limits.ring_slots.saturating_sub(summary.blocked_rings);
    summary.armor_value = armor_value.unwrap_or(0);
    summary.total_weight = (summary.total_weight * 100.0).round() / 100.0;

    cap_slots(&mut summary.slots.rings, summary.ring_slots_max, "ring");
    cap_slots(&mut summary.slots.essences, summary.essence_slots_max, "essence");
    cap_slots(&mut summary.slots.contracts, summary.contract_slots_max, "contract");

    tracing::debug!(
        weight = summary.total_weight,
        item_level = summary.total_item_level,
        rings = summary.slots.rings.len(),
        essences = summary.slots.essences.len(),
        "linked equipment"
    );
    summary
}

fn cap_slots(bound: &mut Vec<ItemId>, max: u32, kind: &str) {
    let max = max as usize;
    if bound.len() > max {
        tracing::warn!(kind, bound = bound.len(), max, "more items equipped than slots, extras left unbound");
        bound.truncate(max);
    }
}
