//! Equip/unequip planning
//!
//! Planning never touches the entity. It returns the item updates that
//! toggling one item implies, including items pushed out of the slots it
//! claims.

use super::EquipmentSummary;
use crate::entity::{Entity, EntityDelta, ItemUpdate};
use crate::error::{EngineError, EngineResult};
use crate::item::{ArmorData, ArmorSlot, EquipStatus, Grip, Item, ItemKind, WeaponData};
use crate::types::ItemId;

/// Plan toggling `item_id` between equipped and stored
///
/// `equipment` must come from the entity's current item list. Kinds that
/// cannot be equipped yield an empty delta.
pub fn plan_toggle_equip(
    entity: &Entity,
    equipment: &EquipmentSummary,
    item_id: &ItemId,
) -> EngineResult<EntityDelta> {
    let item = entity
        .item(item_id)
        .ok_or_else(|| EngineError::ItemNotFound(item_id.clone()))?;

    let mut delta = EntityDelta::new();
    match &item.kind {
        ItemKind::Weapon(weapon) => toggle_weapon(entity, equipment, item, weapon, &mut delta),
        ItemKind::Armor(armor) => toggle_armor(entity, equipment, item, armor, &mut delta)?,
        ItemKind::Essence(_) => toggle_capped(
            item,
            equipment.slots.essences.len(),
            equipment.essence_slots_max,
            "essence",
            &mut delta,
        )?,
        ItemKind::Contract(_) => toggle_capped(
            item,
            equipment.slots.contracts.len(),
            equipment.contract_slots_max,
            "contract",
            &mut delta,
        )?,
        other => {
            tracing::debug!(item = %item.id, kind = other.name(), "item kind is not equippable");
        }
    }

    tracing::debug!(entity = %entity.id, item = %item.id, updates = delta.items.len(), "planned equip toggle");
    Ok(delta)
}

fn stow(delta: &mut EntityDelta, id: &ItemId) {
    delta.push_item(ItemUpdate::new(id.clone()).status(EquipStatus::Stored));
}

/// Stow whatever occupies a slot, unless it is `keep`
fn stow_occupant(delta: &mut EntityDelta, occupant: Option<&ItemId>, keep: &ItemId) {
    if let Some(id) = occupant.filter(|id| *id != keep) {
        stow(delta, id);
    }
}

fn toggle_weapon(
    entity: &Entity,
    equipment: &EquipmentSummary,
    item: &Item,
    weapon: &WeaponData,
    delta: &mut EntityDelta,
) {
    let slots = &equipment.slots;
    let update = ItemUpdate::new(item.id.clone());

    if item.is_equipped() {
        if weapon.tags.versatile && weapon.grip == Grip::OneHanded {
            stow_occupant(delta, slots.off_hand.as_ref(), &item.id);
            delta.push_item(update.grip(Grip::TwoHanded));
        } else if weapon.tags.versatile {
            delta.push_item(update.status(EquipStatus::Stored).grip(Grip::OneHanded));
        } else {
            delta.push_item(update.status(EquipStatus::Stored));
        }
        return;
    }

    stow_occupant(delta, slots.main_hand.as_ref(), &item.id);
    if weapon.tags.two_handed {
        stow_occupant(delta, slots.off_hand.as_ref(), &item.id);
        delta.push_item(update.status(EquipStatus::Equipped).grip(Grip::TwoHanded));
    } else {
        delta.push_item(update.status(EquipStatus::Equipped).grip(Grip::OneHanded));
    }
    tracing::trace!(entity = %entity.id, weapon = %item.id, "weapon drawn");
}

fn toggle_armor(
    entity: &Entity,
    equipment: &EquipmentSummary,
    item: &Item,
    armor: &ArmorData,
    delta: &mut EntityDelta,
) -> EngineResult<()> {
    let update = ItemUpdate::new(item.id.clone());
    if item.is_equipped() {
        delta.push_item(update.status(EquipStatus::Stored));
        return Ok(());
    }

    let slots = &equipment.slots;
    if armor.is_shield {
        let two_handed = slots
            .main_hand
            .as_ref()
            .and_then(|id| entity.item(id))
            .and_then(Item::as_weapon)
            .is_some_and(|w| w.grip == Grip::TwoHanded);
        if two_handed {
            return Err(EngineError::HandsOccupied);
        }
        stow_occupant(delta, slots.off_hand.as_ref(), &item.id);
    } else if armor.slot == ArmorSlot::Ring {
        if slots.rings.len() >= equipment.ring_slots_max as usize {
            return Err(EngineError::SlotsFull {
                kind: "ring",
                max: equipment.ring_slots_max,
            });
        }
    } else {
        let claimed: Vec<ArmorSlot> = std::iter::once(armor.slot)
            .chain(armor.covers_slots.iter().copied())
            .collect();
        let displaced = entity.items.iter().filter(|other| {
            other.id != item.id
                && other.is_equipped()
                && other
                    .as_armor()
                    .is_some_and(|a| !a.is_shield && claimed.iter().any(|s| a.occupies(*s)))
        });
        for other in displaced {
            stow(delta, &other.id);
        }
    }

    delta.push_item(update.status(EquipStatus::Equipped));
    Ok(())
}

fn toggle_capped(
    item: &Item,
    bound: usize,
    max: u32,
    kind: &'static str,
    delta: &mut EntityDelta,
) -> EngineResult<()> {
    let update = ItemUpdate::new(item.id.clone());
    if item.is_equipped() {
        delta.push_item(update.status(EquipStatus::Stored));
        return Ok(());
    }
    if bound >= max as usize {
        return Err(EngineError::SlotsFull { kind, max });
    }
    delta.push_item(update.status(EquipStatus::Equipped));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{link_equipment, EquipmentLimits};
    use crate::item::{ContractData, EssenceData, WeaponTags};

    fn limits() -> EquipmentLimits {
        EquipmentLimits {
            ring_slots: 10,
            essence_slots: 1,
            contract_slots: 1,
        }
    }

    fn plan(entity: &Entity, id: &str) -> EngineResult<EntityDelta> {
        let summary = link_equipment(&entity.items, &limits());
        plan_toggle_equip(entity, &summary, &ItemId::from(id))
    }

    fn weapon(id: &str, tags: WeaponTags) -> Item {
        Item::new(
            id,
            id,
            ItemKind::Weapon(WeaponData {
                tags,
                ..WeaponData::default()
            }),
        )
    }

    fn status(delta: &EntityDelta, id: &str) -> Option<EquipStatus> {
        delta.item(&ItemId::from(id)).and_then(|u| u.equip_status)
    }

    fn grip(delta: &EntityDelta, id: &str) -> Option<Grip> {
        delta.item(&ItemId::from(id)).and_then(|u| u.grip)
    }

    #[test]
    fn test_unknown_item() {
        let entity = Entity::new("hero", "Hero");
        assert_eq!(
            plan(&entity, "ghost"),
            Err(EngineError::ItemNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_versatile_cycles_grip() {
        let versatile = WeaponTags {
            versatile: true,
            ..WeaponTags::default()
        };
        let mut entity = Entity::new("hero", "Hero")
            .with_item(weapon("sword", versatile).equipped())
            .with_item(weapon("dagger", WeaponTags::default()).equipped());
        if let ItemKind::Weapon(w) = &mut entity.items[1].kind {
            w.grip = Grip::OffHand;
        }

        let delta = plan(&entity, "sword").unwrap();
        assert_eq!(grip(&delta, "sword"), Some(Grip::TwoHanded));
        assert_eq!(status(&delta, "sword"), None);
        assert_eq!(status(&delta, "dagger"), Some(EquipStatus::Stored));

        entity.apply_delta(&delta);
        let delta = plan(&entity, "sword").unwrap();
        assert_eq!(status(&delta, "sword"), Some(EquipStatus::Stored));
        assert_eq!(grip(&delta, "sword"), Some(Grip::OneHanded));
    }

    #[test]
    fn test_two_handed_frees_both_hands() {
        let great = WeaponTags {
            two_handed: true,
            ..WeaponTags::default()
        };
        let buckler = Item::new(
            "buckler",
            "Buckler",
            ItemKind::Armor(ArmorData {
                is_shield: true,
                ..ArmorData::default()
            }),
        )
        .equipped();
        let entity = Entity::new("hero", "Hero")
            .with_item(weapon("axe", WeaponTags::default()).equipped())
            .with_item(buckler)
            .with_item(weapon("maul", great));

        let delta = plan(&entity, "maul").unwrap();
        assert_eq!(status(&delta, "axe"), Some(EquipStatus::Stored));
        assert_eq!(status(&delta, "buckler"), Some(EquipStatus::Stored));
        assert_eq!(status(&delta, "maul"), Some(EquipStatus::Equipped));
        assert_eq!(grip(&delta, "maul"), Some(Grip::TwoHanded));
    }

    #[test]
    fn test_shield_refused_with_two_handed_grip() {
        let mut maul = weapon(
            "maul",
            WeaponTags {
                two_handed: true,
                ..WeaponTags::default()
            },
        )
        .equipped();
        if let ItemKind::Weapon(w) = &mut maul.kind {
            w.grip = Grip::TwoHanded;
        }
        let shield = Item::new(
            "kite",
            "Kite Shield",
            ItemKind::Armor(ArmorData {
                is_shield: true,
                ..ArmorData::default()
            }),
        );
        let entity = Entity::new("hero", "Hero").with_item(maul).with_item(shield);
        assert_eq!(plan(&entity, "kite"), Err(EngineError::HandsOccupied));
    }

    #[test]
    fn test_armor_displaces_covered_slots() {
        let helm = Item::new(
            "helm",
            "Helm",
            ItemKind::Armor(ArmorData {
                slot: ArmorSlot::Head,
                ..ArmorData::default()
            }),
        )
        .equipped();
        let bracers = Item::new(
            "bracers",
            "Bracers",
            ItemKind::Armor(ArmorData {
                slot: ArmorSlot::Arms,
                ..ArmorData::default()
            }),
        )
        .equipped();
        let plate = Item::new(
            "plate",
            "Full Plate",
            ItemKind::Armor(ArmorData {
                slot: ArmorSlot::Body,
                covers_slots: vec![ArmorSlot::Arms, ArmorSlot::Legs],
                ..ArmorData::default()
            }),
        );
        let entity = Entity::new("hero", "Hero")
            .with_item(helm)
            .with_item(bracers)
            .with_item(plate);

        let delta = plan(&entity, "plate").unwrap();
        assert_eq!(status(&delta, "bracers"), Some(EquipStatus::Stored));
        assert_eq!(status(&delta, "helm"), None);
        assert_eq!(status(&delta, "plate"), Some(EquipStatus::Equipped));
    }

    #[test]
    fn test_contract_and_essence_caps() {
        let entity = Entity::new("hero", "Hero")
            .with_item(Item::new("c1", "Pact", ItemKind::Contract(ContractData::default())).equipped())
            .with_item(Item::new("c2", "Oath", ItemKind::Contract(ContractData::default())))
            .with_item(Item::new("e1", "Ember", ItemKind::Essence(EssenceData::default())).equipped())
            .with_item(Item::new("e2", "Frost", ItemKind::Essence(EssenceData::default())));

        assert_eq!(
            plan(&entity, "c2"),
            Err(EngineError::SlotsFull {
                kind: "contract",
                max: 1
            })
        );
        assert_eq!(
            plan(&entity, "e2"),
            Err(EngineError::SlotsFull {
                kind: "essence",
                max: 1
            })
        );

        let delta = plan(&entity, "c1").unwrap();
        assert_eq!(status(&delta, "c1"), Some(EquipStatus::Stored));
    }

    #[test]
    fn test_loot_is_not_equippable() {
        let entity = Entity::new("hero", "Hero").with_item(Item::new("gem", "Gem", ItemKind::Loot));
        assert!(plan(&entity, "gem").unwrap().is_empty());
    }
}
