//! Equipment - slot bindings, load totals and equip planning

mod linker;
mod toggle;

pub use linker::{link_equipment, EquipmentLimits, EquipmentSlots, EquipmentSummary};
pub use toggle::plan_toggle_equip;
