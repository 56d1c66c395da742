//! Ruleset and fixture loading
//!
//! Rulesets are TOML; entity fixtures use the JSON shape the entity store
//! exchanges.

mod rules;

pub use rules::{
    default_rules, load_rules, parse_rules, DamageConstants, DefenseConstants,
    EquipmentConstants, ProgressionConstants, RegenConstants, RulesConfig, SizeEntry, SizeTable,
    MAX_LEVEL, XP_TABLE,
};
pub(crate) use rules::threshold_from;

use crate::entity::Entity;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid ruleset: {0}")]
    ValidationError(String),
}

pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    parse_toml(&fs::read_to_string(path)?)
}

pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Parse an entity from its JSON record
///
/// Current resource values are left as stored; callers that want them
/// clamped apply `Entity::clamp_to` after `recompute`.
pub fn parse_entity(json: &str) -> Result<Entity, ConfigError> {
    let entity: Entity = serde_json::from_str(json)?;
    tracing::debug!(entity = %entity.id, items = entity.items.len(), "entity parsed");
    Ok(entity)
}

pub fn load_entity(path: &Path) -> Result<Entity, ConfigError> {
    parse_entity(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::item::{Grip, ItemKind};
    use crate::types::{ItemId, Rank, Size};

    #[test]
    fn test_parse_entity_record() {
        let json = r#"{
            "id": "wolf",
            "name": "Grey Wolf",
            "kind": { "type": "monster", "rank": 3 },
            "size": "large",
            "sub": { "agility": 39, "bone_density": 20 },
            "resources": { "hp": { "value": 30, "max": 30 } },
            "items": [{
                "id": "bite",
                "name": "Bite",
                "equip_status": "equipped",
                "kind": { "type": "weapon", "damage": "1d6+1", "grip": "2h" }
            }]
        }"#;
        let wolf = parse_entity(json).unwrap();
        assert!(matches!(wolf.kind, EntityKind::Monster { rank, .. } if rank == Rank::new(3)));
        assert_eq!(wolf.size, Size::Large);
        assert!((wolf.sub.agility - 39.0).abs() < f64::EPSILON);
        let bite = wolf.item(&ItemId::from("bite")).unwrap();
        assert!(bite.is_equipped());
        assert!(matches!(&bite.kind, ItemKind::Weapon(w) if w.grip == Grip::TwoHanded));
    }

    #[test]
    fn test_parse_entity_rejects_bad_formula() {
        let json = r#"{
            "id": "x",
            "name": "X",
            "items": [{ "id": "w", "name": "W", "kind": { "type": "weapon", "damage": "1dx" } }]
        }"#;
        assert!(matches!(parse_entity(json), Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_parse_toml_partial() {
        let rules: RulesConfig = parse_toml("[regen]\ncooldown_reset_minutes = 10.0\n").unwrap();
        assert!((rules.regen.cooldown_reset_minutes - 10.0).abs() < f64::EPSILON);
        assert!((rules.regen.rate_per_minute - 0.5).abs() < f64::EPSILON);
    }
}
