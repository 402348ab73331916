//! Record normalization.
//!
//! Converts one untrusted generated NPC object into a [`RecordDraft`]: a
//! fully-defaulted [`NormalizedCharacter`] whose items have passed type
//! validation, plus the action names still to be resolved against the
//! catalog. Catalog work is async and lives in the engine.

pub mod raw;

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::entities::{ItemSpec, NormalizedCharacter};
use crate::error::DomainError;
use crate::game_systems::TypeRegistry;
use crate::value_objects::{challenge_rating_or_random, skill_code, Ability, Movement};

use raw::{array_field, entry_name, field, int_value, keyed_entries, string_field, truthy};

/// Item type used when the registry has no item types to validate against
/// and the generated item declares none.
pub const FALLBACK_ITEM_TYPE: &str = "loot";

/// Name used for generated items without one.
pub const DEFAULT_ITEM_NAME: &str = "Unnamed Item";

/// A recoverable validation problem found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The generated record type was not recognized and was replaced.
    RecordTypeDefaulted {
        record: String,
        found: String,
        substituted: String,
    },
    /// A generated item had an unrecognized or missing type and was dropped.
    ItemTypeRejected {
        record: String,
        item: String,
        item_type: Option<String>,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordTypeDefaulted {
                record,
                found,
                substituted,
            } => write!(
                f,
                "{}: unknown record type '{}', using '{}'",
                record, found, substituted
            ),
            Self::ItemTypeRejected {
                record,
                item,
                item_type: Some(item_type),
            } => write!(
                f,
                "{}: dropped item '{}' with unknown type '{}'",
                record, item, item_type
            ),
            Self::ItemTypeRejected {
                record,
                item,
                item_type: None,
            } => write!(f, "{}: dropped item '{}' without a type", record, item),
        }
    }
}

/// A normalized character awaiting catalog resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// Character with validated, not yet catalog-resolved, items.
    pub character: NormalizedCharacter,
    /// Names from `actions` then `legendaryActions`, in input order.
    pub action_names: Vec<String>,
    pub warnings: Vec<ValidationWarning>,
}

/// Applies type validation and defaults to generated records.
pub struct RecordNormalizer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Normalize one generated record.
    ///
    /// `gen_range` supplies the random challenge rating when the generated
    /// one cannot be parsed. Only a record that is not a JSON object fails.
    pub fn normalize(
        &self,
        raw: &Value,
        gen_range: impl FnOnce(i32, i32) -> i32,
    ) -> Result<RecordDraft, DomainError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| DomainError::validation("generated record is not a JSON object"))?;

        let mut warnings = Vec::new();
        let name = string_field(obj, &["name"]);
        let label = name.clone().unwrap_or_else(|| crate::entities::DEFAULT_NPC_NAME.to_string());

        let record_type = self.record_type(obj, &label, &mut warnings);
        let mut character = NormalizedCharacter::with_defaults(record_type);
        if let Some(name) = name {
            character.name = name;
        }
        character.biography = string_field(obj, &["description", "biography"]).unwrap_or_default();
        character.background = string_field(obj, &["background"]).unwrap_or_default();
        character.species = string_field(obj, &["species", "race"]).unwrap_or_default();

        apply_abilities(obj, &mut character);
        apply_saving_throws(obj, &mut character);
        apply_skills(obj, &mut character);

        character.hit_points = field(obj, &["hp", "hitPoints"])
            .and_then(int_value)
            .filter(|hp| *hp >= 1)
            .and_then(|hp| u32::try_from(hp).ok())
            .unwrap_or(1);

        character.challenge_rating = challenge_rating_or_random(
            field(obj, &["cr", "challengeRating"]).unwrap_or(&Value::Null),
            gen_range,
        );

        character.movement = movement(obj);
        character.sub_items = self.validated_items(obj, &label, &mut warnings);

        let action_names = array_field(obj, &["actions"])
            .iter()
            .chain(array_field(obj, &["legendaryActions"]))
            .filter_map(entry_name)
            .collect();

        Ok(RecordDraft {
            character,
            action_names,
            warnings,
        })
    }

    fn record_type(
        &self,
        obj: &Map<String, Value>,
        label: &str,
        warnings: &mut Vec<ValidationWarning>,
    ) -> String {
        let valid = self.registry.valid_record_types();
        let default = self.registry.fallback_record_type(&valid);
        if valid.is_empty() {
            return default;
        }

        match string_field(obj, &["type"]) {
            Some(found) if valid.contains(&found.to_lowercase()) => found.to_lowercase(),
            Some(found) => {
                warnings.push(ValidationWarning::RecordTypeDefaulted {
                    record: label.to_string(),
                    found,
                    substituted: default.clone(),
                });
                default
            }
            None => default,
        }
    }

    fn validated_items(
        &self,
        obj: &Map<String, Value>,
        label: &str,
        warnings: &mut Vec<ValidationWarning>,
    ) -> Vec<ItemSpec> {
        let valid = self.registry.valid_item_types();
        array_field(obj, &["items"])
            .iter()
            .filter_map(|raw_item| {
                let item = raw_item.as_object();
                let name = item
                    .and_then(|i| string_field(i, &["name"]))
                    .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
                let declared = item
                    .and_then(|i| string_field(i, &["type"]))
                    .map(|t| t.to_lowercase());
                let payload = item
                    .and_then(|i| field(i, &["system"]))
                    .filter(|p| p.is_object())
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));

                match item_type(declared.as_deref(), &valid) {
                    Some(item_type) => Some(ItemSpec::generated(name, item_type, payload)),
                    None => {
                        warnings.push(ValidationWarning::ItemTypeRejected {
                            record: label.to_string(),
                            item: name,
                            item_type: declared,
                        });
                        None
                    }
                }
            })
            .collect()
    }
}

fn item_type(declared: Option<&str>, valid: &BTreeSet<String>) -> Option<String> {
    if valid.is_empty() {
        return Some(declared.unwrap_or(FALLBACK_ITEM_TYPE).to_string());
    }
    declared.filter(|t| valid.contains(*t)).map(str::to_string)
}

fn apply_abilities(obj: &Map<String, Value>, character: &mut NormalizedCharacter) {
    let Some(abilities) = field(obj, &["abilities"]).and_then(Value::as_object) else {
        return;
    };
    for (key, value) in abilities {
        if let (Some(ability), Some(score)) = (Ability::from_key(key), int_value(value)) {
            if let Ok(score) = i32::try_from(score) {
                character.abilities.set(ability, score);
            }
        }
    }
}

fn apply_saving_throws(obj: &Map<String, Value>, character: &mut NormalizedCharacter) {
    let Some(saves) = field(obj, &["savingThrows", "saves"]) else {
        return;
    };
    for (key, value) in keyed_entries(saves) {
        if let Some(ability) = Ability::from_key(&key) {
            if truthy(&value) {
                character.saving_throw_proficiency.insert(ability, true);
            }
        }
    }
}

fn apply_skills(obj: &Map<String, Value>, character: &mut NormalizedCharacter) {
    let Some(skills) = field(obj, &["skills"]) else {
        return;
    };
    for (key, value) in keyed_entries(skills) {
        let Some(code) = skill_code(&key) else {
            continue;
        };
        let rank = match value {
            Value::Bool(true) => 1,
            Value::Bool(false) => 0,
            other => int_value(&other).map(|r| r.clamp(0, 2) as u8).unwrap_or(1),
        };
        character.skill_proficiency.insert(code.to_string(), rank);
    }
}

fn movement(obj: &Map<String, Value>) -> Movement {
    match field(obj, &["movementSpeed", "speed"]) {
        Some(Value::String(s)) => Movement::parse(s),
        Some(Value::Number(n)) => Movement::parse(&n.to_string()),
        _ => Movement::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_systems::{Dnd5eSystem, HostTypes};
    use serde_json::json;
    use std::sync::Arc;

    fn dnd5e_registry() -> TypeRegistry {
        TypeRegistry::for_host(Some(Arc::new(Dnd5eSystem::new())), HostTypes::default())
    }

    fn never_random(_: i32, _: i32) -> i32 {
        panic!("random fallback should not be used")
    }

    #[test]
    fn missing_abilities_default_to_ten() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"name": "Plain", "cr": 1}), never_random)
            .expect("object record");

        let character = draft.character;
        assert_eq!(character.abilities.len(), 6);
        assert!(character.abilities.iter().all(|(_, score)| score == 10));
        assert!(character.saving_throw_proficiency.values().all(|p| !p));
        assert!(draft.warnings.is_empty());
    }

    #[test]
    fn full_record_is_mapped() {
        let registry = dnd5e_registry();
        let raw = json!({
            "name": "Grumbar Ironfoot",
            "type": "npc",
            "description": "A gruff dwarf",
            "species": "Dwarf",
            "background": "Guild Artisan",
            "abilities": {"str": 16, "DEX": "12", "constitution": {"value": 15}, "luck": 18},
            "hp": "45 (6d8 + 18)",
            "cr": "2",
            "savingThrows": ["con", "wis", "luck"],
            "skills": {"Athletics": 2, "Sleight of Hand": 1, "Basket Weaving": 2},
            "movementSpeed": "25 ft.",
            "actions": ["Multiattack", {"name": "Warhammer"}, {"desc": "unnamed"}],
            "legendaryActions": ["Stone Stance"]
        });

        let draft = RecordNormalizer::new(&registry)
            .normalize(&raw, never_random)
            .expect("object record");
        let c = &draft.character;

        assert_eq!(c.name, "Grumbar Ironfoot");
        assert_eq!(c.record_type, "npc");
        assert_eq!(c.biography, "A gruff dwarf");
        assert_eq!(c.species, "Dwarf");
        assert_eq!(c.background, "Guild Artisan");
        assert_eq!(c.abilities.get(Ability::Str), 16);
        assert_eq!(c.abilities.get(Ability::Dex), 12);
        assert_eq!(c.abilities.get(Ability::Con), 15);
        assert_eq!(c.abilities.get(Ability::Cha), 10);
        assert!(c.is_save_proficient(Ability::Con));
        assert!(c.is_save_proficient(Ability::Wis));
        assert!(!c.is_save_proficient(Ability::Str));
        assert_eq!(c.skill_proficiency.get("ath"), Some(&2));
        assert_eq!(c.skill_proficiency.get("slt"), Some(&1));
        assert_eq!(c.skill_proficiency.len(), 2);
        assert_eq!(c.hit_points, 45);
        assert_eq!(c.challenge_rating, 2.0);
        assert_eq!(c.movement.walk, Some(25));
        assert_eq!(
            draft.action_names,
            vec!["Multiattack", "Warhammer", "Stone Stance"]
        );
    }

    #[test]
    fn unknown_record_type_is_defaulted_with_warning() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"name": "Odd", "type": "monster", "cr": 1}), never_random)
            .expect("object record");

        assert_eq!(draft.character.record_type, "npc");
        assert_eq!(
            draft.warnings,
            vec![ValidationWarning::RecordTypeDefaulted {
                record: "Odd".to_string(),
                found: "monster".to_string(),
                substituted: "npc".to_string(),
            }]
        );
    }

    #[test]
    fn record_type_match_ignores_case() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"name": "Loud", "type": "NPC", "cr": 1}), never_random)
            .expect("object record");
        assert_eq!(draft.character.record_type, "npc");
        assert!(draft.warnings.is_empty());
    }

    #[test]
    fn default_outside_host_types_is_replaced() {
        let registry = TypeRegistry::for_host(
            None,
            HostTypes {
                record_types: vec!["creature".to_string()],
                item_types: vec![],
            },
        );
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"name": "Beast", "type": "npc", "cr": 1}), never_random)
            .expect("object record");

        assert_eq!(draft.character.record_type, "creature");
        assert!(registry
            .valid_record_types()
            .contains(&draft.character.record_type));
        assert_eq!(
            draft.warnings,
            vec![ValidationWarning::RecordTypeDefaulted {
                record: "Beast".to_string(),
                found: "npc".to_string(),
                substituted: "creature".to_string(),
            }]
        );
    }

    #[test]
    fn missing_record_type_defaults_silently() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"cr": 1}), never_random)
            .expect("object record");
        assert_eq!(draft.character.record_type, "npc");
        assert_eq!(draft.character.name, "Unknown NPC");
        assert!(draft.warnings.is_empty());
    }

    #[test]
    fn empty_registry_uses_default_type() {
        let registry = TypeRegistry::new("npc");
        let draft = RecordNormalizer::new(&registry)
            .normalize(
                &json!({"type": "anything", "cr": 1, "items": [{"name": "Rope"}]}),
                never_random,
            )
            .expect("object record");
        assert_eq!(draft.character.record_type, "npc");
        assert!(draft.warnings.is_empty());
        assert_eq!(draft.character.sub_items.len(), 1);
        assert_eq!(draft.character.sub_items[0].item_type, "loot");
    }

    #[test]
    fn unknown_item_type_is_dropped_with_warning() {
        let registry = dnd5e_registry();
        let raw = json!({
            "name": "Trader",
            "cr": 1,
            "items": [
                {"name": "Longsword", "type": "weapon", "system": {"damage": "1d8"}},
                {"name": "Mystery Box", "type": "junk"}
            ]
        });

        let draft = RecordNormalizer::new(&registry)
            .normalize(&raw, never_random)
            .expect("object record");

        let items = &draft.character.sub_items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Longsword");
        assert_eq!(items[0].payload, json!({"damage": "1d8"}));
        assert_eq!(
            draft.warnings,
            vec![ValidationWarning::ItemTypeRejected {
                record: "Trader".to_string(),
                item: "Mystery Box".to_string(),
                item_type: Some("junk".to_string()),
            }]
        );
    }

    #[test]
    fn item_type_check_ignores_case() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(
                &json!({"cr": 1, "items": [{"name": "Fireball", "type": "Spell"}]}),
                never_random,
            )
            .expect("object record");
        assert_eq!(draft.character.sub_items[0].item_type, "spell");
    }

    #[test]
    fn unparsable_cr_uses_random_fallback() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"cr": "deadly"}), |min, max| {
                assert_eq!((min, max), (1, 20));
                13
            })
            .expect("object record");
        assert_eq!(draft.character.challenge_rating, 13.0);
    }

    #[test]
    fn non_positive_hp_becomes_one() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"cr": 1, "hp": -4}), never_random)
            .expect("object record");
        assert_eq!(draft.character.hit_points, 1);
    }

    #[test]
    fn movement_without_digits_stays_empty() {
        let registry = dnd5e_registry();
        let draft = RecordNormalizer::new(&registry)
            .normalize(&json!({"cr": 1, "movementSpeed": "slow"}), never_random)
            .expect("object record");
        assert!(draft.character.movement.is_empty());
    }

    #[test]
    fn non_object_record_fails() {
        let registry = dnd5e_registry();
        let result = RecordNormalizer::new(&registry).normalize(&json!("just text"), never_random);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
