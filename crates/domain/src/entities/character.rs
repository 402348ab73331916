//! Normalized character records.
//!
//! A [`NormalizedCharacter`] is the strongly-typed result of cleaning one
//! generated NPC object. Every field has a value; defaults are applied by
//! the normalizer, never left to the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::entities::ItemSpec;
use crate::value_objects::{Ability, Movement};

/// Name used when the generated record has none.
pub const DEFAULT_NPC_NAME: &str = "Unknown NPC";

/// Ability score used when the generated record has none.
pub const DEFAULT_ABILITY_SCORE: i32 = 10;

/// Scores for all six abilities. Always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores([i32; 6]);

impl Default for AbilityScores {
    fn default() -> Self {
        Self([DEFAULT_ABILITY_SCORE; 6])
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        self.0[Self::index(ability)]
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        self.0[Self::index(ability)] = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn index(ability: Ability) -> usize {
        match ability {
            Ability::Str => 0,
            Ability::Dex => 1,
            Ability::Con => 2,
            Ability::Int => 3,
            Ability::Wis => 4,
            Ability::Cha => 5,
        }
    }
}

/// A generated NPC after validation and defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCharacter {
    pub name: String,
    pub record_type: String,
    pub biography: String,
    pub background: String,
    pub species: String,
    pub abilities: AbilityScores,
    pub saving_throw_proficiency: BTreeMap<Ability, bool>,
    /// Skill code to proficiency rank (0 none, 1 proficient, 2 expertise)
    pub skill_proficiency: BTreeMap<String, u8>,
    pub hit_points: u32,
    pub challenge_rating: f64,
    pub movement: Movement,
    pub sub_items: Vec<ItemSpec>,
}

impl NormalizedCharacter {
    /// A character with every field at its default.
    pub fn with_defaults(record_type: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_NPC_NAME.to_string(),
            record_type: record_type.into(),
            biography: String::new(),
            background: String::new(),
            species: String::new(),
            abilities: AbilityScores::default(),
            saving_throw_proficiency: Ability::ALL.into_iter().map(|a| (a, false)).collect(),
            skill_proficiency: BTreeMap::new(),
            hit_points: 1,
            challenge_rating: 0.0,
            movement: Movement::default(),
            sub_items: Vec::new(),
        }
    }

    pub fn is_save_proficient(&self, ability: Ability) -> bool {
        self.saving_throw_proficiency
            .get(&ability)
            .copied()
            .unwrap_or(false)
    }

    /// Record structure handed to the host, without embedded items.
    pub fn to_record_data(&self) -> Value {
        let abilities: Map<String, Value> = self
            .abilities
            .iter()
            .map(|(ability, score)| {
                (
                    ability.code().to_string(),
                    json!({
                        "value": score,
                        "proficient": u8::from(self.is_save_proficient(ability)),
                    }),
                )
            })
            .collect();

        let skills: Map<String, Value> = self
            .skill_proficiency
            .iter()
            .map(|(code, rank)| (code.clone(), json!({ "value": rank })))
            .collect();

        let mut movement = Map::new();
        if let Some(walk) = self.movement.walk {
            movement.insert("walk".to_string(), json!(walk));
        }
        movement.insert("units".to_string(), json!("ft"));

        json!({
            "name": self.name,
            "type": self.record_type,
            "system": {
                "abilities": abilities,
                "attributes": {
                    "hp": { "value": self.hit_points, "max": self.hit_points },
                    "movement": movement,
                },
                "details": {
                    "biography": { "value": self.biography },
                    "background": self.background,
                    "race": self.species,
                    "cr": self.challenge_rating,
                },
                "skills": skills,
            },
        })
    }

    /// Full host document including embedded items.
    pub fn to_document(&self) -> Value {
        let mut doc = self.to_record_data();
        if let Value::Object(ref mut map) = doc {
            map.insert(
                "items".to_string(),
                Value::Array(self.sub_items.iter().map(ItemSpec::to_document).collect()),
            );
        }
        doc
    }
}
