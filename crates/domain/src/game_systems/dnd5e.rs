//! D&D 5th Edition rule system declarations.

use super::traits::RuleSystem;

const RECORD_TYPES: &[&str] = &["character", "npc", "vehicle", "group"];

const ITEM_TYPES: &[&str] = &[
    "weapon",
    "equipment",
    "consumable",
    "tool",
    "loot",
    "container",
    "spell",
    "feat",
    "class",
    "subclass",
    "background",
    "race",
];

/// D&D 5e rule system.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dnd5eSystem;

impl Dnd5eSystem {
    pub fn new() -> Self {
        Self
    }
}

impl RuleSystem for Dnd5eSystem {
    fn system_id(&self) -> &str {
        "dnd5e"
    }

    fn display_name(&self) -> &str {
        "D&D 5th Edition"
    }

    fn record_types(&self) -> &[&str] {
        RECORD_TYPES
    }

    fn item_types(&self) -> &[&str] {
        ITEM_TYPES
    }
}
