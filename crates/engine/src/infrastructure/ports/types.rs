//! Plain data exchanged across ports.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog searched for spells by name.
pub const SPELL_CATALOG_ID: &str = "dnd5e.spells";

/// What a catalog holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Embeddable sub-records (spells, feats, gear)
    Item,
    /// Top-level records (creatures)
    Actor,
}

/// A catalog as enumerated by the catalog source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogInfo {
    pub id: String,
    pub label: String,
    pub kind: CatalogKind,
}

impl CatalogInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: CatalogKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// One line of a catalog index. Full content needs a document fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIndexEntry {
    pub entry_id: String,
    pub name: String,
    pub item_type: String,
}

impl CatalogIndexEntry {
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Handle for a record created in the host store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHandle(pub Uuid);

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_name_match_ignores_case_and_padding() {
        let entry = CatalogIndexEntry {
            entry_id: "fireball-phb".into(),
            name: "Fireball".into(),
            item_type: "spell".into(),
        };
        assert!(entry.matches_name("fireball"));
        assert!(entry.matches_name("  FIREBALL "));
        assert!(!entry.matches_name("Fire Bolt"));
    }
}
