//! Raw 5etools JSON structures.
//!
//! Only the fields the catalog indexes on are typed; everything else is
//! carried through untouched in `extra`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// `data/spells/index.json`: source abbreviation to file name.
pub type FiveToolsIndex = HashMap<String, String>;

/// One named entry from any 5etools content file.
#[derive(Debug, Clone, Deserialize)]
pub struct FiveToolsEntry {
    pub name: String,
    pub source: String,
    /// Item type code, e.g. `M`, `HA`, `P|XDMG`. Absent for spells and feats.
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-source spell file, e.g. `spells-phb.json`.
#[derive(Debug, Deserialize)]
pub struct FiveToolsSpellFile {
    #[serde(default)]
    pub spell: Vec<FiveToolsEntry>,
}

/// `data/feats.json`.
#[derive(Debug, Deserialize)]
pub struct FiveToolsFeatFile {
    #[serde(default)]
    pub feat: Vec<FiveToolsEntry>,
}

/// `data/optionalfeatures.json`.
#[derive(Debug, Deserialize)]
pub struct FiveToolsOptionalFeatureFile {
    #[serde(default)]
    pub optionalfeature: Vec<FiveToolsEntry>,
}

/// `data/items.json`.
#[derive(Debug, Deserialize)]
pub struct FiveToolsItemFile {
    #[serde(default)]
    pub item: Vec<FiveToolsEntry>,
}
