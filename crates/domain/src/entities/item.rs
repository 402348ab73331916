//! Sub-records attached to a generated character.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where an item's content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSource {
    /// Built from the model-generated name, type and payload.
    Generated,
    /// Copied from a canonical catalog entry.
    Catalog { catalog_id: String, entry_id: String },
}

/// An item to embed in a created character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpec {
    pub name: String,
    pub item_type: String,
    /// System-specific data, passed through to the host untouched.
    pub payload: Value,
    pub source: ItemSource,
}

impl ItemSpec {
    /// Minimal locally-constructed item.
    pub fn generated(name: impl Into<String>, item_type: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            item_type: item_type.into(),
            payload,
            source: ItemSource::Generated,
        }
    }

    pub fn is_from_catalog(&self) -> bool {
        matches!(self.source, ItemSource::Catalog { .. })
    }

    /// Host document for this item.
    pub fn to_document(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "type": self.item_type,
            "system": self.payload,
        })
    }
}

/// Canonical content fetched from a reference catalog.
///
/// Catalog records are never mutated; consumers clone them into new
/// [`ItemSpec`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub catalog_id: String,
    pub entry_id: String,
    pub name: String,
    pub item_type: String,
    pub data: Value,
}

impl CatalogRecord {
    /// Copy this record into a new item.
    pub fn to_item_spec(&self) -> ItemSpec {
        ItemSpec {
            name: self.name.clone(),
            item_type: self.item_type.clone(),
            payload: self.data.clone(),
            source: ItemSource::Catalog {
                catalog_id: self.catalog_id.clone(),
                entry_id: self.entry_id.clone(),
            },
        }
    }
}
