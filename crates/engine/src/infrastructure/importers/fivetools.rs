//! 5etools-backed reference catalog.
//!
//! Exposes spells, feats, optional features and items from an extracted
//! 5etools directory as item catalogs. Each catalog is read on first use
//! and cached for the life of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use npcsmith_domain::CatalogRecord;
use serde_json::Value;
use tokio::fs;
use tokio::sync::OnceCell;

use super::fivetools_types::*;
use crate::infrastructure::ports::{
    CatalogError, CatalogIndexEntry, CatalogInfo, CatalogKind, CatalogPort, SPELL_CATALOG_ID,
};

pub const SPELLS_CATALOG: &str = SPELL_CATALOG_ID;
pub const FEATS_CATALOG: &str = "dnd5e.feats";
pub const OPTIONAL_FEATURES_CATALOG: &str = "dnd5e.optionalfeatures";
pub const ITEMS_CATALOG: &str = "dnd5e.items";

// {@tag content} or {@tag content|source|display}
static FIVETOOLS_TAG_REGEX: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\{@\w+\s+([^|}]+)(?:\|[^}]*)?\}").expect("valid regex")
});

/// Which 5etools file a catalog reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Spells,
    Feats,
    OptionalFeatures,
    Items,
}

impl Source {
    const ALL: [Source; 4] = [
        Source::Spells,
        Source::Feats,
        Source::OptionalFeatures,
        Source::Items,
    ];

    fn catalog_id(self) -> &'static str {
        match self {
            Source::Spells => SPELLS_CATALOG,
            Source::Feats => FEATS_CATALOG,
            Source::OptionalFeatures => OPTIONAL_FEATURES_CATALOG,
            Source::Items => ITEMS_CATALOG,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Source::Spells => "Spells (5etools)",
            Source::Feats => "Feats (5etools)",
            Source::OptionalFeatures => "Optional Features (5etools)",
            Source::Items => "Items (5etools)",
        }
    }

    fn from_catalog_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.catalog_id() == id)
    }

    /// File whose presence marks the catalog as available.
    fn marker(self, data_path: &Path) -> PathBuf {
        match self {
            Source::Spells => data_path.join("data/spells/index.json"),
            Source::Feats => data_path.join("data/feats.json"),
            Source::OptionalFeatures => data_path.join("data/optionalfeatures.json"),
            Source::Items => data_path.join("data/items.json"),
        }
    }
}

/// A loaded catalog: index in file order plus documents by id.
#[derive(Debug, Default)]
struct CatalogTable {
    index: Vec<CatalogIndexEntry>,
    documents: HashMap<String, CatalogRecord>,
}

impl CatalogTable {
    fn insert(&mut self, record: CatalogRecord) {
        if self.documents.contains_key(&record.entry_id) {
            return;
        }
        self.index.push(CatalogIndexEntry {
            entry_id: record.entry_id.clone(),
            name: record.name.clone(),
            item_type: record.item_type.clone(),
        });
        self.documents.insert(record.entry_id.clone(), record);
    }
}

/// Catalog over an extracted 5etools directory.
pub struct FiveToolsCatalog {
    data_path: PathBuf,
    spells: OnceCell<CatalogTable>,
    feats: OnceCell<CatalogTable>,
    optional_features: OnceCell<CatalogTable>,
    items: OnceCell<CatalogTable>,
}

impl FiveToolsCatalog {
    /// Create a catalog pointing to the root of an extracted 5etools
    /// folder, e.g. `/path/to/5etools-v2.22.0`.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            spells: OnceCell::new(),
            feats: OnceCell::new(),
            optional_features: OnceCell::new(),
            items: OnceCell::new(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn cell(&self, source: Source) -> &OnceCell<CatalogTable> {
        match source {
            Source::Spells => &self.spells,
            Source::Feats => &self.feats,
            Source::OptionalFeatures => &self.optional_features,
            Source::Items => &self.items,
        }
    }

    async fn table(&self, catalog_id: &str) -> Result<&CatalogTable, CatalogError> {
        let source = Source::from_catalog_id(catalog_id)
            .ok_or_else(|| CatalogError::catalog_not_found(catalog_id))?;

        self.cell(source)
            .get_or_try_init(|| async {
                let table = self.load(source).await?;
                tracing::debug!(
                    catalog = catalog_id,
                    entries = table.index.len(),
                    "Loaded 5etools catalog"
                );
                Ok::<_, CatalogError>(table)
            })
            .await
    }

    async fn load(&self, source: Source) -> Result<CatalogTable, CatalogError> {
        let marker = source.marker(&self.data_path);
        if !fs::try_exists(&marker).await.unwrap_or(false) {
            return Err(CatalogError::Unavailable(marker.display().to_string()));
        }

        let mut table = CatalogTable::default();
        match source {
            Source::Spells => {
                for entry in self.read_spells().await? {
                    table.insert(to_record(SPELLS_CATALOG, entry, "spell"));
                }
            }
            Source::Feats => {
                let file: FiveToolsFeatFile = read_json(&marker).await?;
                for entry in file.feat {
                    table.insert(to_record(FEATS_CATALOG, entry, "feat"));
                }
            }
            Source::OptionalFeatures => {
                let file: FiveToolsOptionalFeatureFile = read_json(&marker).await?;
                for entry in file.optionalfeature {
                    table.insert(to_record(OPTIONAL_FEATURES_CATALOG, entry, "feat"));
                }
            }
            Source::Items => {
                let file: FiveToolsItemFile = read_json(&marker).await?;
                for entry in file.item {
                    let item_type = item_type_for_code(entry.item_type.as_deref());
                    table.insert(to_record(ITEMS_CATALOG, entry, item_type));
                }
            }
        }
        Ok(table)
    }

    /// Read every per-source spell file listed in the spell index.
    async fn read_spells(&self) -> Result<Vec<FiveToolsEntry>, CatalogError> {
        let spells_dir = self.data_path.join("data/spells");
        let index: FiveToolsIndex = read_json(&spells_dir.join("index.json")).await?;

        let mut files: Vec<(String, String)> = index.into_iter().collect();
        files.sort();

        let mut spells = Vec::new();
        for (source, filename) in files {
            if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
                tracing::warn!(source = %source, filename = %filename, "Skipping spell file with invalid name");
                continue;
            }
            let file_path = spells_dir.join(&filename);
            if !fs::try_exists(&file_path).await.unwrap_or(false) {
                tracing::debug!(path = %file_path.display(), "Spell file listed in index is missing");
                continue;
            }
            let file: FiveToolsSpellFile = read_json(&file_path).await?;
            spells.extend(file.spell);
        }
        Ok(spells)
    }
}

#[async_trait]
impl CatalogPort for FiveToolsCatalog {
    async fn list_catalogs(&self) -> Vec<CatalogInfo> {
        let mut catalogs = Vec::new();
        for source in Source::ALL {
            if fs::try_exists(source.marker(&self.data_path))
                .await
                .unwrap_or(false)
            {
                catalogs.push(CatalogInfo::new(
                    source.catalog_id(),
                    source.label(),
                    CatalogKind::Item,
                ));
            }
        }
        catalogs
    }

    async fn index(&self, catalog_id: &str) -> Result<Vec<CatalogIndexEntry>, CatalogError> {
        Ok(self.table(catalog_id).await?.index.clone())
    }

    async fn document(
        &self,
        catalog_id: &str,
        entry_id: &str,
    ) -> Result<CatalogRecord, CatalogError> {
        self.table(catalog_id)
            .await?
            .documents
            .get(entry_id)
            .cloned()
            .ok_or_else(|| CatalogError::entry_not_found(entry_id))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn make_id(source: &str, name: &str) -> String {
    format!(
        "5e_{}_{}",
        source.to_lowercase(),
        name.to_lowercase().replace(' ', "_").replace('\'', "")
    )
}

fn to_record(catalog_id: &str, entry: FiveToolsEntry, item_type: &str) -> CatalogRecord {
    let mut data = entry.extra;
    data.insert("source".to_string(), Value::String(entry.source.clone()));
    data.insert(
        "description".to_string(),
        Value::String(entries_text(&entry.entries)),
    );

    CatalogRecord {
        catalog_id: catalog_id.to_string(),
        entry_id: make_id(&entry.source, &entry.name),
        name: entry.name,
        item_type: item_type.to_string(),
        data: Value::Object(data),
    }
}

/// Map a 5etools item type code to a host item type.
fn item_type_for_code(code: Option<&str>) -> &'static str {
    // Newer data qualifies codes with their source: "M|XPHB"
    let code = code
        .and_then(|c| c.split('|').next())
        .unwrap_or_default();
    match code {
        "M" | "R" => "weapon",
        "LA" | "MA" | "HA" | "S" => "equipment",
        "P" | "SC" => "consumable",
        _ => "loot",
    }
}

/// Flatten nested 5etools `entries` into plain paragraphs.
fn entries_text(entries: &[Value]) -> String {
    let mut paragraphs = Vec::new();
    collect_text(entries, &mut paragraphs);
    paragraphs.join("\n")
}

fn collect_text(entries: &[Value], out: &mut Vec<String>) {
    for entry in entries {
        match entry {
            Value::String(s) => out.push(clean_formatting(s)),
            Value::Object(obj) => {
                if let Some(Value::String(name)) = obj.get("name") {
                    out.push(clean_formatting(name));
                }
                for key in ["entries", "items"] {
                    if let Some(Value::Array(nested)) = obj.get(key) {
                        collect_text(nested, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Strip 5etools inline tags, keeping their display text.
fn clean_formatting(text: &str) -> String {
    FIVETOOLS_TAG_REGEX.replace_all(text, "$1").to_string()
}
