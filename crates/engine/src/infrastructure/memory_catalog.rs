//! In-memory reference catalog.
//!
//! Used for runs without 5etools data and as a test double for the catalog
//! port.

use async_trait::async_trait;
use npcsmith_domain::CatalogRecord;

use crate::infrastructure::ports::{
    CatalogError, CatalogIndexEntry, CatalogInfo, CatalogKind, CatalogPort,
};

#[derive(Debug, Clone)]
struct MemoryCatalogEntry {
    info: CatalogInfo,
    records: Vec<CatalogRecord>,
}

/// Catalogs held in memory, enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    catalogs: Vec<MemoryCatalogEntry>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty catalog.
    pub fn with_catalog(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        kind: CatalogKind,
    ) -> Self {
        self.catalogs.push(MemoryCatalogEntry {
            info: CatalogInfo::new(id, label, kind),
            records: Vec::new(),
        });
        self
    }

    /// Add a record to the catalog named by `record.catalog_id`, creating an
    /// item catalog if it does not exist yet.
    pub fn with_record(mut self, record: CatalogRecord) -> Self {
        match self
            .catalogs
            .iter_mut()
            .find(|c| c.info.id == record.catalog_id)
        {
            Some(catalog) => catalog.records.push(record),
            None => self.catalogs.push(MemoryCatalogEntry {
                info: CatalogInfo::new(
                    record.catalog_id.clone(),
                    record.catalog_id.clone(),
                    CatalogKind::Item,
                ),
                records: vec![record],
            }),
        }
        self
    }

    fn catalog(&self, catalog_id: &str) -> Result<&MemoryCatalogEntry, CatalogError> {
        self.catalogs
            .iter()
            .find(|c| c.info.id == catalog_id)
            .ok_or_else(|| CatalogError::catalog_not_found(catalog_id))
    }
}

#[async_trait]
impl CatalogPort for MemoryCatalog {
    async fn list_catalogs(&self) -> Vec<CatalogInfo> {
        self.catalogs.iter().map(|c| c.info.clone()).collect()
    }

    async fn index(&self, catalog_id: &str) -> Result<Vec<CatalogIndexEntry>, CatalogError> {
        Ok(self
            .catalog(catalog_id)?
            .records
            .iter()
            .map(|r| CatalogIndexEntry {
                entry_id: r.entry_id.clone(),
                name: r.name.clone(),
                item_type: r.item_type.clone(),
            })
            .collect())
    }

    async fn document(
        &self,
        catalog_id: &str,
        entry_id: &str,
    ) -> Result<CatalogRecord, CatalogError> {
        self.catalog(catalog_id)?
            .records
            .iter()
            .find(|r| r.entry_id == entry_id)
            .cloned()
            .ok_or_else(|| CatalogError::entry_not_found(entry_id))
    }
}
