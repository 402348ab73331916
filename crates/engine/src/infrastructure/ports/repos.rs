//! Ports for the host's content: reference catalogs and the record store.

use async_trait::async_trait;
use npcsmith_domain::{CatalogRecord, ItemSpec};
use serde_json::Value;

use super::error::{CatalogError, RecordStoreError};
use super::types::{CatalogIndexEntry, CatalogInfo, RecordHandle};

// =============================================================================
// Reference Catalogs
// =============================================================================

/// Read-only canonical content, fetched index first then document.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Catalogs in enumeration order.
    async fn list_catalogs(&self) -> Vec<CatalogInfo>;

    async fn index(&self, catalog_id: &str) -> Result<Vec<CatalogIndexEntry>, CatalogError>;

    async fn document(
        &self,
        catalog_id: &str,
        entry_id: &str,
    ) -> Result<CatalogRecord, CatalogError>;
}

// =============================================================================
// Host Record Store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStorePort: Send + Sync {
    /// Create a top-level record from its host structure.
    async fn create_record(&self, data: &Value) -> Result<RecordHandle, RecordStoreError>;

    /// Embed items in a created record. Returns how many were created.
    async fn create_embedded_items(
        &self,
        handle: RecordHandle,
        items: &[ItemSpec],
    ) -> Result<usize, RecordStoreError>;
}
