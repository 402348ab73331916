//! In-memory host record store.
//!
//! Stands in for the host application's document database: created records
//! are kept as their materialized JSON documents, keyed by handle.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use npcsmith_domain::ItemSpec;
use serde_json::Value;

use crate::infrastructure::clock::SystemRandom;
use crate::infrastructure::ports::{RandomPort, RecordHandle, RecordStoreError, RecordStorePort};

pub struct InMemoryRecordStore {
    records: DashMap<RecordHandle, Value>,
    random: Arc<dyn RandomPort>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::with_random(Arc::new(SystemRandom::new()))
    }

    /// Store that takes record handles from `random`.
    pub fn with_random(random: Arc<dyn RandomPort>) -> Self {
        Self {
            records: DashMap::new(),
            random,
        }
    }

    /// The stored document for `handle`, items included.
    pub fn get(&self, handle: RecordHandle) -> Option<Value> {
        self.records.get(&handle).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStorePort for InMemoryRecordStore {
    async fn create_record(&self, data: &Value) -> Result<RecordHandle, RecordStoreError> {
        let Some(fields) = data.as_object() else {
            return Err(RecordStoreError::creation(
                "create_record",
                "record data must be a JSON object",
            ));
        };
        if !fields.get("name").is_some_and(Value::is_string) {
            return Err(RecordStoreError::creation(
                "create_record",
                "record data has no name",
            ));
        }

        let handle = RecordHandle(self.random.gen_uuid());
        if self.records.contains_key(&handle) {
            return Err(RecordStoreError::creation(
                "create_record",
                format!("handle {} already in use", handle),
            ));
        }

        let mut document = fields.clone();
        document.insert("items".to_string(), Value::Array(Vec::new()));
        self.records.insert(handle, Value::Object(document));
        tracing::debug!(handle = %handle, "Created record");
        Ok(handle)
    }

    async fn create_embedded_items(
        &self,
        handle: RecordHandle,
        items: &[ItemSpec],
    ) -> Result<usize, RecordStoreError> {
        let mut record = self
            .records
            .get_mut(&handle)
            .ok_or_else(|| RecordStoreError::NotFound(handle.to_string()))?;

        let Some(Value::Array(embedded)) = record.get_mut("items") else {
            return Err(RecordStoreError::creation(
                "create_embedded_items",
                format!("record {} has no item list", handle),
            ));
        };
        embedded.extend(items.iter().map(ItemSpec::to_document));
        Ok(items.len())
    }
}
