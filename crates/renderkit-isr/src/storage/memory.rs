//! In-memory storage backend for render records

use crate::record::RenderRecord;
use crate::storage::Storage;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage backend
///
/// Stores render records in a HashMap. Fast but non-persistent - records
/// are lost on restart and re-created by the startup prerender.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    records: Arc<RwLock<HashMap<String, RenderRecord>>>,
}

impl MemoryStorage {
    /// Create a new memory storage backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Get store size (number of records)
    pub async fn size(&self) -> usize {
        self.records.read().await.len()
    }

    /// Get total bytes of stored HTML
    pub async fn total_bytes(&self) -> usize {
        self.records
            .read()
            .await
            .values()
            .map(|record| record.html.len())
            .sum()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<RenderRecord>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn set(&self, key: &str, record: RenderRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        let mut records = self.records.write().await;
        records.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        Ok(records.keys().cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
