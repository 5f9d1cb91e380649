//! Storage backends for render records

use crate::record::RenderRecord;
use anyhow::Result;
use async_trait::async_trait;

pub mod filesystem;
pub mod memory;

/// Trait for render record storage backends
///
/// `set` replaces the stored record wholesale, so readers never observe a
/// partially-updated record and concurrent writers race with
/// last-write-wins semantics.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get a stored record by route
    async fn get(&self, key: &str) -> Result<Option<RenderRecord>>;

    /// Store a record, replacing any previous one
    async fn set(&self, key: &str, record: RenderRecord) -> Result<()>;

    /// Delete a stored record
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Clear all stored records
    async fn clear(&self) -> Result<()>;

    /// Get all stored keys
    async fn keys(&self) -> Result<Vec<String>>;

    /// Get storage backend name
    fn name(&self) -> &'static str;
}
