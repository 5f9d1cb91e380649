//! Stored render records and cache statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored render of a single page
///
/// Owned by the regeneration engine: created at first successful render or
/// at startup prerender, superseded in place by a successful regeneration,
/// never explicitly destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRecord {
    /// The rendered HTML content
    pub html: String,

    /// When the content was generated
    pub generated_at: DateTime<Utc>,

    /// Staleness window; `None` means the content never goes stale
    pub stale_after: Option<Duration>,

    /// Regeneration bookkeeping
    pub metadata: RecordMetadata,
}

impl RenderRecord {
    /// Create a new record generated now
    pub fn new(html: String, stale_after: Option<Duration>) -> Self {
        Self {
            html,
            generated_at: Utc::now(),
            stale_after,
            metadata: RecordMetadata::default(),
        }
    }

    /// Check if the record is stale at the given instant
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.stale_after {
            None => false,
            Some(window) => self.age_at(now) >= window,
        }
    }

    /// Check if the record is stale now
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    /// Age of the record at the given instant
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.generated_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Age of the record now
    pub fn age(&self) -> Duration {
        self.age_at(Utc::now())
    }
}

/// Regeneration bookkeeping for a record
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordMetadata {
    /// Number of times this record has been regenerated in place
    pub regenerations: u64,

    /// Most recent successful regeneration
    pub last_regenerated: Option<DateTime<Utc>>,
}

impl RecordMetadata {
    /// Increment regeneration count
    pub fn record_regeneration(&mut self) {
        self.regenerations += 1;
        self.last_regenerated = Some(Utc::now());
    }
}

/// Statistics for the regeneration engine
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total number of requests served from the store
    pub hits: u64,

    /// Total number of requests that had to generate content
    pub misses: u64,

    /// Total number of successful regenerations
    pub regenerations: u64,
}

impl CacheStats {
    /// Calculate store hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
