//! The content freshness policy
//!
//! Decides, for a single request, whether to serve stored content unchanged,
//! serve it while regenerating in the background, or generate fresh content
//! before responding. The decision is a pure function of the page's render
//! mode and the record's age, so every branch is testable without a clock.

use chrono::{DateTime, Utc};
use renderkit::RenderMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a freshness check for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Serve the stored content unchanged
    ServeCached,

    /// Serve the stored content and refresh it out of band
    ServeCachedAndRegenerateAsync,

    /// Generate fresh content before responding
    GenerateSynchronously,
}

/// Decide how to answer a request for a page
///
/// Stale-while-revalidate semantics: once the window has elapsed the
/// triggering request still receives the old content; regeneration happens
/// out of band and updates `generated_at` on success. Repeated stale
/// requests keep producing `ServeCachedAndRegenerateAsync` until a
/// regeneration succeeds.
pub fn decide(
    mode: RenderMode,
    generated_at: DateTime<Utc>,
    stale_after: Option<Duration>,
    now: DateTime<Utc>,
) -> Decision {
    match (mode, stale_after) {
        // Dynamic pages are never cached
        (RenderMode::Dynamic, _) => Decision::GenerateSynchronously,

        // Content fixed at build time
        (_, None) => Decision::ServeCached,

        (_, Some(window)) => {
            let age = now
                .signed_duration_since(generated_at)
                .to_std()
                .unwrap_or(Duration::ZERO);

            if age < window {
                Decision::ServeCached
            } else {
                Decision::ServeCachedAndRegenerateAsync
            }
        }
    }
}

/// How a response's content was obtained, reported in the
/// `x-render-cache` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh record served from the store
    Hit,

    /// Stale record served while regenerating
    Stale,

    /// No record existed; generated and stored
    Miss,

    /// Dynamic page; the store was not consulted
    Bypass,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Stale => write!(f, "STALE"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}
