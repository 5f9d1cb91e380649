//! Regeneration engine - stale-while-revalidate over the render store

use crate::config::{EngineConfig, StorageBackend};
use crate::policy::{decide, CacheStatus, Decision};
use crate::record::{CacheStats, RenderRecord};
use crate::storage::Storage;
use anyhow::{Context, Result};
use chrono::Utc;
use renderkit::{Page, PageRegistry, RenderMode};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the engine produced for a single request
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// HTML to serve
    pub html: String,

    /// How the content was obtained
    pub status: CacheStatus,
}

/// Regeneration engine for managing stored page renders
pub struct RegenEngine {
    storage: Arc<dyn Storage>,
    stats: Arc<RwLock<CacheStats>>,
}

impl RegenEngine {
    /// Create a new regeneration engine
    pub async fn new(config: EngineConfig) -> Result<Self> {
        let storage = Self::create_storage(&config.storage).await?;

        Ok(Self {
            storage,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        })
    }

    /// Create a storage backend from config
    async fn create_storage(backend: &StorageBackend) -> Result<Arc<dyn Storage>> {
        match backend {
            StorageBackend::Memory => {
                use crate::storage::memory::MemoryStorage;
                Ok(Arc::new(MemoryStorage::new()))
            }
            StorageBackend::Filesystem(config) => {
                use crate::storage::filesystem::FilesystemStorage;
                let storage = FilesystemStorage::new(config.clone()).await?;
                Ok(Arc::new(storage))
            }
        }
    }

    /// Serve a page according to the freshness policy
    ///
    /// - Dynamic pages are generated fresh on every request and never stored.
    /// - Missing records are generated synchronously and stored.
    /// - Fresh records are served unchanged.
    /// - Stale records are served unchanged while a background task
    ///   regenerates them; the triggering request never waits.
    pub async fn get_or_render(&self, page: &Page) -> Result<RenderOutcome> {
        if page.config.mode == RenderMode::Dynamic {
            let html = page.generate().await?;
            return Ok(RenderOutcome {
                html,
                status: CacheStatus::Bypass,
            });
        }

        let route = page.config.route.as_str();

        if let Some(record) = self.storage.get(route).await? {
            self.record_hit().await;

            let decision = decide(
                page.config.mode,
                record.generated_at,
                record.stale_after,
                Utc::now(),
            );

            match decision {
                Decision::ServeCached => Ok(RenderOutcome {
                    html: record.html,
                    status: CacheStatus::Hit,
                }),
                Decision::ServeCachedAndRegenerateAsync => {
                    // Stale-while-revalidate: serve the old record, refresh
                    // out of band
                    self.spawn_regeneration(page.clone());

                    Ok(RenderOutcome {
                        html: record.html,
                        status: CacheStatus::Stale,
                    })
                }
                Decision::GenerateSynchronously => {
                    let html = page.generate().await?;
                    Ok(RenderOutcome {
                        html,
                        status: CacheStatus::Bypass,
                    })
                }
            }
        } else {
            self.record_miss().await;

            // Not stored yet, generate now
            let html = page.generate().await?;
            let record = RenderRecord::new(html.clone(), page.config.stale_after);
            self.storage.set(route, record).await?;

            Ok(RenderOutcome {
                html,
                status: CacheStatus::Miss,
            })
        }
    }

    /// Dispatch a background regeneration for a page
    ///
    /// No single-flight deduplication: concurrent stale observers may each
    /// dispatch a regeneration, and the last successful write wins.
    fn spawn_regeneration(&self, page: Page) {
        let engine = self.clone();

        tokio::spawn(async move {
            if let Err(e) = engine.regenerate(&page).await {
                tracing::warn!(
                    "Regeneration failed for {}: {} - keeping stale content",
                    page.config.route,
                    e
                );
            }
        });
    }

    /// Re-render a page and replace its stored record
    ///
    /// A failed render returns the error without touching the previous
    /// record; the next stale request triggers the next attempt.
    pub async fn regenerate(&self, page: &Page) -> Result<()> {
        let route = page.config.route.as_str();

        let html = page.generate().await?;

        let mut record = RenderRecord::new(html, page.config.stale_after);
        if let Some(previous) = self.storage.get(route).await? {
            record.metadata = previous.metadata;
        }
        record.metadata.record_regeneration();

        self.storage.set(route, record).await?;
        self.bump_regenerations().await;

        tracing::info!("Regenerated {}", route);
        Ok(())
    }

    /// Render and store every cacheable page once (the "build" step)
    ///
    /// Returns the number of pages rendered. Dynamic pages are skipped.
    pub async fn prerender(&self, registry: &PageRegistry) -> Result<usize> {
        let mut count = 0;

        for page in registry.pages() {
            if !page.config.mode.is_cacheable() {
                continue;
            }

            let html = page
                .generate()
                .await
                .with_context(|| format!("Failed to prerender {}", page.config.route))?;

            let record = RenderRecord::new(html, page.config.stale_after);
            self.storage.set(&page.config.route, record).await?;
            count += 1;
        }

        Ok(count)
    }

    /// Get a stored record by route
    pub async fn get(&self, route: &str) -> Result<Option<RenderRecord>> {
        self.storage.get(route).await
    }

    /// Store a record directly, replacing any previous one
    pub async fn set(&self, route: &str, record: RenderRecord) -> Result<()> {
        self.storage.set(route, record).await
    }

    /// Drop the stored record for a route so the next request regenerates it
    pub async fn revalidate(&self, route: &str) -> Result<()> {
        self.storage.delete(route).await
    }

    /// Revalidate multiple routes
    pub async fn revalidate_many(&self, routes: &[String]) -> Result<()> {
        for route in routes {
            self.revalidate(route).await.ok();
        }
        Ok(())
    }

    /// Clear all stored records and reset statistics
    pub async fn clear(&self) -> Result<()> {
        self.storage.clear().await?;

        let mut stats = self.stats.write().await;
        *stats = CacheStats::default();

        Ok(())
    }

    /// Get engine statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    async fn record_hit(&self) {
        let mut stats = self.stats.write().await;
        stats.hits += 1;
    }

    async fn record_miss(&self) {
        let mut stats = self.stats.write().await;
        stats.misses += 1;
    }

    async fn bump_regenerations(&self) {
        let mut stats = self.stats.write().await;
        stats.regenerations += 1;
    }
}

impl Clone for RegenEngine {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            stats: Arc::clone(&self.stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use maud::html;
    use renderkit::{fetch, ModeFlag, PageConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Page whose fetch callback counts invocations and returns "v{n}"
    fn counting_page(
        route: &str,
        flag: ModeFlag,
        revalidate: Option<Duration>,
        counter: Arc<AtomicUsize>,
    ) -> Page {
        Page {
            config: PageConfig::new(route, "Test", flag, revalidate).unwrap(),
            fetch: Arc::new(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Box::pin(async move { Ok(fetch::Message::new(format!("v{}", n))) })
            }),
            render: Arc::new(|message| html! { p { (message.message) } }),
        }
    }

    /// Page whose fetch succeeds once and fails afterwards
    fn failing_after_first_page(route: &str, counter: Arc<AtomicUsize>) -> Page {
        Page {
            config: PageConfig::new(route, "Test", ModeFlag::ForceStatic, Some(Duration::ZERO))
                .unwrap(),
            fetch: Arc::new(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        Ok(fetch::Message::new("v1"))
                    } else {
                        Err(anyhow::anyhow!("upstream unavailable"))
                    }
                })
            }),
            render: Arc::new(|message| html! { p { (message.message) } }),
        }
    }

    async fn memory_engine() -> RegenEngine {
        RegenEngine::new(EngineConfig::default()).await.unwrap()
    }

    /// Poll the store until the record for `route` satisfies `pred`
    async fn wait_for_record(
        engine: &RegenEngine,
        route: &str,
        pred: impl Fn(&RenderRecord) -> bool,
    ) -> Option<RenderRecord> {
        for _ in 0..100 {
            if let Some(record) = engine.get(route).await.unwrap() {
                if pred(&record) {
                    return Some(record);
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_miss_generates_and_stores() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page("/ssg", ModeFlag::ForceStatic, None, counter.clone());

        let first = engine.get_or_render(&page).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.html, "<p>v1</p>");

        // Second request is served from the store without re-fetching
        let second = engine.get_or_render(&page).await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.html, "<p>v1</p>");
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let stats = engine.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_dynamic_bypasses_store_and_refetches() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page("/ssr", ModeFlag::ForceDynamic, None, counter.clone());

        let first = engine.get_or_render(&page).await.unwrap();
        let second = engine.get_or_render(&page).await.unwrap();

        assert_eq!(first.status, CacheStatus::Bypass);
        assert_eq!(second.status, CacheStatus::Bypass);
        assert_eq!(first.html, "<p>v1</p>");
        assert_eq!(second.html, "<p>v2</p>");

        // Nothing was stored
        assert!(engine.get("/ssr").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_serves_old_content_and_regenerates() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        // Zero window: stale immediately after generation
        let page = counting_page(
            "/isr",
            ModeFlag::ForceStatic,
            Some(Duration::ZERO),
            counter.clone(),
        );

        let first = engine.get_or_render(&page).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        // Stale request still receives the old content
        let second = engine.get_or_render(&page).await.unwrap();
        assert_eq!(second.status, CacheStatus::Stale);
        assert_eq!(second.html, "<p>v1</p>");

        // The background task replaces the record
        let record = wait_for_record(&engine, "/isr", |r| r.html == "<p>v2</p>")
            .await
            .expect("background regeneration should replace the record");
        assert_eq!(record.metadata.regenerations, 1);
    }

    #[tokio::test]
    async fn test_failed_regeneration_keeps_previous_record() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = failing_after_first_page("/isr", counter.clone());

        let first = engine.get_or_render(&page).await.unwrap();
        assert_eq!(first.html, "<p>v1</p>");

        // Each stale request serves v1 and triggers another failing attempt
        for _ in 0..3 {
            let outcome = engine.get_or_render(&page).await.unwrap();
            assert_eq!(outcome.status, CacheStatus::Stale);
            assert_eq!(outcome.html, "<p>v1</p>");
        }

        // Give the background tasks time to fail
        tokio::time::sleep(Duration::from_millis(50)).await;

        let record = engine.get("/isr").await.unwrap().unwrap();
        assert_eq!(record.html, "<p>v1</p>");
        assert_eq!(record.metadata.regenerations, 0);

        // The fetch callback kept being retried
        assert!(counter.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_regenerate_updates_generated_at() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page(
            "/isr",
            ModeFlag::ForceStatic,
            Some(Duration::from_secs(60)),
            counter.clone(),
        );

        // Store a record that is already past its window
        let mut record = RenderRecord::new("<p>old</p>".to_string(), Some(Duration::from_secs(60)));
        record.generated_at = Utc::now() - TimeDelta::seconds(120);
        engine.set("/isr", record.clone()).await.unwrap();

        engine.regenerate(&page).await.unwrap();

        let updated = engine.get("/isr").await.unwrap().unwrap();
        assert_eq!(updated.html, "<p>v1</p>");
        assert!(updated.generated_at > record.generated_at);

        // Fresh again within the new window
        let outcome = engine.get_or_render(&page).await.unwrap();
        assert_eq!(outcome.status, CacheStatus::Hit);
    }

    #[tokio::test]
    async fn test_concurrent_regenerations_tolerated() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page(
            "/isr",
            ModeFlag::ForceStatic,
            Some(Duration::ZERO),
            counter.clone(),
        );

        engine.get_or_render(&page).await.unwrap();

        // No single-flight guarantee: both regenerations run, last write wins
        let (a, b) = tokio::join!(engine.regenerate(&page), engine.regenerate(&page));
        a.unwrap();
        b.unwrap();

        let record = engine.get("/isr").await.unwrap().unwrap();
        assert!(record.html == "<p>v2</p>" || record.html == "<p>v3</p>");
        assert_eq!(engine.stats().await.regenerations, 2);
    }

    #[tokio::test]
    async fn test_prerender_covers_cacheable_pages_only() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));

        let mut registry = PageRegistry::new();
        registry
            .register(counting_page(
                "/ssg",
                ModeFlag::ForceStatic,
                None,
                counter.clone(),
            ))
            .unwrap();
        registry
            .register(counting_page(
                "/isr",
                ModeFlag::ForceStatic,
                Some(Duration::from_secs(10)),
                counter.clone(),
            ))
            .unwrap();
        registry
            .register(counting_page(
                "/ssr",
                ModeFlag::ForceDynamic,
                None,
                counter.clone(),
            ))
            .unwrap();

        let count = engine.prerender(&registry).await.unwrap();
        assert_eq!(count, 2);

        assert!(engine.get("/ssg").await.unwrap().is_some());
        assert!(engine.get("/isr").await.unwrap().is_some());
        assert!(engine.get("/ssr").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revalidate_drops_record() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page("/ssg", ModeFlag::ForceStatic, None, counter.clone());

        engine.get_or_render(&page).await.unwrap();
        assert!(engine.get("/ssg").await.unwrap().is_some());

        engine.revalidate("/ssg").await.unwrap();
        assert!(engine.get("/ssg").await.unwrap().is_none());

        // Next request regenerates
        let outcome = engine.get_or_render(&page).await.unwrap();
        assert_eq!(outcome.status, CacheStatus::Miss);
        assert_eq!(outcome.html, "<p>v2</p>");
    }

    #[tokio::test]
    async fn test_clear_resets_stats() {
        let engine = memory_engine().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let page = counting_page("/ssg", ModeFlag::ForceStatic, None, counter);

        engine.get_or_render(&page).await.unwrap();
        engine.get_or_render(&page).await.unwrap();
        assert_eq!(engine.stats().await.hits, 1);

        engine.clear().await.unwrap();

        let stats = engine.stats().await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert!(engine.get("/ssg").await.unwrap().is_none());
    }
}
