//! Page definitions and the route registry

use crate::fetch::{FetchFn, Message};
use anyhow::{bail, Result};
use maud::Markup;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// How a page's content is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Generated once and reused unchanged
    Static,

    /// Generated fresh on every request
    Dynamic,

    /// Static content refreshed in the background once a staleness window
    /// elapses
    Regenerating,
}

impl RenderMode {
    /// Whether records for this mode live in the render store
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Dynamic)
    }
}

/// Declared per-page rendering flag, as written in configuration
///
/// `Default` resolves to `Static` or `Regenerating` depending on whether a
/// revalidate window is declared alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeFlag {
    /// Treat the page as static regardless of its data fetching
    ForceStatic,

    /// Render the page on every request
    ForceDynamic,

    /// No explicit flag declared
    #[default]
    Default,
}

impl ModeFlag {
    /// Resolve the declared flag and optional revalidate window into an
    /// explicit render mode
    pub fn resolve(self, revalidate: Option<Duration>) -> RenderMode {
        match (self, revalidate) {
            (ModeFlag::ForceDynamic, _) => RenderMode::Dynamic,
            (_, Some(_)) => RenderMode::Regenerating,
            (_, None) => RenderMode::Static,
        }
    }
}

/// Validated per-page configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// Route path, e.g. "/isr"
    pub route: String,

    /// Heading shown on the rendered page
    pub title: String,

    /// Explicit render mode
    pub mode: RenderMode,

    /// Staleness window for regenerating pages
    pub stale_after: Option<Duration>,
}

impl PageConfig {
    /// Build a page configuration from the declared flag and revalidate
    /// window.
    ///
    /// Dynamic pages are never cached, so declaring a revalidate window
    /// together with `force-dynamic` is rejected.
    pub fn new(
        route: impl Into<String>,
        title: impl Into<String>,
        flag: ModeFlag,
        revalidate: Option<Duration>,
    ) -> Result<Self> {
        let route = route.into();

        if flag == ModeFlag::ForceDynamic && revalidate.is_some() {
            bail!(
                "dynamic pages are never cached; remove the revalidate window for {}",
                route
            );
        }

        let mode = flag.resolve(revalidate);

        Ok(Self {
            route,
            title: title.into(),
            mode,
            stale_after: revalidate,
        })
    }
}

/// Render callback turning a fetched message into page markup
pub type RenderFn = Arc<dyn Fn(&Message) -> Markup + Send + Sync>;

/// A registered page: configuration plus its fetch and render callbacks
#[derive(Clone)]
pub struct Page {
    pub config: PageConfig,
    pub fetch: FetchFn,
    pub render: RenderFn,
}

impl Page {
    /// Fetch the page's message and render it to an HTML string
    pub async fn generate(&self) -> Result<String> {
        let message = (self.fetch)().await?;
        Ok((self.render)(&message).into_string())
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("config", &self.config).finish()
    }
}

/// Route -> page registry with explicit registration
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: HashMap<String, Page>,
}

impl PageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page, rejecting duplicate routes
    pub fn register(&mut self, page: Page) -> Result<()> {
        let route = page.config.route.clone();

        if self.pages.contains_key(&route) {
            bail!("route already registered: {}", route);
        }

        self.pages.insert(route, page);
        Ok(())
    }

    /// Look up a page by route
    pub fn get(&self, route: &str) -> Option<&Page> {
        self.pages.get(route)
    }

    /// Iterate over all registered pages
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// All registered routes, sorted for stable iteration
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.pages.keys().cloned().collect();
        routes.sort();
        routes
    }

    /// Number of registered pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the registry has no pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
