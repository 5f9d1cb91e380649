//! # Renderkit ISR - incremental static regeneration
//!
//! This crate implements the content freshness policy for renderkit pages.
//!
//! ## Features
//!
//! - **Explicit freshness decisions**: a pure function maps a page's render
//!   mode and record age to serve/regenerate/generate-fresh
//! - **Stale-While-Revalidate**: serve stored content while updating in the
//!   background; the triggering request never waits and never sees an error
//! - **Multiple Storage Backends**: memory, filesystem
//! - **On-Demand Revalidation**: invalidate stored records by route
//!
//! ## Example
//!
//! ```rust,no_run
//! use renderkit_isr::{EngineConfig, RegenEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = RegenEngine::new(EngineConfig::default()).await?;
//!
//!     // Use in your request handlers: engine.get_or_render(&page).await
//!     # let _ = engine;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod policy;
pub mod record;
pub mod storage;

pub use config::{EngineConfig, FilesystemConfig, StorageBackend};
pub use engine::{RegenEngine, RenderOutcome};
pub use policy::{decide, CacheStatus, Decision};
pub use record::{CacheStats, RenderRecord};
