//! # Renderkit - rendering-strategy demo framework
//!
//! Core types for a small framework that serves the same page content under
//! different rendering strategies:
//!
//! - **Static**: generated once and reused unchanged
//! - **Dynamic**: generated fresh on every request
//! - **Regenerating**: static content refreshed in the background once a
//!   staleness window elapses (incremental static regeneration)
//!
//! Pages declare their mode explicitly at registration time; there is no
//! inference from code shape. The regeneration machinery itself lives in
//! the `renderkit-isr` crate.

pub mod config;
pub mod fetch;
pub mod page;

pub use config::Config;
pub use fetch::{BoxFuture, FetchFn, Message};
pub use page::{ModeFlag, Page, PageConfig, PageRegistry, RenderFn, RenderMode};

// Re-export Maud for page markup
pub use maud::{html as maud, Markup, PreEscaped, DOCTYPE};
