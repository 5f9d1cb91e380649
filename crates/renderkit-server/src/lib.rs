//! Demo server for the renderkit rendering strategies
//!
//! Exposes one page per strategy (`/csr`, `/ssr`, `/ssg`, `/isr`) plus the
//! JSON endpoint backing the client-rendered page (`/api/message`).

pub mod pages;
pub mod server;

pub use server::{build_app, router, run, AppState, RENDER_CACHE_HEADER};
