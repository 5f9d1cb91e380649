//! The four demo pages, one per rendering strategy

use anyhow::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use renderkit::{fetch, Message, ModeFlag, Page, PageConfig, PageRegistry};
use std::sync::Arc;
use std::time::Duration;

/// Message served by `/api/message` for the client-rendered page
pub const CSR_MESSAGE: &str = "Hello from Client-Side Rendering (CSR)!";

/// Staleness window for the regenerating demo page
pub const ISR_REVALIDATE: Duration = Duration::from_secs(10);

/// Build the registry of demo pages
pub fn demo_registry() -> Result<PageRegistry> {
    let mut registry = PageRegistry::new();

    // Client-side rendering: the server ships a static shell with a loading
    // placeholder; the browser fetches /api/message after mount.
    registry.register(Page {
        config: PageConfig::new(
            "/csr",
            "Client-Side Rendering (CSR)",
            ModeFlag::ForceStatic,
            None,
        )?,
        fetch: fetch::static_message("Loading..."),
        render: Arc::new(render_csr),
    })?;

    // Server-side rendering: generated fresh on every request.
    registry.register(Page {
        config: PageConfig::new(
            "/ssr",
            "Server-Side Rendering (SSR)",
            ModeFlag::ForceDynamic,
            None,
        )?,
        fetch: fetch::static_message("Hello from Server-Side Rendering (SSR)!"),
        render: Arc::new(render_ssr),
    })?;

    // Static generation: rendered once at startup, reused unchanged.
    registry.register(Page {
        config: PageConfig::new(
            "/ssg",
            "Static Site Generation (SSG)",
            ModeFlag::ForceStatic,
            None,
        )?,
        fetch: fetch::static_message("Hello from Static Site Generation (SSG)!"),
        render: Arc::new(render_ssg),
    })?;

    // Incremental static regeneration: the timestamp shows when the content
    // was last regenerated.
    registry.register(Page {
        config: PageConfig::new(
            "/isr",
            "Incremental Static Regeneration (ISR)",
            ModeFlag::ForceStatic,
            Some(ISR_REVALIDATE),
        )?,
        fetch: fetch::timestamped_message("Hello from ISR!"),
        render: Arc::new(render_isr),
    })?;

    Ok(registry)
}

fn render_csr(message: &Message) -> Markup {
    shell(
        "Client-Side Rendering (CSR)",
        html! {
            h1 { "Client-Side Rendering (CSR)" }
            p id="message" class="note" { (message.message) }
            script { (PreEscaped(CSR_SCRIPT)) }
        },
    )
}

fn render_ssr(message: &Message) -> Markup {
    shell(
        "Server-Side Rendering (SSR)",
        html! {
            h1 { "Server-Side Rendering (SSR)" }
            p class="msg-red" { (message.message) }
        },
    )
}

fn render_ssg(message: &Message) -> Markup {
    shell(
        "Static Site Generation (SSG)",
        html! {
            h1 { "Static Site Generation (SSG)" }
            p class="msg-red" { (message.message) }
        },
    )
}

fn render_isr(message: &Message) -> Markup {
    shell(
        "Incremental Static Regeneration (ISR)",
        html! {
            h1 { "Incremental Static Regeneration (ISR)" }
            p class="msg-green" { (message.message) }
            p class="note" { "This page will regenerate every 10 seconds." }
        },
    )
}

/// Shared document shell around a page body
fn shell(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(PAGE_STYLES)) }
            }
            body {
                div class="page" { (body) }
            }
        }
    }
}

const CSR_SCRIPT: &str = r#"
fetch('/api/message')
    .then((response) => response.json())
    .then((data) => {
        const el = document.getElementById('message');
        el.textContent = data.message;
        el.className = 'msg-blue';
    });
"#;

const PAGE_STYLES: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; }
.page { padding: 2.5rem; display: flex; flex-direction: column; gap: 0.75rem; align-items: flex-start; }
h1 { font-size: 1.875rem; font-weight: 400; margin: 0; }
.msg-blue { color: #3b82f6; font-size: 1.125rem; margin: 0; }
.msg-red { color: #ef4444; font-size: 1.125rem; margin: 0; }
.msg-green { color: #22c55e; font-size: 1.125rem; margin: 0; }
.note { color: #6b7280; margin: 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use renderkit::RenderMode;

    #[test]
    fn test_demo_registry_modes() {
        let registry = demo_registry().unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("/csr").unwrap().config.mode, RenderMode::Static);
        assert_eq!(registry.get("/ssr").unwrap().config.mode, RenderMode::Dynamic);
        assert_eq!(registry.get("/ssg").unwrap().config.mode, RenderMode::Static);
        assert_eq!(
            registry.get("/isr").unwrap().config.mode,
            RenderMode::Regenerating
        );
        assert_eq!(
            registry.get("/isr").unwrap().config.stale_after,
            Some(ISR_REVALIDATE)
        );
    }

    #[tokio::test]
    async fn test_csr_shell_contains_placeholder_and_script() {
        let registry = demo_registry().unwrap();
        let html = registry.get("/csr").unwrap().generate().await.unwrap();

        assert!(html.contains("Loading..."));
        assert!(html.contains("/api/message"));
    }

    #[tokio::test]
    async fn test_isr_page_notes_its_window() {
        let registry = demo_registry().unwrap();
        let html = registry.get("/isr").unwrap().generate().await.unwrap();

        assert!(html.contains("Hello from ISR! Timestamp: "));
        assert!(html.contains("This page will regenerate every 10 seconds."));
    }
}
