//! Axum wiring for the demo server

use crate::pages;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use renderkit::{Config, Message, PageRegistry};
use renderkit_isr::{EngineConfig, RegenEngine};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Response header reporting how the content was obtained
pub const RENDER_CACHE_HEADER: &str = "x-render-cache";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RegenEngine>,
    pub registry: Arc<PageRegistry>,
}

/// Build the demo application: registry, engine, startup prerender, router
pub async fn build_app(config: &Config) -> Result<Router> {
    let registry = pages::demo_registry()?;
    let engine = RegenEngine::new(EngineConfig::from_settings(&config.cache)?).await?;

    let prerendered = engine.prerender(&registry).await?;
    info!("Prerendered {} static pages", prerendered);

    Ok(router(AppState {
        engine: Arc::new(engine),
        registry: Arc::new(registry),
    }))
}

/// Build the router over existing application state
pub fn router(state: AppState) -> Router {
    let mut app = Router::new().route("/api/message", get(api_message));

    for route in state.registry.routes() {
        app = app.route(&route, get(page_handler));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Serve the demo application until shutdown
pub async fn run(config: Config) -> Result<()> {
    let app = build_app(&config).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let route = uri.path();

    let Some(page) = state.registry.get(route) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.engine.get_or_render(page).await {
        Ok(outcome) => {
            let mut response = Html(outcome.html).into_response();

            if let Ok(value) = HeaderValue::from_str(&outcome.status.to_string()) {
                response.headers_mut().insert(RENDER_CACHE_HEADER, value);
            }

            response
        }
        Err(e) => {
            tracing::error!("Failed to render {}: {}", route, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// JSON endpoint backing the client-rendered page
async fn api_message() -> Json<Message> {
    Json(Message::new(pages::CSR_MESSAGE))
}
