//! End-to-end tests for the demo pages
//!
//! Each test builds the full application (registry + engine + startup
//! prerender) and drives it through tower's `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use renderkit::Config;
use renderkit_server::{build_app, RENDER_CACHE_HEADER};
use rstest::rstest;
use tower::ServiceExt;

async fn app() -> axum::Router {
    build_app(&Config::default()).await.unwrap()
}

/// Issue a GET and return (status, x-render-cache header, body)
async fn get_page(app: &axum::Router, path: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_status = response
        .headers()
        .get(RENDER_CACHE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    (status, cache_status, body)
}

#[rstest]
#[case("/csr", "Client-Side Rendering (CSR)")]
#[case("/ssr", "Hello from Server-Side Rendering (SSR)!")]
#[case("/ssg", "Hello from Static Site Generation (SSG)!")]
#[case("/isr", "Hello from ISR! Timestamp: ")]
#[tokio::test]
async fn test_pages_render_their_content(#[case] path: &str, #[case] needle: &str) {
    let app = app().await;

    let (status, _, body) = get_page(&app, path).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(needle), "missing {:?} in {}", needle, path);
}

#[tokio::test]
async fn test_ssg_is_identical_on_every_request() {
    let app = app().await;

    let (_, first_status, first_body) = get_page(&app, "/ssg").await;
    let (_, second_status, second_body) = get_page(&app, "/ssg").await;

    // Prerendered at startup, so every request is a store hit
    assert_eq!(first_status.as_deref(), Some("HIT"));
    assert_eq!(second_status.as_deref(), Some("HIT"));
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_ssr_bypasses_the_store() {
    let app = app().await;

    let (_, first_status, _) = get_page(&app, "/ssr").await;
    let (_, second_status, _) = get_page(&app, "/ssr").await;

    assert_eq!(first_status.as_deref(), Some("BYPASS"));
    assert_eq!(second_status.as_deref(), Some("BYPASS"));
}

#[tokio::test]
async fn test_isr_serves_prerendered_content_within_window() {
    let app = app().await;

    let (_, cache_status, body) = get_page(&app, "/isr").await;

    // The 10-second window has not elapsed since startup prerender
    assert_eq!(cache_status.as_deref(), Some("HIT"));
    assert!(body.contains("This page will regenerate every 10 seconds."));
}

#[tokio::test]
async fn test_csr_ships_a_loading_shell() {
    let app = app().await;

    let (_, cache_status, body) = get_page(&app, "/csr").await;

    assert_eq!(cache_status.as_deref(), Some("HIT"));
    assert!(body.contains("Loading..."));
    assert!(body.contains("/api/message"));
}

#[tokio::test]
async fn test_api_message_returns_json_payload() {
    let app = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/message")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        payload["message"],
        "Hello from Client-Side Rendering (CSR)!"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app().await;

    let (status, _, _) = get_page(&app, "/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
