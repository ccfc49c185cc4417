//! Read-only REST endpoints. Each request authenticates, fetches the listing
//! once and answers; nothing is cached between requests.

use crate::reddit_logic::config::Config;
use crate::reddit_logic::state::AppState;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use lib_common::ingestors::reddit_polling::fetch_payload;
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

pub const TOP_POSTS_PATH: &str = "/api/science/top-posts";
pub const TOP_USERS_PATH: &str = "/api/science/top-users";

pub fn router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new().allow_methods([Method::GET]);
    match HeaderValue::from_str(cors_origin) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => log::warn!("Ignoring invalid CORS origin {:?}: {}", cors_origin, e),
    }

    Router::new()
        .route(TOP_POSTS_PATH, get(top_posts_handler))
        .route(TOP_USERS_PATH, get(top_users_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn run(config: Config, state: AppState, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    log::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state, config.cors_origin()))
        .with_graceful_shutdown(async move {
            shutdown.recv().await.ok();
            log::info!("HTTP server shutting down.");
        })
        .await?;
    Ok(())
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn top_posts_handler(State(state): State<AppState>) -> Response {
    match fetch_payload(state.source.as_ref()).await {
        Ok(payload) => Json(payload.top_items).into_response(),
        Err(e) => internal_error(TOP_POSTS_PATH, &e),
    }
}

async fn top_users_handler(State(state): State<AppState>) -> Response {
    match fetch_payload(state.source.as_ref()).await {
        Ok(payload) => Json(payload.top_contributors).into_response(),
        Err(e) => internal_error(TOP_USERS_PATH, &e),
    }
}

// The client only ever sees a fixed body; details stay in the log.
fn internal_error(path: &str, error: &dyn std::fmt::Display) -> Response {
    log::error!("GET {} failed: {}", path, error);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit_logic::testing::{FailingSource, StaticSource};
    use lib_common::sources::reddit::TopItemsSource;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    async fn serve(source: Arc<dyn TopItemsSource>) -> String {
        let state = AppState::new(source, Duration::from_secs(10));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state, "http://localhost:3000")).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn top_posts_returns_the_raw_items() {
        let base = serve(Arc::new(StaticSource)).await;
        let resp = reqwest::get(format!("{base}{TOP_POSTS_PATH}")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["data"]["author"], "u2");
    }

    #[tokio::test]
    async fn top_users_returns_the_ranking() {
        let base = serve(Arc::new(StaticSource)).await;
        let body: Value = reqwest::get(format!("{base}{TOP_USERS_PATH}"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!([{"user": "u1", "count": 2}, {"user": "u2", "count": 1}]));
    }

    #[tokio::test]
    async fn upstream_failures_become_a_plain_500() {
        let base = serve(Arc::new(FailingSource)).await;
        for path in [TOP_POSTS_PATH, TOP_USERS_PATH] {
            let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
            assert_eq!(resp.status(), 500);
            let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
            assert!(content_type.starts_with("text/plain"), "{content_type}");
            assert_eq!(resp.text().await.unwrap(), "Internal server error");
        }
    }

    #[tokio::test]
    async fn cors_allows_the_configured_origin() {
        let base = serve(Arc::new(StaticSource)).await;
        let resp = reqwest::Client::new()
            .get(format!("{base}{TOP_USERS_PATH}"))
            .header("Origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.headers()["access-control-allow-origin"], "http://localhost:3000");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = serve(Arc::new(FailingSource)).await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
