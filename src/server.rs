//! HTTP boundary: `GET /api/scrape?keyword=<term>`.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::search::Searcher;

#[derive(Debug, Deserialize)]
struct ScrapeParams {
    keyword: Option<String>,
}

pub fn router(searcher: Searcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/scrape", get(scrape))
        .layer(cors)
        .with_state(searcher)
}

pub async fn start(bind: IpAddr, port: u16, searcher: Searcher) -> anyhow::Result<()> {
    let app = router(searcher);
    let addr = SocketAddr::new(bind, port);
    info!("Server running at http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn scrape(State(searcher): State<Searcher>, Query(params): Query<ScrapeParams>) -> Response {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if keyword.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "keyword is required");
    }

    // Spawned so a panic inside extraction surfaces as a 500 instead of a
    // dropped connection.
    let task = tokio::spawn(async move { searcher.search(&keyword).await });
    match task.await {
        Ok(Ok(products)) => Json(products).into_response(),
        Ok(Err(e)) => {
            error!("Scrape failed: {e}");
            error_response(StatusCode::BAD_GATEWAY, "marketplace unavailable")
        }
        Err(e) => {
            error!("Scrape task aborted: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during scraping",
            )
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
