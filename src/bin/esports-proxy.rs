//! JSON routes for browser clients. Every route proxies PandaScore through
//! `PandaScoreApi`, so the token never leaves the server.
//!
//! Environment: `PANDA_KEY` and the other `PANDASCORE_*`/`LOLTERM_*` client
//! settings, plus `LOLTERM_BIND` (default 127.0.0.1:3000). Logging via `RUST_LOG`.
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info, warn};
use pandascore_api::client::{ApiError, PandaScoreApi};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

const NO_STORE: &str = "no-store";
const FIVE_MINUTES: &str = "public, max-age=300";
const TEN_MINUTES: &str = "public, max-age=600";

#[derive(Clone)]
struct ProxyState {
    api: Arc<PandaScoreApi>,
}

#[derive(Debug, Deserialize)]
struct PlayersQuery {
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

/// A failed upstream fetch, rendered as a 500 with `{error, details}`.
#[derive(Debug)]
struct ProxyError {
    message: &'static str,
    source: ApiError,
}

impl ProxyError {
    fn wrap(message: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| Self { message, source }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("{}: {}", self.message, self.source);
        let body = ErrorBody { error: self.message, details: self.source.to_string() };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn cached<T: Serialize>(cache_control: &'static str, body: T) -> Response {
    ([(header::CACHE_CONTROL, cache_control)], Json(body)).into_response()
}

async fn health() -> &'static str {
    "ok"
}

async fn live(State(state): State<ProxyState>) -> Result<Response, ProxyError> {
    let matches = state
        .api
        .fetch_live_matches()
        .await
        .map_err(ProxyError::wrap("Failed to fetch live matches"))?;
    Ok(cached(NO_STORE, matches))
}

async fn upcoming(State(state): State<ProxyState>) -> Result<Response, ProxyError> {
    let matches = state
        .api
        .fetch_upcoming_enriched()
        .await
        .map_err(ProxyError::wrap("Failed to fetch upcoming matches"))?;
    Ok(cached(FIVE_MINUTES, matches))
}

async fn players(
    State(state): State<ProxyState>,
    Query(query): Query<PlayersQuery>,
) -> Result<Response, ProxyError> {
    let search = query.search.as_deref().map(str::trim).unwrap_or_default();
    let players = if search.is_empty() {
        state.api.fetch_popular_players().await
    } else {
        state
            .api
            .search_players(search)
            .await
            .map_err(ProxyError::wrap("Failed to fetch players"))?
    };
    Ok(cached(FIVE_MINUTES, players))
}

async fn tournaments(State(state): State<ProxyState>) -> Result<Response, ProxyError> {
    let tournaments = state
        .api
        .fetch_running_tournaments()
        .await
        .map_err(ProxyError::wrap("Failed to fetch tournaments"))?;
    Ok(cached(TEN_MINUTES, tournaments))
}

fn build_router(api: PandaScoreApi) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/live", get(live))
        .route("/api/matches", get(upcoming))
        .route("/api/players", get(players))
        .route("/api/tournaments", get(tournaments))
        .with_state(ProxyState { api: Arc::new(api) })
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let api = PandaScoreApi::from_env();
    if api.config().token.is_none() {
        warn!("PANDA_KEY is not set; upstream requests will be unauthenticated");
    }

    let bind = std::env::var("LOLTERM_BIND")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("esports-proxy listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(api)).await?;
    Ok(())
}
