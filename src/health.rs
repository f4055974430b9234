//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, route table metadata, and cumulative dispatch counters.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub source: String,
    pub version: String,
    pub routes: usize,
    /// Registry entries, implicit redirects included.
    pub entries: usize,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_dispatched: u64,
    pub requests_redirected: u64,
    pub requests_not_found: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.mux.stats();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            source: state.config.source_name.clone(),
            version: state.config.version.short().to_string(),
            routes: state.config.routes,
            entries: state.mux.len(),
        },
        stats: StatsResponse {
            requests_dispatched: stats.dispatched,
            requests_redirected: stats.redirected,
            requests_not_found: stats.not_found,
        },
    })
}
