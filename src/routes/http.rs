// GET handlers: version and host stats

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::{ApiError, AppState, blocking};
use crate::models::{CpuStats, MemoryStats, Uptime};
use crate::stats_repo::DeviceKind;

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UptimeQuery {
    #[serde(default)]
    indexed: bool,
}

/// GET /api/stats/uptime?indexed=true
pub(super) async fn uptime_handler(
    State(state): State<AppState>,
    Query(q): Query<UptimeQuery>,
) -> Result<Json<Uptime>, ApiError> {
    let repo = state.stats_repo.clone();
    let uptime = blocking(move || repo.uptime(q.indexed)).await?;
    Ok(Json(uptime))
}

/// GET /api/stats/loadavg
pub(super) async fn load_average_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = state.stats_repo.clone();
    let load = blocking(move || repo.get_load_average()).await?;
    Ok(Json(serde_json::json!({ "loadAverage": load })))
}

/// GET /api/stats/memory
pub(super) async fn memory_handler(
    State(state): State<AppState>,
) -> Result<Json<MemoryStats>, ApiError> {
    let repo = state.stats_repo.clone();
    Ok(Json(blocking(move || repo.get_memory_stats()).await?))
}

/// GET /api/stats/cpu — blocks a worker thread for the sample interval.
pub(super) async fn cpu_handler(State(state): State<AppState>) -> Result<Json<CpuStats>, ApiError> {
    let repo = state.stats_repo.clone();
    Ok(Json(blocking(move || repo.get_cpu_stats()).await?))
}

/// GET /api/stats/root-device
pub(super) async fn root_device_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = state.stats_repo.clone();
    let device = blocking(move || repo.get_root_device_file()).await?;
    Ok(Json(serde_json::json!({ "deviceFile": device })))
}

/// GET /api/stats/login-defs — 404 when /etc/login.defs is unreadable.
pub(super) async fn login_defs_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = state.stats_repo.clone();
    let defs = blocking(move || Ok(repo.get_login_defs())).await?;
    defs.map(Json)
        .ok_or_else(|| ApiError::NotFound("login.defs unavailable".into()))
}

#[derive(Debug, Deserialize)]
pub(super) struct NextDeviceQuery {
    #[serde(rename = "type")]
    kind: DeviceKind,
    name: String,
}

/// GET /api/devices/next?type=disk&name=md — `{"device": null}` when 0..=255 are all taken.
pub(super) async fn next_device_handler(
    State(state): State<AppState>,
    Query(q): Query<NextDeviceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if q.name.is_empty() {
        return Err(ApiError::BadRequest("name must be non-empty".into()));
    }
    let repo = state.stats_repo.clone();
    let device = blocking(move || repo.get_next_device(q.kind, &q.name)).await?;
    Ok(Json(serde_json::json!({ "device": device })))
}
