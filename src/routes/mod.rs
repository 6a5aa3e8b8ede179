// HTTP + WebSocket routes

mod error;
mod http;
mod mounts;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::command::Executor;
use crate::config::AppConfig;
use crate::stats_repo::StatsRepo;

pub use error::ApiError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_repo: Arc<StatsRepo>,
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) config: AppConfig,
}

pub fn app(stats_repo: Arc<StatsRepo>, executor: Arc<dyn Executor>, config: AppConfig) -> Router {
    let state = AppState {
        stats_repo,
        executor,
        config,
    };
    Router::new()
        .route("/", get(|| async { "mountkeeper" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats/uptime", get(http::uptime_handler))
        .route("/api/stats/loadavg", get(http::load_average_handler))
        .route("/api/stats/memory", get(http::memory_handler))
        .route("/api/stats/cpu", get(http::cpu_handler))
        .route("/api/stats/root-device", get(http::root_device_handler))
        .route("/api/stats/login-defs", get(http::login_defs_handler))
        .route("/api/devices/next", get(http::next_device_handler))
        .route("/api/mounts/{id}", get(mounts::status_handler))
        .route(
            "/api/mounts/{id}/dir",
            post(mounts::create_handler).delete(mounts::unlink_handler),
        )
        .route("/api/mounts/{id}/mount", post(mounts::mount_handler))
        .route("/api/mounts/{id}/umount", post(mounts::umount_handler))
        .route("/ws/cpu", get(ws::ws_cpu)) // WS /ws/cpu
        .route("/ws/memory", get(ws::ws_memory)) // WS /ws/memory
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Run a blocking repo call off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task join: {}", e)))?
        .map_err(ApiError::from)
}
