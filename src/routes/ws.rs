// WebSocket handlers: periodic CPU and memory streams

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use super::{AppState, blocking};
use crate::stats_repo::StatsRepo;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_cpu(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let repo = state.stats_repo.clone();
    let interval_ms = state.config.stats.cpu_stats_frequency_ms;
    ws.on_upgrade(move |socket| async move {
        tracing::info!("Client connected to CPU stream");
        if let Err(e) = stream(socket, repo, interval_ms, StatsRepo::get_cpu_stats).await {
            tracing::info!("CPU stream error: {}", e);
        }
    })
}

pub(super) async fn ws_memory(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let repo = state.stats_repo.clone();
    let interval_ms = state.config.stats.memory_stats_frequency_ms;
    ws.on_upgrade(move |socket| async move {
        tracing::info!("Client connected to memory stream");
        if let Err(e) = stream(socket, repo, interval_ms, StatsRepo::get_memory_stats).await {
            tracing::info!("Memory stream error: {}", e);
        }
    })
}

/// Send `collect(repo)` as JSON every `interval_ms` until the client goes away.
/// A CPU reading blocks for its sample interval, so ticks missed meanwhile are skipped.
async fn stream<T>(
    mut socket: WebSocket,
    repo: Arc<StatsRepo>,
    interval_ms: u64,
    collect: fn(&StatsRepo) -> crate::Result<T>,
) -> anyhow::Result<()>
where
    T: Serialize + Send + 'static,
{
    let mut tick = tokio::time::interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let repo = repo.clone();
                let stats = blocking(move || collect(&repo))
                    .await
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                let json = serde_json::to_string(&stats)?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
