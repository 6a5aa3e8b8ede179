use anyhow::Result;
use mountkeeper::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        base_dir = %app_config.mount.base_dir,
        root_dir = %app_config.stats.root_dir,
        "Configuration loaded"
    );

    let executor: Arc<dyn command::Executor> = Arc::new(command::SystemExecutor::new());
    let stats_repo = Arc::new(
        stats_repo::StatsRepo::with_executor(executor.clone())
            .with_root(&app_config.stats.root_dir)
            .with_cpu_sample_interval(Duration::from_millis(
                app_config.stats.cpu_sample_interval_ms,
            )),
    );

    // Resolve once up front so the first request does not pay for findmnt.
    {
        let repo = stats_repo.clone();
        match tokio::task::spawn_blocking(move || repo.get_root_device_file()).await? {
            Ok(dev) => tracing::info!(device = %dev, "Root device file"),
            Err(e) => tracing::warn!(error = %e, "Could not resolve root device file"),
        }
    }

    let app = routes::app(stats_repo, executor, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received shutdown signal");
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
