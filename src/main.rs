use task_tracker::api::task_routes;
use task_tracker::config::{ServerConfig, StoreConfig};
use task_tracker::tasks::TaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let store_config = StoreConfig::from_env();
    let server_config = ServerConfig::from_env()?;

    eprintln!("📋 Task Tracker v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Task file: {}", store_config.path.display());
    eprintln!("   API: http://0.0.0.0:{}/api/tasks", server_config.port);

    // Fail fast on a missing directory or a file with the wrong columns.
    let store = TaskStore::new(store_config.path);
    let table = store.load().await?;
    eprintln!("   Tasks: {}\n", table.len());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.port)).await?;
    tracing::info!(port = server_config.port, "Dashboard API started");

    axum::serve(listener, task_routes(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
