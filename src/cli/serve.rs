use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use update_server::api::create_router;
use update_server::config::Config;
use update_server::core::{UpdateError, UpdateResult};
use update_server::di::ServiceContainer;

pub async fn run(config: Config, no_poll: bool) -> UpdateResult<()> {
    let bind_address = config.bind_address.clone();
    let poll_interval = config.poll_interval_secs;

    let container = ServiceContainer::new(config).await?;
    let coordinator = container.coordinator()?;

    if container.config.api_key.is_empty() {
        tracing::warn!("No api_key configured; the refresh webhook will reject every call");
    }

    // Ingestion outcomes never reach an HTTP caller; trace them as JSON
    let mut events = coordinator.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        tracing::debug!(target: "update_server::ingest", "{}", json);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} ingestion events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let poller = match poll_interval {
        Some(secs) if !no_poll => Some(coordinator.spawn_poller(Duration::from_secs(secs))),
        _ => None,
    };

    let app = create_router(container.app_state(coordinator));

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|e| UpdateError::Config(format!("Failed to bind {}: {}", bind_address, e)))?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(poller) = poller {
        poller.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
