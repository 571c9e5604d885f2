//! Stockroom API Server Entry Point
//!
//! Bootstraps configuration, connection pools, cache, event plumbing, and
//! the Axum HTTP server. The event listener runs as one background task and
//! is torn down cooperatively on shutdown; buffered-but-unflushed events are
//! not flushed on exit (the event subsystem's accepted durability window).

use std::net::SocketAddr;
use std::sync::Arc;

use stockroom_api::{
    create_router, AnalyticsConfig, ApiConfig, ApiError, ApiResult, AppState, DbConfig,
    EventListener, EventWriter, GoodsInteractor, MemoryCacheStore, PgEventSink,
    PgGoodsRepository, PubSub,
};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let api_config = ApiConfig::from_env();
    let db_pool = DbConfig::from_env().create_pool()?;
    let analytics_pool = AnalyticsConfig::from_env().create_pool()?;

    let repo = Arc::new(PgGoodsRepository::new(db_pool));
    let cache = Arc::new(MemoryCacheStore::new());
    let bus = PubSub::new(api_config.broadcast_capacity);

    let sink = Arc::new(PgEventSink::new(analytics_pool));
    let writer = Arc::new(EventWriter::new(sink, api_config.event_flush_threshold));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = EventListener::new(&bus, writer, shutdown_rx);
    let listener_handle = tokio::spawn(listener.run());

    let interactor = Arc::new(GoodsInteractor::new(
        repo,
        cache,
        bus,
        api_config.request_timeout,
        api_config.cache_ttl,
    ));
    let app = create_router(AppState::new(interactor));

    let addr: SocketAddr = format!("{}:{}", api_config.bind_host, api_config.bind_port)
        .parse()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address: {}", e)))?;
    tracing::info!(%addr, "starting stockroom API server");

    let listener_socket = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener_socket, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    // Tear the listener down; whatever sits in the event buffer is dropped.
    let _ = shutdown_tx.send(true);
    let _ = listener_handle.await;

    Ok(())
}
