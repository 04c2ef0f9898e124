#![deny(warnings)]

use actix_web::{App, HttpServer};
use anyhow::Context;

use poolguard::backend::SeaOrmBackend;
use poolguard::manager::PoolManager;
use poolguard::metrics::AppMetrics;
use poolguard::{DatabaseManager, config, observability, router};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("failed to load configuration")?;
    observability::init(&config.observability);

    tracing::info!(
        name = %config.app.name,
        version = %config.app.version,
        environment = %config.app.environment,
        "starting"
    );

    let manager: DatabaseManager = PoolManager::new(
        SeaOrmBackend::from_config(&config.database),
        config.database.clone(),
        config.retry.clone(),
    );

    // Startup is only allowed to proceed against a verified pool; serving
    // traffic in a broken state is worse than not serving at all.
    if let Err(err) = manager.connect().await {
        tracing::error!(error = %err, "could not establish database pool, refusing to serve");
        std::process::exit(1);
    }

    let metrics = AppMetrics::new();

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "http server listening"
    );

    let server_manager = manager.clone();
    let server_metrics = metrics.clone();
    let mut server = HttpServer::new(move || {
        let manager = server_manager.clone();
        let metrics = server_metrics.clone();
        App::new().configure(move |app| router::route(app, manager, metrics))
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind((config.server.host.as_str(), config.server.port))?
        .shutdown_timeout(config.app.shutdown_timeout)
        .run()
        .await?;

    // Graceful-termination path: the listener has stopped accepting
    // requests, so the pool can be torn down.
    manager.close().await;

    Ok(())
}
