use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use common::admin_http::spawn_admin_server;
use configs::AppConfig;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn metrics_response() -> (StatusCode, String) {
    match service::metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Build the app from configuration: connect, migrate if asked, wire the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrate: {e}")))?;
        info!(event = "migrated", "schema up to date");
    }
    Ok(routes::build_router(build_cors(), ServerState { db }))
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    if let Some(addr) = cfg.admin.addr.as_deref() {
        // 管理端口独立线程运行，不阻塞主服务
        let _handle = spawn_admin_server(addr, metrics_response);
    }

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "catalog server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(event = "stopped", "server stopped");
    Ok(())
}
