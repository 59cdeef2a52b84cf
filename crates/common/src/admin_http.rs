//! Lightweight admin HTTP server spawner
//!
//! Exposes `/healthz` and `/metrics` endpoints, with metrics provided by caller.

use std::thread;
use axum::{routing::get, Router};
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tracing::{error, info};

async fn healthz() -> &'static str { "OK" }

/// Build the admin router; split out so it can be driven without a socket.
pub fn admin_router(metrics_fn: fn() -> (StatusCode, String)) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || async move { metrics_fn() }))
}

/// Spawn an admin HTTP server on its own thread and runtime.
/// The metrics are provided by the caller via a function.
pub fn spawn_admin_server(addr: &str, metrics_fn: fn() -> (StatusCode, String)) -> thread::JoinHandle<()> {
    let addr = addr.to_string();
    thread::spawn(move || {
        let rt = match Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                error!(event = "admin_runtime_failed", error = %e, "cannot build admin runtime");
                return;
            }
        };
        rt.block_on(async move {
            let listener = match TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    error!(event = "admin_bind_failed", %addr, error = %e, "cannot bind admin server");
                    return;
                }
            };
            info!(%addr, "admin server listening");
            if let Err(e) = axum::serve(listener, admin_router(metrics_fn)).await {
                error!(event = "admin_serve_failed", error = %e, "admin server stopped");
            }
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn fake_metrics() -> (StatusCode, String) { (StatusCode::OK, "up 1\n".into()) }

    #[tokio::test]
    async fn serves_healthz_and_metrics() {
        let app = admin_router(fake_metrics);
        let res = app.clone().oneshot(Request::get("/healthz").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(Request::get("/metrics").body(Body::empty()).unwrap()).await.unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"up 1\n");
    }
}
