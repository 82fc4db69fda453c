//! The HTTP surface bound to the Unix socket.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use commander_core::DispatchError;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::UnixListener;
use tower::ServiceExt as _;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::dispatch;
use crate::registry::Registry;
use crate::status::{format_duration, StatusTracker};
use crate::watchdog::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub status: Arc<StatusTracker>,
}

/// Builds the request router. The watchdog route only exists when the
/// service manager asked for liveness pings.
pub fn router(state: AppState, watchdog: Option<Notifier>) -> Router {
    let mut router = Router::new()
        .route("/listing", get(listing))
        .route("/status", get(status))
        .route("/dispatch", post(dispatch_request));

    if let Some(notifier) = watchdog {
        router = router.route(
            "/watchdog",
            get(move || async move {
                notifier.keep_alive();
                StatusCode::OK
            }),
        );
    }

    router
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// Accepts connections and serves each on its own task.
pub async fn serve(listener: UnixListener, router: Router) -> anyhow::Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        let router = router.clone();

        tokio::spawn(async move {
            let socket = TokioIo::new(stream);
            let service =
                service_fn(move |request: Request<Incoming>| router.clone().oneshot(request));
            if let Err(err) = http1::Builder::new().serve_connection(socket, service).await {
                debug!("connection ended with error: {err}");
            }
        });
    }
}

async fn listing(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let commands = state.registry.descriptions();
    state.status.record_success();
    Json(json!({
        "count": commands.len(),
        "commands": commands,
    }))
}

async fn status(Extension(state): Extension<AppState>) -> impl IntoResponse {
    // Snapshot before recording, so the reply does not count itself.
    let snapshot = state.status.snapshot();
    state.status.record_success();
    Json(json!({
        "uptime": format_duration(snapshot.uptime),
        "started_at": snapshot.started_at,
        "registered_commands": state.registry.len(),
        "executions": {
            "successful": snapshot.successes,
            "failed": snapshot.failures,
            "total": snapshot.total,
        },
    }))
}

async fn dispatch_request(Extension(state): Extension<AppState>, body: Bytes) -> Response {
    match dispatch::dispatch(&state.registry, &state.status, &body).await {
        Ok(Ok(result)) => Json(json!({ "success": true, "result": result })).into_response(),
        Ok(Err(handler_err)) => Json(json!({
            "success": false,
            "error": handler_err.to_string(),
        }))
        .into_response(),
        Err(err) => (
            error_status(&err),
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn error_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::EnvelopeDecode(_) | DispatchError::ParameterDecode { .. } => {
            StatusCode::BAD_REQUEST
        }
        DispatchError::UnknownCommand(_) => StatusCode::NOT_FOUND,
    }
}
