//! HTTP service exposing the analyzer.
//!
//! - `POST /task/analyze`: analyze a task-list or legacy payload
//! - `GET /health`: liveness plus loaded-model status
//!
//! Analysis runs on Tokio's blocking pool. Client errors map to 400 with
//! `{"error": "..."}`; anything else maps to a generic 500.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use serde::Serialize;
use serde_json::json;
use switchwise_core::{Analyzer, CoreError, ModelStatus, RequestError};
use tower_http::trace::TraceLayer;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind, overriding `server.bind` from the config
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    #[serde(flatten)]
    models: ModelStatus,
}

pub fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, base_dir) = super::load_config()?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let analyzer = Arc::new(Analyzer::from_config(&config, &base_dir));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(router(analyzer), &bind))
}

/// Build the service router.
pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/task/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(AppState { analyzer })
        .layer(TraceLayer::new_for_http())
}

async fn serve(app: Router, bind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    eprintln!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        models: state.analyzer.status(),
    })
}

/// POST /task/analyze
async fn analyze(State(state): State<AppState>, body: Bytes) -> Response {
    let analyzer = Arc::clone(&state.analyzer);
    let result = tokio::task::spawn_blocking(move || match std::str::from_utf8(&body) {
        Ok(text) => analyzer.analyze_payload(text),
        Err(_) => Err(CoreError::Request(RequestError::InvalidJson)),
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(CoreError::Request(e))) => {
            tracing::warn!(error = %e, "rejected analyze request");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "analysis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
        Err(e) => {
            tracing::error!(error = %e, "analysis task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
