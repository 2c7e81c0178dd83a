//! Explorer UI Server
//!
//! A small axum app around one [`Pipeline`]:
//!
//! | Route                    | Purpose                                   |
//! |--------------------------|-------------------------------------------|
//! | `GET /`                  | Company form                              |
//! | `POST /analyze`          | Run the pipeline, render the three stages |
//! | `GET /artifacts/{stage}` | Re-read one persisted artifact            |
//! | `GET /health`            | Liveness probe                            |
//!
//! All runs write the same artifact files, so they are serialized.

mod render;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::pipeline::{Pipeline, Stage};
use crate::types::{CompanyName, InnovateError, Result};

pub use render::{escape, markdown};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    default_company: Arc<str>,
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, default_company: impl Into<String>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            default_company: Arc::from(default_company.into()),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    company: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/artifacts/{stage}", get(artifact))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| InnovateError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Explorer UI listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| InnovateError::Server(e.to_string()))
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::page(&state.default_company, ""))
}

async fn analyze(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> (StatusCode, Html<String>) {
    let company = match CompanyName::parse(&form.company) {
        Ok(company) => company,
        Err(e) => {
            let message = match e {
                InnovateError::InvalidInput(message) => message,
                other => other.to_string(),
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render::input_error(&form.company, &message)),
            );
        }
    };

    let _guard = state.run_lock.lock().await;
    info!(company = %company, "Analysis requested");

    match state.pipeline.run(&company).await {
        Ok(report) => (StatusCode::OK, Html(render::report(&report))),
        Err(e) => {
            error!(company = %company, "Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::run_error(company.as_str(), &e.to_string())),
            )
        }
    }
}

async fn artifact(
    State(state): State<AppState>,
    Path(stage): Path<String>,
) -> (StatusCode, Html<String>) {
    let stage: Stage = match stage.parse() {
        Ok(stage) => stage,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Html(render::input_error(
                    &state.default_company,
                    &e.to_string(),
                )),
            );
        }
    };

    let status = state.pipeline.store().read(stage).await;
    (
        StatusCode::OK,
        Html(render::artifact(&state.default_company, stage, &status)),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
