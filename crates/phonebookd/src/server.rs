// # HTTP server
//
// Endpoints:
// - `GET /phonebook?target=<vendor>&format=<format>`: rendered XML phonebook
// - `GET /info`: version, entry count and time of the last refresh
// - `GET /reload`: refresh now and report whether it worked
//
// Handlers only read the current snapshot; the refresh loop runs elsewhere.

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::{DateTime, Utc};
use phonebook_core::config::ExportConfig;
use phonebook_core::engine::Refresher;
use phonebook_core::error::Error;
use phonebook_core::exporter::Format;
use phonebook_core::registry::Registry;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state for all handlers
pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub registry: Arc<Registry>,
    /// Flags applied to every rendered phonebook
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
pub struct PhonebookQuery {
    pub target: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub version: &'static str,
    pub entries: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub version: &'static str,
    pub source: String,
    pub success: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/phonebook", get(phonebook))
        .route("/info", get(info))
        .route("/reload", get(reload))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    state: Arc<AppState>,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("unable to listen on {}", addr))?;

    info!(port = port, "Serving phonebooks");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

fn required(value: Option<String>, name: &str) -> std::result::Result<String, Response> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err((StatusCode::BAD_REQUEST, format!("{} needs to be set", name)).into_response()),
    }
}

fn error_response(e: Error) -> Response {
    if e.is_client_error() {
        debug!("Rejected phonebook request: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string()).into_response()
    } else {
        error!("Unable to render phonebook: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    }
}

async fn phonebook(State(state): State<Arc<AppState>>, Query(query): Query<PhonebookQuery>) -> Response {
    let target = match required(query.target, "target") {
        Ok(target) => target,
        Err(response) => return response,
    };
    let format = match required(query.format, "format") {
        Ok(format) => format,
        Err(response) => return response,
    };
    let format: Format = match format.parse() {
        Ok(format) => format,
        Err(e) => return error_response(e),
    };

    let snapshot = state.refresher.store().read();
    match state.registry.render(&target, &snapshot, &state.export.options(format)) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body).into_response(),
        Err(e) => error_response(e),
    }
}

async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let snapshot = state.refresher.store().read();
    Json(InfoResponse {
        version: VERSION,
        entries: snapshot.len(),
        refreshed_at: snapshot.refreshed_at(),
    })
}

async fn reload(State(state): State<Arc<AppState>>) -> Json<ReloadResponse> {
    let success = match state.refresher.refresh_once().await {
        Ok(_) => true,
        Err(e) => {
            warn!("Reload failed: {}", e);
            false
        }
    };
    Json(ReloadResponse {
        version: VERSION,
        source: state.refresher.source_name().to_string(),
        success,
    })
}
