//! Portfolio HTTP routes: admin API, site reads, uploads, change feed.

pub mod admin;
pub mod extract;
pub mod site;
pub mod subscribe;
pub mod upload;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::services::upload_service::UploadError;
use crate::services::{ContentBackend, ContentError};
use crate::site::BackendStatus;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: SiteConfig,
    pub status: watch::Receiver<BackendStatus>,
}

impl AppState {
    pub fn new(config: SiteConfig, status: watch::Receiver<BackendStatus>) -> Self {
        Self { config, status }
    }

    /// Current backend status, cloned out of the watch channel.
    pub fn status(&self) -> BackendStatus {
        self.status.borrow().clone()
    }

    /// The backend, or 503 while it is unconfigured or still connecting.
    pub fn backend(&self) -> ApiResult<ContentBackend> {
        match self.status() {
            BackendStatus::Ready(backend) => Ok(backend),
            other => Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("content backend is {}", other.label()),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// HTTP status for a service error.
pub fn status_for(err: &ContentError) -> StatusCode {
    match err {
        ContentError::Validation(_) | ContentError::Payload(_) | ContentError::Reorder(_) => {
            StatusCode::BAD_REQUEST
        }
        ContentError::NotFound(_) => StatusCode::NOT_FOUND,
        ContentError::Conflict(_) => StatusCode::CONFLICT,
        ContentError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        ContentError::Upload(_) => StatusCode::BAD_REQUEST,
        ContentError::Io(_) | ContentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a service error to its JSON response, logging server-side failures.
pub fn content_error(err: ContentError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, %status, "Request rejected");
    }
    api_error(status, err.to_string())
}

/// Build the portfolio service's Axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(admin::routes())
        .merge(site::routes())
        .merge(upload::routes())
        .merge(subscribe::routes())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
    version: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "up",
        backend: state.status().label(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
