//! Upload targets, file intake, URL resolution and file serving.

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::{ApiBytes, ApiJson, ApiPath};
use super::{content_error, ApiResult, AppState};
use crate::services::upload_service::{self, UploadKind, UploadTarget};

/// Largest accepted file (resumes) plus headroom for the request itself.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024 + 64 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/uploads/url", post(create_target))
        .route(
            "/api/uploads/{key}",
            post(receive_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/uploads/{key}/url", get(file_url))
        .route("/files/{id}", get(serve_file))
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub kind: UploadKind,
}

#[derive(Debug, Serialize)]
pub struct StoredResponse {
    pub storage_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

async fn create_target(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TargetRequest>,
) -> ApiResult<Json<UploadTarget>> {
    state.backend()?;
    upload_service::create_upload_target(&state.config, req.kind)
        .map(Json)
        .map_err(content_error)
}

async fn receive_file(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> ApiResult<(StatusCode, Json<StoredResponse>)> {
    let backend = state.backend()?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    upload_service::accept_upload(&backend, &state.config, &token, content_type, &body)
        .await
        .map(|file| (StatusCode::CREATED, Json(StoredResponse { storage_id: file.id })))
        .map_err(content_error)
}

async fn file_url(State(state): State<AppState>, ApiPath(storage_id): ApiPath<Uuid>) -> ApiResult<Json<UrlResponse>> {
    let backend = state.backend()?;
    upload_service::resolve_url(&backend, &state.config, storage_id)
        .await
        .map(|url| Json(UrlResponse { url }))
        .map_err(content_error)
}

async fn serve_file(State(state): State<AppState>, ApiPath(storage_id): ApiPath<Uuid>) -> ApiResult<impl IntoResponse> {
    let backend = state.backend()?;
    let (file, bytes) = upload_service::read_file(&backend, &state.config, storage_id)
        .await
        .map_err(content_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
            (header::ETAG, format!("\"{}\"", file.sha256)),
        ],
        bytes,
    ))
}
