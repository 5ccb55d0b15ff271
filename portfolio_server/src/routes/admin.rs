//! Admin API: collection CRUD, project reorder, settings and summary.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath};
use super::{api_error, content_error, ApiResult, AppState};
use crate::dashboard::summary::{content_summary, ContentSummary};
use crate::models::{Collection, OrderAssignment, SiteSettings};
use crate::services::{content_service, project_service, settings_service};

pub fn routes() -> Router<AppState> {
    Router::new()
        // Singletons (static segments win over `{collection}`)
        .route("/api/admin/summary", get(summary))
        .route("/api/admin/settings", get(get_settings).put(put_settings))
        .route("/api/admin/projects/reorder", post(reorder_projects))
        // Collections
        .route("/api/admin/{collection}", get(list_records).post(create_record))
        .route(
            "/api/admin/{collection}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

fn collection(name: &str) -> ApiResult<Collection> {
    name.parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))
}

// ── Collections ──

async fn list_records(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let collection = collection(&name)?;
    let backend = state.backend()?;
    content_service::list_json(&backend, collection)
        .await
        .map(Json)
        .map_err(content_error)
}

async fn get_record(
    State(state): State<AppState>,
    ApiPath((name, id)): ApiPath<(String, Uuid)>,
) -> ApiResult<Json<Value>> {
    let collection = collection(&name)?;
    let backend = state.backend()?;
    content_service::get_json(&backend, collection, id)
        .await
        .map(Json)
        .map_err(content_error)
}

async fn create_record(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(fields): ApiJson<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let collection = collection(&name)?;
    let backend = state.backend()?;
    content_service::create_json(&backend, collection, fields)
        .await
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(content_error)
}

async fn update_record(
    State(state): State<AppState>,
    ApiPath((name, id)): ApiPath<(String, Uuid)>,
    ApiJson(fields): ApiJson<Value>,
) -> ApiResult<Json<Value>> {
    let collection = collection(&name)?;
    let backend = state.backend()?;
    content_service::update_json(&backend, collection, id, fields)
        .await
        .map(Json)
        .map_err(content_error)
}

async fn delete_record(
    State(state): State<AppState>,
    ApiPath((name, id)): ApiPath<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let collection = collection(&name)?;
    let backend = state.backend()?;
    content_service::delete_json(&backend, collection, id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(content_error)
}

// ── Projects ──

async fn reorder_projects(
    State(state): State<AppState>,
    ApiJson(assignments): ApiJson<Vec<OrderAssignment>>,
) -> ApiResult<StatusCode> {
    let backend = state.backend()?;
    project_service::reorder_projects(&backend, &assignments)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(content_error)
}

// ── Settings ──

async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SiteSettings>> {
    let backend = state.backend()?;
    settings_service::get_settings(&backend)
        .await
        .map_err(content_error)?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "site settings have not been saved"))
}

async fn put_settings(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<SiteSettings>,
) -> ApiResult<Json<SiteSettings>> {
    let backend = state.backend()?;
    settings_service::upsert_settings(&backend, settings)
        .await
        .map(Json)
        .map_err(content_error)
}

// ── Dashboard ──

async fn summary(State(state): State<AppState>) -> ApiResult<Json<ContentSummary>> {
    let backend = state.backend()?;
    content_summary(&backend)
        .await
        .map(Json)
        .map_err(content_error)
}
