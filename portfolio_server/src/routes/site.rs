//! Public site reads. These never answer 503: an unready backend shows up
//! as `loading` or as fallback content in the body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::extract::ApiPath;
use super::{api_error, content_error, ApiResult, AppState};
use crate::site::{read_profile, read_section, views, ListState, ProfileState, Section, Snapshot};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/site/profile", get(profile))
        .route("/api/site/{section}", get(section))
}

async fn profile(State(state): State<AppState>) -> ApiResult<Json<ProfileState>> {
    read_profile(&state.status(), state.config.use_fallback)
        .await
        .map(Json)
        .map_err(content_error)
}

async fn section(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult<Response> {
    let section: Section = name
        .parse()
        .map_err(|_| api_error(StatusCode::NOT_FOUND, format!("unknown site section: {name}")))?;

    match section {
        Section::Projects => render(&state, section, views::project_views).await,
        Section::Experiences => render(&state, section, views::experience_views).await,
        Section::Languages => render(&state, section, views::language_views).await,
        Section::Skills => render(&state, section, views::skill_groups).await,
        Section::Certificates => render(&state, section, views::certificate_views).await,
        Section::About => render(&state, section, views::about_sections).await,
    }
}

async fn render<T: Serialize>(
    state: &AppState,
    section: Section,
    view: fn(&Snapshot) -> Vec<T>,
) -> ApiResult<Response> {
    let list: ListState<T> = read_section(&state.status(), state.config.use_fallback, section, view)
        .await
        .map_err(content_error)?;
    Ok(Json(list).into_response())
}
