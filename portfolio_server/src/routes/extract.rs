//! Extractors whose rejections use the API's JSON error body.
//!
//! Axum's own `Json`, `Path` and `Bytes` rejections answer in plain text
//! with statuses such as 415 or 422. These wrappers fold malformed input
//! into 400 and keep 413 for bodies over the route limit.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use super::{api_error, ApiError};

/// `Json<T>` with JSON rejections.
pub struct ApiJson<T>(pub T);

/// `Path<T>` with JSON rejections.
pub struct ApiPath<T>(pub T);

/// Raw request body with JSON rejections.
pub struct ApiBytes(pub Bytes);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(path_rejection(rejection)),
        }
    }
}

impl<S> FromRequest<S> for ApiBytes
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Bytes::from_request(req, state).await {
            Ok(bytes) => Ok(ApiBytes(bytes)),
            Err(rejection) => Err(bytes_rejection(rejection)),
        }
    }
}

pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    tracing::debug!(%status, error = %rejection.body_text(), "Rejected JSON body");
    api_error(status, format!("malformed payload: {}", rejection.body_text()))
}

pub fn path_rejection(rejection: PathRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, format!("malformed path: {}", rejection.body_text()))
}

pub fn bytes_rejection(rejection: BytesRejection) -> ApiError {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            api_error(StatusCode::PAYLOAD_TOO_LARGE, "request body exceeds the upload size limit")
        }
        status => api_error(status, rejection.body_text()),
    }
}
