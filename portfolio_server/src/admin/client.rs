//! HTTP client for the admin API, usable as the editor's binding, the
//! reorder target and the upload backend.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::binding::EntityBinding;
use super::reorder::ReorderTarget;
use super::upload::UploadBackend;
use crate::dashboard::summary::ContentSummary;
use crate::models::{Collection, OrderAssignment, SiteSettings};
use crate::services::upload_service::UploadKind;

#[derive(Clone)]
pub struct AdminClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct UploadUrlBody {
    upload_url: String,
}

#[derive(Deserialize)]
struct StorageIdBody {
    storage_id: Uuid,
}

#[derive(Deserialize)]
struct UrlBody {
    url: String,
}

/// Turn a non-success response into an error carrying the server's message.
async fn check(resp: Response) -> anyhow::Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    anyhow::bail!("{status}: {message}")
}

async fn json<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    Ok(check(resp).await?.json::<T>().await?)
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get_record(&self, collection: Collection, id: Uuid) -> anyhow::Result<Value> {
        let resp = self
            .http
            .get(self.url(&format!("/api/admin/{collection}/{id}")))
            .send()
            .await?;
        json(resp).await
    }

    /// `None` when settings were never saved.
    pub async fn get_settings(&self) -> anyhow::Result<Option<SiteSettings>> {
        let resp = self.http.get(self.url("/api/admin/settings")).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        json(resp).await.map(Some)
    }

    pub async fn put_settings(&self, settings: &SiteSettings) -> anyhow::Result<SiteSettings> {
        let resp = self
            .http
            .put(self.url("/api/admin/settings"))
            .json(settings)
            .send()
            .await?;
        json(resp).await
    }

    pub async fn summary(&self) -> anyhow::Result<ContentSummary> {
        let resp = self.http.get(self.url("/api/admin/summary")).send().await?;
        json(resp).await
    }
}

#[async_trait]
impl EntityBinding for AdminClient {
    async fn list(&self, collection: Collection) -> anyhow::Result<Vec<Value>> {
        let resp = self
            .http
            .get(self.url(&format!("/api/admin/{collection}")))
            .send()
            .await?;
        json(resp).await
    }

    async fn create(&self, collection: Collection, fields: Value) -> anyhow::Result<Value> {
        let resp = self
            .http
            .post(self.url(&format!("/api/admin/{collection}")))
            .json(&fields)
            .send()
            .await?;
        json(resp).await
    }

    async fn update(&self, collection: Collection, id: Uuid, fields: Value) -> anyhow::Result<Value> {
        let resp = self
            .http
            .put(self.url(&format!("/api/admin/{collection}/{id}")))
            .json(&fields)
            .send()
            .await?;
        json(resp).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> anyhow::Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/admin/{collection}/{id}")))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl ReorderTarget for AdminClient {
    async fn submit_order(&self, assignments: Vec<OrderAssignment>) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(self.url("/api/admin/projects/reorder"))
            .json(&assignments)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl UploadBackend for AdminClient {
    async fn request_upload_url(&self, kind: UploadKind) -> anyhow::Result<String> {
        let resp = self
            .http
            .post(self.url("/api/uploads/url"))
            .json(&serde_json::json!({ "kind": kind }))
            .send()
            .await?;
        Ok(json::<UploadUrlBody>(resp).await?.upload_url)
    }

    async fn send_file(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<Uuid> {
        let resp = self
            .http
            .post(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Ok(json::<StorageIdBody>(resp).await?.storage_id)
    }

    async fn resolve_url(&self, storage_id: Uuid) -> anyhow::Result<String> {
        let resp = self
            .http
            .get(self.url(&format!("/api/uploads/{storage_id}/url")))
            .send()
            .await?;
        Ok(json::<UrlBody>(resp).await?.url)
    }
}
