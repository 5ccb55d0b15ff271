//! End-to-end tests against the HTTP router with an in-memory backend.

use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::watch;
use uuid::Uuid;

use portfolio_server::admin::{
    AdminClient, EntityBinding, MediaFieldSpec, PendingFile, ReorderDraft, UploadField,
};
use portfolio_server::config::SiteConfig;
use portfolio_server::models::{Collection, SiteSettings};
use portfolio_server::routes::{router, AppState};
use portfolio_server::services::upload_service::UploadKind;
use portfolio_server::services::ContentBackend;
use portfolio_server::site::BackendStatus;

struct TestServer {
    base: String,
    client: AdminClient,
    http: reqwest::Client,
    status: watch::Sender<BackendStatus>,
    _uploads: TempDir,
}

async fn spawn(status: BackendStatus, use_fallback: bool) -> TestServer {
    let uploads = tempfile::tempdir().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let mut config = SiteConfig::local(uploads.path());
    config.public_url = base.clone();
    config.use_fallback = use_fallback;

    let (tx, rx) = watch::channel(status);
    let app = router(AppState::new(config, rx));
    tokio::spawn(async move { axum::serve(listener, app).await });

    TestServer {
        client: AdminClient::new(base.clone()),
        base,
        http: reqwest::Client::new(),
        status: tx,
        _uploads: uploads,
    }
}

async fn ready() -> TestServer {
    spawn(BackendStatus::Ready(ContentBackend::in_memory()), false).await
}

fn project(title: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} description"),
        "status": "completed",
        "tech_stack": ["rust"],
    })
}

fn id_of(record: &Value) -> Uuid {
    record["id"].as_str().unwrap().parse().unwrap()
}

async fn titles(client: &AdminClient) -> Vec<String> {
    client
        .list(Collection::Projects)
        .await
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn project_crud_round_trip() {
    let server = ready().await;
    let client = &server.client;

    let created = client.create(Collection::Projects, project("Compiler")).await.unwrap();
    let id = id_of(&created);
    assert_eq!(created["order"], 1);

    let mut changed = project("Compiler v2");
    changed["live_url"] = json!("https://example.com");
    let updated = client.update(Collection::Projects, id, changed).await.unwrap();
    assert_eq!(updated["title"], "Compiler v2");
    assert_eq!(updated["order"], 1);

    let fetched = client.get_record(Collection::Projects, id).await.unwrap();
    assert_eq!(fetched["live_url"], "https://example.com");

    client.delete(Collection::Projects, id).await.unwrap();
    assert!(client.list(Collection::Projects).await.unwrap().is_empty());

    let err = client.get_record(Collection::Projects, id).await.unwrap_err();
    assert!(err.to_string().starts_with("404"), "{err}");
}

#[tokio::test]
async fn invalid_record_is_rejected_with_message() {
    let server = ready().await;
    let err = server
        .client
        .create(Collection::Projects, json!({ "title": "", "description": "x", "status": "planned" }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "400 Bad Request: title: is required");
}

#[tokio::test]
async fn reorder_applies_full_permutation() {
    let server = ready().await;
    let client = &server.client;
    let mut ids = Vec::new();
    for title in ["p1", "p2", "p3"] {
        ids.push(id_of(&client.create(Collection::Projects, project(title)).await.unwrap()));
    }

    let mut draft = ReorderDraft::new(ids.clone());
    assert!(draft.move_item(2, 0));
    assert!(draft.save(client).await.unwrap());

    assert_eq!(titles(client).await, ["p3", "p1", "p2"]);
}

#[tokio::test]
async fn rejected_reorder_leaves_orders_untouched() {
    let server = ready().await;
    let client = &server.client;
    let p1 = id_of(&client.create(Collection::Projects, project("p1")).await.unwrap());
    let p2 = id_of(&client.create(Collection::Projects, project("p2")).await.unwrap());

    let resp = server
        .http
        .post(format!("{}/api/admin/projects/reorder", server.base))
        .json(&json!([{ "id": p1, "order": 1 }, { "id": p2, "order": 1 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "order 1 is assigned more than once");

    assert_eq!(titles(client).await, ["p1", "p2"]);
}

#[tokio::test]
async fn referenced_provider_cannot_be_deleted() {
    let server = ready().await;
    let client = &server.client;
    let provider = client
        .create(Collection::Providers, json!({ "key": "aws", "name": "Amazon Web Services" }))
        .await
        .unwrap();
    let provider_id = id_of(&provider);
    let cert = client
        .create(
            Collection::Certificates,
            json!({ "title": "Solutions Architect", "provider_id": provider_id, "issue_date": "2023-05-01" }),
        )
        .await
        .unwrap();

    let err = client.delete(Collection::Providers, provider_id).await.unwrap_err();
    assert!(err.to_string().starts_with("409"), "{err}");

    client.delete(Collection::Certificates, id_of(&cert)).await.unwrap();
    client.delete(Collection::Providers, provider_id).await.unwrap();
}

#[tokio::test]
async fn unknown_collection_is_not_found() {
    let server = ready().await;
    let resp = server
        .http
        .get(format!("{}/api/admin/widgets", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_upsert_is_idempotent() {
    let server = ready().await;
    let client = &server.client;
    assert_eq!(client.get_settings().await.unwrap(), None);

    let settings = SiteSettings {
        name: "Sam Lee".into(),
        headline: "Platform engineer".into(),
        email: Some("sam@example.com".into()),
        ..Default::default()
    };
    client.put_settings(&settings).await.unwrap();
    let saved = client.put_settings(&settings).await.unwrap();
    assert_eq!(saved, settings);
    assert_eq!(client.get_settings().await.unwrap(), Some(settings));

    let summary = client.summary().await.unwrap();
    assert!(summary.settings);
    assert_eq!(summary.total_records(), 0);
}

#[tokio::test]
async fn image_upload_binds_servable_url() {
    let server = ready().await;
    let mut field = UploadField::new(
        MediaFieldSpec {
            name: "image_url",
            label: "Cover image",
            kind: UploadKind::Image,
        },
        None,
    );
    let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4];
    let url = field
        .upload(
            &server.client,
            PendingFile {
                file_name: "cover.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: bytes.clone(),
            },
        )
        .await
        .unwrap();
    assert!(url.starts_with(&format!("{}/files/", server.base)), "{url}");
    assert_eq!(field.value(), Some(url.as_str()));

    let resp = server.http.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[reqwest::header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), bytes.as_slice());

    assert_eq!(server.client.summary().await.unwrap().files, 1);
}

async fn upload_target(server: &TestServer, kind: &str) -> String {
    let resp = server
        .http
        .post(format!("{}/api/uploads/url", server.base))
        .json(&json!({ "kind": kind }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["upload_url"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn oversized_image_is_rejected_by_server() {
    let server = ready().await;
    let target = upload_target(&server, "image").await;

    let resp = server
        .http
        .post(&target)
        .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
        .body(vec![0u8; 6 * 1024 * 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("image must be at most 5 MB"));
}

#[tokio::test]
async fn upload_target_is_single_use() {
    let server = ready().await;
    let target = upload_target(&server, "resume").await;

    let send = || {
        server
            .http
            .post(&target)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(b"%PDF-1.7".to_vec())
            .send()
    };
    assert_eq!(send().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(send().await.unwrap().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn tampered_upload_target_is_rejected() {
    let server = ready().await;
    let target = upload_target(&server, "logo").await;
    let tampered = target.replacen("/logo.", "/resume.", 1);

    let resp = server
        .http
        .post(&tampered)
        .header(reqwest::header::CONTENT_TYPE, "application/pdf")
        .body(b"%PDF-1.7".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_wait_for_backend() {
    let server = spawn(BackendStatus::Connecting, false).await;
    let err = server.client.list(Collection::Projects).await.unwrap_err();
    assert_eq!(err.to_string(), "503 Service Unavailable: content backend is connecting");

    let site: Value = server
        .http
        .get(format!("{}/api/site/projects", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(site["loading"], true);
    assert_eq!(site["items"], json!([]));

    server
        .status
        .send_replace(BackendStatus::Ready(ContentBackend::in_memory()));
    assert!(server.client.list(Collection::Projects).await.unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_site_serves_fallback_content() {
    let server = spawn(BackendStatus::Unconfigured, true).await;
    let get = |path: &str| {
        let url = format!("{}{path}", server.base);
        let http = server.http.clone();
        async move { http.get(url).send().await.unwrap().json::<Value>().await.unwrap() }
    };

    let projects = get("/api/site/projects").await;
    assert_eq!(projects["fallback"], true);
    assert_eq!(projects["loading"], false);
    assert!(!projects["items"].as_array().unwrap().is_empty());

    let certificates = get("/api/site/certificates").await;
    assert!(certificates["items"][0]["provider"].is_string());

    let profile = get("/api/site/profile").await;
    assert_eq!(profile["profile"]["name"], "Alex Rivera");

    let health = get("/health").await;
    assert_eq!(health["backend"], "unconfigured");
}

#[tokio::test]
async fn live_site_reads_from_backend() {
    let backend = ContentBackend::in_memory();
    let server = spawn(BackendStatus::Ready(backend), true).await;
    server
        .client
        .create(Collection::Projects, project("Live project"))
        .await
        .unwrap();

    let resp = server
        .http
        .get(format!("{}/api/site/projects", server.base))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fallback"], false);
    assert_eq!(body["items"][0]["title"], "Live project");
    assert_eq!(body["items"][0]["status_label"], "Completed");

    let resp = server
        .http
        .get(format!("{}/api/site/hobbies", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
