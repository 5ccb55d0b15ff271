//! Media upload field: validate, upload, resolve and bind a file URL.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::fields::MediaFieldSpec;
use crate::services::upload_service::{validate_file, UploadError, UploadKind};

const TICK: Duration = Duration::from_millis(150);
const TICK_STEP: u8 = 10;
const TICK_CAP: u8 = 90;

/// The three backend calls an upload goes through.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// One-time upload target for a file of `kind`.
    async fn request_upload_url(&self, kind: UploadKind) -> anyhow::Result<String>;

    /// Send the bytes to the target, returning the storage handle.
    async fn send_file(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<Uuid>;

    async fn resolve_url(&self, storage_id: Uuid) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadFieldError {
    #[error("Invalid {}: {source}", .kind.label())]
    Rejected {
        kind: UploadKind,
        #[source]
        source: UploadError,
    },
    #[error("Could not prepare {} upload: {message}", .kind.label())]
    Request { kind: UploadKind, message: String },
    #[error("Could not upload {}: {message}", .kind.label())]
    Transfer { kind: UploadKind, message: String },
    #[error("Could not resolve uploaded {} URL: {message}", .kind.label())]
    Resolve { kind: UploadKind, message: String },
}

/// Next synthetic progress value.
pub fn next_progress(current: u8) -> u8 {
    current.saturating_add(TICK_STEP).min(TICK_CAP)
}

/// Advances a shared percentage on a fixed timer until dropped.
struct ProgressTicker {
    handle: JoinHandle<()>,
    progress: Arc<AtomicU8>,
}

impl ProgressTicker {
    fn start(progress: Arc<AtomicU8>) -> Self {
        progress.store(0, Ordering::Relaxed);
        let shared = progress.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.tick().await;
            loop {
                interval.tick().await;
                let current = shared.load(Ordering::Relaxed);
                shared.store(next_progress(current), Ordering::Relaxed);
            }
        });
        Self { handle, progress }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
        self.progress.store(0, Ordering::Relaxed);
    }
}

pub struct UploadField {
    spec: MediaFieldSpec,
    value: Option<String>,
    progress: Arc<AtomicU8>,
    uploading: bool,
    error: Option<String>,
}

impl UploadField {
    pub fn new(spec: MediaFieldSpec, value: Option<String>) -> Self {
        Self {
            spec,
            value,
            progress: Arc::new(AtomicU8::new(0)),
            uploading: false,
            error: None,
        }
    }

    pub fn spec(&self) -> &MediaFieldSpec {
        &self.spec
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn uploading(&self) -> bool {
        self.uploading
    }

    /// Synthetic percentage, for display only.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Shared handle on the progress value, for observers outside the field.
    pub fn progress_handle(&self) -> Arc<AtomicU8> {
        self.progress.clone()
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.error = None;
    }

    /// Upload `file` and bind its public URL. The kind's rule is checked
    /// before any network call; any failure leaves the value unchanged.
    pub async fn upload(
        &mut self,
        backend: &dyn UploadBackend,
        file: PendingFile,
    ) -> Result<String, UploadFieldError> {
        let kind = self.spec.kind;
        self.error = None;

        if let Err(source) = validate_file(kind, &file.content_type, file.bytes.len() as u64) {
            return Err(self.fail(UploadFieldError::Rejected { kind, source }));
        }

        self.uploading = true;
        let result = {
            let _ticker = ProgressTicker::start(self.progress.clone());
            transfer(backend, kind, file).await
        };
        self.uploading = false;

        match result {
            Ok(url) => {
                tracing::debug!(field = self.spec.name, %url, "Media bound");
                self.value = Some(url.clone());
                Ok(url)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: UploadFieldError) -> UploadFieldError {
        self.error = Some(error.to_string());
        error
    }
}

async fn transfer(
    backend: &dyn UploadBackend,
    kind: UploadKind,
    file: PendingFile,
) -> Result<String, UploadFieldError> {
    let upload_url = backend
        .request_upload_url(kind)
        .await
        .map_err(|e| UploadFieldError::Request {
            kind,
            message: e.to_string(),
        })?;
    let storage_id = backend
        .send_file(&upload_url, &file.content_type, file.bytes)
        .await
        .map_err(|e| UploadFieldError::Transfer {
            kind,
            message: e.to_string(),
        })?;
    backend
        .resolve_url(storage_id)
        .await
        .map_err(|e| UploadFieldError::Resolve {
            kind,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeBackend {
        calls: AtomicUsize,
        fail_send: bool,
    }

    #[async_trait]
    impl UploadBackend for FakeBackend {
        async fn request_upload_url(&self, _kind: UploadKind) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("http://localhost/api/uploads/token".into())
        }

        async fn send_file(&self, _url: &str, _ct: &str, _bytes: Vec<u8>) -> anyhow::Result<Uuid> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(600)).await;
            if self.fail_send {
                anyhow::bail!("connection reset");
            }
            Ok(Uuid::from_u128(7))
        }

        async fn resolve_url(&self, storage_id: Uuid) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("http://localhost/files/{storage_id}"))
        }
    }

    fn image_field() -> UploadField {
        UploadField::new(
            MediaFieldSpec {
                name: "image_url",
                label: "Cover image",
                kind: UploadKind::Image,
            },
            None,
        )
    }

    fn jpeg(size: usize) -> PendingFile {
        PendingFile {
            file_name: "cover.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn progress_caps_at_ninety() {
        assert_eq!(next_progress(0), 10);
        assert_eq!(next_progress(85), 90);
        assert_eq!(next_progress(90), 90);
    }

    #[tokio::test]
    async fn oversized_file_never_reaches_backend() {
        let backend = FakeBackend::default();
        let mut field = image_field();
        let err = field.upload(&backend, jpeg(6 * 1024 * 1024)).await.unwrap_err();

        assert!(matches!(err, UploadFieldError::Rejected { .. }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(field.error().unwrap().starts_with("Invalid image:"));
        assert_eq!(field.value(), None);
    }

    #[tokio::test]
    async fn success_binds_resolved_url_and_resets_progress() {
        let backend = FakeBackend::default();
        let mut field = image_field();
        let url = field.upload(&backend, jpeg(1024)).await.unwrap();

        assert_eq!(url, format!("http://localhost/files/{}", Uuid::from_u128(7)));
        assert_eq!(field.value(), Some(url.as_str()));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(field.progress(), 0);
        assert!(!field.uploading());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_advances_while_transfer_runs() {
        let backend = FakeBackend::default();
        let mut field = image_field();
        let progress = field.progress_handle();

        let observer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            progress.load(Ordering::Relaxed)
        });
        field.upload(&backend, jpeg(1024)).await.unwrap();

        // Ticks land at 150 ms and 300 ms before the 350 ms read.
        let seen = observer.await.unwrap();
        assert_eq!(seen, 20);
    }

    #[tokio::test]
    async fn transfer_failure_keeps_previous_value() {
        let backend = FakeBackend {
            fail_send: true,
            ..Default::default()
        };
        let mut field = UploadField::new(*image_field().spec(), Some("/files/old".into()));
        let err = field.upload(&backend, jpeg(1024)).await.unwrap_err();

        assert_eq!(err.to_string(), "Could not upload image: connection reset");
        assert_eq!(field.value(), Some("/files/old"));
        assert_eq!(field.progress(), 0);
    }
}
