//! Media uploads: per-kind acceptance rules, signed one-time upload targets,
//! blob storage under the upload directory, and public URL resolution.
//!
//! An upload target is a token `kind.nonce.expiry.signature` where the
//! signature is HMAC-SHA256 over `kind.nonce.expiry`. The nonce becomes the
//! stored file's id, so each target can be used once.

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum_macros::{Display, EnumString, VariantNames};
use uuid::Uuid;

use super::{ContentBackend, ContentError};
use crate::config::SiteConfig;
use crate::models::{NewStoredFile, StoredFile};

type HmacSha256 = Hmac<Sha256>;

const MIB: u64 = 1024 * 1024;

/// What a media field holds. Each kind carries a fixed acceptance rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadKind {
    Image,
    Logo,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRule {
    pub max_bytes: u64,
    pub mime_types: &'static [&'static str],
}

impl UploadKind {
    pub fn rule(self) -> UploadRule {
        match self {
            UploadKind::Image => UploadRule {
                max_bytes: 5 * MIB,
                mime_types: &["image/jpeg", "image/png", "image/webp", "image/gif"],
            },
            UploadKind::Logo => UploadRule {
                max_bytes: 2 * MIB,
                mime_types: &["image/png", "image/svg+xml", "image/jpeg", "image/webp"],
            },
            UploadKind::Resume => UploadRule {
                max_bytes: 10 * MIB,
                mime_types: &["application/pdf"],
            },
        }
    }

    /// Human label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Logo => "logo",
            UploadKind::Resume => "resume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("{label} must be at most {max_mib} MB (got {size} bytes)", label = .kind.label(), max_mib = .max / MIB)]
    TooLarge { kind: UploadKind, size: u64, max: u64 },
    #[error("{label} does not accept {content_type} files", label = .kind.label())]
    UnsupportedType { kind: UploadKind, content_type: String },
    #[error("file is empty")]
    Empty,
    #[error("upload target is malformed")]
    MalformedToken,
    #[error("upload target signature does not match")]
    BadSignature,
    #[error("upload target expired at {0}")]
    Expired(DateTime<Utc>),
}

/// Strip parameters and case from a `Content-Type` header value.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check a file against its kind's size cap and MIME allow-list.
pub fn validate_file(kind: UploadKind, content_type: &str, size: u64) -> Result<(), UploadError> {
    let rule = kind.rule();
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > rule.max_bytes {
        return Err(UploadError::TooLarge {
            kind,
            size,
            max: rule.max_bytes,
        });
    }
    let content_type = normalize_content_type(content_type);
    if !rule.mime_types.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType { kind, content_type });
    }
    Ok(())
}

// ── Upload targets ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

/// The verified contents of an upload token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadClaims {
    pub kind: UploadKind,
    pub nonce: Uuid,
    pub expires_at: DateTime<Utc>,
}

fn sign(secret: &str, payload: &str) -> Result<HmacSha256, UploadError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| UploadError::BadSignature)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Build a signed token for `kind` valid until `expires_at`.
pub fn issue_token(
    secret: &str,
    kind: UploadKind,
    nonce: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<String, UploadError> {
    let payload = format!("{kind}.{}.{}", nonce.simple(), expires_at.timestamp());
    let signature = hex::encode(sign(secret, &payload)?.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Check a token's shape, signature and expiry.
pub fn verify_token(secret: &str, token: &str, now: DateTime<Utc>) -> Result<UploadClaims, UploadError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(UploadError::MalformedToken)?;
    let mut parts = payload.split('.');
    let (Some(kind), Some(nonce), Some(expiry), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(UploadError::MalformedToken);
    };

    let sig_bytes = hex::decode(signature).map_err(|_| UploadError::MalformedToken)?;
    sign(secret, payload)?
        .verify_slice(&sig_bytes)
        .map_err(|_| UploadError::BadSignature)?;

    let kind: UploadKind = kind.parse().map_err(|_| UploadError::MalformedToken)?;
    let nonce = Uuid::parse_str(nonce).map_err(|_| UploadError::MalformedToken)?;
    let expires_at = expiry
        .parse::<i64>()
        .ok()
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .ok_or(UploadError::MalformedToken)?;

    if expires_at < now {
        return Err(UploadError::Expired(expires_at));
    }
    Ok(UploadClaims {
        kind,
        nonce,
        expires_at,
    })
}

/// Generate a one-time upload target for `kind`.
pub fn create_upload_target(config: &SiteConfig, kind: UploadKind) -> Result<UploadTarget, ContentError> {
    let expires_at = Utc::now() + chrono::Duration::seconds(config.upload_ttl_secs);
    let token = issue_token(&config.upload_secret, kind, Uuid::new_v4(), expires_at)?;
    tracing::debug!(kind = %kind, %expires_at, "Upload target issued");
    Ok(UploadTarget {
        upload_url: format!("{}/api/uploads/{token}", config.public_url),
        expires_at,
    })
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Accept the bytes posted to an upload target and record the stored file.
pub async fn accept_upload(
    backend: &ContentBackend,
    config: &SiteConfig,
    token: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<StoredFile, ContentError> {
    let claims = verify_token(&config.upload_secret, token, Utc::now()).inspect_err(|e| {
        tracing::warn!(error = %e, "Upload target rejected");
        crate::metrics::upload("unknown", "rejected");
    })?;
    let kind = claims.kind.label();

    if let Err(e) = validate_file(claims.kind, content_type, bytes.len() as u64) {
        crate::metrics::upload(kind, "rejected");
        return Err(e.into());
    }
    if backend.store.find_file(claims.nonce).await?.is_some() {
        crate::metrics::upload(kind, "rejected");
        return Err(ContentError::Conflict(format!(
            "upload target {} was already used",
            claims.nonce
        )));
    }

    let content_type = normalize_content_type(content_type);
    let file_name = format!("{}.{}", claims.nonce.simple(), extension_for(&content_type));
    let sha256 = hex::encode(Sha256::digest(bytes));

    // Staged under a per-request name; only the request that claims the id
    // moves its bytes into place.
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let final_path = config.upload_dir.join(&file_name);
    let staged_path = config
        .upload_dir
        .join(format!("{file_name}.{}.part", Uuid::new_v4().simple()));
    tokio::fs::write(&staged_path, bytes).await?;

    let claimed = backend
        .store
        .insert_file(NewStoredFile {
            id: claims.nonce,
            content_type,
            size_bytes: bytes.len() as i64,
            sha256,
            file_name,
        })
        .await;
    let stored = match claimed {
        Ok(stored) => stored,
        Err(e) => {
            discard(&staged_path).await;
            crate::metrics::upload(kind, "rejected");
            return Err(e.into());
        }
    };
    if let Err(e) = tokio::fs::rename(&staged_path, &final_path).await {
        discard(&staged_path).await;
        return Err(e.into());
    }

    crate::metrics::upload(kind, "stored");
    crate::metrics::upload_bytes(kind, bytes.len() as u64);
    tracing::info!(kind, storage_id = %stored.id, size = stored.size_bytes, "Upload stored");

    Ok(stored)
}

async fn discard(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
    }
}

/// Public URL of a stored file.
pub async fn resolve_url(
    backend: &ContentBackend,
    config: &SiteConfig,
    storage_id: Uuid,
) -> Result<String, ContentError> {
    let file = find_stored(backend, storage_id).await?;
    Ok(format!("{}/files/{}", config.public_url, file.id))
}

/// Metadata and bytes of a stored file, for serving.
pub async fn read_file(
    backend: &ContentBackend,
    config: &SiteConfig,
    storage_id: Uuid,
) -> Result<(StoredFile, Vec<u8>), ContentError> {
    let file = find_stored(backend, storage_id).await?;
    let bytes = tokio::fs::read(config.upload_dir.join(&file.file_name)).await?;
    Ok((file, bytes))
}

async fn find_stored(backend: &ContentBackend, storage_id: Uuid) -> Result<StoredFile, ContentError> {
    backend
        .store
        .find_file(storage_id)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("stored file {storage_id} not found")))
}
