//! Document upload endpoints
//!
//! Files are written through [`UploadStore`](crate::storage::UploadStore) and
//! recorded one row per file. Each file commits on its own, so a request can
//! partially succeed; the response lists both outcomes. That includes a body
//! cut off mid-stream after some files were already stored.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use ledgerctl_core::Document;

use crate::db::repos::{DocumentRepo, NewDocument, PackageRepo};
use crate::http::error::ApiError;
use crate::http::extractors::PathId;
use crate::http::server::AppState;
use crate::storage::guess_mime_type;

/// Multipart field names that carry files
const FILE_FIELDS: [&str; 2] = ["files", "file"];

/// Files accepted in a single request
const MAX_FILES_PER_REQUEST: usize = 10;

/// Slack for multipart boundaries and headers on top of the file payloads
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// One file that could not be stored
#[derive(Debug, Serialize)]
pub struct FailedUpload {
    pub name: String,
    pub error: String,
}

/// Upload outcome
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub documents: Vec<Document>,
    pub failed: Vec<FailedUpload>,
}

/// GET /packages/{id}/documents
async fn list_documents(
    State(state): State<Arc<AppState>>,
    PathId(package_id): PathId,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = DocumentRepo::new(&state.pool)
        .list_for_package(package_id)
        .await?;
    Ok(Json(documents))
}

/// POST /packages/{id}/documents - multipart upload of one or more files
async fn upload_documents(
    State(state): State<Arc<AppState>>,
    PathId(package_id): PathId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = multipart?;

    // 404 before anything touches the disk
    PackageRepo::new(&state.pool).get(package_id).await?;

    let mut response = UploadResponse {
        documents: Vec::new(),
        failed: Vec::new(),
    };
    let mut seen = 0usize;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // Nothing stored yet, so the whole request is bad
            Err(e) if seen == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!(%package_id, "upload stream ended early: {}", e);
                response.failed.push(FailedUpload {
                    name: format!("upload-{}", seen + 1),
                    error: e.body_text(),
                });
                break;
            }
        };

        let is_file = field
            .name()
            .is_some_and(|name| FILE_FIELDS.contains(&name));
        if !is_file {
            continue;
        }

        seen += 1;
        let name = field
            .file_name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("upload-{}", seen));

        if seen > MAX_FILES_PER_REQUEST {
            response.failed.push(FailedUpload {
                name,
                error: format!("more than {} files in one request", MAX_FILES_PER_REQUEST),
            });
            continue;
        }

        let mime_type = field
            .content_type()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_owned)
            .unwrap_or_else(|| guess_mime_type(&name).to_owned());

        // A broken stream ends the request, but files already stored stay reported
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%package_id, file = %name, "upload stream ended early: {}", e);
                response.failed.push(FailedUpload {
                    name,
                    error: e.body_text(),
                });
                break;
            }
        };

        match store_one(&state, package_id, &name, &mime_type, &bytes).await {
            Ok(document) => response.documents.push(document),
            Err(error) => {
                tracing::warn!(%package_id, file = %name, "upload failed: {}", error);
                response.failed.push(FailedUpload { name, error });
            }
        }
    }

    if seen == 0 {
        return Err(ApiError::bad_request(
            "No files uploaded",
            Some("send one or more 'files' parts".into()),
        ));
    }

    if response.documents.is_empty() {
        let details = response
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.name, f.error))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ApiError::bad_request("No files could be stored", Some(details)));
    }

    tracing::info!(
        %package_id,
        stored = response.documents.len(),
        failed = response.failed.len(),
        "upload finished"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Write one file and record it. A row that fails to insert takes its file with it.
async fn store_one(
    state: &AppState,
    package_id: Uuid,
    name: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Result<Document, String> {
    let stored = state
        .uploads
        .save(package_id, name, bytes)
        .await
        .map_err(|e| e.to_string())?;

    let doc = NewDocument {
        name: name.to_owned(),
        url: stored.url.clone(),
        mime_type: mime_type.to_owned(),
    };

    match DocumentRepo::new(&state.pool).create(package_id, &doc).await {
        Ok(document) => Ok(document),
        Err(e) => {
            tracing::error!(%package_id, file = %name, "failed to record document: {}", e);
            if let Err(cleanup) = state.uploads.remove(&stored.url).await {
                tracing::warn!(url = %stored.url, "failed to remove orphaned file: {}", cleanup);
            }
            Err("could not record document".to_owned())
        }
    }
}

/// DELETE /documents/{id} - drop the row, then the file
async fn delete_document(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    let document = DocumentRepo::new(&state.pool).delete(id).await?;

    if let Err(e) = state.uploads.remove(&document.url).await {
        tracing::warn!(url = %document.url, "failed to remove stored file: {}", e);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Document routes; `max_upload_bytes` is the per-file limit.
pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    let body_limit = max_upload_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/packages/{id}/documents",
            get(list_documents)
                .post(upload_documents)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/documents/{id}", delete(delete_document))
}
