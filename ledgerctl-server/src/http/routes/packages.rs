//! Package endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use ledgerctl_core::{Package, PackageDetail};

use crate::db::repos::PackageRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, PathId};
use crate::http::server::AppState;
use crate::models::{NewPackageRequest, PackageUpdateRequest};

/// POST /packages - create a package under a company
async fn create_package(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewPackageRequest>,
) -> Result<(StatusCode, Json<Package>), ApiError> {
    let (company_id, draft) = req.validate()?;
    let package = PackageRepo::new(&state.pool).create(company_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

/// GET /packages/{id} - package with entries, totals, company and documents
async fn get_package(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<Json<PackageDetail>, ApiError> {
    let detail = PackageRepo::new(&state.pool).detail(id).await?;
    Ok(Json(detail))
}

/// PUT /packages/{id} - update fields and optionally edit charges
async fn update_package(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
    ApiJson(req): ApiJson<PackageUpdateRequest>,
) -> Result<Json<PackageDetail>, ApiError> {
    let update = req.validate()?;
    let repo = PackageRepo::new(&state.pool);
    repo.update(id, &update).await?;
    Ok(Json(repo.detail(id).await?))
}

/// DELETE /packages/{id} - refused while charges or payments exist
async fn delete_package(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    let documents = PackageRepo::new(&state.pool).delete(id).await?;

    // Rows are gone; stale files are only logged
    for document in documents {
        if let Err(e) = state.uploads.remove(&document.url).await {
            tracing::warn!(url = %document.url, "failed to remove stored file: {}", e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Package routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages", post(create_package))
        .route(
            "/packages/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
}
