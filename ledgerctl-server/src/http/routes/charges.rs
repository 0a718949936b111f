//! Charge endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

use ledgerctl_core::Charge;

use crate::db::repos::ChargeRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, PathId};
use crate::http::server::AppState;
use crate::models::ChargeRequest;

/// POST /packages/{id}/charges - add a charge (negative for a discount)
async fn create_charge(
    State(state): State<Arc<AppState>>,
    PathId(package_id): PathId,
    ApiJson(req): ApiJson<ChargeRequest>,
) -> Result<(StatusCode, Json<Charge>), ApiError> {
    let draft = req.validate()?;
    let charge = ChargeRepo::new(&state.pool).create(package_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(charge)))
}

/// PUT /charges/{id}
async fn update_charge(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
    ApiJson(req): ApiJson<ChargeRequest>,
) -> Result<Json<Charge>, ApiError> {
    let draft = req.validate()?;
    let charge = ChargeRepo::new(&state.pool).update(id, &draft).await?;
    Ok(Json(charge))
}

/// DELETE /charges/{id}
async fn delete_charge(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    ChargeRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Charge routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages/{id}/charges", post(create_charge))
        .route("/charges/{id}", put(update_charge).delete(delete_charge))
}
