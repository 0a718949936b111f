//! Payment endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

use ledgerctl_core::Payment;

use crate::db::repos::PaymentRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, PathId};
use crate::http::server::AppState;
use crate::models::PaymentRequest;

/// POST /payments - record a payment; body carries packageId
async fn create_payment(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let (package_id, draft) = req.validate_new()?;
    let payment = PaymentRepo::new(&state.pool).create(package_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// PUT /payments/{id}
async fn update_payment(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let draft = req.validate()?;
    let payment = PaymentRepo::new(&state.pool).update(id, &draft).await?;
    Ok(Json(payment))
}

/// DELETE /payments/{id}
async fn delete_payment(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    PaymentRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Payment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/{id}", put(update_payment).delete(delete_payment))
}
