//! Company endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use ledgerctl_core::{Company, CompanyLedger, CompanySummary};

use crate::db::repos::CompanyRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, PathId};
use crate::http::server::AppState;
use crate::models::{CompanyFilter, CompanyListParams, CompanyRequest};

/// GET /companies - list with totals, newest activity first
async fn list_companies(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<CompanyListParams>,
) -> Result<Json<Vec<CompanySummary>>, ApiError> {
    let filter = CompanyFilter::try_from(params)?;
    let companies = CompanyRepo::new(&state.pool).list(&filter).await?;
    Ok(Json(companies))
}

/// POST /companies - create a company
async fn create_company(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CompanyRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let draft = req.validate()?;
    let company = CompanyRepo::new(&state.pool).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /companies/{id} - company with packages, entries and totals
async fn get_company(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<Json<CompanyLedger>, ApiError> {
    let ledger = CompanyRepo::new(&state.pool).ledger(id).await?;
    Ok(Json(ledger))
}

/// PUT /companies/{id} - replace company fields
async fn update_company(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
    ApiJson(req): ApiJson<CompanyRequest>,
) -> Result<Json<Company>, ApiError> {
    let draft = req.validate()?;
    let company = CompanyRepo::new(&state.pool).update(id, &draft).await?;
    Ok(Json(company))
}

/// DELETE /companies/{id} - refused while the company has packages
async fn delete_company(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    CompanyRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /companies/{id}/reset-updates - clear the update flags top-down
async fn reset_updates(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    CompanyRepo::new(&state.pool).reset_updates(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Company routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/{id}/reset-updates", post(reset_updates))
}
