//! Dashboard endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use ledgerctl_core::DashboardStats;

use crate::db::repos::DashboardRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// GET /dashboard - ledger-wide totals
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = DashboardRepo::new(&state.pool).stats().await?;
    Ok(Json(stats))
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
