//! # Report Routes
//!
//! Dashboard headline numbers and the debtors list. The SQL rollups live
//! in fiado-db; these handlers only serialize.

use axum::extract::State;
use axum::Json;

use fiado_db::{DashboardSummary, DebtorRow};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /reports/dashboard
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = state.db.reports().dashboard_summary().await?;
    Ok(Json(summary))
}

/// GET /reports/debtors
pub async fn debtors(State(state): State<AppState>) -> Result<Json<Vec<DebtorRow>>, ApiError> {
    let debtors = state.db.reports().list_debtors().await?;
    Ok(Json(debtors))
}
