//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};

/// GET /api/health - Liveness check with a cheap database probe
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let records = state.db.count_asset_records()?;
    let expenses = state.db.count_expenses()?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "asset_records": records,
        "expenses": expenses,
    })))
}
