//! Expense handlers: CRUD and spending statistics

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{core_error, AppError, AppState, SuccessResponse};
use tally_core::{Expense, NewExpense};

/// Listing filters; blank strings mean "no filter"
#[derive(Debug, Deserialize)]
pub struct ExpenseListParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub payer: Option<String>,
    pub is_public: Option<bool>,
}

impl ExpenseListParams {
    fn range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => Err(AppError::bad_request(
                "start and end must be provided together",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatisticsParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub category: Option<String>,
    pub payer: Option<String>,
    pub is_public: Option<bool>,
}

/// POST /api/expenses - Create a spending entry
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewExpense>,
) -> Result<Json<Expense>, AppError> {
    let expense = state.db.create_expense(&req).map_err(core_error)?;
    Ok(Json(expense))
}

/// GET /api/expenses?start=&end=&category=&payer=&is_public=
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let expenses = state.db.list_expenses_filtered(
        params.range()?,
        params.category.as_deref(),
        params.payer.as_deref(),
        params.is_public,
    )?;
    Ok(Json(expenses))
}

/// GET /api/expenses/recent - The 10 most recently created entries
pub async fn recent_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(state.db.recent_expenses()?))
}

/// GET /api/expenses/:id - Get a single spending entry
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", id)))?;
    Ok(Json(expense))
}

/// PUT /api/expenses/:id - Replace a spending entry
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NewExpense>,
) -> Result<Json<Expense>, AppError> {
    let expense = state.db.update_expense(id, &req).map_err(core_error)?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete a spending entry
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_expense(id).map_err(core_error)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/expenses/statistics?start=&end=&category=&payer=&is_public=
pub async fn expense_statistics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatisticsParams>,
) -> Result<Json<tally_core::models::ExpenseStatistics>, AppError> {
    Ok(Json(state.db.expense_statistics(
        params.start,
        params.end,
        params.category.as_deref(),
        params.payer.as_deref(),
        params.is_public,
    )?))
}
