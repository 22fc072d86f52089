//! Asset ledger handlers: CRUD, filtered listings, aggregates, forecast

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{core_error, AppError, AppState, SuccessResponse};
use tally_core::{AssetForecast, AssetRecord, Forecaster, NewAssetRecord, RecordType, Scope};

/// Inclusive date range, both ends required
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Optional aggregate filters; blank strings mean "no filter"
#[derive(Debug, Deserialize)]
pub struct TotalParams {
    pub record_type: Option<String>,
    pub owner: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TotalParams {
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
pub struct RecentParams {
    pub limit: Option<i64>,
}

/// POST /api/asset-records - Create a ledger entry
pub async fn create_asset_record(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewAssetRecord>,
) -> Result<Json<AssetRecord>, AppError> {
    let record = state.db.create_asset_record(&req).map_err(core_error)?;
    Ok(Json(record))
}

/// GET /api/asset-records - List all ledger entries
pub async fn list_asset_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    Ok(Json(state.db.list_asset_records()?))
}

/// GET /api/asset-records/:id - Get a single ledger entry
pub async fn get_asset_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AssetRecord>, AppError> {
    let record = state
        .db
        .get_asset_record(id)?
        .ok_or_else(|| AppError::not_found(&format!("Asset record {} not found", id)))?;
    Ok(Json(record))
}

/// PUT /api/asset-records/:id - Replace a ledger entry
pub async fn update_asset_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NewAssetRecord>,
) -> Result<Json<AssetRecord>, AppError> {
    let record = state.db.update_asset_record(id, &req).map_err(core_error)?;
    Ok(Json(record))
}

/// DELETE /api/asset-records/:id - Delete a ledger entry
pub async fn delete_asset_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_asset_record(id).map_err(core_error)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/asset-records/user/:user_id - A user's ledger entries
pub async fn list_asset_records_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    Ok(Json(state.db.list_asset_records_by_user(user_id)?))
}

/// GET /api/asset-records/user/:user_id/type/:record_type
pub async fn list_asset_records_by_user_and_type(
    State(state): State<Arc<AppState>>,
    Path((user_id, record_type)): Path<(i64, String)>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    let record_type = RecordType::from(record_type);
    Ok(Json(
        state
            .db
            .list_asset_records_by_user_and_type(user_id, &record_type)?,
    ))
}

/// GET /api/asset-records/user/:user_id/range?start=&end=
pub async fn list_asset_records_by_user_in_range(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(range): Query<RangeParams>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    Ok(Json(state.db.list_asset_records_by_user_in_range(
        user_id,
        range.start,
        range.end,
    )?))
}

/// GET /api/asset-records/owner/:owner - An owner's ledger entries
pub async fn list_asset_records_by_owner(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    Ok(Json(state.db.list_asset_records_by_owner(&owner)?))
}

/// GET /api/asset-records/owner/:owner/type/:record_type
pub async fn list_asset_records_by_owner_and_type(
    State(state): State<Arc<AppState>>,
    Path((owner, record_type)): Path<(String, String)>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    let record_type = RecordType::from(record_type);
    Ok(Json(
        state
            .db
            .list_asset_records_by_owner_and_type(&owner, &record_type)?,
    ))
}

/// GET /api/asset-records/owner/:owner/range?start=&end=
pub async fn list_asset_records_by_owner_in_range(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
    Query(range): Query<RangeParams>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    Ok(Json(state.db.list_asset_records_by_owner_in_range(
        &owner,
        range.start,
        range.end,
    )?))
}

/// GET /api/asset-records/user/:user_id/recent?limit=
///
/// Limits above 10 return the user's full history by record date; see the
/// data layer for the compatibility quirk.
pub async fn recent_asset_records(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<AssetRecord>>, AppError> {
    let limit = params.limit.unwrap_or(10);
    if limit <= 0 {
        return Err(AppError::bad_request("limit must be positive"));
    }
    Ok(Json(state.db.recent_asset_records(user_id, limit)?))
}

/// GET /api/asset-records/user/:user_id/total?record_type=&owner=&start=&end=
pub async fn total_assets_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<TotalParams>,
) -> Result<Json<Decimal>, AppError> {
    let total = state.db.sum_assets_filtered(
        Scope::User(user_id),
        params.record_type.as_deref(),
        params.owner.as_deref(),
        params.range()?,
    )?;
    Ok(Json(total))
}

/// GET /api/asset-records/total?record_type=&owner=&start=&end=
pub async fn total_assets_for_all(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TotalParams>,
) -> Result<Json<Decimal>, AppError> {
    let total = state.db.sum_assets_filtered(
        Scope::All,
        params.record_type.as_deref(),
        params.owner.as_deref(),
        params.range()?,
    )?;
    Ok(Json(total))
}

/// GET /api/asset-records/user/:user_id/monthly-income
pub async fn monthly_income_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Decimal>, AppError> {
    Ok(Json(state.db.salary_total(Scope::User(user_id))?))
}

/// GET /api/asset-records/monthly-income - Salary total across all users
pub async fn monthly_income_for_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Decimal>, AppError> {
    Ok(Json(state.db.salary_total(Scope::All)?))
}

/// GET /api/asset-records/user/:user_id/forecast
pub async fn forecast_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<AssetForecast>, AppError> {
    let forecaster = Forecaster::new(&state.db, state.clock.as_ref());
    Ok(Json(forecaster.predict_year_end(Scope::User(user_id))?))
}

/// GET /api/asset-records/forecast - Household-wide forecast
pub async fn forecast_for_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AssetForecast>, AppError> {
    let forecaster = Forecaster::new(&state.db, state.clock.as_ref());
    Ok(Json(forecaster.predict_year_end(Scope::All)?))
}
