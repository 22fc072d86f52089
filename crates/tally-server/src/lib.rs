//! Tally Web Server
//!
//! Axum-based REST API for the Tally asset tracker:
//! - Asset ledger CRUD and filtered listings
//! - Aggregate endpoints (totals, monthly income)
//! - Year-end forecast, per-user and household-wide
//! - Expense CRUD and spending statistics
//!
//! Error responses are sanitized: validation problems and missing records
//! map to 400/404 with a short message, everything else becomes an opaque
//! 500 while the full error goes to the log.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use tally_core::{Clock, Database, SystemClock};

mod handlers;

#[cfg(test)]
mod tests;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Time source for forecast horizons; swapped for a fixed clock in tests
    pub clock: Arc<dyn Clock>,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    create_router_with_clock(db, config, Arc::new(SystemClock))
}

/// Create the application router with an explicit clock (for testing)
pub fn create_router_with_clock(
    db: Database,
    config: ServerConfig,
    clock: Arc<dyn Clock>,
) -> Router {
    let state = Arc::new(AppState { db, clock });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/asset-records",
            get(handlers::list_asset_records).post(handlers::create_asset_record),
        )
        .route("/asset-records/total", get(handlers::total_assets_for_all))
        .route(
            "/asset-records/monthly-income",
            get(handlers::monthly_income_for_all),
        )
        .route("/asset-records/forecast", get(handlers::forecast_for_all))
        .route(
            "/asset-records/:id",
            get(handlers::get_asset_record)
                .put(handlers::update_asset_record)
                .delete(handlers::delete_asset_record),
        )
        .route(
            "/asset-records/user/:user_id",
            get(handlers::list_asset_records_by_user),
        )
        .route(
            "/asset-records/user/:user_id/type/:record_type",
            get(handlers::list_asset_records_by_user_and_type),
        )
        .route(
            "/asset-records/user/:user_id/range",
            get(handlers::list_asset_records_by_user_in_range),
        )
        .route(
            "/asset-records/user/:user_id/total",
            get(handlers::total_assets_by_user),
        )
        .route(
            "/asset-records/user/:user_id/monthly-income",
            get(handlers::monthly_income_by_user),
        )
        .route(
            "/asset-records/user/:user_id/forecast",
            get(handlers::forecast_by_user),
        )
        .route(
            "/asset-records/user/:user_id/recent",
            get(handlers::recent_asset_records),
        )
        .route(
            "/asset-records/owner/:owner",
            get(handlers::list_asset_records_by_owner),
        )
        .route(
            "/asset-records/owner/:owner/type/:record_type",
            get(handlers::list_asset_records_by_owner_and_type),
        )
        .route(
            "/asset-records/owner/:owner/range",
            get(handlers::list_asset_records_by_owner_in_range),
        )
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/recent", get(handlers::recent_expenses))
        .route("/expenses/statistics", get(handlers::expense_statistics))
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until terminated
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        // Same-origin only
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// API error with sanitized client-facing message
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

/// Map core errors onto HTTP statuses
///
/// The blanket `From` above turns everything into a 500; validation and
/// lookup failures are client errors and use this instead.
pub(crate) fn core_error(err: tally_core::Error) -> AppError {
    match err {
        tally_core::Error::InvalidData(msg) => AppError::bad_request(&msg),
        tally_core::Error::NotFound(msg) => AppError::not_found(&msg),
        other => AppError::from(other),
    }
}
