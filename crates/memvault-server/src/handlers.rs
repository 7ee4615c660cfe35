//! HTTP request handlers for the fact ledger.
//!
//! Implements the create/batch/retrieve/search/revoke endpoints plus a
//! health check using axum. Error mapping is centralized in [`AppError`]:
//! each ledger error variant corresponds to exactly one status code and
//! wire error code.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use chrono::{DateTime, Utc};
use memvault_domain::traits::FactQuery;
use memvault_domain::SourceType;
use memvault_ledger::{CreateFactRequest, FactLedger, FactPageDto, FactRecordDto, LedgerError};
use memvault_store::SqliteStore;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::gate::ApiKeyGateLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The fact ledger backing all endpoints
    pub ledger: Arc<FactLedger<SqliteStore>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Offending field, when known
    pub field: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Error surfaced by a ledger operation
    Ledger(LedgerError),
    /// Request body could not be read as JSON of the expected shape
    BadBody,
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        AppError::Ledger(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(_: JsonRejection) -> Self {
        AppError::BadBody
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            AppError::Ledger(LedgerError::Validation { field, message }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                message,
                Some(field.to_string()),
            ),
            AppError::Ledger(LedgerError::BadRequest(message)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message, None)
            }
            AppError::Ledger(LedgerError::Conflict(message)) => {
                (StatusCode::CONFLICT, "CONFLICT", message, None)
            }
            AppError::Ledger(LedgerError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message, None)
            }
            AppError::Ledger(LedgerError::Internal(detail)) => {
                // Full detail stays server-side; callers get an opaque message
                error!("Internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Unexpected server error".to_string(),
                    None,
                )
            }
            AppError::BadBody => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Malformed JSON request".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
            field,
        });
        (status, body).into_response()
    }
}

/// POST /v1/facts - Record a signed fact
async fn create_fact(
    State(state): State<AppState>,
    payload: Result<Json<CreateFactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FactRecordDto>), AppError> {
    let Json(request) = payload?;
    let dto = state.ledger.record(&request)?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// POST /v1/facts/batch - Record an ordered batch in one all-or-nothing scope
async fn create_facts_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CreateFactRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<FactRecordDto>>), AppError> {
    let Json(requests) = payload?;
    let dtos = state.ledger.record_batch(&requests)?;
    Ok((StatusCode::CREATED, Json(dtos)))
}

/// GET /v1/facts/{factId} - Fetch a fact by external id
async fn get_fact(
    State(state): State<AppState>,
    Path(fact_id): Path<String>,
) -> Result<Json<FactRecordDto>, AppError> {
    Ok(Json(state.ledger.get(&fact_id)?))
}

/// Search query parameters.
///
/// Dates and the source tag arrive as raw strings so that malformed values
/// can be answered with a bad-request instead of a framework-level reject.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    source_id: Option<String>,
    recorded_by: Option<String>,
    source_type: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    page: Option<usize>,
    size: Option<usize>,
}

fn parse_date(raw: &str, name: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::Ledger(LedgerError::BadRequest(format!(
                "Invalid {name} (expected RFC3339 date-time)"
            )))
        })
}

/// GET /v1/facts - Search facts by conjunctive attribute/date filters
async fn search_facts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<FactPageDto>, AppError> {
    let source_type = match &params.source_type {
        Some(raw) => Some(SourceType::parse(raw).ok_or_else(|| {
            AppError::Ledger(LedgerError::BadRequest(format!(
                "Invalid source_type filter: {raw}"
            )))
        })?),
        None => None,
    };
    let from_date = params
        .from_date
        .as_deref()
        .map(|raw| parse_date(raw, "from_date"))
        .transpose()?;
    let to_date = params
        .to_date
        .as_deref()
        .map(|raw| parse_date(raw, "to_date"))
        .transpose()?;

    let query = FactQuery {
        source_id: params.source_id,
        recorded_by: params.recorded_by,
        source_type,
        from_date,
        to_date,
        page: params.page.unwrap_or(0),
        size: params.size.unwrap_or(0),
    };
    Ok(Json(state.ledger.search(query)?))
}

/// Revoke request body; the reason is optional
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    /// Why the fact is being revoked
    pub reason: Option<String>,
}

/// POST /v1/facts/{factId}/revoke - Mark a fact revoked without deleting it
///
/// The body is optional, but a body that is present and malformed is a bad
/// request, not a fallback to the default reason.
async fn revoke_fact(
    State(state): State<AppState>,
    Path(fact_id): Path<String>,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let reason = match body {
        Ok(Json(b)) => b.reason,
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return Err(rejection.into()),
    }
    .unwrap_or_else(|| "No reason provided".to_string());
    state.ledger.revoke(&fact_id, &reason)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health - Liveness check, excluded from the access gate
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes behind the access gate
pub fn create_router(state: AppState, gate: ApiKeyGateLayer) -> AxumRouter {
    AxumRouter::new()
        .route("/v1/facts", post(create_fact).get(search_facts))
        .route("/v1/facts/batch", post(create_facts_batch))
        .route("/v1/facts/:fact_id", get(get_fact))
        .route("/v1/facts/:fact_id/revoke", post(revoke_fact))
        .route("/health", get(health_check))
        .layer(gate)
        .with_state(state)
}
