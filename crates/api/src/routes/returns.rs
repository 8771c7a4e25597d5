//! Sales-return management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use super::error_response;
use crate::AppState;
use vendra_core::numbering::NumberingError;
use vendra_db::entities::sales_returns;
use vendra_db::repositories::{
    CreateSalesReturnInput, SalesReturnError, SalesReturnRepository,
};
use vendra_shared::types::{PageRequest, PageResponse};
use vendra_shared::AppError;

/// Creates the sales-return routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/returns", get(list_returns).post(create_return))
        .route("/returns/{id}", get(get_return))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing returns.
#[derive(Debug, Deserialize)]
pub struct ListReturnsQuery {
    /// Filter by customer.
    pub customer: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating a sales return.
#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    /// The returning customer.
    pub customer_id: Uuid,
    /// Optional sale the goods came from.
    pub sale_id: Option<Uuid>,
    /// Business date (YYYY-MM-DD).
    pub return_date: NaiveDate,
    /// Total value as a decimal string.
    pub grand_total: String,
    /// Why the goods came back.
    pub reason: Option<String>,
}

/// Response for a sales return.
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    /// Return ID.
    pub id: Uuid,
    /// The returning customer.
    pub customer_id: Uuid,
    /// Originating sale, if any.
    pub sale_id: Option<Uuid>,
    /// Return number (`SR-YYYY-NNNN`).
    pub return_no: String,
    /// Business date.
    pub return_date: String,
    /// Total value credited back.
    pub grand_total: String,
    /// Reason for the return.
    pub reason: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<sales_returns::Model> for ReturnResponse {
    fn from(model: sales_returns::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            sale_id: model.sale_id,
            return_no: model.return_no,
            return_date: model.return_date.to_string(),
            grand_total: model.grand_total.to_string(),
            reason: model.reason,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/returns` - List sales returns.
async fn list_returns(
    State(state): State<AppState>,
    Query(query): Query<ListReturnsQuery>,
) -> Response {
    let repo = SalesReturnRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    match repo.list(&page, query.customer).await {
        Ok((returns, total)) => {
            let items: Vec<ReturnResponse> =
                returns.into_iter().map(ReturnResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => return_error_response(&e, "Failed to list returns"),
    }
}

/// POST `/returns` - Create a return with a freshly allocated number.
async fn create_return(
    State(state): State<AppState>,
    Json(body): Json<CreateReturnRequest>,
) -> Response {
    let grand_total = match Decimal::from_str(&body.grand_total) {
        Ok(v) => v,
        Err(_) => {
            return error_response(&AppError::Validation(format!(
                "Invalid amount: {}",
                body.grand_total
            )));
        }
    };

    let repo = SalesReturnRepository::new((*state.db).clone());
    match repo
        .create(CreateSalesReturnInput {
            customer_id: body.customer_id,
            sale_id: body.sale_id,
            return_date: body.return_date,
            grand_total,
            reason: body.reason,
        })
        .await
    {
        Ok(row) => (StatusCode::CREATED, Json(ReturnResponse::from(row))).into_response(),
        Err(e) => return_error_response(&e, "Failed to create return"),
    }
}

/// GET `/returns/{id}` - Fetch a sales return.
async fn get_return(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = SalesReturnRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(row) => (StatusCode::OK, Json(ReturnResponse::from(row))).into_response(),
        Err(e) => return_error_response(&e, "Failed to fetch return"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps a sales-return repository error to an HTTP response.
fn return_error_response(err: &SalesReturnError, context: &str) -> Response {
    match err {
        SalesReturnError::NotFound(_) | SalesReturnError::CustomerNotFound(_) => {
            error_response(&AppError::NotFound(err.to_string()))
        }
        SalesReturnError::CustomerInactive(_)
        | SalesReturnError::SaleMismatch(_)
        | SalesReturnError::InvalidAmount(_) => {
            error_response(&AppError::BusinessRule(err.to_string()))
        }
        SalesReturnError::Numbering(e @ NumberingError::ConcurrencyConflict { .. }) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.error_code(), "message": e.to_string() })),
        )
            .into_response(),
        SalesReturnError::Numbering(e) => {
            error!(error = %e, "{context}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.error_code(), "message": "An error occurred" })),
            )
                .into_response()
        }
        SalesReturnError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
