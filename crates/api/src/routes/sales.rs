//! Sale (bill) management routes.

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
use vendra_db::entities::sales;
use vendra_db::repositories::{CreateSaleInput, SaleError, SaleRepository};
use vendra_shared::types::{PageRequest, PageResponse};
use vendra_shared::AppError;

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{id}", get(get_sale))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing sales.
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    /// Filter by customer.
    pub customer: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating a sale.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    /// The billed customer.
    pub customer_id: Uuid,
    /// Optional originating order.
    pub order_id: Option<Uuid>,
    /// Business date (YYYY-MM-DD).
    pub sale_date: NaiveDate,
    /// Net amount as a decimal string.
    pub net_amount: String,
    /// Optional settling payment reference.
    pub payment_ref: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Response for a sale.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    /// Sale ID.
    pub id: Uuid,
    /// The billed customer.
    pub customer_id: Uuid,
    /// Originating order, if any.
    pub order_id: Option<Uuid>,
    /// Bill number (`FS-YYYY-NNNN`).
    pub bill_no: String,
    /// Business date.
    pub sale_date: String,
    /// Net amount billed.
    pub net_amount: String,
    /// Settling payment reference, if any.
    pub payment_ref: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<sales::Model> for SaleResponse {
    fn from(model: sales::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            order_id: model.order_id,
            bill_no: model.bill_no,
            sale_date: model.sale_date.to_string(),
            net_amount: model.net_amount.to_string(),
            payment_ref: model.payment_ref,
            notes: model.notes,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/sales` - List sales.
async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Response {
    let repo = SaleRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    match repo.list(&page, query.customer).await {
        Ok((sales, total)) => {
            let items: Vec<SaleResponse> = sales.into_iter().map(SaleResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => sale_error_response(&e, "Failed to list sales"),
    }
}

/// POST `/sales` - Create a sale with a freshly allocated bill number.
async fn create_sale(State(state): State<AppState>, Json(body): Json<CreateSaleRequest>) -> Response {
    let net_amount = match Decimal::from_str(&body.net_amount) {
        Ok(v) => v,
        Err(_) => {
            return error_response(&AppError::Validation(format!(
                "Invalid amount: {}",
                body.net_amount
            )));
        }
    };

    let repo = SaleRepository::new((*state.db).clone());
    match repo
        .create(CreateSaleInput {
            customer_id: body.customer_id,
            order_id: body.order_id,
            sale_date: body.sale_date,
            net_amount,
            payment_ref: body.payment_ref,
            notes: body.notes,
        })
        .await
    {
        Ok(sale) => (StatusCode::CREATED, Json(SaleResponse::from(sale))).into_response(),
        Err(e) => sale_error_response(&e, "Failed to create sale"),
    }
}

/// GET `/sales/{id}` - Fetch a sale.
async fn get_sale(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = SaleRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(sale) => (StatusCode::OK, Json(SaleResponse::from(sale))).into_response(),
        Err(e) => sale_error_response(&e, "Failed to fetch sale"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps a sale repository error to an HTTP response.
fn sale_error_response(err: &SaleError, context: &str) -> Response {
    match err {
        SaleError::NotFound(_) | SaleError::CustomerNotFound(_) => {
            error_response(&AppError::NotFound(err.to_string()))
        }
        SaleError::CreditLimitExceeded { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "CREDIT_LIMIT_EXCEEDED",
                "message": err.to_string()
            })),
        )
            .into_response(),
        SaleError::CustomerInactive(_)
        | SaleError::OrderMismatch(_)
        | SaleError::InvalidAmount(_) => error_response(&AppError::BusinessRule(err.to_string())),
        SaleError::Numbering(e @ NumberingError::ConcurrencyConflict { .. }) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.error_code(), "message": e.to_string() })),
        )
            .into_response(),
        SaleError::Numbering(e) => {
            error!(error = %e, "{context}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.error_code(), "message": "An error occurred" })),
            )
                .into_response()
        }
        SaleError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
