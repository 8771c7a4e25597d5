//! Order management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
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
use vendra_core::workflow::OrderStatus;
use vendra_db::entities::orders;
use vendra_db::repositories::{CreateOrderInput, OrderError, OrderFilter, OrderRepository};
use vendra_shared::types::{PageRequest, PageResponse};
use vendra_shared::AppError;

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// Filter by customer.
    pub customer: Option<Uuid>,
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// The ordering customer.
    pub customer_id: Uuid,
    /// Business date (YYYY-MM-DD).
    pub order_date: NaiveDate,
    /// Total order value as a decimal string.
    pub total_amount: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    /// Target status.
    pub status: String,
}

/// Response for an order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// The ordering customer.
    pub customer_id: Uuid,
    /// Business reference (`ORD-YYYY-NNNNN`).
    pub order_no: String,
    /// Business date.
    pub order_date: String,
    /// Current status.
    pub status: String,
    /// Total order value.
    pub total_amount: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<orders::Model> for OrderResponse {
    fn from(model: orders::Model) -> Self {
        let status: OrderStatus = model.status.into();
        Self {
            id: model.id,
            customer_id: model.customer_id,
            order_no: model.order_no,
            order_date: model.order_date.to_string(),
            status: status.to_string(),
            total_amount: model.total_amount.to_string(),
            notes: model.notes,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/orders` - List orders with filters.
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Response {
    let status = match query.status.as_deref().map(OrderStatus::from_str).transpose() {
        Ok(status) => status,
        Err(message) => return error_response(&AppError::Validation(message)),
    };

    let repo = OrderRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };
    let filter = OrderFilter {
        customer_id: query.customer,
        status,
    };

    match repo.list(&page, filter).await {
        Ok((orders, total)) => {
            let items: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => order_error_response(&e, "Failed to list orders"),
    }
}

/// POST `/orders` - Create an order with a freshly allocated number.
async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Response {
    let total_amount = match Decimal::from_str(&body.total_amount) {
        Ok(v) => v,
        Err(_) => {
            return error_response(&AppError::Validation(format!(
                "Invalid amount: {}",
                body.total_amount
            )));
        }
    };

    let repo = OrderRepository::new((*state.db).clone());
    match repo
        .create(CreateOrderInput {
            customer_id: body.customer_id,
            order_date: body.order_date,
            total_amount,
            notes: body.notes,
        })
        .await
    {
        Ok(order) => (StatusCode::CREATED, Json(OrderResponse::from(order))).into_response(),
        Err(e) => order_error_response(&e, "Failed to create order"),
    }
}

/// GET `/orders/{id}` - Fetch an order.
async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = OrderRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Err(e) => order_error_response(&e, "Failed to fetch order"),
    }
}

/// PATCH `/orders/{id}/status` - Move an order through its workflow.
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Response {
    let next = match OrderStatus::from_str(&body.status) {
        Ok(status) => status,
        Err(message) => return error_response(&AppError::Validation(message)),
    };

    let repo = OrderRepository::new((*state.db).clone());
    match repo.update_status(id, next).await {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Err(e) => order_error_response(&e, "Failed to update order status"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps an order repository error to an HTTP response.
fn order_error_response(err: &OrderError, context: &str) -> Response {
    match err {
        OrderError::NotFound(_) | OrderError::CustomerNotFound(_) => {
            error_response(&AppError::NotFound(err.to_string()))
        }
        OrderError::CustomerInactive(_) | OrderError::InvalidAmount(_) => {
            error_response(&AppError::BusinessRule(err.to_string()))
        }
        OrderError::Workflow(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.error_code(), "message": e.to_string() })),
        )
            .into_response(),
        OrderError::Numbering(e @ NumberingError::ConcurrencyConflict { .. }) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.error_code(), "message": e.to_string() })),
        )
            .into_response(),
        OrderError::Numbering(e) => {
            error!(error = %e, "{context}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.error_code(), "message": "An error occurred" })),
            )
                .into_response()
        }
        OrderError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
