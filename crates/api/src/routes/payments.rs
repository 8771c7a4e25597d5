//! Payment management routes, including settlement transitions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
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
use vendra_core::workflow::PaymentStatus;
use vendra_db::entities::{payments, sea_orm_active_enums::PaymentMethod};
use vendra_db::repositories::{CreatePaymentInput, PaymentError, PaymentRepository};
use vendra_shared::types::{PageRequest, PageResponse};
use vendra_shared::AppError;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/verify", post(verify_payment))
        .route("/payments/{id}/fail", post(fail_payment))
        .route("/payments/{id}/refund", post(refund_payment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing payments.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Filter by customer.
    pub customer: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// The paying customer.
    pub customer_id: Uuid,
    /// Optional sale this payment settles.
    pub sale_id: Option<Uuid>,
    /// Business date (YYYY-MM-DD).
    pub payment_date: NaiveDate,
    /// Amount as a decimal string.
    pub amount: String,
    /// Payment method: "cash", "card", "bank_transfer", or "cheque".
    pub method: String,
    /// Optional external reference.
    pub payment_ref: Option<String>,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// The paying customer.
    pub customer_id: Uuid,
    /// Settled sale, if any.
    pub sale_id: Option<Uuid>,
    /// Business date.
    pub payment_date: String,
    /// Amount received.
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// External reference, if any.
    pub payment_ref: Option<String>,
    /// Settlement status.
    pub status: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<payments::Model> for PaymentResponse {
    fn from(model: payments::Model) -> Self {
        let status: PaymentStatus = model.status.into();
        Self {
            id: model.id,
            customer_id: model.customer_id,
            sale_id: model.sale_id,
            payment_date: model.payment_date.to_string(),
            amount: model.amount.to_string(),
            method: method_to_string(&model.method),
            payment_ref: model.payment_ref,
            status: status.to_string(),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/payments` - List payments.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    match repo.list(&page, query.customer).await {
        Ok((payments, total)) => {
            let items: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => payment_error_response(&e, "Failed to list payments"),
    }
}

/// POST `/payments` - Record a payment in pending status.
async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Response {
    let amount = match Decimal::from_str(&body.amount) {
        Ok(v) => v,
        Err(_) => {
            return error_response(&AppError::Validation(format!(
                "Invalid amount: {}",
                body.amount
            )));
        }
    };

    let Some(method) = string_to_method(&body.method) else {
        return error_response(&AppError::Validation(format!(
            "Unknown payment method: {}",
            body.method
        )));
    };

    let repo = PaymentRepository::new((*state.db).clone());
    match repo
        .create(CreatePaymentInput {
            customer_id: body.customer_id,
            sale_id: body.sale_id,
            payment_date: body.payment_date,
            amount,
            method,
            payment_ref: body.payment_ref,
        })
        .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => payment_error_response(&e, "Failed to record payment"),
    }
}

/// GET `/payments/{id}` - Fetch a payment.
async fn get_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => payment_error_response(&e, "Failed to fetch payment"),
    }
}

/// POST `/payments/{id}/verify` - Confirm a pending payment.
async fn verify_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.verify(id).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => payment_error_response(&e, "Failed to verify payment"),
    }
}

/// POST `/payments/{id}/fail` - Mark a pending payment as bounced.
async fn fail_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.fail(id).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => payment_error_response(&e, "Failed to mark payment failed"),
    }
}

/// POST `/payments/{id}/refund` - Refund a verified payment.
async fn refund_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.refund(id).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => payment_error_response(&e, "Failed to refund payment"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn string_to_method(value: &str) -> Option<PaymentMethod> {
    match value {
        "cash" => Some(PaymentMethod::Cash),
        "card" => Some(PaymentMethod::Card),
        "bank_transfer" => Some(PaymentMethod::BankTransfer),
        "cheque" => Some(PaymentMethod::Cheque),
        _ => None,
    }
}

fn method_to_string(method: &PaymentMethod) -> String {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Card => "card",
        PaymentMethod::BankTransfer => "bank_transfer",
        PaymentMethod::Cheque => "cheque",
    }
    .to_string()
}

/// Maps a payment repository error to an HTTP response.
fn payment_error_response(err: &PaymentError, context: &str) -> Response {
    match err {
        PaymentError::NotFound(_) | PaymentError::CustomerNotFound(_) => {
            error_response(&AppError::NotFound(err.to_string()))
        }
        PaymentError::CustomerInactive(_)
        | PaymentError::SaleMismatch(_)
        | PaymentError::InvalidAmount(_) => {
            error_response(&AppError::BusinessRule(err.to_string()))
        }
        PaymentError::Workflow(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.error_code(), "message": e.to_string() })),
        )
            .into_response(),
        PaymentError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
