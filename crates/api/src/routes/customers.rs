//! Customer management routes, including statements and credit standing.

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
use vendra_core::ledger::{DateRange, LedgerError, Statement};
use vendra_shared::AppError;
use vendra_db::entities::customers;
use vendra_db::repositories::{
    CreateCustomerInput, CustomerError, CustomerRepository, StatementError, StatementRepository,
    UpdateCustomerInput,
};
use vendra_shared::types::{PageRequest, PageResponse};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(deactivate_customer),
        )
        .route("/customers/{id}/statement", get(customer_statement))
        .route("/customers/{id}/credit", get(customer_credit))
        .route("/customers/{id}/reconcile", post(reconcile_customer))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing customers.
#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    /// Name fragment to filter by.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Opening balance as a decimal string (default "0").
    pub opening_balance: Option<String>,
    /// Credit limit as a decimal string (default "0", disabled).
    pub credit_limit: Option<String>,
}

/// Request body for updating a customer.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
    /// New postal address.
    pub address: Option<String>,
    /// New credit limit as a decimal string.
    pub credit_limit: Option<String>,
}

/// Query parameters for the statement window.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Window start (YYYY-MM-DD), inclusive.
    pub from: Option<NaiveDate>,
    /// Window end (YYYY-MM-DD), inclusive.
    pub to: Option<NaiveDate>,
}

/// Response for a customer.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    /// Customer ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Opening balance.
    pub opening_balance: String,
    /// Credit limit.
    pub credit_limit: String,
    /// Cached amount owed.
    pub total_due: String,
    /// Whether the customer is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<customers::Model> for CustomerResponse {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            opening_balance: model.opening_balance.to_string(),
            credit_limit: model.credit_limit.to_string(),
            total_due: model.total_due.to_string(),
            is_active: model.is_active,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Response for one statement line.
#[derive(Debug, Serialize)]
pub struct StatementLineResponse {
    /// Identifier of the underlying record.
    pub id: Uuid,
    /// Business date.
    pub date: String,
    /// Entry kind: "sale", "payment", or "return".
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description.
    pub description: String,
    /// Business reference.
    pub reference: Option<String>,
    /// Debit amount.
    pub debit: String,
    /// Credit amount.
    pub credit: String,
    /// Running balance after this entry.
    pub balance: String,
}

/// Response for a customer statement.
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    /// Entries in chronological order.
    pub entries: Vec<StatementLineResponse>,
    /// Balance carried into the window.
    pub opening_balance: String,
    /// Balance after the last entry.
    pub closing_balance: String,
    /// Sum of debits.
    pub total_debit: String,
    /// Sum of credits.
    pub total_credit: String,
}

impl From<Statement> for StatementResponse {
    fn from(statement: Statement) -> Self {
        let entries = statement
            .lines
            .into_iter()
            .map(|line| StatementLineResponse {
                id: line.entry.id,
                date: line.entry.date.to_string(),
                kind: match line.entry.kind {
                    vendra_core::ledger::EntryKind::Sale => "sale".to_string(),
                    vendra_core::ledger::EntryKind::Payment => "payment".to_string(),
                    vendra_core::ledger::EntryKind::Return => "return".to_string(),
                },
                description: line.entry.description,
                reference: line.entry.reference,
                debit: line.entry.debit.to_string(),
                credit: line.entry.credit.to_string(),
                balance: line.balance.to_string(),
            })
            .collect();

        Self {
            entries,
            opening_balance: statement.opening_balance.to_string(),
            closing_balance: statement.closing_balance.to_string(),
            total_debit: statement.total_debit.to_string(),
            total_credit: statement.total_credit.to_string(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/customers` - List active customers.
async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    match repo.list(&page, query.search.as_deref()).await {
        Ok((customers, total)) => {
            let items: Vec<CustomerResponse> =
                customers.into_iter().map(CustomerResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => customer_error_response(&e, "Failed to list customers"),
    }
}

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerRequest>,
) -> Response {
    let opening_balance = match parse_amount(body.opening_balance.as_deref().unwrap_or("0")) {
        Ok(v) => v,
        Err(response) => return response,
    };
    let credit_limit = match parse_amount(body.credit_limit.as_deref().unwrap_or("0")) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let repo = CustomerRepository::new((*state.db).clone());
    match repo
        .create(CreateCustomerInput {
            name: body.name,
            email: body.email,
            phone: body.phone,
            address: body.address,
            opening_balance,
            credit_limit,
        })
        .await
    {
        Ok(customer) => (
            StatusCode::CREATED,
            Json(CustomerResponse::from(customer)),
        )
            .into_response(),
        Err(e) => customer_error_response(&e, "Failed to create customer"),
    }
}

/// GET `/customers/{id}` - Fetch a customer.
async fn get_customer(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(customer) => (StatusCode::OK, Json(CustomerResponse::from(customer))).into_response(),
        Err(e) => customer_error_response(&e, "Failed to fetch customer"),
    }
}

/// PATCH `/customers/{id}` - Update contact details and credit limit.
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Response {
    let credit_limit = match body.credit_limit.as_deref().map(parse_amount).transpose() {
        Ok(v) => v,
        Err(response) => return response,
    };

    let repo = CustomerRepository::new((*state.db).clone());
    match repo
        .update(
            id,
            UpdateCustomerInput {
                name: body.name,
                email: body.email,
                phone: body.phone,
                address: body.address,
                credit_limit,
            },
        )
        .await
    {
        Ok(customer) => (StatusCode::OK, Json(CustomerResponse::from(customer))).into_response(),
        Err(e) => customer_error_response(&e, "Failed to update customer"),
    }
}

/// DELETE `/customers/{id}` - Soft-delete a customer.
async fn deactivate_customer(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.deactivate(id).await {
        Ok(customer) => (StatusCode::OK, Json(CustomerResponse::from(customer))).into_response(),
        Err(e) => customer_error_response(&e, "Failed to deactivate customer"),
    }
}

/// GET `/customers/{id}/statement` - Compute the ledger statement.
async fn customer_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Response {
    let repo = StatementRepository::new((*state.db).clone());
    let range = DateRange {
        from: query.from,
        to: query.to,
    };

    match repo.customer_statement(id, range).await {
        Ok(statement) => {
            (StatusCode::OK, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => statement_error_response(&e),
    }
}

/// GET `/customers/{id}/credit` - Credit standing from the cached fields.
async fn customer_credit(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.credit_standing(id).await {
        Ok(standing) => (
            StatusCode::OK,
            Json(json!({
                "credit_limit": standing.credit_limit.to_string(),
                "total_due": standing.total_due.to_string(),
                "available_credit": standing.available_credit().to_string(),
                "is_over_limit": standing.is_over_limit(),
            })),
        )
            .into_response(),
        Err(e) => customer_error_response(&e, "Failed to fetch credit standing"),
    }
}

/// POST `/customers/{id}/reconcile` - Recompute the total_due cache.
async fn reconcile_customer(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.reconcile(id).await {
        Ok(customer) => (StatusCode::OK, Json(CustomerResponse::from(customer))).into_response(),
        Err(e) => customer_error_response(&e, "Failed to reconcile customer"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses a decimal amount from a request string.
fn parse_amount(value: &str) -> Result<Decimal, Response> {
    Decimal::from_str(value)
        .map_err(|_| error_response(&AppError::Validation(format!("Invalid amount: {value}"))))
}

/// Maps a customer repository error to an HTTP response.
fn customer_error_response(err: &CustomerError, context: &str) -> Response {
    match err {
        CustomerError::NotFound(id) => {
            error_response(&AppError::NotFound(format!("Customer {id}")))
        }
        CustomerError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}

/// Maps a statement repository error to an HTTP response.
fn statement_error_response(err: &StatementError) -> Response {
    match err {
        StatementError::CustomerNotFound(id) => {
            error_response(&AppError::NotFound(format!("Customer {id}")))
        }
        StatementError::Ledger(e @ LedgerError::InvalidRange { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": e.error_code(),
                "message": e.to_string()
            })),
        )
            .into_response(),
        StatementError::Database(e) => {
            error!(error = %e, "Failed to compute statement");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
