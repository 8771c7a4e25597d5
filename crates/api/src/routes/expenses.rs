//! Expense tracking routes.

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
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use super::error_response;
use crate::AppState;
use vendra_db::entities::expenses;
use vendra_db::repositories::{
    CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository,
};
use vendra_shared::types::{PageRequest, PageResponse};
use vendra_shared::AppError;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/{id}", get(get_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Expense category.
    pub category: String,
    /// Business date (YYYY-MM-DD).
    pub expense_date: NaiveDate,
    /// Amount as a decimal string.
    pub amount: String,
    /// Free-form description.
    pub description: Option<String>,
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Expense category.
    pub category: String,
    /// Business date.
    pub expense_date: String,
    /// Amount spent.
    pub amount: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<expenses::Model> for ExpenseResponse {
    fn from(model: expenses::Model) -> Self {
        Self {
            id: model.id,
            category: model.category,
            expense_date: model.expense_date.to_string(),
            amount: model.amount.to_string(),
            description: model.description,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/expenses` - List expenses with filters.
async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListExpensesQuery>,
) -> Response {
    let repo = ExpenseRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };
    let filter = ExpenseFilter {
        category: query.category,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list(&page, filter).await {
        Ok((expenses, total)) => {
            let items: Vec<ExpenseResponse> =
                expenses.into_iter().map(ExpenseResponse::from).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(items, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => expense_error_response(&e, "Failed to list expenses"),
    }
}

/// POST `/expenses` - Record an expense.
async fn create_expense(
    State(state): State<AppState>,
    Json(body): Json<CreateExpenseRequest>,
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

    let repo = ExpenseRepository::new((*state.db).clone());
    match repo
        .create(CreateExpenseInput {
            category: body.category,
            expense_date: body.expense_date,
            amount,
            description: body.description,
        })
        .await
    {
        Ok(expense) => (StatusCode::CREATED, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => expense_error_response(&e, "Failed to record expense"),
    }
}

/// GET `/expenses/{id}` - Fetch an expense.
async fn get_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => expense_error_response(&e, "Failed to fetch expense"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps an expense repository error to an HTTP response.
fn expense_error_response(err: &ExpenseError, context: &str) -> Response {
    match err {
        ExpenseError::NotFound(_) => error_response(&AppError::NotFound(err.to_string())),
        ExpenseError::InvalidAmount(_) => {
            error_response(&AppError::BusinessRule(err.to_string()))
        }
        ExpenseError::Database(e) => {
            error!(error = %e, "{context}");
            error_response(&AppError::Internal("An error occurred".to_string()))
        }
    }
}
