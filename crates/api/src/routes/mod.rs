//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use vendra_shared::AppError;

pub mod customers;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod payments;
pub mod returns;
pub mod sales;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(customers::routes())
        .merge(orders::routes())
        .merge(sales::routes())
        .merge(payments::routes())
        .merge(returns::routes())
        .merge(expenses::routes())
}

/// Renders an application error as a JSON response.
///
/// Route modules with domain-specific error codes (credit limit,
/// workflow, numbering) build their own bodies; everything else goes
/// through here.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status_mapping() {
        let response = error_response(&AppError::NotFound("Customer x".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(&AppError::Validation("bad amount".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&AppError::Internal("boom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
