//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Creation paths for numbered documents (orders, sales,
//! sales returns) allocate their reference number with a bounded retry
//! against the unique index.

pub mod customer;
pub mod expense;
pub mod order;
pub mod payment;
pub mod sale;
pub mod sales_return;
pub mod statement;

pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput};
pub use expense::{CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository};
pub use order::{CreateOrderInput, OrderError, OrderFilter, OrderRepository};
pub use payment::{CreatePaymentInput, PaymentError, PaymentRepository};
pub use sale::{CreateSaleInput, SaleError, SaleRepository};
pub use sales_return::{CreateSalesReturnInput, SalesReturnError, SalesReturnRepository};
pub use statement::{StatementError, StatementRepository};

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::DbErr;

/// UTC bounds of a calendar year: `[Jan 1 00:00, next Jan 1 00:00)`.
///
/// Used to scope "latest document number" lookups to records created in
/// the year being numbered.
pub(crate) fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), DbErr> {
    let start_of = |y: i32| {
        NaiveDate::from_ymd_opt(y, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| DbErr::Custom(format!("year {y} out of range")))
    };
    Ok((start_of(year)?, start_of(year + 1)?))
}

/// Returns true if the error is a unique-constraint violation.
///
/// This is the signal the numbering retry loop reacts to: a concurrent
/// writer claimed the candidate number first.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2025).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_year_bounds_rejects_absurd_year() {
        assert!(year_bounds(i32::MAX).is_err());
    }
}
